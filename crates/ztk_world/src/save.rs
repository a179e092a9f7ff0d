use num_enum::TryFromPrimitive;

use ztk_io::Buffer;

use crate::vob::decode_enum;
use crate::{Result, WorldError};

/// Metadata block of a save-game (`SAVEINFO.SAV`).
#[derive(Debug, Clone, Default)]
pub struct SaveInfo {
    pub title: String,
    pub world: String,
    pub time_day: i32,
    pub time_hour: i32,
    pub time_minute: i32,
    pub save_date: String,
    pub version_major: i32,
    pub version_minor: i32,
    pub play_time_seconds: i32,
    // Gothic II extensions
    pub version_point: i32,
    pub version_int: i32,
    pub version_app_name: String,
}

impl SaveInfo {
    pub fn parse(buf: Buffer) -> Result<SaveInfo> {
        let mut archive = ztk_archive::open(buf)?;

        let header = archive
            .read_object_begin()?
            .filter(|o| o.class_name == "oCSavegameInfo");
        let Some(header) = header else {
            return Err(WorldError::Malformed(
                "expected oCSavegameInfo object not found".into(),
            ));
        };

        let mut info = SaveInfo {
            title: archive.read_string()?,          // Title
            world: archive.read_string()?,          // WorldName
            time_day: archive.read_int()?,          // TimeDay
            time_hour: archive.read_int()?,         // TimeHour
            time_minute: archive.read_int()?,       // TimeMin
            save_date: archive.read_string()?,      // SaveDate
            version_major: archive.read_int()?,     // VersionMajor
            version_minor: archive.read_int()?,     // VersionMinor
            play_time_seconds: archive.read_int()?, // PlayTimeSeconds
            ..SaveInfo::default()
        };

        if !archive.read_object_end()? {
            // Gothic II stores three more fields
            info.version_point = archive.read_int()?; // VersionPoint
            info.version_int = archive.read_int()?; // VersionInt
            info.version_app_name = archive.read_string()?; // VersionAppName
        }

        if !archive.read_object_end()? {
            log::warn!("save_info: {:?} not fully parsed", header.class_name);
        }

        Ok(info)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum TopicSection {
    Quests = 0,
    Notes = 1,
}

impl Default for TopicSection {
    fn default() -> Self {
        Self::Quests
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum TopicStatus {
    Free = 0,
    Running = 1,
    Success = 2,
    Failure = 3,
    Obsolete = 4,
}

impl Default for TopicStatus {
    fn default() -> Self {
        Self::Free
    }
}

/// One quest-log topic with its entries.
#[derive(Debug, Clone, Default)]
pub struct LogTopic {
    pub description: String,
    pub section: TopicSection,
    pub status: TopicStatus,
    pub entries: Vec<String>,
}

/// The persisted value(s) of one script symbol.
#[derive(Debug, Clone, Default)]
pub struct SymbolState {
    pub name: String,
    pub values: Vec<i32>,
}

/// The script-side state of a save-game (`SAVEDAT.SAV`): told dialogs,
/// the quest log, symbol values and the guild attitude table.
#[derive(Debug, Clone, Default)]
pub struct ScriptState {
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub infos: Vec<(bool, String)>,
    pub log: Vec<LogTopic>,
    pub symbols: Vec<SymbolState>,
    pub guild_attitudes: Vec<Vec<u8>>,
}

const GUILD_COUNT: usize = 42;

impl ScriptState {
    pub fn parse(buf: Buffer, g2: bool) -> Result<ScriptState> {
        let mut archive = ztk_archive::open(buf)?;
        let mut state = ScriptState {
            day: archive.read_int()?,    // day
            hour: archive.read_int()?,   // hour
            minute: archive.read_int()?, // min
            ..ScriptState::default()
        };

        let entry_count = archive.read_int()?; // NumOfEntries
        state.infos.reserve(entry_count.max(0) as usize);
        for _ in 0..entry_count {
            let told = archive.read_bool()?; // Told
            let name = archive.read_string()?; // InstName
            state.infos.push((told, name));
        }

        let _entry_count = archive.read_int()?; // NumOfEntries
        let topic_count = archive.read_int()?; // LOGMANAGERTOPICCOUNT
        state.log.reserve(topic_count.max(0) as usize);

        for _ in 0..topic_count {
            let mut topic = LogTopic {
                description: archive.read_string()?, // TOPICDESCRIPTION
                section: decode_enum("topic section", archive.read_enum()?)?, // TOPICSECTION
                status: decode_enum("topic status", archive.read_enum()?)?, // TOPICSTATUS
                entries: Vec::new(),
            };

            let entry_count = archive.read_int()?; // LOGTOPICENTRYCOUNT
            let _manager_entry_count = archive.read_int()?; // LOGMANAGERENTRYCOUNT

            topic.entries.reserve(entry_count.max(0) as usize);
            for _ in 0..entry_count {
                topic.entries.push(archive.read_string()?); // ENTRYDESCRIPTION
            }

            state.log.push(topic);
        }

        let manager = archive
            .read_object_begin()?
            .filter(|o| o.class_name == "oCCSManager:zCCSManager");
        if manager.is_none() {
            return Err(WorldError::Malformed(
                "expected oCCSManager:zCCSManager object not found".into(),
            ));
        }

        let _pool_count = archive.read_int()?; // poolCount

        if !archive.read_object_end()? {
            log::warn!("script_state: oCCSManager not fully parsed");
            archive.skip_object(true)?;
        }

        let symbol_count = archive.read_int()?; // numSymbols
        state.symbols.reserve(symbol_count.max(0) as usize);

        for _ in 0..symbol_count {
            let mut symbol = SymbolState {
                name: archive.read_string()?, // symName%d
                values: Vec::new(),
            };

            if g2 {
                let value_count = archive.read_int()?; // symName%dcnt
                for _ in 0..value_count {
                    symbol.values.push(archive.read_int()?); // symValue%d_%d
                }
            } else {
                symbol.values.push(archive.read_int()?); // symValue%d
            }

            state.symbols.push(symbol);
        }

        // guild attitudes are a flat 42x42 byte matrix
        let mut table = archive.read_raw_bytes(GUILD_COUNT * GUILD_COUNT)?; // guildTable
        state.guild_attitudes.reserve(GUILD_COUNT);
        for _ in 0..GUILD_COUNT {
            let mut row = Vec::with_capacity(GUILD_COUNT);
            for _ in 0..GUILD_COUNT {
                row.push(table.get_u8()?);
            }
            state.guild_attitudes.push(row);
        }

        Ok(state)
    }
}
