use ztk_io::Buffer;
use ztk_world::{SaveInfo, ScriptState, TopicSection, TopicStatus};

fn ascii_archive(body: &str) -> Buffer {
    let text = format!(
        "ZenGin Archive\nver 1\nzCArchiverGeneric\nASCII\nsaveGame 1\nEND\nobjects 1\nEND\n\n{body}"
    );
    Buffer::from_vec(text.into_bytes())
}

#[test]
fn g2_save_info_reads_the_extension_block() {
    let body = "\
[% oCSavegameInfo 0 0]
\tTitle=string:Kapitel 3
\tWorldName=string:NEWWORLD
\tTimeDay=int:12
\tTimeHour=int:21
\tTimeMin=int:5
\tSaveDate=string:6.7.2003 - 21:36
\tVersionMajor=int:2
\tVersionMinor=int:6
\tPlayTimeSeconds=int:48754
\tVersionPoint=int:0
\tVersionInt=int:0
\tVersionAppName=string:Gothic II - 2.6 (fix)
[]
";
    let info = SaveInfo::parse(ascii_archive(body)).unwrap();

    assert_eq!(info.title, "Kapitel 3");
    assert_eq!(info.world, "NEWWORLD");
    assert_eq!(info.time_day, 12);
    assert_eq!(info.time_hour, 21);
    assert_eq!(info.play_time_seconds, 48754);
    assert_eq!(info.version_app_name, "Gothic II - 2.6 (fix)");
}

#[test]
fn script_state_reads_infos_log_and_guild_table() {
    let guild_table: String = "00".repeat(42 * 42);
    let body = format!(
        "\tday=int:3
\thour=int:12
\tmin=int:30
\tNumOfEntries=int:1
\tTold=bool:1
\tInstName=string:DIA_XARDAS_HELLO
\tNumOfEntries=int:1
\tLOGMANAGERTOPICCOUNT=int:1
\tTOPICDESCRIPTION=string:Der Eid
\tTOPICSECTION=enum:0
\tTOPICSTATUS=enum:1
\tLOGTOPICENTRYCOUNT=int:2
\tLOGMANAGERENTRYCOUNT=int:2
\tENTRYDESCRIPTION=string:Erster Eintrag
\tENTRYDESCRIPTION=string:Zweiter Eintrag
[% oCCSManager:zCCSManager 0 1]
\tpoolCount=int:0
[]
\tnumSymbols=int:1
\tsymName0=string:KAPITEL
\tsymName0cnt=int:1
\tsymValue0_0=int:3
\tguildTable=raw:{guild_table}
"
    );

    let state = ScriptState::parse(ascii_archive(&body), true).unwrap();

    assert_eq!((state.day, state.hour, state.minute), (3, 12, 30));
    assert_eq!(state.infos, vec![(true, "DIA_XARDAS_HELLO".to_string())]);

    assert_eq!(state.log.len(), 1);
    let topic = &state.log[0];
    assert_eq!(topic.description, "Der Eid");
    assert_eq!(topic.section, TopicSection::Quests);
    assert_eq!(topic.status, TopicStatus::Running);
    assert_eq!(topic.entries, vec!["Erster Eintrag", "Zweiter Eintrag"]);

    assert_eq!(state.symbols.len(), 1);
    assert_eq!(state.symbols[0].name, "KAPITEL");
    assert_eq!(state.symbols[0].values, vec![3]);

    assert_eq!(state.guild_attitudes.len(), 42);
    assert!(state.guild_attitudes.iter().all(|row| row.len() == 42));
}
