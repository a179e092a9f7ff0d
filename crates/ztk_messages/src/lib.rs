//! The cutscene message database (`OU.BIN` / `OU.CSL`), a `zCCSLib`
//! archive of named conversation blocks.

use ztk_archive::{ArchiveError, ArchiveFormat, ArchiveRead};
use ztk_io::Buffer;

#[derive(Debug, thiserror::Error)]
pub enum MessagesError {
    #[error("malformed message database: {0}")]
    Malformed(String),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

pub type Result<T> = std::result::Result<T, MessagesError>;

/// The spoken/displayed part of a conversation block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationMessage {
    pub kind: u32,
    pub text: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageBlock {
    pub name: String,
    pub message: ConversationMessage,
}

/// All message blocks of a cutscene library, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    blocks: Vec<MessageBlock>,
}

impl Messages {
    pub fn parse(buf: Buffer) -> Result<Messages> {
        let mut archive = ztk_archive::open(buf)?;
        let mut messages = Messages::default();

        let root = archive
            .read_object_begin()?
            .filter(|o| o.class_name == "zCCSLib");
        if root.is_none() {
            return Err(MessagesError::Malformed(
                "root object is not zCCSLib".into(),
            ));
        }

        let item_count = archive.read_int()?; // NumOfItems
        messages.blocks.reserve(item_count.max(0) as usize);

        for _ in 0..item_count {
            let block = archive
                .read_object_begin()?
                .filter(|o| o.class_name == "zCCSBlock");
            if block.is_none() {
                return Err(MessagesError::Malformed(
                    "expected zCCSBlock but didn't find it".into(),
                ));
            }

            let name = archive.read_string()?; // blockName
            let block_count = archive.read_int()?; // numOfBlocks
            let _sub_block = archive.read_float()?; // subBlock0

            if block_count != 1 {
                return Err(MessagesError::Malformed(format!(
                    "expected exactly one block but got {block_count} for {name}"
                )));
            }

            if archive
                .read_object_begin()?
                .filter(|o| o.class_name == "zCCSAtomicBlock")
                .is_none()
            {
                return Err(MessagesError::Malformed(format!(
                    "atomic block of {name} missing"
                )));
            }

            if archive
                .read_object_begin()?
                .filter(|o| o.class_name == "oCMsgConversation:oCNpcMessage:zCEventMessage")
                .is_none()
            {
                return Err(MessagesError::Malformed(format!(
                    "conversation message of {name} missing"
                )));
            }

            // binary databases store the type as a byte, every other
            // encoding as an enum
            let kind = if archive.header().format == ArchiveFormat::Binary {
                archive.read_byte()? as u32
            } else {
                archive.read_enum()?
            };

            let message = ConversationMessage {
                kind,
                text: archive.read_string()?,
                name: archive.read_string()?,
            };

            for class in ["oCMsgConversation", "zCCSAtomicBlock", "zCCSBlock"] {
                if !archive.read_object_end()? {
                    log::warn!("messages: {class}({name:?}) not fully parsed");
                    archive.skip_object(true)?;
                }
            }

            messages.blocks.push(MessageBlock { name, message });
        }

        if !archive.read_object_end()? {
            log::warn!("messages: not fully parsed");
        }

        messages.blocks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(messages)
    }

    pub fn blocks(&self) -> &[MessageBlock] {
        &self.blocks
    }

    /// Exact-name lookup via binary search over the sorted block list.
    pub fn block_by_name(&self, name: &str) -> Option<&MessageBlock> {
        self.blocks
            .binary_search_by(|block| block.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.blocks[i])
    }
}
