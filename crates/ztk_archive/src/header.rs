use ztk_io::Buffer;

use crate::{ArchiveError, Result};

/// On-disk encoding of the object graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Ascii,
    Binary,
    BinSafe,
}

/// The textual preamble every archive starts with.
#[derive(Debug, Clone)]
pub struct ArchiveHeader {
    pub version: i32,
    pub archiver: String,
    pub format: ArchiveFormat,
    pub save: bool,
    pub user: String,
    pub date: String,
}

impl ArchiveHeader {
    pub(crate) fn read(buf: &mut Buffer) -> Result<ArchiveHeader> {
        if buf.get_line(true)? != "ZenGin Archive" {
            return Err(ArchiveError::InvalidHeader("missing magic"));
        }

        let version_line = buf.get_line(true)?;
        let version = version_line
            .strip_prefix("ver ")
            .ok_or(ArchiveError::InvalidHeader("missing version"))?
            .trim()
            .parse()?;

        let archiver = buf.get_line(true)?;

        let format = match buf.get_line(true)?.as_str() {
            "ASCII" => ArchiveFormat::Ascii,
            "BINARY" => ArchiveFormat::Binary,
            "BIN_SAFE" => ArchiveFormat::BinSafe,
            other => return Err(ArchiveError::UnknownFormat(other.to_string())),
        };

        let mut header = ArchiveHeader {
            version,
            archiver,
            format,
            save: false,
            user: String::new(),
            date: String::new(),
        };

        loop {
            let line = buf.get_line(true)?;
            if line == "END" {
                break;
            }

            if let Some(value) = line.strip_prefix("saveGame ") {
                header.save = value.trim().parse::<i32>()? != 0;
            } else if let Some(value) = line.strip_prefix("date ") {
                header.date = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix("user ") {
                header.user = value.trim().to_string();
            }
        }

        Ok(header)
    }
}

/// Consumes the `objects <n> / END` section shared by the ASCII and
/// BINARY encodings.
pub(crate) fn read_object_count(buf: &mut Buffer) -> Result<u32> {
    let line = buf.get_line(true)?;
    let count = line
        .strip_prefix("objects ")
        .ok_or(ArchiveError::InvalidHeader("missing object count"))?
        .trim()
        .parse()?;

    if buf.get_line(true)? != "END" {
        return Err(ArchiveError::InvalidHeader("second END missing"));
    }

    Ok(count)
}
