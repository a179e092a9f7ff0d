use ztk_io::Buffer;

use crate::entry::VdfEntry;
use crate::time::dos_to_unix_time;
use crate::{Result, VdfsError};

const COMMENT_LENGTH: usize = 256;
const SIGNATURE_LENGTH: usize = 16;

pub(crate) const SIGNATURE_G1: &str = "PSVDSC_V2.00\r\n\r\n";
pub(crate) const SIGNATURE_G2: &str = "PSVDSC_V2.00\n\r\n\r";

/// The fixed 296-byte container header.
#[derive(Debug, Clone)]
pub struct VdfHeader {
    pub comment: String,
    pub signature: String,
    pub entry_count: u32,
    pub file_count: u32,
    /// Unix timestamp converted from the on-disk DOS time.
    pub timestamp: i64,
    pub size: u32,
    pub catalog_offset: u32,
    pub version: u32,
}

impl VdfHeader {
    fn read(buf: &mut Buffer) -> Result<VdfHeader> {
        let mut comment = buf.get_string(COMMENT_LENGTH)?;
        if let Some(end) = comment.find('\x1A') {
            comment.truncate(end);
        }

        Ok(VdfHeader {
            comment,
            signature: buf.get_string(SIGNATURE_LENGTH)?,
            entry_count: buf.get_u32()?,
            file_count: buf.get_u32()?,
            timestamp: dos_to_unix_time(buf.get_u32()?),
            size: buf.get_u32()?,
            catalog_offset: buf.get_u32()?,
            version: buf.get_u32()?,
        })
    }
}

/// A mounted VDF container.
#[derive(Debug, Clone)]
pub struct VdfFile {
    header: VdfHeader,
    root: VdfEntry,
}

impl VdfFile {
    /// Parses the container catalog. Only the two retail signatures are
    /// accepted; third-party "Union" containers use an incompatible
    /// layout and are rejected.
    pub fn open(buf: &mut Buffer) -> Result<VdfFile> {
        let header = VdfHeader::read(buf)?;

        if header.signature != SIGNATURE_G1 && header.signature != SIGNATURE_G2 {
            return Err(VdfsError::UnknownSignature(header.signature));
        }

        buf.set_position(header.catalog_offset as usize)?;

        let mut root = VdfEntry::directory("");
        loop {
            let entry = VdfEntry::read(buf, header.catalog_offset)?;
            let last = entry.is_last();
            root.insert_sorted(entry);
            if last {
                break;
            }
        }

        Ok(VdfFile { header, root })
    }

    pub fn header(&self) -> &VdfHeader {
        &self.header
    }

    /// The top-level entries of the container.
    pub fn entries(&self) -> &[VdfEntry] {
        self.root.children()
    }

    /// Depth-first, case-insensitive search across the whole catalog.
    pub fn find_entry(&self, name: &str) -> Option<&VdfEntry> {
        self.root.find_child(name)
    }

    /// Resolves a `/`-separated path from the catalog root. `"/"` (and the
    /// empty path) resolve to the synthetic root directory.
    pub fn resolve_path(&self, path: &str) -> Option<&VdfEntry> {
        self.root.resolve_path(path)
    }

    /// Recursive union with another container's catalog.
    pub fn merge(&mut self, other: &VdfFile, override_existing: bool) {
        for child in other.entries() {
            self.root.merge(child, override_existing);
        }
    }
}
