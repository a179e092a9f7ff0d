use ztk_io::compat::icompare;
use ztk_io::Buffer;

use crate::Result;

pub(crate) const ENTRY_NAME_LENGTH: usize = 64;
/// 64-byte name plus four 32-bit fields.
pub(crate) const PACKED_SIZE: usize = ENTRY_NAME_LENGTH + 4 * 4;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EntryFlags: u32 {
        /// The entry is a directory; its offset points at its first child.
        const DIRECTORY = 0x8000_0000;
        /// The entry is the final sibling of its run.
        const LAST = 0x4000_0000;
    }
}

/// One node of the VDF catalog tree.
///
/// File entries own a zero-copy view into the container; directory
/// entries keep their children sorted case-insensitively by name so
/// lookups can binary-search.
#[derive(Debug, Clone)]
pub struct VdfEntry {
    pub name: String,
    pub offset: u32,
    pub size: u32,
    pub flags: EntryFlags,
    pub attributes: u32,
    data: Buffer,
    children: Vec<VdfEntry>,
}

impl VdfEntry {
    pub(crate) fn read(buf: &mut Buffer, catalog_offset: u32) -> Result<VdfEntry> {
        let mut name = buf.get_string(ENTRY_NAME_LENGTH)?;
        if let Some(end) = name.find(' ') {
            name.truncate(end);
        }

        let mut entry = VdfEntry {
            name,
            offset: buf.get_u32()?,
            size: buf.get_u32()?,
            flags: EntryFlags::from_bits_retain(buf.get_u32()?),
            attributes: buf.get_u32()?,
            data: Buffer::empty(),
            children: Vec::new(),
        };

        if entry.is_directory() {
            let self_offset = buf.position();
            buf.set_position(catalog_offset as usize + entry.offset as usize * PACKED_SIZE)?;

            loop {
                let child = VdfEntry::read(buf, catalog_offset)?;
                let last = child.is_last();
                entry.insert_sorted(child);
                if last {
                    break;
                }
            }

            buf.set_position(self_offset)?;
        } else {
            let offset = entry.offset as usize;
            let size = entry.size as usize;

            if offset + size > buf.limit() {
                entry.data = buf.slice_at(offset.min(buf.limit()), 0)?;
                log::warn!("failed to parse VDF entry {:?}: too big", entry.name);
            } else {
                entry.data = buf.slice_at(offset, size)?;
            }
        }

        Ok(entry)
    }

    pub(crate) fn directory(name: impl Into<String>) -> VdfEntry {
        VdfEntry {
            name: name.into(),
            offset: 0,
            size: 0,
            flags: EntryFlags::DIRECTORY,
            attributes: 0,
            data: Buffer::empty(),
            children: Vec::new(),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.flags.contains(EntryFlags::DIRECTORY)
    }

    pub fn is_file(&self) -> bool {
        !self.is_directory()
    }

    pub fn is_last(&self) -> bool {
        self.flags.contains(EntryFlags::LAST)
    }

    pub fn children(&self) -> &[VdfEntry] {
        &self.children
    }

    /// A fresh cursor over the entry's contents.
    pub fn open(&self) -> Buffer {
        self.data.clone()
    }

    pub(crate) fn insert_sorted(&mut self, child: VdfEntry) {
        let at = self
            .children
            .partition_point(|c| icompare(&c.name, &child.name).is_lt());
        self.children.insert(at, child);
    }

    fn direct_child(&self, name: &str) -> Option<&VdfEntry> {
        self.children
            .binary_search_by(|c| icompare(&c.name, name))
            .ok()
            .map(|i| &self.children[i])
    }

    /// Depth-first search for an entry called `name` anywhere below this
    /// entry. Matching is case-insensitive and on full names only.
    pub fn find_child(&self, name: &str) -> Option<&VdfEntry> {
        if name.is_empty() {
            return None;
        }

        if let Some(found) = self.direct_child(name) {
            return Some(found);
        }

        self.children
            .iter()
            .find_map(|child| child.find_child(name))
    }

    /// Walks `path` segment by segment without descending into siblings.
    pub fn resolve_path(&self, path: &str) -> Option<&VdfEntry> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Some(self);
        }

        let (segment, rest) = match path.split_once('/') {
            Some((segment, rest)) => (segment, Some(rest)),
            None => (path, None),
        };

        let child = self.direct_child(segment)?;
        match rest {
            Some(rest) => child.resolve_path(rest),
            None => Some(child),
        }
    }

    /// Merges `other` into this directory. On a file collision the
    /// incoming entry wins only with `override_existing`; directory pairs
    /// merge recursively.
    pub fn merge(&mut self, other: &VdfEntry, override_existing: bool) {
        match self
            .children
            .binary_search_by(|c| icompare(&c.name, &other.name))
        {
            Err(_) => self.insert_sorted(other.clone()),
            Ok(i) => {
                let existing = &mut self.children[i];
                if other.is_file() || existing.is_file() {
                    if override_existing {
                        self.children[i] = other.clone();
                    }
                } else {
                    for child in other.children() {
                        existing.merge(child, override_existing);
                    }
                }
            }
        }
    }
}
