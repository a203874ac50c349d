//! Map block - the directory of every other block in the file.
//!
//! The Map block is always first. It gives the layout revision and, for each
//! following block in file order, its name, revision and size in bytes. Block
//! offsets are not stored: each block starts where the previous one ends,
//! beginning right after the Map block.

use super::MAP;
use crate::{
    Error, Result,
    blocks::common::{ByteCursor, Revision, format_version},
};
use serde::Serialize;

/// Signature at offset 0 of a revision 2 file.
const MAP_SIGNATURE: &[u8; 4] = b"Map\0";

/// One row of the Map block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDirectoryEntry {
    /// Block name, e.g. "FxdParams".
    pub name: String,
    /// Block revision, e.g. 200.
    pub version: u16,
    /// Block size in bytes, including the revision 2 name header.
    pub length: u32,
    /// Absolute file offset of the first byte of the block.
    pub offset: usize,
    /// Position of the block in the file, starting at 1 (the Map block is 0).
    pub order: usize,
}

impl BlockDirectoryEntry {
    /// Absolute file offset one past the last byte of the block.
    pub fn end(&self) -> usize {
        self.offset + self.length as usize
    }
}

/// Decoded Map block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDirectory {
    /// Layout revision the rest of the file follows.
    pub revision: Revision,
    /// Raw Map block version, e.g. 200.
    pub version: u16,
    /// Map version rendered as text, e.g. "2.00".
    pub version_text: String,
    /// Size of the Map block itself.
    pub length: u32,
    /// Declared block count, including the Map block.
    pub block_count: u16,
    /// Blocks following the Map block, in file order.
    pub blocks: Vec<BlockDirectoryEntry>,
    /// Map bytes left over after the last entry.
    #[serde(skip)]
    pub unread: usize,
}

fn invalid(cause: impl Into<String>) -> Error {
    Error::InvalidDirectory(cause.into())
}

impl BlockDirectory {
    /// Decode the Map block from the start of a file.
    ///
    /// # Errors
    /// - [`Error::InvalidDirectory`] when the signature or revision is not
    ///   recognized, or the declared entries do not fit in the Map block.
    /// - [`Error::TruncatedInput`] when the listed blocks extend past the end
    ///   of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let signed = data.starts_with(MAP_SIGNATURE);
        if signed {
            cursor.skip(MAP_SIGNATURE.len())?;
        }

        let header = |e: Error| invalid(format!("unreadable Map header: {e}"));
        let version = cursor.read_u16().map_err(header)?;
        let revision = match (signed, Revision::from_version(version)) {
            (true, Some(Revision::V2)) => Revision::V2,
            (false, Some(Revision::V1)) => Revision::V1,
            (true, _) => return Err(invalid(format!("unsupported Map revision {version}"))),
            (false, _) => return Err(invalid("missing \"Map\" signature")),
        };
        let length = cursor.read_u32().map_err(header)?;
        let block_count = cursor.read_u16().map_err(header)?;

        let header_len = cursor.consumed();
        let map_len = length as usize;
        if map_len < header_len {
            return Err(invalid(format!(
                "Map size {map_len} is smaller than its {header_len}-byte header"
            )));
        }
        if map_len > data.len() {
            return Err(invalid(format!(
                "Map size {map_len} exceeds file size {}",
                data.len()
            )));
        }
        if block_count == 0 {
            return Err(invalid("block count is zero"));
        }

        let mut entries_cursor = ByteCursor::new(&data[..map_len]);
        entries_cursor.skip(header_len)?;

        let mut blocks = Vec::with_capacity(usize::from(block_count - 1));
        let mut offset = map_len;
        for order in 1..usize::from(block_count) {
            let entry = Self::read_entry(&mut entries_cursor, offset, order).map_err(|e| {
                invalid(format!(
                    "block count {block_count} does not match the Map block: entry {order}: {e}"
                ))
            })?;
            offset += entry.length as usize;
            blocks.push(entry);
        }

        // Every listed block must lie inside the file.
        if let Some(entry) = blocks.iter().find(|entry| entry.end() > data.len()) {
            return Err(Error::TruncatedInput {
                offset: entry.offset,
                requested: entry.length as usize,
                available: data.len().saturating_sub(entry.offset),
            });
        }

        Ok(Self {
            revision,
            version,
            version_text: format_version(version),
            length,
            block_count,
            blocks,
            unread: entries_cursor.remaining(),
        })
    }

    fn read_entry(
        cursor: &mut ByteCursor<'_>,
        offset: usize,
        order: usize,
    ) -> Result<BlockDirectoryEntry> {
        let name = cursor.read_terminated_string()?;
        let version = cursor.read_u16()?;
        let length = cursor.read_u32()?;
        Ok(BlockDirectoryEntry {
            name,
            version,
            length,
            offset,
            order,
        })
    }

    /// Block name used as the result key for the directory itself.
    pub fn name(&self) -> &'static str {
        MAP
    }

    /// Entries for the blocks after the Map block, in file order.
    pub fn entries(&self) -> &[BlockDirectoryEntry] {
        &self.blocks
    }

    /// Look up the first entry with the given name.
    pub fn entry(&self, name: &str) -> Option<&BlockDirectoryEntry> {
        self.blocks.iter().find(|entry| entry.name == name)
    }

    /// Total bytes described by the directory, Map block included.
    pub fn total_length(&self) -> usize {
        self.length as usize
            + self
                .blocks
                .iter()
                .map(|entry| entry.length as usize)
                .sum::<usize>()
    }
}
