//! Checksum block (Cksum) and its validation.
//!
//! The stored value is a CRC-16/CCITT-FALSE over every byte of the file that
//! precedes it. For revision 2 files that span includes the block's own
//! `"Cksum\0"` name header.

use super::CHECKSUM;
use crate::{
    Result,
    blocks::common::{BlockParse, ByteCursor, DecodeContext},
};
use crc::{CRC_16_IBM_3740, Crc};
use serde::Serialize;

/// CRC-16/CCITT-FALSE, catalogued as CRC-16/IBM-3740 (poly 0x1021, init 0xFFFF).
const SOR_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Checksum a SOR file stores in its Cksum block.
pub fn crc16_ccitt(bytes: &[u8]) -> u16 {
    SOR_CRC.checksum(bytes)
}

/// Stored checksum and the outcome of recomputing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumRecord {
    /// Value carried in the file.
    pub stored: u16,
    /// Value recomputed over the covered bytes, once validated.
    pub computed: Option<u16>,
    /// Number of leading file bytes the checksum covers.
    pub covered_bytes: usize,
}

impl ChecksumRecord {
    /// Recompute the checksum over `data`, the complete file.
    ///
    /// Returns whether the stored value matches.
    pub fn validate(&mut self, data: &[u8]) -> Result<bool> {
        let covered = ByteCursor::new(data).slice_absolute(0, self.covered_bytes)?;
        let computed = crc16_ccitt(covered);
        self.computed = Some(computed);
        Ok(computed == self.stored)
    }

    /// Whether the stored value matched; `None` before validation.
    pub fn is_valid(&self) -> Option<bool> {
        self.computed.map(|computed| computed == self.stored)
    }
}

impl BlockParse for ChecksumRecord {
    const NAME: &'static str = CHECKSUM;

    fn parse(cursor: &mut ByteCursor<'_>, _ctx: &DecodeContext) -> Result<Self> {
        let covered_bytes = cursor.position();
        let stored = cursor.read_u16()?;
        Ok(Self {
            stored,
            computed: None,
            covered_bytes,
        })
    }
}
