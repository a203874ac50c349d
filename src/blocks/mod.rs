// src/blocks/mod.rs

// ============================================================================
// Block names
// ============================================================================
// Names as they appear in the Map block. Anything not listed here is a vendor
// block and is kept verbatim.

/// Directory block, always first in the file.
pub const MAP: &str = "Map";
/// General parameters (cable, fiber, operator).
pub const GENERAL_PARAMETERS: &str = "GenParams";
/// Supplier parameters (instrument identification).
pub const SUPPLIER_PARAMETERS: &str = "SupParams";
/// Fixed parameters (acquisition setup).
pub const FIXED_PARAMETERS: &str = "FxdParams";
/// Key events table.
pub const KEY_EVENTS: &str = "KeyEvents";
/// Waveform samples.
pub const DATA_POINTS: &str = "DataPts";
/// Link parameters (landmarks).
pub const LINK_PARAMETERS: &str = "LnkParams";
/// Trailing checksum.
pub const CHECKSUM: &str = "Cksum";

/// Decoder selected for a block name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    GeneralParameters,
    SupplierParameters,
    FixedParameters,
    KeyEvents,
    DataPoints,
    LinkParameters,
    Checksum,
    Proprietary,
}

const BLOCK_KINDS: [(&str, BlockKind); 7] = [
    (GENERAL_PARAMETERS, BlockKind::GeneralParameters),
    (SUPPLIER_PARAMETERS, BlockKind::SupplierParameters),
    (FIXED_PARAMETERS, BlockKind::FixedParameters),
    (KEY_EVENTS, BlockKind::KeyEvents),
    (DATA_POINTS, BlockKind::DataPoints),
    (LINK_PARAMETERS, BlockKind::LinkParameters),
    (CHECKSUM, BlockKind::Checksum),
];

impl BlockKind {
    /// Look up the decoder for a Map entry name. Unknown names are proprietary.
    pub fn from_name(name: &str) -> Self {
        BLOCK_KINDS
            .iter()
            .find(|(known, _)| *known == name)
            .map_or(Self::Proprietary, |&(_, kind)| kind)
    }
}

// ============================================================================
// Submodules
// ============================================================================

mod checksum_block;
mod common;
mod data_points_block;
mod fixed_block;
mod general_block;
mod key_events_block;
mod link_block;
mod map_block;
mod proprietary_block;
mod supplier_block;

// Re-export common types
pub use common::{
    BlockParse, ByteCursor, CodedField, DEFAULT_INDEX_OF_REFRACTION, DecodeContext, Endian,
    Revision, SPEED_OF_LIGHT, format_version, time_to_distance, time_to_seconds,
};

// Re-export block types
pub use checksum_block::{ChecksumRecord, crc16_ccitt};
pub use data_points_block::{DataPoints, ScaleGroup};
pub use fixed_block::{DisplayWindow, FixedParameters};
pub use general_block::GeneralParameters;
pub use key_events_block::{EventKind, EventOrigin, EventType, KeyEvent, KeyEventSummary, KeyEvents};
pub use link_block::{Landmark, LinkParameters};
pub use map_block::{BlockDirectory, BlockDirectoryEntry};
pub use proprietary_block::ProprietaryBlock;
pub use supplier_block::SupplierParameters;
