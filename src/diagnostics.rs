//! Recoverable findings attached to a [`ParseResult`](crate::ParseResult).
//!
//! None of these stop decoding. They tell the caller which parts of a file are
//! suspect so it can decide whether to accept a partially decoded result.

use serde::Serialize;

/// A warning recorded against one block.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The decoder consumed a different number of bytes than the Map block declares.
    #[error("{block}: declared {declared} bytes, decoder consumed {consumed}")]
    BlockLengthMismatch {
        block: String,
        declared: usize,
        consumed: usize,
    },

    /// The number of decoded samples disagrees with a declared count.
    #[error("{block}: declares {declared} data points, {decoded} decoded")]
    SampleCountMismatch {
        block: String,
        declared: u64,
        decoded: u64,
    },

    /// The recomputed checksum differs from the stored one.
    #[error("{block}: stored checksum {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        block: String,
        stored: u16,
        computed: u16,
    },

    /// The event table is not in increasing distance and number order.
    #[error("{block}: event {event_number} is out of order")]
    UnsortedEvents { block: String, event_number: u16 },

    /// The block could not be decoded and is kept as a failure record.
    #[error("{block}: {cause}")]
    BlockDecodeFailed { block: String, cause: String },

    /// Distances were computed before any group index was known.
    #[error("{block}: no FxdParams before this block, distances use group index {index_of_refraction}")]
    DefaultIndexOfRefraction {
        block: String,
        index_of_refraction: f64,
    },
}

impl Diagnostic {
    /// Result key of the block the diagnostic is about.
    pub fn block(&self) -> &str {
        match self {
            Diagnostic::BlockLengthMismatch { block, .. }
            | Diagnostic::SampleCountMismatch { block, .. }
            | Diagnostic::ChecksumMismatch { block, .. }
            | Diagnostic::UnsortedEvents { block, .. }
            | Diagnostic::BlockDecodeFailed { block, .. }
            | Diagnostic::DefaultIndexOfRefraction { block, .. } => block,
        }
    }
}
