//! Error types for SOR decoding.
//!
//! This module defines the [`Error`] enum which represents the failures that
//! abort decoding of a file, or of a single block. Conditions that only make
//! part of a file suspect (length mismatches, bad checksums, unsorted event
//! tables) are not errors: they are collected as
//! [`Diagnostic`](crate::Diagnostic)s on the [`ParseResult`](crate::ParseResult).
//!
//! # Example
//!
//! ```no_run
//! use sor_rs::{Error, Result};
//!
//! fn summarize(path: &str) -> Result<()> {
//!     match sor_rs::parse(path) {
//!         Ok((result, trace)) => {
//!             println!("{} blocks, {} samples", result.blocks().len(), trace.len());
//!             Ok(())
//!         }
//!         Err(Error::InvalidDirectory(cause)) => {
//!             eprintln!("Not a readable SOR file: {cause}");
//!             Err(Error::InvalidDirectory(cause))
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

/// Errors that can occur while decoding a SOR file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A read went past the end of the available bytes.
    ///
    /// At file level this is fatal: the file is shorter than its own directory
    /// claims, so no offset can be trusted. Inside a block window it means the
    /// block is shorter than its decoder expects.
    #[error("Truncated input at offset {offset}: need {requested} bytes, {available} available")]
    TruncatedInput {
        /// Absolute file offset of the failed read
        offset: usize,
        /// Number of bytes the read needed
        requested: usize,
        /// Number of bytes left before the bound
        available: usize,
    },

    /// The file signature or the Map block is unusable.
    #[error("Invalid block directory: {0}")]
    InvalidDirectory(String),

    /// A revision 2 block did not start with its own name.
    #[error("Invalid block header: expected {expected:?}, found {found:?}")]
    BlockHeaderMismatch {
        /// The name listed in the Map block
        expected: String,
        /// The name found at the start of the block
        found: String,
    },

    /// A field held a value that cannot be interpreted.
    #[error("Invalid {field} in {block}: {value}")]
    InvalidField {
        /// Block that holds the field
        block: &'static str,
        /// Field name
        field: &'static str,
        /// Offending value, rendered for display
        value: String,
    },

    /// An I/O error occurred while reading the input or writing output.
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),

    /// Rendering the result as JSON failed.
    #[error("JSON serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// A specialized Result type for SOR operations.
///
/// This is defined as `core::result::Result<T, Error>` for convenience.
pub type Result<T> = core::result::Result<T, Error>;
