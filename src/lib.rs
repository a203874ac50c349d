#![forbid(unsafe_code)]

//! # sor-rs
//!
//! A Rust library for decoding Telcordia SOR files, the binary format optical
//! time-domain reflectometers (OTDRs) use to store fiber traces.
//!
//! A SOR file is a sequence of named, length-prefixed blocks. The leading Map
//! block lists every other block; the rest hold general and supplier metadata,
//! the acquisition setup, the instrument's key event table, the waveform
//! samples, optional landmarks, vendor blocks and a trailing checksum.
//!
//! ## Features
//!
//! - **Decoding**: Both layout revisions (1.x and 2.x) with values converted to
//!   metres, seconds and dB
//! - **Partial results**: A damaged block is recorded and skipped; the rest of
//!   the file is still decoded
//! - **Integrity**: The stored CRC is recomputed and compared
//! - **JSON output**: Stable, file-ordered JSON dumps with an optional trace
//!
//! ## Quick Start
//!
//! ```no_run
//! use sor_rs::{Result, dump::{self, DumpOptions}};
//!
//! fn main() -> Result<()> {
//!     let (result, trace) = sor_rs::parse("fiber-001.sor")?;
//!
//!     if let Some(params) = result.fixed_parameters() {
//!         println!("{} nm, {} points", params.wavelength_nm, params.number_of_data_points);
//!     }
//!     if let Some(events) = result.key_events() {
//!         for event in &events.events {
//!             println!("event {} at {:.1} m", event.number, event.distance_m);
//!         }
//!     }
//!     for diagnostic in result.diagnostics() {
//!         eprintln!("warning: {diagnostic}");
//!     }
//!
//!     println!("{}", dump::to_json(&result, Some(&trace), &DumpOptions::default())?);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`blocks`] | Byte cursor, Map directory and per-block decoders |
//! | [`parsing`] | Decoding a whole file into a [`ParseResult`] |
//! | [`dump`] | JSON and trace file output |
//! | [`batch`] | Converting every SOR file under a directory |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Error Handling
//!
//! Only problems that make the whole file unreadable are errors: I/O failures,
//! an unrecognized Map block ([`Error::InvalidDirectory`]) or a file shorter
//! than its Map block declares ([`Error::TruncatedInput`]). Everything else is
//! reported as a [`Diagnostic`] on the result.

pub mod blocks;
pub mod parsing;

mod diagnostics;
mod result;
mod trace;

pub mod batch;
pub mod dump;
pub mod error;

// Re-export commonly used types at the crate root
pub use diagnostics::Diagnostic;
pub use error::{Error, Result};
pub use parsing::{parse_from_bytes as parse_bytes, parse_from_file as parse};
pub use result::{BlockRecord, DecodedBlock, FailedBlock, ParseResult, Summary};
pub use trace::TraceBuffer;
