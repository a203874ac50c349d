// blocks/common.rs
//! Common types, traits, and helper functions for SOR block parsing.
//!
//! This module provides:
//! - [`ByteCursor`]: bounds-checked sequential reader over the file bytes
//! - [`BlockParse`]: Trait for decoding one block from its byte window
//! - [`Revision`] and [`DecodeContext`]: per-file state the decoders depend on
//! - Unit conversion helpers shared by the block decoders

use crate::{Error, Result};
use serde::Serialize;

// ============================================================================
// Physical constants
// ============================================================================

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Group index assumed when a block needs one before FxdParams supplied it.
pub const DEFAULT_INDEX_OF_REFRACTION: f64 = 1.4682;

/// Time fields are stored in units of 100 ps.
const TIME_UNIT_S: f64 = 1e-10;

/// Convert a raw time-of-flight value (100 ps units) to seconds.
#[inline]
pub fn time_to_seconds(raw: f64) -> f64 {
    raw * TIME_UNIT_S
}

/// Convert a raw time-of-flight value (100 ps units) to a one-way fiber distance in metres.
#[inline]
pub fn time_to_distance(raw: f64, index_of_refraction: f64) -> f64 {
    time_to_seconds(raw) * SPEED_OF_LIGHT / index_of_refraction
}

// ============================================================================
// Byte cursor
// ============================================================================

/// Byte order of a multi-byte integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Sequential reader over a byte slice.
///
/// A cursor covers either the whole file or a window of it. Positions reported
/// by [`position`](Self::position) are always absolute file offsets, so errors
/// raised inside a block window still point into the file.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    base: usize,
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor over a complete buffer, starting at offset 0.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_base(bytes, 0)
    }

    /// Create a cursor over `bytes`, which start at absolute offset `base`.
    pub fn with_base(bytes: &'a [u8], base: usize) -> Self {
        Self {
            bytes,
            base,
            pos: 0,
        }
    }

    /// Absolute file offset of the next byte to read.
    #[inline]
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    /// Number of bytes consumed since the cursor was created.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Number of bytes left before the bound.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Bytes not read yet.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn truncated(&self, requested: usize) -> Error {
        Error::TruncatedInput {
            offset: self.position(),
            requested,
            available: self.remaining(),
        }
    }

    /// Read `len` bytes as a borrowed slice.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.truncated(len));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Advance past `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Split off a cursor over the next `len` bytes and advance past them.
    pub fn window(&mut self, len: usize) -> Result<ByteCursor<'a>> {
        let base = self.position();
        let bytes = self.read_bytes(len)?;
        Ok(ByteCursor::with_base(bytes, base))
    }

    /// Borrow `len` bytes starting at absolute file offset `offset`.
    ///
    /// Does not move the cursor. The range must lie within this cursor's bound.
    pub fn slice_absolute(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let start = offset.checked_sub(self.base).ok_or(Error::TruncatedInput {
            offset,
            requested: len,
            available: 0,
        })?;
        let available = self.bytes.len().saturating_sub(start);
        if len > available {
            return Err(Error::TruncatedInput {
                offset,
                requested: len,
                available,
            });
        }
        Ok(&self.bytes[start..start + len])
    }

    /// Read an unsigned integer of `width` bytes (1 to 8).
    pub fn read_uint(&mut self, width: usize, endian: Endian) -> Result<u64> {
        if !(1..=8).contains(&width) {
            return Err(Error::InvalidField {
                block: "cursor",
                field: "integer width",
                value: width.to_string(),
            });
        }
        let bytes = self.read_bytes(width)?;
        let mut buf = [0u8; 8];
        let value = match endian {
            Endian::Little => {
                buf[..width].copy_from_slice(bytes);
                u64::from_le_bytes(buf)
            }
            Endian::Big => {
                buf[8 - width..].copy_from_slice(bytes);
                u64::from_be_bytes(buf)
            }
        };
        Ok(value)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        let b = self.read_bytes(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        let b = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a fixed-length text field, dropping trailing NUL and space padding.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        Ok(decode_text(bytes)
            .trim_end_matches(['\0', ' '])
            .to_string())
    }

    /// Read a NUL-terminated string. The terminator is consumed.
    pub fn read_terminated_string(&mut self) -> Result<String> {
        let rest = self.rest();
        let Some(end) = rest.iter().position(|&b| b == 0) else {
            return Err(self.truncated(rest.len() + 1));
        };
        let text = decode_text(&rest[..end]);
        self.pos += end + 1;
        Ok(text)
    }

    /// Read a string preceded by a little-endian length of `prefix_width` bytes.
    pub fn read_length_prefixed_string(&mut self, prefix_width: usize) -> Result<String> {
        let start = self.pos;
        let len = self.read_uint(prefix_width, Endian::Little)?;
        let len = match usize::try_from(len) {
            Ok(len) if len <= self.remaining() => len,
            _ => {
                let error = self.truncated(len.try_into().unwrap_or(usize::MAX));
                self.pos = start;
                return Err(error);
            }
        };
        let bytes = self.read_bytes(len)?;
        Ok(decode_text(bytes))
    }
}

/// SOR text is single-byte; anything that is not valid UTF-8 is decoded lossily.
fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// ============================================================================
// Format revision
// ============================================================================

/// Layout revision of a SOR file, taken from the Map block.
///
/// Revision 2 files start with a `"Map\0"` signature and repeat each block's
/// name at the start of the block; several blocks carry extra fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Revision {
    #[serde(rename = "1")]
    V1,
    #[serde(rename = "2")]
    V2,
}

impl Revision {
    /// Classify a raw version number such as 100 or 200.
    pub fn from_version(version: u16) -> Option<Self> {
        match version {
            100..=199 => Some(Self::V1),
            200..=299 => Some(Self::V2),
            _ => None,
        }
    }

    /// Whether blocks repeat their name as a header.
    pub fn has_block_names(self) -> bool {
        self == Self::V2
    }
}

/// Render a raw version number the way instruments display it, e.g. 200 → `"2.00"`.
pub fn format_version(version: u16) -> String {
    format!("{}.{:02}", version / 100, version % 100)
}

/// File-level state passed to every block decoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeContext {
    /// Layout revision from the Map block
    pub revision: Revision,
    /// Group index used to turn times of flight into distances
    pub index_of_refraction: f64,
}

impl DecodeContext {
    pub fn new(revision: Revision) -> Self {
        Self {
            revision,
            index_of_refraction: DEFAULT_INDEX_OF_REFRACTION,
        }
    }

    pub fn with_index_of_refraction(mut self, index_of_refraction: f64) -> Self {
        self.index_of_refraction = index_of_refraction;
        self
    }

    /// Distance in metres for a raw time-of-flight value.
    #[inline]
    pub fn distance(&self, raw: f64) -> f64 {
        time_to_distance(raw, self.index_of_refraction)
    }
}

// ============================================================================
// Block parsing
// ============================================================================

/// A decoder for one named block.
pub trait BlockParse: Sized {
    /// Block name as it appears in the Map block.
    const NAME: &'static str;

    /// Consume the revision 2 name header, checking it names this block.
    fn parse_header(cursor: &mut ByteCursor<'_>, ctx: &DecodeContext) -> Result<()> {
        if !ctx.revision.has_block_names() {
            return Ok(());
        }
        let found = cursor.read_terminated_string()?;
        if found != Self::NAME {
            return Err(Error::BlockHeaderMismatch {
                expected: Self::NAME.to_string(),
                found,
            });
        }
        Ok(())
    }

    /// Decode the block body from a cursor windowed to the block.
    fn parse(cursor: &mut ByteCursor<'_>, ctx: &DecodeContext) -> Result<Self>;

    /// Decode header and body.
    fn from_cursor(cursor: &mut ByteCursor<'_>, ctx: &DecodeContext) -> Result<Self> {
        Self::parse_header(cursor, ctx)?;
        Self::parse(cursor, ctx)
    }
}

/// A raw code paired with its human-readable meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodedField<T> {
    pub code: T,
    pub description: &'static str,
}

impl<T> CodedField<T> {
    pub fn new(code: T, description: &'static str) -> Self {
        Self { code, description }
    }
}
