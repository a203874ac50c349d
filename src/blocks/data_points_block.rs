//! Data points block (DataPts) - the waveform.
//!
//! The block holds one or more scale groups. Each group gives its own point
//! count and scale factor followed by that many 16-bit samples. Samples are
//! converted to dB here and handed to the trace buffer by the aggregator; the
//! block record itself only keeps counts and scales.

use super::DATA_POINTS;
use crate::{
    Result,
    blocks::common::{BlockParse, ByteCursor, DecodeContext},
};
use serde::Serialize;

/// Scale factors are stored times 1000, and samples are in 0.001 dB units.
const SCALE_DIVISOR: f64 = 1_000_000.0;

/// Point count and scale of one group of samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleGroup {
    /// Points declared for this group.
    pub points: u32,
    /// Raw scale factor.
    pub scale_factor: u16,
    /// dB per raw sample unit.
    pub db_per_unit: f64,
}

/// Data points header and statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoints {
    /// Points declared by the block header.
    pub total_points: u32,
    /// Scale groups declared by the block header.
    pub scale_group_count: u16,
    pub scale_groups: Vec<ScaleGroup>,
    /// Samples actually present in the block.
    pub decoded_points: usize,
    pub min_level_db: Option<f64>,
    pub max_level_db: Option<f64>,
    /// Decoded samples, moved into the trace buffer by the aggregator.
    #[serde(skip)]
    pub(crate) samples: Vec<f64>,
}

impl DataPoints {
    /// Take the decoded samples out of the record.
    pub fn take_samples(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.samples)
    }
}

/// Convert one raw sample to dB.
///
/// The integer product is exact, so the only rounding is the final division.
#[inline]
fn sample_to_db(raw: u16, scale_factor: u16) -> f64 {
    (f64::from(raw) * f64::from(scale_factor)) / SCALE_DIVISOR
}

impl BlockParse for DataPoints {
    const NAME: &'static str = DATA_POINTS;

    fn parse(cursor: &mut ByteCursor<'_>, _ctx: &DecodeContext) -> Result<Self> {
        let total_points = cursor.read_u32()?;
        let scale_group_count = cursor.read_u16()?;

        let mut scale_groups = Vec::with_capacity(usize::from(scale_group_count));
        let mut samples = Vec::new();
        for _ in 0..scale_group_count {
            // A short block keeps whatever samples it holds.
            if cursor.remaining() < 6 {
                break;
            }
            let points = cursor.read_u32()?;
            let scale_factor = cursor.read_u16()?;
            scale_groups.push(ScaleGroup {
                points,
                scale_factor,
                db_per_unit: f64::from(scale_factor) / SCALE_DIVISOR,
            });

            let available = cursor.remaining() / 2;
            let count = (points as usize).min(available);
            samples.reserve(count);
            for _ in 0..count {
                samples.push(sample_to_db(cursor.read_u16()?, scale_factor));
            }
            if count < points as usize {
                break;
            }
        }

        let min_level_db = samples.iter().copied().reduce(f64::min);
        let max_level_db = samples.iter().copied().reduce(f64::max);

        Ok(Self {
            total_points,
            scale_group_count,
            scale_groups,
            decoded_points: samples.len(),
            min_level_db,
            max_level_db,
            samples,
        })
    }
}
