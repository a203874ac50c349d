//! Link parameters block (LnkParams) - landmarks along the fiber route.

use super::LINK_PARAMETERS;
use crate::{
    Result,
    blocks::common::{BlockParse, ByteCursor, DecodeContext},
};
use serde::Serialize;

/// One landmark row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Landmark {
    pub number: u16,
    /// Two-character landmark code.
    pub code: String,
    /// Location along the fiber, metres.
    pub location_m: f64,
    /// Key event the landmark is tied to.
    pub related_event: u16,
    pub gps_longitude: i32,
    pub gps_latitude: i32,
    pub fiber_correction_factor: u16,
    pub sheath_marker_entering: u32,
    pub sheath_marker_leaving: u32,
    pub sheath_units: String,
    pub mode_field_diameter: u16,
    pub comment: String,
}

/// Decoded LnkParams block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkParameters {
    pub landmarks: Vec<Landmark>,
}

impl LinkParameters {
    /// Landmark with the given number.
    pub fn landmark(&self, number: u16) -> Option<&Landmark> {
        self.landmarks.iter().find(|landmark| landmark.number == number)
    }
}

impl BlockParse for LinkParameters {
    const NAME: &'static str = LINK_PARAMETERS;

    fn parse(cursor: &mut ByteCursor<'_>, ctx: &DecodeContext) -> Result<Self> {
        let count = cursor.read_u16()?;
        let mut landmarks = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            landmarks.push(Landmark {
                number: cursor.read_u16()?,
                code: cursor.read_fixed_string(2)?,
                location_m: ctx.distance(f64::from(cursor.read_i32()?)),
                related_event: cursor.read_u16()?,
                gps_longitude: cursor.read_i32()?,
                gps_latitude: cursor.read_i32()?,
                fiber_correction_factor: cursor.read_u16()?,
                sheath_marker_entering: cursor.read_u32()?,
                sheath_marker_leaving: cursor.read_u32()?,
                sheath_units: cursor.read_fixed_string(2)?,
                mode_field_diameter: cursor.read_u16()?,
                comment: cursor.read_terminated_string()?,
            });
        }
        Ok(Self { landmarks })
    }
}
