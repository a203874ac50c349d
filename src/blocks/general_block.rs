//! General parameters block (GenParams) - cable, fiber and operator metadata.

use super::GENERAL_PARAMETERS;
use crate::{
    Result,
    blocks::common::{BlockParse, ByteCursor, CodedField, DecodeContext, Revision, time_to_seconds},
};
use serde::Serialize;

/// ITU-T fiber category for a GenParams fiber type code.
fn fiber_type_description(code: u16) -> &'static str {
    match code {
        651 => "G.651 (50um core multimode)",
        652 => "G.652 (standard SMF)",
        653 => "G.653 (dispersion-shifted fiber)",
        654 => "G.654 (1550nm loss-minimized fiber)",
        655 => "G.655 (nonzero dispersion-shifted fiber)",
        656 => "G.656 (wideband nonzero dispersion-shifted fiber)",
        657 => "G.657 (bend-insensitive fiber)",
        _ => "unknown",
    }
}

fn build_condition_description(code: &str) -> &'static str {
    match code {
        "BC" => "as-built",
        "CC" => "as-current",
        "RC" => "as-repaired",
        "OT" => "other",
        _ => "unknown",
    }
}

/// General parameters: who measured what, and where.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralParameters {
    /// Two-letter language code of the text fields.
    pub language: String,
    pub cable_id: String,
    pub fiber_id: String,
    /// Fiber type (revision 2 only).
    pub fiber_type: Option<CodedField<u16>>,
    /// Nominal wavelength in nm.
    pub wavelength_nm: u16,
    pub location_a: String,
    pub location_b: String,
    pub cable_code: String,
    pub build_condition: CodedField<String>,
    /// User offset, seconds.
    pub user_offset_s: f64,
    /// User offset distance, raw (revision 2 only).
    pub user_offset_distance: Option<i32>,
    pub operator: String,
    pub comments: String,
}

impl BlockParse for GeneralParameters {
    const NAME: &'static str = GENERAL_PARAMETERS;

    fn parse(cursor: &mut ByteCursor<'_>, ctx: &DecodeContext) -> Result<Self> {
        let rev2 = ctx.revision == Revision::V2;

        let language = cursor.read_fixed_string(2)?;
        let cable_id = cursor.read_terminated_string()?;
        let fiber_id = cursor.read_terminated_string()?;
        let fiber_type = if rev2 {
            let code = cursor.read_u16()?;
            Some(CodedField::new(code, fiber_type_description(code)))
        } else {
            None
        };
        let wavelength_nm = cursor.read_u16()?;
        let location_a = cursor.read_terminated_string()?;
        let location_b = cursor.read_terminated_string()?;
        let cable_code = cursor.read_terminated_string()?;
        let code = cursor.read_fixed_string(2)?;
        let description = build_condition_description(&code);
        let build_condition = CodedField::new(code, description);
        let user_offset_s = time_to_seconds(f64::from(cursor.read_i32()?));
        let user_offset_distance = if rev2 { Some(cursor.read_i32()?) } else { None };
        let operator = cursor.read_terminated_string()?;
        let comments = cursor.read_terminated_string()?;

        Ok(Self {
            language,
            cable_id,
            fiber_id,
            fiber_type,
            wavelength_nm,
            location_a,
            location_b,
            cable_code,
            build_condition,
            user_offset_s,
            user_offset_distance,
            operator,
            comments,
        })
    }
}
