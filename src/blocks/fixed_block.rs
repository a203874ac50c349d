//! Fixed parameters block (FxdParams) - acquisition setup.
//!
//! Every field here is fixed width. Values with an implicit scale are converted
//! to base units while decoding (seconds, metres, dB) and never again later.
//! Per-pulse-width arrays hold one value for each pulse width the instrument
//! used; most files have exactly one.

use super::FIXED_PARAMETERS;
use crate::{
    Error, Result,
    blocks::common::{
        BlockParse, ByteCursor, CodedField, DecodeContext, Revision, SPEED_OF_LIGHT,
        time_to_seconds,
    },
};
use chrono::{DateTime, SecondsFormat};
use serde::Serialize;

/// Sample spacing is stored as the time for 10 000 points, in 100 ps units.
const SAMPLE_SPACING_UNIT_S: f64 = 1e-14;
/// Acquisition range is stored in units of 2e-5 km.
const ACQUISITION_RANGE_UNIT_M: f64 = 0.02;
/// Group index is stored times 100 000.
const INDEX_SCALE: f64 = 100_000.0;

fn distance_unit_description(code: &str) -> &'static str {
    match code {
        "mt" => "meters",
        "km" => "kilometers",
        "ft" => "feet",
        "kf" => "kilo-ft",
        "mi" => "miles",
        _ => "unknown",
    }
}

fn trace_type_description(code: &str) -> &'static str {
    match code {
        "ST" => "standard trace",
        "RT" => "reverse trace",
        "DT" => "difference trace",
        "RF" => "reference trace",
        _ => "unknown",
    }
}

/// Display window stored by revision 2 instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayWindow {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Fixed parameters: how the trace was acquired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedParameters {
    /// Acquisition time, Unix seconds.
    pub date_time: u32,
    /// Acquisition time as RFC 3339 UTC.
    pub date_time_utc: Option<String>,
    pub distance_unit: CodedField<String>,
    /// Actual wavelength in nm.
    pub wavelength_nm: f64,
    /// Acquisition offset, seconds.
    pub acquisition_offset_s: f64,
    /// Acquisition offset distance, raw (revision 2 only).
    pub acquisition_offset_distance: Option<i32>,
    /// Pulse widths, seconds.
    pub pulse_widths_s: Vec<f64>,
    /// Time between two samples for each pulse width, seconds.
    pub sample_spacings_s: Vec<f64>,
    /// Number of samples for each pulse width.
    pub data_points_per_pulse: Vec<u32>,
    /// Total number of samples over all pulse widths.
    pub number_of_data_points: u64,
    /// Group index of the fiber.
    pub index_of_refraction: f64,
    /// Backscatter coefficient, dB.
    pub backscatter_coefficient_db: f64,
    pub number_of_averages: u32,
    /// Averaging time, seconds (revision 2 only).
    pub averaging_time_s: Option<f64>,
    /// Acquisition range, metres.
    pub acquisition_range_m: f64,
    /// Acquisition range distance, raw (revision 2 only).
    pub acquisition_range_distance: Option<i32>,
    /// Front panel offset, seconds.
    pub front_panel_offset_s: f64,
    pub noise_floor_level: u16,
    pub noise_floor_scale_factor: i16,
    /// Power offset of the first point, dB.
    pub power_offset_first_point_db: f64,
    pub loss_threshold_db: f64,
    pub reflection_threshold_db: f64,
    pub end_of_fiber_threshold_db: f64,
    /// Trace type (revision 2 only).
    pub trace_type: Option<CodedField<String>>,
    /// Display window (revision 2 only).
    pub display_window: Option<DisplayWindow>,
    /// Distance between two samples of the first pulse width, metres.
    pub resolution_m: Option<f64>,
    /// Distance covered by the first pulse width's samples, metres.
    pub range_m: Option<f64>,
}

impl FixedParameters {
    /// First pulse width, seconds.
    pub fn pulse_width_s(&self) -> Option<f64> {
        self.pulse_widths_s.first().copied()
    }
}

fn render_date_time(secs: u32) -> Option<String> {
    DateTime::from_timestamp(i64::from(secs), 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

impl BlockParse for FixedParameters {
    const NAME: &'static str = FIXED_PARAMETERS;

    fn parse(cursor: &mut ByteCursor<'_>, ctx: &DecodeContext) -> Result<Self> {
        let rev2 = ctx.revision == Revision::V2;

        let date_time = cursor.read_u32()?;
        let unit = cursor.read_fixed_string(2)?;
        let unit_description = distance_unit_description(&unit);
        let wavelength_nm = f64::from(cursor.read_u16()?) / 10.0;
        let acquisition_offset_s = time_to_seconds(f64::from(cursor.read_i32()?));
        let acquisition_offset_distance = if rev2 { Some(cursor.read_i32()?) } else { None };

        let pulse_count = usize::from(cursor.read_u16()?);
        let mut pulse_widths_s = Vec::with_capacity(pulse_count);
        for _ in 0..pulse_count {
            pulse_widths_s.push(f64::from(cursor.read_u16()?) * 1e-9);
        }
        let mut sample_spacings_s = Vec::with_capacity(pulse_count);
        for _ in 0..pulse_count {
            sample_spacings_s.push(f64::from(cursor.read_u32()?) * SAMPLE_SPACING_UNIT_S);
        }
        let mut data_points_per_pulse = Vec::with_capacity(pulse_count);
        for _ in 0..pulse_count {
            data_points_per_pulse.push(cursor.read_u32()?);
        }

        let index_raw = cursor.read_u32()?;
        if index_raw == 0 {
            return Err(Error::InvalidField {
                block: FIXED_PARAMETERS,
                field: "index of refraction",
                value: index_raw.to_string(),
            });
        }
        let index_of_refraction = f64::from(index_raw) / INDEX_SCALE;
        let backscatter_coefficient_db = f64::from(cursor.read_u16()?) / -10.0;
        let number_of_averages = cursor.read_u32()?;
        let averaging_time_s = if rev2 {
            Some(f64::from(cursor.read_u16()?) / 10.0)
        } else {
            None
        };
        let acquisition_range_m = f64::from(cursor.read_u32()?) * ACQUISITION_RANGE_UNIT_M;
        let acquisition_range_distance = if rev2 { Some(cursor.read_i32()?) } else { None };
        let front_panel_offset_s = time_to_seconds(f64::from(cursor.read_i32()?));
        let noise_floor_level = cursor.read_u16()?;
        let noise_floor_scale_factor = cursor.read_i16()?;
        let power_offset_first_point_db = f64::from(cursor.read_u16()?) / 1000.0;
        let loss_threshold_db = f64::from(cursor.read_u16()?) / 1000.0;
        let reflection_threshold_db = f64::from(cursor.read_u16()?) / -1000.0;
        let end_of_fiber_threshold_db = f64::from(cursor.read_u16()?) / 1000.0;

        let (trace_type, display_window) = if rev2 {
            let code = cursor.read_fixed_string(2)?;
            let description = trace_type_description(&code);
            let window = DisplayWindow {
                x1: cursor.read_i32()?,
                y1: cursor.read_i32()?,
                x2: cursor.read_i32()?,
                y2: cursor.read_i32()?,
            };
            (Some(CodedField::new(code, description)), Some(window))
        } else {
            (None, None)
        };

        let number_of_data_points = data_points_per_pulse.iter().map(|&n| u64::from(n)).sum();
        let resolution_m = sample_spacings_s
            .first()
            .map(|spacing| spacing * SPEED_OF_LIGHT / index_of_refraction);
        let range_m = resolution_m
            .zip(data_points_per_pulse.first())
            .map(|(resolution, &points)| resolution * f64::from(points));

        Ok(Self {
            date_time,
            date_time_utc: render_date_time(date_time),
            distance_unit: CodedField::new(unit, unit_description),
            wavelength_nm,
            acquisition_offset_s,
            acquisition_offset_distance,
            pulse_widths_s,
            sample_spacings_s,
            data_points_per_pulse,
            number_of_data_points,
            index_of_refraction,
            backscatter_coefficient_db,
            number_of_averages,
            averaging_time_s,
            acquisition_range_m,
            acquisition_range_distance,
            front_panel_offset_s,
            noise_floor_level,
            noise_floor_scale_factor,
            power_offset_first_point_db,
            loss_threshold_db,
            reflection_threshold_db,
            end_of_fiber_threshold_db,
            trace_type,
            display_window,
            resolution_m,
            range_m,
        })
    }
}
