//! Key events block (KeyEvents) - the instrument's event table.
//!
//! Events are kept in file order. The table is expected to be sorted by
//! distance; [`KeyEvents::first_unsorted`] reports where it is not, and the
//! aggregator turns that into a warning without reordering anything.

use super::KEY_EVENTS;
use crate::{
    Result,
    blocks::common::{BlockParse, ByteCursor, DecodeContext, Revision},
};
use serde::Serialize;

/// Reflectance class of an event, from the first event type character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NonReflective,
    Reflective,
    SaturatedReflective,
    Unknown,
}

impl EventKind {
    pub fn from_code(code: u8) -> Self {
        match code {
            b'0' => Self::NonReflective,
            b'1' => Self::Reflective,
            b'2' => Self::SaturatedReflective,
            _ => Self::Unknown,
        }
    }
}

/// How the event entered the table, from the second event type character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    AddedByUser,
    MovedByUser,
    EndOfFiber,
    FoundBySoftware,
    OutOfRange,
    ModifiedEndOfFiber,
    Unknown,
}

impl EventOrigin {
    pub fn from_code(code: u8) -> Self {
        match code {
            b'A' => Self::AddedByUser,
            b'M' => Self::MovedByUser,
            b'E' => Self::EndOfFiber,
            b'F' => Self::FoundBySoftware,
            b'O' => Self::OutOfRange,
            b'D' => Self::ModifiedEndOfFiber,
            _ => Self::Unknown,
        }
    }
}

/// Eight-character event type code, e.g. `1F9999LS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventType {
    pub code: String,
    pub kind: EventKind,
    pub origin: EventOrigin,
}

impl EventType {
    pub fn from_code(code: String) -> Self {
        let bytes = code.as_bytes();
        Self {
            kind: bytes.first().map_or(EventKind::Unknown, |&b| EventKind::from_code(b)),
            origin: bytes
                .get(1)
                .map_or(EventOrigin::Unknown, |&b| EventOrigin::from_code(b)),
            code,
        }
    }
}

/// One row of the event table. Distances are in metres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEvent {
    pub number: u16,
    pub event_type: EventType,
    pub distance_m: f64,
    pub slope_db_per_km: f64,
    pub splice_loss_db: f64,
    pub reflection_loss_db: f64,
    // Revision 2 only
    pub end_of_previous_event_m: Option<f64>,
    pub start_of_current_event_m: Option<f64>,
    pub end_of_current_event_m: Option<f64>,
    pub start_of_next_event_m: Option<f64>,
    pub peak_point_m: Option<f64>,
    pub comment: String,
}

/// Totals following the event rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEventSummary {
    pub total_loss_db: f64,
    pub loss_start_m: f64,
    pub loss_end_m: f64,
    // Revision 2 only
    pub optical_return_loss_db: Option<f64>,
    pub optical_return_loss_start_m: Option<f64>,
    pub optical_return_loss_end_m: Option<f64>,
}

/// Decoded KeyEvents block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEvents {
    pub events: Vec<KeyEvent>,
    pub summary: KeyEventSummary,
}

impl KeyEvents {
    /// Number of the first event that breaks distance order or number order.
    pub fn first_unsorted(&self) -> Option<u16> {
        self.events
            .windows(2)
            .find(|pair| {
                pair[1].distance_m < pair[0].distance_m || pair[1].number <= pair[0].number
            })
            .map(|pair| pair[1].number)
    }

    /// Event marked as end of fiber, if any.
    pub fn end_of_fiber(&self) -> Option<&KeyEvent> {
        self.events
            .iter()
            .find(|event| event.event_type.origin == EventOrigin::EndOfFiber)
    }
}

fn parse_event(cursor: &mut ByteCursor<'_>, ctx: &DecodeContext) -> Result<KeyEvent> {
    let number = cursor.read_u16()?;
    let distance_m = ctx.distance(f64::from(cursor.read_u32()?));
    let slope_db_per_km = f64::from(cursor.read_i16()?) * 0.001;
    let splice_loss_db = f64::from(cursor.read_i16()?) * 0.001;
    let reflection_loss_db = f64::from(cursor.read_i32()?) * 0.001;
    let event_type = EventType::from_code(cursor.read_fixed_string(8)?);

    let mut positions = [None; 5];
    if ctx.revision == Revision::V2 {
        for position in &mut positions {
            *position = Some(ctx.distance(f64::from(cursor.read_u32()?)));
        }
    }
    let [
        end_of_previous_event_m,
        start_of_current_event_m,
        end_of_current_event_m,
        start_of_next_event_m,
        peak_point_m,
    ] = positions;
    let comment = cursor.read_terminated_string()?;

    Ok(KeyEvent {
        number,
        event_type,
        distance_m,
        slope_db_per_km,
        splice_loss_db,
        reflection_loss_db,
        end_of_previous_event_m,
        start_of_current_event_m,
        end_of_current_event_m,
        start_of_next_event_m,
        peak_point_m,
        comment,
    })
}

impl BlockParse for KeyEvents {
    const NAME: &'static str = KEY_EVENTS;

    fn parse(cursor: &mut ByteCursor<'_>, ctx: &DecodeContext) -> Result<Self> {
        let count = cursor.read_u16()?;
        let mut events = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            events.push(parse_event(cursor, ctx)?);
        }

        let total_loss_db = f64::from(cursor.read_i32()?) * 0.001;
        let loss_start_m = ctx.distance(f64::from(cursor.read_i32()?));
        let loss_end_m = ctx.distance(f64::from(cursor.read_u32()?));
        let (optical_return_loss_db, optical_return_loss_start_m, optical_return_loss_end_m) =
            if ctx.revision == Revision::V2 {
                (
                    Some(f64::from(cursor.read_u16()?) * 0.001),
                    Some(ctx.distance(f64::from(cursor.read_i32()?))),
                    Some(ctx.distance(f64::from(cursor.read_u32()?))),
                )
            } else {
                (None, None, None)
            };

        Ok(Self {
            events,
            summary: KeyEventSummary {
                total_loss_db,
                loss_start_m,
                loss_end_m,
                optical_return_loss_db,
                optical_return_loss_start_m,
                optical_return_loss_end_m,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_codes() {
        let end = EventType::from_code("1E9999LS".to_string());
        assert_eq!(end.kind, EventKind::Reflective);
        assert_eq!(end.origin, EventOrigin::EndOfFiber);

        let splice = EventType::from_code("0F9999LS".to_string());
        assert_eq!(splice.kind, EventKind::NonReflective);
        assert_eq!(splice.origin, EventOrigin::FoundBySoftware);

        let odd = EventType::from_code("x".to_string());
        assert_eq!(odd.kind, EventKind::Unknown);
        assert_eq!(odd.origin, EventOrigin::Unknown);
    }
}
