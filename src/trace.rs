use serde::Serialize;

/// Waveform samples decoded from the DataPts block.
///
/// The buffer is filled once by the decode pass and read-only afterwards.
/// Levels are in dB as stored by the instrument (loss below the reference
/// level, so larger values are further down the trace).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceBuffer {
    /// Distance between two samples, metres, when FxdParams provided it.
    resolution_m: Option<f64>,
    samples: Vec<f64>,
}

impl TraceBuffer {
    pub(crate) fn new(samples: Vec<f64>, resolution_m: Option<f64>) -> Self {
        Self {
            resolution_m,
            samples,
        }
    }

    /// Sample levels in dB, in acquisition order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn resolution_m(&self) -> Option<f64> {
        self.resolution_m
    }

    /// `(distance_m, level_db)` pairs.
    ///
    /// Without a known resolution the distance is the sample index.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let step = self.resolution_m.unwrap_or(1.0);
        self.samples
            .iter()
            .enumerate()
            .map(move |(i, &level)| (i as f64 * step, level))
    }
}
