use crate::{
    Diagnostic, Error, ParseResult, Result, TraceBuffer,
    blocks::{
        BlockDirectory, BlockDirectoryEntry, BlockKind, BlockParse, ByteCursor, ChecksumRecord,
        DEFAULT_INDEX_OF_REFRACTION, DataPoints, DecodeContext, FixedParameters,
        GeneralParameters, KeyEvents, LinkParameters, MAP, ProprietaryBlock, Revision,
        SupplierParameters, format_version,
    },
    result::{BlockRecord, DecodedBlock, FailedBlock, Summary},
};
use std::path::Path;
use tracing::{debug, warn};

/// Keys the serialized result uses for itself; blocks with these names get a suffix.
const RESERVED_KEYS: [&str; 5] = ["filename", "summary", MAP, "diagnostics", "trace"];

/// Parse a SOR file from a given file path.
///
/// # Arguments
/// * `path` - Path to the `.sor` file on disk.
///
/// # Returns
/// The decoded [`ParseResult`] and the waveform samples, or an
/// [`crate::Error`] if the file could not be read or its directory is unusable.
pub fn parse_from_file<P: AsRef<Path>>(path: P) -> Result<(ParseResult, TraceBuffer)> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_from_bytes(&filename, &data)
}

/// Parse a SOR file from a byte buffer.
///
/// # Arguments
/// * `filename` - Name recorded in the result.
/// * `data` - Complete file contents.
///
/// # Returns
/// The decoded [`ParseResult`] and the waveform samples. Only an unusable
/// directory, or a directory that lists more bytes than `data` holds, is an
/// error; problems inside individual blocks are recorded as diagnostics.
pub fn parse_from_bytes(filename: &str, data: &[u8]) -> Result<(ParseResult, TraceBuffer)> {
    let directory = BlockDirectory::from_bytes(data)?;
    debug!(
        "{}: Map {} lists {} blocks",
        filename,
        directory.version_text,
        directory.entries().len()
    );

    let mut aggregator = Aggregator::new(directory.revision);
    if directory.unread > 0 {
        aggregator.warn(Diagnostic::BlockLengthMismatch {
            block: MAP.to_string(),
            declared: directory.length as usize,
            consumed: directory.length as usize - directory.unread,
        });
    }
    for entry in directory.entries() {
        aggregator.decode_entry(data, entry);
    }
    aggregator.finish(filename, directory, data)
}

/// Collects block records, samples and diagnostics over one pass.
struct Aggregator {
    revision: Revision,
    index_of_refraction: Option<f64>,
    blocks: Vec<DecodedBlock>,
    samples: Vec<f64>,
    diagnostics: Vec<Diagnostic>,
}

impl Aggregator {
    fn new(revision: Revision) -> Self {
        Self {
            revision,
            index_of_refraction: None,
            blocks: Vec::new(),
            samples: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn warn(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn context(&self) -> DecodeContext {
        DecodeContext::new(self.revision).with_index_of_refraction(
            self.index_of_refraction
                .unwrap_or(DEFAULT_INDEX_OF_REFRACTION),
        )
    }

    fn unique_key(&self, name: &str) -> String {
        let taken = |key: &str| {
            RESERVED_KEYS.contains(&key) || self.blocks.iter().any(|block| block.key == key)
        };
        if !taken(name) {
            return name.to_string();
        }
        (2..)
            .map(|n| format!("{name}#{n}"))
            .find(|key| !taken(key))
            .unwrap_or_else(|| name.to_string())
    }

    /// Decode one directory entry and store the outcome under its key.
    fn decode_entry(&mut self, data: &[u8], entry: &BlockDirectoryEntry) {
        let key = self.unique_key(&entry.name);
        let kind = BlockKind::from_name(&entry.name);
        // The directory guarantees every entry lies inside `data`.
        let mut window = ByteCursor::with_base(&data[entry.offset..entry.end()], entry.offset);
        let ctx = self.context();
        debug!(
            "Decoding {} ({:?}) at offset {}, {} bytes",
            key, kind, entry.offset, entry.length
        );

        if matches!(kind, BlockKind::KeyEvents | BlockKind::LinkParameters)
            && self.index_of_refraction.is_none()
        {
            self.warn(Diagnostic::DefaultIndexOfRefraction {
                block: key.clone(),
                index_of_refraction: ctx.index_of_refraction,
            });
        }

        let decoded = match kind {
            BlockKind::GeneralParameters => {
                GeneralParameters::from_cursor(&mut window, &ctx).map(BlockRecord::GeneralParameters)
            }
            BlockKind::SupplierParameters => SupplierParameters::from_cursor(&mut window, &ctx)
                .map(BlockRecord::SupplierParameters),
            BlockKind::FixedParameters => {
                FixedParameters::from_cursor(&mut window, &ctx).map(|params| {
                    self.index_of_refraction = Some(params.index_of_refraction);
                    BlockRecord::FixedParameters(params)
                })
            }
            BlockKind::KeyEvents => KeyEvents::from_cursor(&mut window, &ctx).map(|events| {
                if let Some(event_number) = events.first_unsorted() {
                    self.warn(Diagnostic::UnsortedEvents {
                        block: key.clone(),
                        event_number,
                    });
                }
                BlockRecord::KeyEvents(events)
            }),
            BlockKind::DataPoints => DataPoints::from_cursor(&mut window, &ctx).map(|mut points| {
                self.samples.extend(points.take_samples());
                if u64::from(points.total_points) != points.decoded_points as u64 {
                    self.warn(Diagnostic::SampleCountMismatch {
                        block: key.clone(),
                        declared: u64::from(points.total_points),
                        decoded: points.decoded_points as u64,
                    });
                }
                BlockRecord::DataPoints(points)
            }),
            BlockKind::LinkParameters => {
                LinkParameters::from_cursor(&mut window, &ctx).map(BlockRecord::LinkParameters)
            }
            BlockKind::Checksum => {
                ChecksumRecord::from_cursor(&mut window, &ctx).map(BlockRecord::Checksum)
            }
            BlockKind::Proprietary => {
                ProprietaryBlock::from_cursor(&mut window, &ctx, &entry.name, entry.length)
                    .map(BlockRecord::Proprietary)
            }
        };

        let declared = entry.length as usize;
        let record = match decoded {
            Ok(record) => {
                if window.remaining() > 0 {
                    self.warn(Diagnostic::BlockLengthMismatch {
                        block: key.clone(),
                        declared,
                        consumed: window.consumed(),
                    });
                }
                record
            }
            Err(error) => {
                let diagnostic = match &error {
                    Error::TruncatedInput { requested, .. } => Diagnostic::BlockLengthMismatch {
                        block: key.clone(),
                        declared,
                        consumed: window.consumed() + requested,
                    },
                    other => Diagnostic::BlockDecodeFailed {
                        block: key.clone(),
                        cause: other.to_string(),
                    },
                };
                self.warn(diagnostic);
                BlockRecord::Failed(FailedBlock {
                    declared_length: entry.length,
                    error: error.to_string(),
                })
            }
        };

        self.blocks.push(DecodedBlock {
            key,
            name: entry.name.clone(),
            record,
        });
    }

    /// Cross-check the blocks against each other and build the result.
    fn finish(
        mut self,
        filename: &str,
        directory: BlockDirectory,
        data: &[u8],
    ) -> Result<(ParseResult, TraceBuffer)> {
        let fixed = self.blocks.iter().find_map(|block| match &block.record {
            BlockRecord::FixedParameters(params) => Some((block.key.clone(), params.clone())),
            _ => None,
        });
        if let Some((key, params)) = &fixed {
            let decoded = self.samples.len() as u64;
            if params.number_of_data_points != decoded {
                self.warn(Diagnostic::SampleCountMismatch {
                    block: key.clone(),
                    declared: params.number_of_data_points,
                    decoded,
                });
            }
        }

        let mut mismatches = Vec::new();
        for block in &mut self.blocks {
            if let BlockRecord::Checksum(checksum) = &mut block.record {
                if !checksum.validate(data)? {
                    mismatches.push(Diagnostic::ChecksumMismatch {
                        block: block.key.clone(),
                        stored: checksum.stored,
                        computed: checksum.computed.unwrap_or_default(),
                    });
                }
            }
        }
        for diagnostic in mismatches {
            self.warn(diagnostic);
        }

        let resolution_m = fixed.as_ref().and_then(|(_, params)| params.resolution_m);
        let trace = TraceBuffer::new(std::mem::take(&mut self.samples), resolution_m);
        let mut result = ParseResult {
            filename: filename.to_string(),
            directory,
            blocks: self.blocks,
            summary: Summary::default(),
            diagnostics: self.diagnostics,
        };
        result.summary = summarize(&result);
        debug!(
            "{}: decoded {} blocks, {} samples, {} diagnostics",
            filename,
            result.blocks.len(),
            trace.len(),
            result.diagnostics.len()
        );
        Ok((result, trace))
    }
}

fn summarize(result: &ParseResult) -> Summary {
    let general = result.general_parameters();
    let supplier = result.supplier_parameters();
    let fixed = result.fixed_parameters();
    let events = result.key_events();

    Summary {
        format_version: format_version(result.directory.version),
        date_time_utc: fixed.and_then(|params| params.date_time_utc.clone()),
        distance_unit: fixed.map(|params| params.distance_unit.description.to_string()),
        wavelength_nm: fixed
            .map(|params| params.wavelength_nm)
            .or_else(|| general.map(|params| f64::from(params.wavelength_nm))),
        pulse_width_s: fixed.and_then(FixedParameters::pulse_width_s),
        index_of_refraction: fixed.map(|params| params.index_of_refraction),
        resolution_m: fixed.and_then(|params| params.resolution_m),
        range_m: fixed.and_then(|params| params.range_m),
        number_of_data_points: fixed.map(|params| params.number_of_data_points),
        cable_id: general.map(|params| params.cable_id.clone()),
        fiber_id: general.map(|params| params.fiber_id.clone()),
        operator: general.map(|params| params.operator.clone()),
        supplier: supplier.map(|params| params.supplier.clone()),
        otdr: supplier.map(|params| params.otdr.clone()),
        number_of_events: events.map(|events| events.events.len()),
        total_loss_db: events.map(|events| events.summary.total_loss_db),
        fiber_length_m: events.map(|events| {
            events
                .end_of_fiber()
                .map_or(events.summary.loss_end_m, |event| event.distance_m)
        }),
        checksum_valid: result.checksum().and_then(ChecksumRecord::is_valid),
    }
}
