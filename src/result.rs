use crate::{
    Diagnostic,
    blocks::{
        BlockDirectory, ChecksumRecord, DataPoints, FixedParameters, GeneralParameters,
        KeyEvents, LinkParameters, MAP, ProprietaryBlock, Revision, SupplierParameters,
    },
};
use serde::{Serialize, Serializer, ser::SerializeMap};

/// A block whose decoder failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedBlock {
    /// Block size from the Map block.
    pub declared_length: u32,
    pub error: String,
}

/// Decoded contents of one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlockRecord {
    GeneralParameters(GeneralParameters),
    SupplierParameters(SupplierParameters),
    FixedParameters(FixedParameters),
    KeyEvents(KeyEvents),
    DataPoints(DataPoints),
    LinkParameters(LinkParameters),
    Checksum(ChecksumRecord),
    Proprietary(ProprietaryBlock),
    Failed(FailedBlock),
}

impl BlockRecord {
    pub fn is_failed(&self) -> bool {
        matches!(self, BlockRecord::Failed(_))
    }
}

/// A block record stored under its result key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedBlock {
    /// Unique key: the block name, with `#2`, `#3`... for repeated names.
    pub key: String,
    /// Block name from the Map block.
    pub name: String,
    pub record: BlockRecord,
}

/// Convenience values gathered from several blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Format revision as text, e.g. "2.00".
    pub format_version: String,
    pub date_time_utc: Option<String>,
    pub distance_unit: Option<String>,
    pub wavelength_nm: Option<f64>,
    pub pulse_width_s: Option<f64>,
    pub index_of_refraction: Option<f64>,
    pub resolution_m: Option<f64>,
    pub range_m: Option<f64>,
    pub number_of_data_points: Option<u64>,
    pub cable_id: Option<String>,
    pub fiber_id: Option<String>,
    pub operator: Option<String>,
    pub supplier: Option<String>,
    pub otdr: Option<String>,
    pub number_of_events: Option<usize>,
    pub total_loss_db: Option<f64>,
    pub fiber_length_m: Option<f64>,
    pub checksum_valid: Option<bool>,
}

/// Everything decoded from one SOR file, except the waveform samples.
///
/// Blocks are kept in file order. Serializing the result writes `filename`,
/// `summary`, the `Map` directory, one key per block and `diagnostics`, in
/// that order, so the output is stable for a given input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub(crate) filename: String,
    pub(crate) directory: BlockDirectory,
    pub(crate) blocks: Vec<DecodedBlock>,
    pub(crate) summary: Summary,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// File name the result was decoded from.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn revision(&self) -> Revision {
        self.directory.revision
    }

    /// The decoded Map block.
    pub fn directory(&self) -> &BlockDirectory {
        &self.directory
    }

    /// Decoded blocks in file order.
    pub fn blocks(&self) -> &[DecodedBlock] {
        &self.blocks
    }

    /// Record stored under `key`.
    pub fn block(&self, key: &str) -> Option<&BlockRecord> {
        self.blocks
            .iter()
            .find(|block| block.key == key)
            .map(|block| &block.record)
    }

    fn records(&self) -> impl Iterator<Item = &BlockRecord> {
        self.blocks.iter().map(|block| &block.record)
    }

    pub fn general_parameters(&self) -> Option<&GeneralParameters> {
        self.records().find_map(|record| match record {
            BlockRecord::GeneralParameters(params) => Some(params),
            _ => None,
        })
    }

    pub fn supplier_parameters(&self) -> Option<&SupplierParameters> {
        self.records().find_map(|record| match record {
            BlockRecord::SupplierParameters(params) => Some(params),
            _ => None,
        })
    }

    pub fn fixed_parameters(&self) -> Option<&FixedParameters> {
        self.records().find_map(|record| match record {
            BlockRecord::FixedParameters(params) => Some(params),
            _ => None,
        })
    }

    pub fn key_events(&self) -> Option<&KeyEvents> {
        self.records().find_map(|record| match record {
            BlockRecord::KeyEvents(events) => Some(events),
            _ => None,
        })
    }

    pub fn data_points(&self) -> Option<&DataPoints> {
        self.records().find_map(|record| match record {
            BlockRecord::DataPoints(points) => Some(points),
            _ => None,
        })
    }

    pub fn link_parameters(&self) -> Option<&LinkParameters> {
        self.records().find_map(|record| match record {
            BlockRecord::LinkParameters(params) => Some(params),
            _ => None,
        })
    }

    pub fn checksum(&self) -> Option<&ChecksumRecord> {
        self.records().find_map(|record| match record {
            BlockRecord::Checksum(checksum) => Some(checksum),
            _ => None,
        })
    }

    /// Vendor and unknown blocks, in file order.
    pub fn proprietary_blocks(&self) -> impl Iterator<Item = &ProprietaryBlock> {
        self.records().filter_map(|record| match record {
            BlockRecord::Proprietary(block) => Some(block),
            _ => None,
        })
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Recoverable problems found while decoding, in the order they were found.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Write every result key into an open serde map.
    pub(crate) fn serialize_entries<M: SerializeMap>(
        &self,
        map: &mut M,
    ) -> core::result::Result<(), M::Error> {
        map.serialize_entry("filename", &self.filename)?;
        map.serialize_entry("summary", &self.summary)?;
        map.serialize_entry(MAP, &self.directory)?;
        for block in &self.blocks {
            map.serialize_entry(&block.key, &block.record)?;
        }
        map.serialize_entry("diagnostics", &self.diagnostics)?;
        Ok(())
    }
}

impl Serialize for ParseResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_entries(&mut map)?;
        map.end()
    }
}
