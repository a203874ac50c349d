use super::SUPPLIER_PARAMETERS;
use crate::{
    Result,
    blocks::common::{BlockParse, ByteCursor, DecodeContext},
};
use serde::Serialize;

/// Supplier parameters (SupParams) - instrument identification.
///
/// The layout is the same in both revisions: seven NUL-terminated strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupplierParameters {
    pub supplier: String,
    /// OTDR mainframe ID.
    pub otdr: String,
    pub otdr_serial: String,
    /// Optical module ID.
    pub module: String,
    pub module_serial: String,
    pub software: String,
    pub other: String,
}

impl BlockParse for SupplierParameters {
    const NAME: &'static str = SUPPLIER_PARAMETERS;

    fn parse(cursor: &mut ByteCursor<'_>, _ctx: &DecodeContext) -> Result<Self> {
        Ok(Self {
            supplier: cursor.read_terminated_string()?,
            otdr: cursor.read_terminated_string()?,
            otdr_serial: cursor.read_terminated_string()?,
            module: cursor.read_terminated_string()?,
            module_serial: cursor.read_terminated_string()?,
            software: cursor.read_terminated_string()?,
            other: cursor.read_terminated_string()?,
        })
    }
}
