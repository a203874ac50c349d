//! Vendor blocks and any other block without a dedicated decoder.

use crate::{
    Result,
    blocks::common::{ByteCursor, DecodeContext},
};
use serde::{Serialize, Serializer};

/// A block kept as raw bytes.
///
/// The payload excludes the revision 2 name header when one is present, so a
/// stricter decoder can later be given exactly the bytes it would see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProprietaryBlock {
    pub name: String,
    /// Block size from the Map block.
    pub length: u32,
    #[serde(serialize_with = "serialize_hex")]
    pub payload: Vec<u8>,
}

fn serialize_hex<S: Serializer>(
    bytes: &[u8],
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

impl ProprietaryBlock {
    /// Keep everything left in the block window.
    pub fn from_cursor(
        cursor: &mut ByteCursor<'_>,
        ctx: &DecodeContext,
        name: &str,
        length: u32,
    ) -> Result<Self> {
        if ctx.revision.has_block_names() {
            let header = cursor.rest();
            if header.len() > name.len()
                && header.starts_with(name.as_bytes())
                && header[name.len()] == 0
            {
                cursor.skip(name.len() + 1)?;
            }
        }
        let payload = cursor.read_bytes(cursor.remaining())?.to_vec();
        Ok(Self {
            name: name.to_string(),
            length,
            payload,
        })
    }
}
