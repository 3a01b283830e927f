//! Purpose: Table codec: JSON envelopes for labeled tables/series plus explicit extensions.
//! Exports: `encode`, `decode`, envelope helpers, `CodecRegistry`, document helpers.
//! Role: The only path between in-memory tables and their JSON interchange form.
//! Invariants: Decoding never guesses: unknown or absent `type` means pass-through.
//! Invariants: No reflective fallback; non-table types need a registered extension.

mod document;
mod envelope;
mod registry;

pub use document::{Node, decode_document, encode_document, from_json_str, to_json_string};
pub use envelope::{DATAFRAME_TAG, SERIES_TAG, ToEnvelope, encode, encode_series, encode_table};
pub use registry::{CodecRegistry, CustomValue, Decoded};

use crate::core::error::Error;
use serde_json::Value;

/// Decodes one envelope with the built-in codec only.
pub fn decode(envelope: &Value) -> Result<Decoded, Error> {
    CodecRegistry::new().decode(envelope)
}
