//! Purpose: Define the stable public Rust API boundary for framekit.
//! Exports: Data model, codec, flattener, significance tester, and error types.
//! Role: Public, additive-only surface used by the CLI, tests, and downstream crates.
//! Invariants: This module is the only public path to the internal modules.
//! Invariants: `VERSION` is fixed at compile time from Cargo metadata.

pub use crate::codec::{
    CodecRegistry, CustomValue, DATAFRAME_TAG, Decoded, Node, SERIES_TAG, ToEnvelope, decode,
    decode_document, encode, encode_document, encode_series, encode_table, from_json_str,
    to_json_string,
};
pub use crate::core::dtype::DType;
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::frame::{LabeledSeries, LabeledTable};
pub use crate::core::index::{FlatIndex, Index, MultiIndex};
pub use crate::core::scalar::Scalar;
pub use crate::flatten::{DEFAULT_LABEL_FIELD, flatten, flatten_default};
pub use crate::stats::wilcoxon::{WilcoxonMethod, WilcoxonResult, signed_rank};
pub use crate::stats::{
    DEFAULT_MIN_ELEMENTS, PairComparison, SIGNIFICANCE_LEVEL, Truncation, asterisks,
    comparisons_to_table, significance_comparison,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
