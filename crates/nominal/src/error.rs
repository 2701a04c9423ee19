//! Error types for metadata decoding

use crate::types::Kind;
use thiserror::Error;
use typemeta_core::{MetadataAddress, TypeReference};
use typemeta_memory::MemoryError;

/// Why a metadata record could not be decoded
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    UnreadableMemory(#[from] MemoryError),

    #[error("Missing field type accessor for {metadata}")]
    MissingAccessor { metadata: MetadataAddress },

    #[error("Field count mismatch: {names} names, {offsets} offsets, {types} types")]
    FieldCountMismatch {
        names: usize,
        offsets: usize,
        types: usize,
    },

    #[error("Empty mangled name for {metadata}")]
    EmptyMangledName { metadata: MetadataAddress },

    #[error("Negative {field} in descriptor: {value}")]
    NegativeCount { field: &'static str, value: i32 },

    #[error("Not a nominal type: {kind:?}")]
    NotNominal { kind: Kind },

    #[error("No layout available for {ty}")]
    LayoutUnavailable { ty: TypeReference },

    #[error(transparent)]
    Config(#[from] typemeta_core::Error),
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
