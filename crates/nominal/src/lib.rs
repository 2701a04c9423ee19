//! Nominal type metadata decoder
//!
//! This crate reads the metadata records a compiler emits for structs,
//! classes and enums (mangled name, stored fields with their offsets and
//! types, generic arguments) and turns them into an immutable [`TypeInfo`].

pub mod accessor;
pub mod builder;
pub mod decoder;
pub mod descriptor;
pub mod error;
pub mod metadata;
pub mod output;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use accessor::{FieldTypeAccessor, NativeAccessor, ResolvedAccessors};
pub use builder::{LayoutQuery, StaticLayouts, TypeInfoBuilder};
pub use decoder::{open_dump, Decoder};
pub use descriptor::{HeaderLayout, NominalTypeDescriptor};
pub use error::{DecodeError, DecodeResult};
pub use metadata::{ClassMetadata, EnumMetadata, NominalMetadataType, StructMetadata};
pub use types::*;

use typemeta_core::{Architecture, DecoderConfig, MetadataAddress};
use typemeta_memory::MemoryView;

/// Decode one metadata record with the default configuration, taking the
/// architecture from the view's word size
pub fn decode(
    view: &dyn MemoryView,
    accessor: &dyn FieldTypeAccessor,
    layouts: &dyn LayoutQuery,
    metadata: MetadataAddress,
) -> DecodeResult<TypeInfo> {
    let mut config = DecoderConfig::default();
    if let Some(architecture) = Architecture::for_pointer_size(view.word_size()) {
        config = config.with_architecture(architecture);
    }
    Decoder::new(view, accessor, layouts, config)?.decode(metadata)
}
