//! Nominal type descriptor header reader

use crate::accessor::{invoke_accessor, FieldTypeAccessor};
use crate::{DecodeError, DecodeResult};
use tracing::debug;
use typemeta_core::{Address, Error, MetadataAddress, TypeReference};
use typemeta_memory::{
    read_metadata_vector, read_relative, read_string, read_string_table, MemoryView,
};

/// Byte offsets of the descriptor header slots. Every slot is a native-endian
/// `i32`, either a relative pointer, a metadata word index or a plain count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub mangled_name: u64,
    pub number_of_fields: u64,
    pub field_offset_vector: u64,
    pub field_names: u64,
    pub field_type_accessor: u64,
    pub generic_parameter_vector: u64,
    pub generic_parameter_count: u64,
}

impl HeaderLayout {
    /// Version 1 header (40 bytes). The metadata pattern, a reserved word and
    /// the inclusive generic count sit at 20, 24 and 32 and are not decoded.
    pub const V1: HeaderLayout = HeaderLayout {
        mangled_name: 0,
        number_of_fields: 4,
        field_offset_vector: 8,
        field_names: 12,
        field_type_accessor: 16,
        generic_parameter_vector: 28,
        generic_parameter_count: 36,
    };

    pub fn for_version(version: u32) -> typemeta_core::Result<Self> {
        match version {
            1 => Ok(Self::V1),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }
}

/// Handle on a descriptor header in foreign memory. Slots are read on demand.
#[derive(Debug, Clone, Copy)]
pub struct NominalTypeDescriptor {
    address: Address,
    layout: HeaderLayout,
}

impl NominalTypeDescriptor {
    pub fn new(address: Address, layout: HeaderLayout) -> Self {
        Self { address, layout }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn slot(&self, offset: u64) -> Address {
        self.address.add(offset)
    }

    fn count(
        &self,
        view: &dyn MemoryView,
        offset: u64,
        field: &'static str,
    ) -> DecodeResult<usize> {
        let value = view.read_i32(self.slot(offset))?;
        usize::try_from(value).map_err(|_| DecodeError::NegativeCount { field, value })
    }

    pub fn mangled_name(
        &self,
        view: &dyn MemoryView,
        metadata: MetadataAddress,
    ) -> DecodeResult<String> {
        let target = read_relative(view, self.slot(self.layout.mangled_name))?;
        let name = read_string(view, target)?;
        if name.is_empty() {
            return Err(DecodeError::EmptyMangledName { metadata });
        }
        Ok(name)
    }

    pub fn number_of_fields(&self, view: &dyn MemoryView) -> DecodeResult<usize> {
        self.count(view, self.layout.number_of_fields, "field count")
    }

    pub fn field_offsets(
        &self,
        view: &dyn MemoryView,
        metadata: MetadataAddress,
        count: usize,
    ) -> DecodeResult<Vec<usize>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let index = view.read_i32(self.slot(self.layout.field_offset_vector))?;
        let offsets = read_metadata_vector(view, metadata.address(), index, count)?;
        Ok(offsets.into_iter().map(|o| o as usize).collect())
    }

    pub fn field_names(&self, view: &dyn MemoryView, count: usize) -> DecodeResult<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let table = read_relative(view, self.slot(self.layout.field_names))?;
        Ok(read_string_table(view, table, count)?)
    }

    /// Resolved entry point of the field type accessor
    pub fn field_type_accessor(&self, view: &dyn MemoryView) -> DecodeResult<Address> {
        Ok(read_relative(view, self.slot(self.layout.field_type_accessor))?)
    }

    pub fn field_types(
        &self,
        view: &dyn MemoryView,
        accessor: &dyn FieldTypeAccessor,
        metadata: MetadataAddress,
        count: usize,
    ) -> DecodeResult<Vec<TypeReference>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let entry = self.field_type_accessor(view)?;
        invoke_accessor(view, accessor, entry, metadata, count)
    }

    pub fn generic_parameter_count(&self, view: &dyn MemoryView) -> DecodeResult<usize> {
        self.count(view, self.layout.generic_parameter_count, "generic parameter count")
    }

    /// Generic arguments. With a zero count the vector slot is never read.
    pub fn generic_parameters(
        &self,
        view: &dyn MemoryView,
        metadata: MetadataAddress,
        count: usize,
    ) -> DecodeResult<Vec<TypeReference>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let index = view.read_i32(self.slot(self.layout.generic_parameter_vector))?;
        let words = read_metadata_vector(view, metadata.address(), index, count)?;
        debug!("Read {} generic parameters for {}", words.len(), metadata);
        Ok(words.into_iter().map(TypeReference::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_versions() {
        assert_eq!(HeaderLayout::for_version(1).unwrap(), HeaderLayout::V1);
        assert!(matches!(
            HeaderLayout::for_version(2),
            Err(Error::UnsupportedVersion(2))
        ));
    }
}
