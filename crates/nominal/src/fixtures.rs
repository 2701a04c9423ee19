//! Synthetic metadata images for tests

use crate::accessor::{FieldTypeAccessor, ResolvedAccessors};
use crate::builder::StaticLayouts;
use crate::descriptor::HeaderLayout;
use crate::types::{Layout, NominalKind};
use crate::DecodeResult;
use std::collections::HashMap;
use typemeta_core::{Address, Architecture, MetadataAddress, TypeReference};
use typemeta_memory::{BufferView, MemoryView};

/// Handles of types that live outside the image; never dereferenced
pub const INT: TypeReference = TypeReference(Address(0x7000_0010));
pub const STRING: TypeReference = TypeReference(Address(0x7000_0020));
pub const DOUBLE: TypeReference = TypeReference(Address(0x7000_0030));

const IMAGE_BASE: u64 = 0x10_0000;
const DESCRIPTOR_SIZE: usize = 40;

enum AccessorSpec {
    Resolved,
    Absent,
    Returns(Vec<TypeReference>),
}

/// Description of one nominal type to lay out in an image
pub struct TypeSpec {
    nominal: NominalKind,
    kind_flag: Option<u64>,
    mangled_name: String,
    fields: Vec<(String, usize, TypeReference)>,
    declared_fields: Option<i32>,
    generics: Vec<TypeReference>,
    generic_vector_index: Option<i32>,
    accessor: AccessorSpec,
    layout: Layout,
}

impl TypeSpec {
    pub fn new(nominal: NominalKind, mangled_name: &str) -> Self {
        Self {
            nominal,
            kind_flag: None,
            mangled_name: mangled_name.to_string(),
            fields: Vec::new(),
            declared_fields: None,
            generics: Vec::new(),
            generic_vector_index: None,
            accessor: AccessorSpec::Resolved,
            layout: Layout::new(8, 8, 8),
        }
    }

    pub fn field(mut self, name: &str, offset: usize, ty: TypeReference) -> Self {
        self.fields.push((name.to_string(), offset, ty));
        self
    }

    pub fn generic(mut self, ty: TypeReference) -> Self {
        self.generics.push(ty);
        self
    }

    /// Override the kind word of the metadata record
    pub fn kind_flag(mut self, flag: u64) -> Self {
        self.kind_flag = Some(flag);
        self
    }

    /// Store a field count different from the number of fields laid out
    pub fn declared_fields(mut self, count: i32) -> Self {
        self.declared_fields = Some(count);
        self
    }

    /// Store this value in the generic-parameter vector slot
    pub fn generic_vector_index(mut self, index: i32) -> Self {
        self.generic_vector_index = Some(index);
        self
    }

    /// Make the accessor slot resolve to a null entry point
    pub fn no_accessor(mut self) -> Self {
        self.accessor = AccessorSpec::Absent;
        self
    }

    /// Make the accessor return exactly `types`, whatever the field count
    pub fn accessor_returns(mut self, types: Vec<TypeReference>) -> Self {
        self.accessor = AccessorSpec::Returns(types);
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}

/// Accessor used by fixtures: recorded vectors plus canned results
#[derive(Debug, Clone, Default)]
pub struct FixtureAccessors {
    resolved: ResolvedAccessors,
    canned: HashMap<Address, Vec<TypeReference>>,
}

impl FieldTypeAccessor for FixtureAccessors {
    fn field_types(
        &self,
        view: &dyn MemoryView,
        entry: Address,
        metadata: MetadataAddress,
        count: usize,
    ) -> DecodeResult<Vec<TypeReference>> {
        if let Some(types) = self.canned.get(&entry) {
            return Ok(types.clone());
        }
        self.resolved.field_types(view, entry, metadata, count)
    }
}

/// Lays out metadata records, descriptors, string tables and vectors in one
/// contiguous buffer
pub struct ImageBuilder {
    architecture: Architecture,
    data: Vec<u8>,
    accessors: FixtureAccessors,
    layouts: StaticLayouts,
}

impl ImageBuilder {
    pub fn new(architecture: Architecture) -> Self {
        Self {
            architecture,
            data: Vec::new(),
            accessors: FixtureAccessors::default(),
            layouts: StaticLayouts::new(),
        }
    }

    fn word(&self) -> usize {
        self.architecture.pointer_size()
    }

    fn alloc(&mut self, len: usize, align: usize) -> Address {
        let padded = self.data.len().next_multiple_of(align);
        self.data.resize(padded + len, 0);
        Address::new(IMAGE_BASE + padded as u64)
    }

    fn index(&self, address: Address) -> usize {
        (address.as_u64() - IMAGE_BASE) as usize
    }

    fn write_i32(&mut self, address: Address, value: i32) {
        let at = self.index(address);
        self.data[at..at + 4].copy_from_slice(&value.to_ne_bytes());
    }

    fn write_word(&mut self, address: Address, value: u64) {
        let at = self.index(address);
        if self.word() == 8 {
            self.data[at..at + 8].copy_from_slice(&value.to_ne_bytes());
        } else {
            self.data[at..at + 4].copy_from_slice(&(value as u32).to_ne_bytes());
        }
    }

    fn write_relative(&mut self, slot: Address, target: Address) {
        let value = target.as_u64() as i64 - (slot.as_u64() as i64 + 4);
        self.write_i32(slot, value as i32);
    }

    fn write_strings<'s>(&mut self, strings: impl IntoIterator<Item = &'s str>) -> Address {
        let mut bytes = Vec::new();
        for s in strings {
            bytes.extend_from_slice(s.as_bytes());
            bytes.push(0);
        }
        let start = self.alloc(bytes.len().max(1), 1);
        let at = self.index(start);
        self.data[at..at + bytes.len()].copy_from_slice(&bytes);
        start
    }

    /// Lay out `spec` and return its metadata address
    pub fn add_type(&mut self, spec: TypeSpec) -> MetadataAddress {
        let word = self.word();
        let header = HeaderLayout::V1;

        // Metadata record: kind word, descriptor pointer, then the field
        // offset vector and generic vector as trailing words.
        let descriptor_index = spec.nominal.descriptor_offset(word) as usize / word;
        let offsets_index = descriptor_index + 1;
        let generics_index = offsets_index + spec.fields.len();
        let record = self.alloc((generics_index + spec.generics.len()) * word, word);
        let metadata = MetadataAddress(record);

        let kind_flag = spec.kind_flag.unwrap_or(match spec.nominal {
            NominalKind::Struct => 1,
            NominalKind::Enum => 2,
            NominalKind::Class => 0x0804_1000,
        });
        self.write_word(record, kind_flag);

        for (i, (_, offset, _)) in spec.fields.iter().enumerate() {
            self.write_word(record.add(((offsets_index + i) * word) as u64), *offset as u64);
        }
        for (i, ty) in spec.generics.iter().enumerate() {
            let slot = record.add(((generics_index + i) * word) as u64);
            self.write_word(slot, ty.address().as_u64());
        }

        let name = self.write_strings([spec.mangled_name.as_str()]);
        let names = self.write_strings(spec.fields.iter().map(|(n, _, _)| n.as_str()));

        let types = self.alloc(spec.fields.len() * word, word);
        for (i, (_, _, ty)) in spec.fields.iter().enumerate() {
            self.write_word(types.add((i * word) as u64), ty.address().as_u64());
        }

        let descriptor = self.alloc(DESCRIPTOR_SIZE, 4);
        self.write_word(record.add((descriptor_index * word) as u64), descriptor.as_u64());

        self.write_relative(descriptor.add(header.mangled_name), name);
        let declared = spec.declared_fields.unwrap_or(spec.fields.len() as i32);
        self.write_i32(descriptor.add(header.number_of_fields), declared);
        self.write_i32(descriptor.add(header.field_offset_vector), offsets_index as i32);
        self.write_relative(descriptor.add(header.field_names), names);

        let accessor_slot = descriptor.add(header.field_type_accessor);
        match spec.accessor {
            AccessorSpec::Absent => self.write_relative(accessor_slot, Address::ZERO),
            AccessorSpec::Resolved => {
                let entry = self.alloc(16, 16);
                self.write_relative(accessor_slot, entry);
                self.accessors.resolved.insert(entry, types);
            }
            AccessorSpec::Returns(canned) => {
                let entry = self.alloc(16, 16);
                self.write_relative(accessor_slot, entry);
                self.accessors.canned.insert(entry, canned);
            }
        }

        let generic_index = spec.generic_vector_index.unwrap_or(generics_index as i32);
        self.write_i32(descriptor.add(header.generic_parameter_vector), generic_index);
        self.write_i32(descriptor.add(header.generic_parameter_count), spec.generics.len() as i32);

        self.layouts.insert(metadata.as_type(), spec.layout);
        metadata
    }

    pub fn finish(self) -> (BufferView, FixtureAccessors, StaticLayouts) {
        let view = BufferView::new(self.data, Address::new(IMAGE_BASE), self.architecture);
        (view, self.accessors, self.layouts)
    }
}
