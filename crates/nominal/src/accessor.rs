//! Field type accessors
//!
//! The runtime does not store field types in the descriptor. Instead the
//! descriptor points at a generated function which, given the metadata
//! address, returns a vector of type handles in field order.

use crate::{DecodeError, DecodeResult};
use std::collections::HashMap;
use tracing::debug;
use typemeta_core::{Address, MetadataAddress, TypeReference};
use typemeta_memory::{read_pointer_vector, MemoryView};

/// Strategy for obtaining the field types behind an accessor entry point
pub trait FieldTypeAccessor: Send + Sync {
    /// Field types of `metadata`, as returned by the accessor at `entry`
    fn field_types(
        &self,
        view: &dyn MemoryView,
        entry: Address,
        metadata: MetadataAddress,
        count: usize,
    ) -> DecodeResult<Vec<TypeReference>>;
}

/// Run the accessor for a type declaring `count` fields.
///
/// Nothing is invoked for a fieldless type; a null entry point is an error
/// only when there are fields to type.
pub fn invoke_accessor(
    view: &dyn MemoryView,
    accessor: &dyn FieldTypeAccessor,
    entry: Address,
    metadata: MetadataAddress,
    count: usize,
) -> DecodeResult<Vec<TypeReference>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if entry.is_null() {
        return Err(DecodeError::MissingAccessor { metadata });
    }
    debug!("Invoking field type accessor {} for {}", entry, metadata);
    accessor.field_types(view, entry, metadata, count)
}

type RawAccessor = extern "C" fn(*const usize) -> *const usize;

/// Calls accessor entry points as native code in this process
#[derive(Debug)]
pub struct NativeAccessor {
    _private: (),
}

impl NativeAccessor {
    /// # Safety
    ///
    /// Every entry point handed to this accessor must be a live runtime
    /// field type accessor taking a metadata pointer and returning a pointer
    /// to its type vector.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl FieldTypeAccessor for NativeAccessor {
    fn field_types(
        &self,
        view: &dyn MemoryView,
        entry: Address,
        metadata: MetadataAddress,
        count: usize,
    ) -> DecodeResult<Vec<TypeReference>> {
        // Entry points are vouched for by the constructor's caller.
        let function =
            unsafe { std::mem::transmute::<usize, RawAccessor>(entry.as_u64() as usize) };
        let start = function(metadata.address().as_u64() as usize as *const usize);
        Ok(read_pointer_vector(view, Address::new(start as usize as u64), count)?)
    }
}

/// Accessor results recorded ahead of time, keyed by entry point.
///
/// Used when decoding a memory dump where the accessors cannot run: each
/// entry maps to the address its type vector had in the dumped process.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAccessors {
    vectors: HashMap<Address, Address>,
}

impl ResolvedAccessors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: Address, vector: Address) {
        self.vectors.insert(entry, vector);
    }

    pub fn with(mut self, entry: Address, vector: Address) -> Self {
        self.insert(entry, vector);
        self
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl FieldTypeAccessor for ResolvedAccessors {
    fn field_types(
        &self,
        view: &dyn MemoryView,
        entry: Address,
        metadata: MetadataAddress,
        count: usize,
    ) -> DecodeResult<Vec<TypeReference>> {
        let vector = self
            .vectors
            .get(&entry)
            .ok_or(DecodeError::MissingAccessor { metadata })?;
        Ok(read_pointer_vector(view, *vector, count)?)
    }
}
