//! Assembles decoded field lists into a [`TypeInfo`]

use crate::types::{Kind, Layout, PropertyInfo, TypeInfo};
use crate::{DecodeError, DecodeResult};
use std::collections::HashMap;
use typemeta_core::TypeReference;

/// Source of layout facts and display names, which the metadata record
/// itself does not describe
pub trait LayoutQuery: Send + Sync {
    fn layout(&self, ty: TypeReference) -> Option<Layout>;

    /// Human-readable name; decoded types fall back to their mangled name
    fn display_name(&self, _ty: TypeReference) -> Option<String> {
        None
    }
}

/// Precomputed layouts and names keyed by type
#[derive(Debug, Clone, Default)]
pub struct StaticLayouts {
    layouts: HashMap<TypeReference, Layout>,
    names: HashMap<TypeReference, String>,
}

impl StaticLayouts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ty: TypeReference, layout: Layout) {
        self.layouts.insert(ty, layout);
    }

    pub fn insert_named(&mut self, ty: TypeReference, name: impl Into<String>, layout: Layout) {
        self.layouts.insert(ty, layout);
        self.names.insert(ty, name.into());
    }

    pub fn with(mut self, ty: TypeReference, layout: Layout) -> Self {
        self.insert(ty, layout);
        self
    }
}

impl LayoutQuery for StaticLayouts {
    fn layout(&self, ty: TypeReference) -> Option<Layout> {
        self.layouts.get(&ty).copied()
    }

    fn display_name(&self, ty: TypeReference) -> Option<String> {
        self.names.get(&ty).cloned()
    }
}

/// Collects the decoded pieces of one type and checks they agree
#[derive(Debug, Clone)]
pub struct TypeInfoBuilder {
    kind: Kind,
    ty: TypeReference,
    mangled_name: String,
    names: Vec<String>,
    offsets: Vec<usize>,
    types: Vec<TypeReference>,
    generic_types: Vec<TypeReference>,
}

impl TypeInfoBuilder {
    pub fn new(kind: Kind, ty: TypeReference, mangled_name: impl Into<String>) -> Self {
        Self {
            kind,
            ty,
            mangled_name: mangled_name.into(),
            names: Vec::new(),
            offsets: Vec::new(),
            types: Vec::new(),
            generic_types: Vec::new(),
        }
    }

    pub fn fields(
        mut self,
        names: Vec<String>,
        offsets: Vec<usize>,
        types: Vec<TypeReference>,
    ) -> Self {
        self.names = names;
        self.offsets = offsets;
        self.types = types;
        self
    }

    pub fn generic_types(mut self, generic_types: Vec<TypeReference>) -> Self {
        self.generic_types = generic_types;
        self
    }

    pub fn build(self, layouts: &dyn LayoutQuery) -> DecodeResult<TypeInfo> {
        let count = self.names.len();
        if self.offsets.len() != count || self.types.len() != count {
            return Err(DecodeError::FieldCountMismatch {
                names: count,
                offsets: self.offsets.len(),
                types: self.types.len(),
            });
        }

        let owner = self.ty;
        let properties: Vec<PropertyInfo> = self
            .names
            .into_iter()
            .zip(self.offsets)
            .zip(self.types)
            .map(|((name, byte_offset), ty)| PropertyInfo {
                name,
                ty,
                byte_offset,
                owner_type: owner,
            })
            .collect();

        let layout = layouts
            .layout(self.ty)
            .ok_or(DecodeError::LayoutUnavailable { ty: self.ty })?;
        let name = layouts
            .display_name(self.ty)
            .unwrap_or_else(|| self.mangled_name.clone());

        Ok(TypeInfo {
            kind: self.kind,
            name,
            ty: self.ty,
            mangled_name: self.mangled_name,
            number_of_properties: properties.len(),
            properties,
            number_of_generic_types: self.generic_types.len(),
            generic_types: self.generic_types,
            size: layout.size,
            alignment: layout.alignment,
            stride: layout.stride,
        })
    }
}
