//! Decoded type descriptions and metadata kinds

use serde::{Deserialize, Serialize};
use typemeta_core::TypeReference;

/// Metadata kind, stored in the first word of every metadata record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Struct,
    Enum,
    Optional,
    Opaque,
    Tuple,
    Function,
    Existential,
    Metatype,
    ObjCClassWrapper,
    ExistentialMetatype,
    ForeignClass,
    HeapLocalVariable,
    HeapGenericLocalVariable,
    ErrorObject,
    Class,
}

impl Kind {
    /// Decode the kind word. Class metadata keeps an isa pointer there, so
    /// anything unrecognised is a class.
    pub fn from_flag(flag: u64) -> Self {
        match flag {
            1 => Kind::Struct,
            2 => Kind::Enum,
            3 => Kind::Optional,
            8 => Kind::Opaque,
            9 => Kind::Tuple,
            10 => Kind::Function,
            12 => Kind::Existential,
            13 => Kind::Metatype,
            14 => Kind::ObjCClassWrapper,
            15 => Kind::ExistentialMetatype,
            16 => Kind::ForeignClass,
            64 => Kind::HeapLocalVariable,
            65 => Kind::HeapGenericLocalVariable,
            128 => Kind::ErrorObject,
            _ => Kind::Class,
        }
    }

    /// The nominal decoder for this kind, if it has one
    pub fn nominal(&self) -> Option<NominalKind> {
        match self {
            Kind::Struct => Some(NominalKind::Struct),
            Kind::Enum | Kind::Optional => Some(NominalKind::Enum),
            Kind::Class => Some(NominalKind::Class),
            _ => None,
        }
    }
}

/// The metadata shapes that carry a nominal type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NominalKind {
    Struct,
    Class,
    Enum,
}

impl NominalKind {
    /// Byte offset of the descriptor pointer inside the metadata record
    pub fn descriptor_offset(&self, word_size: usize) -> u64 {
        let word = word_size as u64;
        match self {
            NominalKind::Struct | NominalKind::Enum => word,
            // isa, superclass, two runtime-reserved words and rodata, then
            // flags, address point, instance size, align mask, reserved,
            // class size and class address point
            NominalKind::Class => 5 * word + 4 + 4 + 4 + 2 + 2 + 4 + 4,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            NominalKind::Struct => Kind::Struct,
            NominalKind::Class => Kind::Class,
            NominalKind::Enum => Kind::Enum,
        }
    }
}

/// Size, alignment and stride of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Layout {
    pub size: usize,
    pub alignment: usize,
    pub stride: usize,
}

impl Layout {
    pub fn new(size: usize, alignment: usize, stride: usize) -> Self {
        Self {
            size,
            alignment,
            stride,
        }
    }
}

/// One stored field of a nominal type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeReference,
    pub byte_offset: usize,
    pub owner_type: TypeReference,
}

/// Decoded description of a nominal type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub kind: Kind,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeReference,
    pub mangled_name: String,
    /// Stored fields in declaration order
    pub properties: Vec<PropertyInfo>,
    /// Bound generic arguments in parameter order
    pub generic_types: Vec<TypeReference>,
    pub number_of_properties: usize,
    pub number_of_generic_types: usize,
    pub size: usize,
    pub alignment: usize,
    pub stride: usize,
}

impl TypeInfo {
    /// Look up a property by field name
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_generic(&self) -> bool {
        self.number_of_generic_types > 0
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.size, self.alignment, self.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_flags() {
        assert_eq!(Kind::from_flag(1), Kind::Struct);
        assert_eq!(Kind::from_flag(2), Kind::Enum);
        assert_eq!(Kind::from_flag(3), Kind::Optional);
        assert_eq!(Kind::from_flag(9), Kind::Tuple);
        assert_eq!(Kind::from_flag(128), Kind::ErrorObject);
        assert_eq!(Kind::from_flag(0x7FFF_0000_1000), Kind::Class);
    }

    #[test]
    fn test_nominal_kinds() {
        assert_eq!(Kind::Optional.nominal(), Some(NominalKind::Enum));
        assert_eq!(Kind::Class.nominal(), Some(NominalKind::Class));
        assert_eq!(Kind::Tuple.nominal(), None);
        assert_eq!(Kind::Function.nominal(), None);
    }

    #[test]
    fn test_descriptor_offsets() {
        assert_eq!(NominalKind::Struct.descriptor_offset(8), 8);
        assert_eq!(NominalKind::Enum.descriptor_offset(4), 4);
        assert_eq!(NominalKind::Class.descriptor_offset(8), 64);
        assert_eq!(NominalKind::Class.descriptor_offset(4), 44);
    }
}
