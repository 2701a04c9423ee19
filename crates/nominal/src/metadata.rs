//! Nominal metadata records: structs, classes and enums
//!
//! The three shapes share one descriptor format and differ only in where the
//! descriptor pointer sits inside the metadata record.

use crate::accessor::FieldTypeAccessor;
use crate::builder::{LayoutQuery, TypeInfoBuilder};
use crate::descriptor::{HeaderLayout, NominalTypeDescriptor};
use crate::types::{Kind, NominalKind, TypeInfo};
use crate::DecodeResult;
use tracing::debug;
use typemeta_core::{Address, MetadataAddress, TypeReference};
use typemeta_memory::MemoryView;

/// Decode operations over a nominal metadata record
pub trait NominalMetadataType {
    fn view(&self) -> &dyn MemoryView;

    fn base(&self) -> MetadataAddress;

    fn header_layout(&self) -> HeaderLayout;

    fn kind(&self) -> Kind;

    fn nominal_kind(&self) -> NominalKind;

    /// Byte offset of the descriptor pointer inside the record
    fn descriptor_offset(&self) -> u64 {
        self.nominal_kind().descriptor_offset(self.view().word_size())
    }

    fn descriptor(&self) -> DecodeResult<NominalTypeDescriptor> {
        let slot = self.base().address().add(self.descriptor_offset());
        let address = Address::new(self.view().read_word(slot)?);
        Ok(NominalTypeDescriptor::new(address, self.header_layout()))
    }

    fn mangled_name(&self) -> DecodeResult<String> {
        self.descriptor()?.mangled_name(self.view(), self.base())
    }

    fn number_of_fields(&self) -> DecodeResult<usize> {
        self.descriptor()?.number_of_fields(self.view())
    }

    fn field_offsets(&self) -> DecodeResult<Vec<usize>> {
        let descriptor = self.descriptor()?;
        let count = descriptor.number_of_fields(self.view())?;
        descriptor.field_offsets(self.view(), self.base(), count)
    }

    fn field_names(&self) -> DecodeResult<Vec<String>> {
        let descriptor = self.descriptor()?;
        let count = descriptor.number_of_fields(self.view())?;
        descriptor.field_names(self.view(), count)
    }

    fn field_types(&self, accessor: &dyn FieldTypeAccessor) -> DecodeResult<Vec<TypeReference>> {
        let descriptor = self.descriptor()?;
        let count = descriptor.number_of_fields(self.view())?;
        descriptor.field_types(self.view(), accessor, self.base(), count)
    }

    fn generic_parameter_count(&self) -> DecodeResult<usize> {
        self.descriptor()?.generic_parameter_count(self.view())
    }

    fn generic_parameters(&self) -> DecodeResult<Vec<TypeReference>> {
        let descriptor = self.descriptor()?;
        let count = descriptor.generic_parameter_count(self.view())?;
        descriptor.generic_parameters(self.view(), self.base(), count)
    }

    /// Decode the whole record. Stops at the first failing step.
    fn to_type_info(
        &self,
        accessor: &dyn FieldTypeAccessor,
        layouts: &dyn LayoutQuery,
    ) -> DecodeResult<TypeInfo> {
        let view = self.view();
        let base = self.base();
        let descriptor = self.descriptor()?;
        debug!(
            "Decoding {:?} metadata at {} (descriptor {})",
            self.kind(),
            base,
            descriptor.address()
        );

        let mangled_name = descriptor.mangled_name(view, base)?;
        let count = descriptor.number_of_fields(view)?;
        let names = descriptor.field_names(view, count)?;
        let offsets = descriptor.field_offsets(view, base, count)?;
        let types = descriptor.field_types(view, accessor, base, count)?;
        let generic_count = descriptor.generic_parameter_count(view)?;
        let generic_types = descriptor.generic_parameters(view, base, generic_count)?;

        TypeInfoBuilder::new(self.kind(), base.as_type(), mangled_name)
            .fields(names, offsets, types)
            .generic_types(generic_types)
            .build(layouts)
    }
}

macro_rules! nominal_metadata {
    ($(#[$doc:meta])* $name:ident, $nominal:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy)]
        pub struct $name<'a> {
            view: &'a dyn MemoryView,
            base: MetadataAddress,
            layout: HeaderLayout,
            kind: Kind,
        }

        impl<'a> $name<'a> {
            pub fn new(
                view: &'a dyn MemoryView,
                base: MetadataAddress,
                layout: HeaderLayout,
            ) -> Self {
                Self {
                    view,
                    base,
                    layout,
                    kind: $nominal.kind(),
                }
            }
        }

        impl NominalMetadataType for $name<'_> {
            fn view(&self) -> &dyn MemoryView {
                self.view
            }

            fn base(&self) -> MetadataAddress {
                self.base
            }

            fn header_layout(&self) -> HeaderLayout {
                self.layout
            }

            fn kind(&self) -> Kind {
                self.kind
            }

            fn nominal_kind(&self) -> NominalKind {
                $nominal
            }
        }
    };
}

nominal_metadata!(
    /// Struct metadata: descriptor pointer follows the kind word
    StructMetadata,
    NominalKind::Struct
);

nominal_metadata!(
    /// Class metadata: descriptor pointer follows the class object header
    ClassMetadata,
    NominalKind::Class
);

nominal_metadata!(
    /// Enum and optional metadata
    EnumMetadata,
    NominalKind::Enum
);

impl<'a> EnumMetadata<'a> {
    /// Optional metadata decodes like an enum but keeps its own kind
    pub fn optional(view: &'a dyn MemoryView, base: MetadataAddress, layout: HeaderLayout) -> Self {
        Self {
            kind: Kind::Optional,
            ..Self::new(view, base, layout)
        }
    }
}

/// Decode `base` with the record shape selected by `kind`
pub fn decode_nominal(
    view: &dyn MemoryView,
    base: MetadataAddress,
    kind: Kind,
    nominal: NominalKind,
    layout: HeaderLayout,
    accessor: &dyn FieldTypeAccessor,
    layouts: &dyn LayoutQuery,
) -> DecodeResult<TypeInfo> {
    match nominal {
        NominalKind::Struct => {
            StructMetadata::new(view, base, layout).to_type_info(accessor, layouts)
        }
        NominalKind::Class => {
            ClassMetadata::new(view, base, layout).to_type_info(accessor, layouts)
        }
        NominalKind::Enum if kind == Kind::Optional => {
            EnumMetadata::optional(view, base, layout).to_type_info(accessor, layouts)
        }
        NominalKind::Enum => EnumMetadata::new(view, base, layout).to_type_info(accessor, layouts),
    }
}
