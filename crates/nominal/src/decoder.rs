//! Decoder entry points: single records and batches

use crate::accessor::FieldTypeAccessor;
use crate::builder::LayoutQuery;
use crate::descriptor::HeaderLayout;
use crate::metadata::decode_nominal;
use crate::types::{Kind, NominalKind, TypeInfo};
use crate::{DecodeError, DecodeResult};
use memmap2::Mmap;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};
use typemeta_core::{Address, DecoderConfig, Error, MetadataAddress};
use typemeta_memory::{BufferView, MemoryResult, MemoryView};

/// Map a memory dump using the configured architecture and string bound
pub fn open_dump(
    path: &Path,
    base: Address,
    config: &DecoderConfig,
) -> MemoryResult<BufferView<Mmap>> {
    let view = BufferView::map_file(path, base, config.architecture)?;
    Ok(view.with_max_string_len(config.max_string_len))
}

/// Nominal metadata decoder over one memory view
pub struct Decoder<'a> {
    view: &'a dyn MemoryView,
    accessor: &'a dyn FieldTypeAccessor,
    layouts: &'a dyn LayoutQuery,
    header: HeaderLayout,
    config: DecoderConfig,
}

impl<'a> Decoder<'a> {
    pub fn new(
        view: &'a dyn MemoryView,
        accessor: &'a dyn FieldTypeAccessor,
        layouts: &'a dyn LayoutQuery,
        config: DecoderConfig,
    ) -> DecodeResult<Self> {
        config.validate()?;
        let word_size = config.architecture.pointer_size();
        if view.word_size() != word_size {
            return Err(Error::config(format!(
                "{:?} uses {}-byte words but the memory view reads {}-byte words",
                config.architecture,
                word_size,
                view.word_size()
            ))
            .into());
        }
        let header = HeaderLayout::for_version(config.abi_version)?;
        Ok(Self {
            view,
            accessor,
            layouts,
            header,
            config,
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Kind stored in the first word of the record
    pub fn kind_of(&self, metadata: MetadataAddress) -> DecodeResult<Kind> {
        Ok(Kind::from_flag(self.view.read_word(metadata.address())?))
    }

    /// Decode the record at `metadata`, picking the record shape from its kind
    pub fn decode(&self, metadata: MetadataAddress) -> DecodeResult<TypeInfo> {
        let kind = self.kind_of(metadata)?;
        let Some(nominal) = kind.nominal() else {
            warn!("Metadata at {} is {:?}, not a nominal type", metadata, kind);
            return Err(DecodeError::NotNominal { kind });
        };
        decode_nominal(self.view, metadata, kind, nominal, self.header, self.accessor, self.layouts)
    }

    /// Decode the record at `metadata` as the given shape, skipping kind detection
    pub fn decode_as(
        &self,
        nominal: NominalKind,
        metadata: MetadataAddress,
    ) -> DecodeResult<TypeInfo> {
        let kind = nominal.kind();
        decode_nominal(self.view, metadata, kind, nominal, self.header, self.accessor, self.layouts)
    }

    /// Decode every address independently. Results are in input order.
    pub fn decode_many(&self, addresses: &[MetadataAddress]) -> Vec<DecodeResult<TypeInfo>> {
        info!("Decoding {} metadata records", addresses.len());

        let results: Vec<_> = if self.config.parallel {
            addresses.par_iter().map(|&m| self.decode(m)).collect()
        } else {
            addresses.iter().map(|&m| self.decode(m)).collect()
        };

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!("{} of {} metadata records failed to decode", failed, results.len());
        } else {
            debug!("All {} metadata records decoded", results.len());
        }
        results
    }
}
