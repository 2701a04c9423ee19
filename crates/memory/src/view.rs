//! Bounded primitive reads over a byte-addressable region

use crate::{MemoryError, MemoryResult};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use memmap2::Mmap;
use std::path::Path;
use tracing::debug;
use typemeta_core::{Address, Architecture};

/// Default bound on null-terminated string scans
pub const DEFAULT_MAX_STRING_LEN: usize = 4096;

/// Read-only view of memory the decoder does not own.
///
/// Every read is checked against the backing region; nothing is ever written.
pub trait MemoryView: Send + Sync {
    /// Width of a native word (pointer) in bytes
    fn word_size(&self) -> usize;

    /// Byte order of stored integers
    fn little_endian(&self) -> bool;

    /// Longest string `read_cstring` will scan for a terminator
    fn max_string_len(&self) -> usize {
        DEFAULT_MAX_STRING_LEN
    }

    /// Number of readable bytes from `address` to the end of the region
    fn available(&self, address: Address) -> usize;

    /// Borrow `len` bytes starting at `address`
    fn read_bytes(&self, address: Address, len: usize) -> MemoryResult<&[u8]>;

    /// Read a native-word-width unsigned integer
    fn read_word(&self, address: Address) -> MemoryResult<u64> {
        let size = self.word_size();
        let bytes = self.read_bytes(address, size)?;
        Ok(if self.little_endian() {
            LittleEndian::read_uint(bytes, size)
        } else {
            BigEndian::read_uint(bytes, size)
        })
    }

    /// Read a signed 32-bit integer
    fn read_i32(&self, address: Address) -> MemoryResult<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(if self.little_endian() {
            LittleEndian::read_i32(bytes)
        } else {
            BigEndian::read_i32(bytes)
        })
    }

    /// Raw bytes of a null-terminated string, terminator excluded
    fn read_cstring_bytes(&self, address: Address) -> MemoryResult<&[u8]> {
        let available = self.available(address);
        if available == 0 {
            return Err(MemoryError::unreadable(address, 1));
        }

        let limit = self.max_string_len();
        let span = available.min(limit.saturating_add(1));
        let bytes = self.read_bytes(address, span)?;

        match bytes.iter().position(|&b| b == 0) {
            Some(end) => Ok(&bytes[..end]),
            None if span == available && available <= limit => {
                Err(MemoryError::unreadable(address.add(available as u64), 1))
            }
            None => Err(MemoryError::UnterminatedString { address, limit }),
        }
    }

    /// Read a null-terminated string, decoding it as UTF-8 (lossy)
    fn read_cstring(&self, address: Address) -> MemoryResult<String> {
        let bytes = self.read_cstring_bytes(address)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Offset of `[address, address + len)` inside the region starting at `start`
pub(crate) fn locate(
    start: Address,
    region_len: usize,
    address: Address,
    len: usize,
) -> MemoryResult<usize> {
    let Some(offset) = address.as_u64().checked_sub(start.as_u64()) else {
        return Err(MemoryError::unreadable(address, len));
    };
    let Ok(offset) = usize::try_from(offset) else {
        return Err(MemoryError::unreadable(address, len));
    };
    match offset.checked_add(len) {
        Some(end) if end <= region_len => Ok(offset),
        _ => Err(MemoryError::unreadable(address, len)),
    }
}

/// Bytes remaining in the region from `address`, zero when outside it
pub(crate) fn remaining(start: Address, region_len: usize, address: Address) -> usize {
    address
        .as_u64()
        .checked_sub(start.as_u64())
        .and_then(|offset| usize::try_from(offset).ok())
        .map(|offset| region_len.saturating_sub(offset))
        .unwrap_or(0)
}

/// A byte buffer placed at a base address.
///
/// Backs tests with synthetic images and offline decoding of memory dumps.
#[derive(Debug)]
pub struct BufferView<B = Vec<u8>> {
    data: B,
    base: Address,
    architecture: Architecture,
    little_endian: bool,
    max_string_len: usize,
}

impl<B: AsRef<[u8]>> BufferView<B> {
    pub fn new(data: B, base: Address, architecture: Architecture) -> Self {
        Self {
            data,
            base,
            architecture,
            little_endian: cfg!(target_endian = "little"),
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }

    pub fn with_little_endian(mut self, little_endian: bool) -> Self {
        self.little_endian = little_endian;
        self
    }

    pub fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }
}

impl BufferView<Mmap> {
    /// Map a raw memory dump whose first byte was at `base` in the source process
    pub fn map_file(path: &Path, base: Address, architecture: Architecture) -> MemoryResult<Self> {
        let file = std::fs::File::open(path)?;
        // The dump must not be modified while it is mapped.
        let map = unsafe { Mmap::map(&file)? };
        debug!("Mapped {} bytes from {:?} at {}", map.len(), path, base);
        Ok(Self::new(map, base, architecture))
    }
}

impl<B: AsRef<[u8]> + Send + Sync> MemoryView for BufferView<B> {
    fn word_size(&self) -> usize {
        self.architecture.pointer_size()
    }

    fn little_endian(&self) -> bool {
        self.little_endian
    }

    fn max_string_len(&self) -> usize {
        self.max_string_len
    }

    fn available(&self, address: Address) -> usize {
        remaining(self.base, self.len(), address)
    }

    fn read_bytes(&self, address: Address, len: usize) -> MemoryResult<&[u8]> {
        let offset = locate(self.base, self.len(), address, len)?;
        Ok(&self.data.as_ref()[offset..offset + len])
    }
}
