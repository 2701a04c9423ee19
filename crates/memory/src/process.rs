//! Reads over the current process's own memory

use crate::view::{locate, remaining, MemoryView, DEFAULT_MAX_STRING_LEN};
use crate::MemoryResult;
use typemeta_core::Address;

/// A region of the running process treated as immutable foreign memory.
///
/// This is the only place the workspace turns addresses back into pointers.
#[derive(Debug, Clone, Copy)]
pub struct ProcessMemory {
    start: Address,
    len: usize,
    max_string_len: usize,
}

impl ProcessMemory {
    /// View `len` bytes of this process starting at `start`.
    ///
    /// # Safety
    ///
    /// The whole region must be mapped and readable, and must not be written
    /// to while the view (or any slice borrowed from it) is alive.
    pub unsafe fn new(start: Address, len: usize) -> Self {
        Self {
            start,
            len,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }

    pub fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl MemoryView for ProcessMemory {
    fn word_size(&self) -> usize {
        std::mem::size_of::<usize>()
    }

    fn little_endian(&self) -> bool {
        cfg!(target_endian = "little")
    }

    fn max_string_len(&self) -> usize {
        self.max_string_len
    }

    fn available(&self, address: Address) -> usize {
        remaining(self.start, self.len, address)
    }

    fn read_bytes(&self, address: Address, len: usize) -> MemoryResult<&[u8]> {
        let offset = locate(self.start, self.len, address, len)?;
        let ptr = (self.start.as_u64() as usize + offset) as *const u8;
        // In bounds of the region the constructor's caller vouched for.
        Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
    }
}
