//! Common types used throughout the decoder

use serde::{Deserialize, Serialize};

/// Represents a memory address (supports both 32 and 64 bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub u64);

impl Address {
    pub const ZERO: Address = Address(0);

    pub fn new(addr: u64) -> Self {
        Self(addr)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Signed displacement, wrapping at the top of the address space
    pub fn offset(&self, offset: i64) -> Self {
        Self(self.0.wrapping_add_signed(offset))
    }

    /// Unsigned displacement, wrapping at the top of the address space
    pub fn add(&self, bytes: u64) -> Self {
        Self(self.0.wrapping_add(bytes))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Self(value as u64)
    }
}

/// Architecture of the process that produced the metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Architecture {
    X86,
    X64,
    Arm32,
    Arm64,
}

impl Architecture {
    /// Architecture of the running process
    pub fn host() -> Self {
        if cfg!(target_arch = "x86") {
            Architecture::X86
        } else if cfg!(target_arch = "arm") {
            Architecture::Arm32
        } else if cfg!(target_arch = "aarch64") {
            Architecture::Arm64
        } else {
            Architecture::X64
        }
    }

    /// Host architecture when its word width is `size`, otherwise the x86
    /// flavour of that width
    pub fn for_pointer_size(size: usize) -> Option<Self> {
        let host = Self::host();
        match size {
            _ if host.pointer_size() == size => Some(host),
            4 => Some(Architecture::X86),
            8 => Some(Architecture::X64),
            _ => None,
        }
    }

    pub fn pointer_size(&self) -> usize {
        match self {
            Architecture::X86 | Architecture::Arm32 => 4,
            Architecture::X64 | Architecture::Arm64 => 8,
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, Architecture::X64 | Architecture::Arm64)
    }
}

impl Default for Architecture {
    fn default() -> Self {
        Self::host()
    }
}

/// Absolute address of a type's runtime metadata record.
///
/// Handed in by whatever maps a declared type to its metadata; the decoder
/// only ever reads through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataAddress(pub Address);

impl MetadataAddress {
    pub fn new(addr: u64) -> Self {
        Self(Address(addr))
    }

    pub fn address(&self) -> Address {
        self.0
    }

    /// A runtime type handle is its metadata address
    pub fn as_type(&self) -> TypeReference {
        TypeReference(self.0)
    }
}

impl std::fmt::Display for MetadataAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Address> for MetadataAddress {
    fn from(value: Address) -> Self {
        Self(value)
    }
}

/// Opaque handle identifying a type. Never dereferenced by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeReference(pub Address);

impl TypeReference {
    pub fn new(addr: u64) -> Self {
        Self(Address(addr))
    }

    pub fn address(&self) -> Address {
        self.0
    }
}

impl std::fmt::Display for TypeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
