//! Error types for foreign memory reads

use thiserror::Error;
use typemeta_core::Address;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable memory: {len} bytes at {address}")]
    UnreadableMemory { address: Address, len: usize },

    #[error("Unterminated string at {address} (scanned {limit} bytes)")]
    UnterminatedString { address: Address, limit: usize },
}

pub type MemoryResult<T> = std::result::Result<T, MemoryError>;

impl MemoryError {
    pub fn unreadable(address: Address, len: usize) -> Self {
        Self::UnreadableMemory { address, len }
    }
}
