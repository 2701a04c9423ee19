//! Core types and configuration for the type-metadata decoder
//!
//! This crate provides the address handles and settings shared by the memory
//! readers and the nominal metadata decoder.

pub mod error;
pub mod types;
pub mod config;

pub use error::{Error, Result};
pub use types::*;
pub use config::DecoderConfig;
