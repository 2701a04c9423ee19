//! Bounded reads over foreign memory
//!
//! Everything the metadata decoder knows about raw memory lives here: the
//! [`MemoryView`] trait and its buffer/process implementations, relative
//! pointer resolution, word vectors and packed string tables.

pub mod view;
pub mod process;
pub mod relative;
pub mod vector;
pub mod strings;
pub mod error;

pub use error::{MemoryError, MemoryResult};
pub use process::ProcessMemory;
pub use relative::{read_relative, resolve};
pub use strings::{read_string, read_string_table};
pub use vector::{read_metadata_vector, read_pointer_vector};
pub use view::{BufferView, MemoryView};
