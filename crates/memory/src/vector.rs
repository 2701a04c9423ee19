//! Runs of native words: metadata-relative vectors and flat pointer vectors

use crate::view::MemoryView;
use crate::MemoryResult;
use typemeta_core::{Address, TypeReference};

/// Read `count` words starting `index` words past the metadata base.
///
/// Used for field-offset and generic-parameter vectors, whose header slot
/// stores a word index into the metadata record rather than a pointer.
pub fn read_metadata_vector(
    view: &dyn MemoryView,
    metadata: Address,
    index: i32,
    count: usize,
) -> MemoryResult<Vec<u64>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let start = metadata.offset(index as i64 * view.word_size() as i64);
    read_words(view, start, count)
}

/// Read `count` type handles stored back to back at `start`
pub fn read_pointer_vector(
    view: &dyn MemoryView,
    start: Address,
    count: usize,
) -> MemoryResult<Vec<TypeReference>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    Ok(read_words(view, start, count)?
        .into_iter()
        .map(TypeReference::new)
        .collect())
}

fn read_words(view: &dyn MemoryView, start: Address, count: usize) -> MemoryResult<Vec<u64>> {
    let word = view.word_size() as u64;
    (0..count as u64)
        .map(|i| view.read_word(start.add(i * word)))
        .collect()
}
