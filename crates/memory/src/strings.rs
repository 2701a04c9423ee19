//! Null-terminated strings and packed string tables

use crate::view::MemoryView;
use crate::MemoryResult;
use typemeta_core::Address;

/// Read one null-terminated string at `address`
pub fn read_string(view: &dyn MemoryView, address: Address) -> MemoryResult<String> {
    view.read_cstring(address)
}

/// Read `count` null-terminated strings packed back to back from `start`.
///
/// Entry `i` of the result is the `i`-th string in the table.
pub fn read_string_table(
    view: &dyn MemoryView,
    start: Address,
    count: usize,
) -> MemoryResult<Vec<String>> {
    let mut strings = Vec::with_capacity(count);
    let mut cursor = start;
    for _ in 0..count {
        let bytes = view.read_cstring_bytes(cursor)?;
        strings.push(String::from_utf8_lossy(bytes).into_owned());
        cursor = cursor.add(bytes.len() as u64 + 1);
    }
    Ok(strings)
}
