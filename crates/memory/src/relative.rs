//! Relative pointers: a signed 32-bit offset stored next to its own address

use crate::view::MemoryView;
use crate::MemoryResult;
use typemeta_core::Address;

/// Size of an encoded relative offset
pub const RELATIVE_OFFSET_SIZE: i64 = 4;

/// Target of the offset field at `field` whose stored value is `value`.
///
/// The target is measured from the end of the field, so a stored zero points
/// at the next byte rather than meaning "null".
pub fn resolve(field: Address, value: i32) -> Address {
    field.offset(RELATIVE_OFFSET_SIZE + value as i64)
}

/// Read the offset stored at `field` and resolve it
pub fn read_relative(view: &dyn MemoryView, field: Address) -> MemoryResult<Address> {
    let value = view.read_i32(field)?;
    Ok(resolve(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferView;
    use typemeta_core::Architecture;

    #[test]
    fn test_zero_is_next_byte() {
        assert_eq!(resolve(Address::new(0x2000), 0), Address::new(0x2004));
    }

    #[test]
    fn test_signed_offsets() {
        assert_eq!(resolve(Address::new(0x2000), 0x10), Address::new(0x2014));
        assert_eq!(resolve(Address::new(0x2000), -0x14), Address::new(0x1FF0));
    }

    #[test]
    fn test_read_relative() {
        let mut data = vec![0u8; 8];
        data[4..8].copy_from_slice(&(-8i32).to_ne_bytes());
        let view = BufferView::new(data, Address::new(0x100), Architecture::X64);
        assert_eq!(read_relative(&view, Address::new(0x104)).unwrap(), Address::new(0x100));
        assert_eq!(read_relative(&view, Address::new(0x100)).unwrap(), Address::new(0x104));
        assert!(read_relative(&view, Address::new(0x106)).is_err());
    }
}
