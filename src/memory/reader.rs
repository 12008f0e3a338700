//! Typed reads from a [`MemoryAccess`] implementation

use super::MemoryAccess;
use crate::core::types::{Address, MemoryError, MemoryResult, MemoryValue, Primitive, ValueType};
use tracing::trace;

/// Upper bound on the bytes scanned for a string terminator
pub const MAX_STRING_LENGTH: usize = 1_000_000;

/// String reads never cross a page in a single request
const PAGE_SIZE: usize = 4096;

/// Read a typed value; strings are bounded by [`MAX_STRING_LENGTH`]
pub fn read_value<M: MemoryAccess + ?Sized>(
    memory: &M,
    address: Address,
    value_type: ValueType,
) -> MemoryResult<MemoryValue> {
    match value_type.size() {
        Some(size) => {
            let bytes = memory.read_bytes(address, size)?;
            MemoryValue::from_bytes(&bytes, value_type)
        }
        None => read_string(memory, address, MAX_STRING_LENGTH).map(MemoryValue::String),
    }
}

/// Read a fixed-width scalar
pub fn read_primitive<T: Primitive, M: MemoryAccess + ?Sized>(
    memory: &M,
    address: Address,
) -> MemoryResult<T> {
    let bytes = memory.read_bytes(address, T::SIZE)?;
    T::from_le_slice(&bytes)
}

/// Bytes from `address` up to, not including, the first zero byte.
///
/// At most `limit` bytes are examined; if none of them is zero the read fails
/// with `StringTooLong` and nothing is returned. Bytes are requested a page at
/// a time; when such a request fails the page is retried byte by byte so the
/// result is the same as reading every byte individually.
pub fn read_c_bytes<M: MemoryAccess + ?Sized>(
    memory: &M,
    address: Address,
    limit: usize,
) -> MemoryResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut chunk = [0u8; PAGE_SIZE];
    let mut cursor = address;

    while out.len() < limit {
        let page_left = PAGE_SIZE - cursor.as_usize() % PAGE_SIZE;
        let want = page_left.min(limit - out.len());
        let window = &mut chunk[..want];

        match memory.read_into(cursor, window) {
            Ok(()) => {
                if let Some(end) = window.iter().position(|&b| b == 0) {
                    out.extend_from_slice(&window[..end]);
                    return Ok(out);
                }
                out.extend_from_slice(window);
            }
            Err(err) => {
                trace!("Page read at {} failed ({}), falling back to single bytes", cursor, err);
                for i in 0..want {
                    let mut byte = [0u8; 1];
                    memory.read_into(cursor.wrapping_add(i), &mut byte)?;
                    if byte[0] == 0 {
                        return Ok(out);
                    }
                    out.push(byte[0]);
                }
            }
        }

        cursor = cursor.wrapping_add(want);
    }

    Err(MemoryError::string_too_long(address, limit))
}

/// Read a null-terminated UTF-8 string
pub fn read_string<M: MemoryAccess + ?Sized>(
    memory: &M,
    address: Address,
    limit: usize,
) -> MemoryResult<String> {
    let bytes = read_c_bytes(memory, address, limit)?;
    Ok(String::from_utf8(bytes)?)
}
