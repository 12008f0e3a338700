//! Typed writes through a [`MemoryAccess`] implementation

use super::MemoryAccess;
use crate::core::types::{Address, MemoryResult, MemoryValue, Primitive, ValueType};
use tracing::trace;

/// Writes a value in its own layout as one request.
///
/// Strings are written as their raw bytes with no terminator appended.
pub fn write_value<M: MemoryAccess + ?Sized>(
    memory: &M,
    address: Address,
    value: &MemoryValue,
) -> MemoryResult<()> {
    let bytes = value.to_bytes();
    if bytes.is_empty() {
        return Ok(());
    }
    trace!("Writing {} bytes of {} at {}", bytes.len(), value.value_type(), address);
    memory.write_bytes(address, &bytes)
}

/// Converts `value` to `value_type`'s layout, then writes it
pub fn write_as<M: MemoryAccess + ?Sized>(
    memory: &M,
    address: Address,
    value_type: ValueType,
    value: MemoryValue,
) -> MemoryResult<()> {
    let value = value.coerce(value_type)?;
    write_value(memory, address, &value)
}

/// Write a fixed-width scalar
pub fn write_primitive<T: Primitive, M: MemoryAccess + ?Sized>(
    memory: &M,
    address: Address,
    value: T,
) -> MemoryResult<()> {
    memory.write_bytes(address, &value.to_le_vec())
}
