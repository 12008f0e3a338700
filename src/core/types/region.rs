//! Half-open address ranges

use super::error::{MemoryError, MemoryResult};
use super::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The interval `[base, base + size)` inside a target process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryRegion {
    base: Address,
    size: usize,
}

impl MemoryRegion {
    /// Creates a region; a region reaching past the end of the address space is clamped
    pub fn new(base: Address, size: usize) -> Self {
        let size = size.min(usize::MAX - base.as_usize());
        MemoryRegion { base, size }
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// First address past the region
    pub fn end(&self) -> Address {
        Address::new(self.base.as_usize() + self.size)
    }

    /// Checks if an address is within this region
    pub fn contains(&self, address: Address) -> bool {
        address >= self.base && address < self.end()
    }

    /// Checks if `[address, address + len)` lies entirely inside the region
    pub fn contains_span(&self, address: Address, len: usize) -> bool {
        match address.offset_from(self.base) {
            Some(offset) => offset <= self.size && len <= self.size - offset,
            None => false,
        }
    }

    /// Fails with `InvalidArgument` unless the span is inside the region
    pub fn check_span(&self, address: Address, len: usize) -> MemoryResult<()> {
        if self.contains_span(address, len) {
            Ok(())
        } else {
            Err(MemoryError::InvalidArgument(format!(
                "{} bytes at {} fall outside {}",
                len, address, self
            )))
        }
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.base, self.end())
    }
}
