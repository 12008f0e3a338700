//! Access restricted to a known region

use super::MemoryAccess;
use crate::core::types::{Address, MemoryError, MemoryRegion, MemoryResult};

/// Rejects any access not entirely inside `region` before it reaches `inner`
#[derive(Debug, Clone)]
pub struct BoundedMemory<M> {
    inner: M,
    region: MemoryRegion,
}

impl<M: MemoryAccess> BoundedMemory<M> {
    pub fn new(inner: M, region: MemoryRegion) -> Self {
        BoundedMemory { inner, region }
    }

    pub fn region(&self) -> MemoryRegion {
        self.region
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: MemoryAccess> MemoryAccess for BoundedMemory<M> {
    fn read_into(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        if !self.region.contains_span(address, buffer.len()) {
            return Err(MemoryError::read_failed(
                address,
                format!("{} bytes fall outside {}", buffer.len(), self.region),
            ));
        }
        self.inner.read_into(address, buffer)
    }

    fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        if !self.region.contains_span(address, data.len()) {
            return Err(MemoryError::write_failed(
                address,
                format!("{} bytes fall outside {}", data.len(), self.region),
            ));
        }
        self.inner.write_bytes(address, data)
    }
}
