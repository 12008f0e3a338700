//! In-process copy of a memory region

use super::pattern::Pattern;
use super::scanner::{scan_buffer, ScanOptions};
use super::MemoryAccess;
use crate::core::types::{Address, MemoryError, MemoryRegion, MemoryResult};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use tracing::debug;

/// A region's bytes copied into this process.
///
/// Implements [`MemoryAccess`] over the copy, so the reader, writer and
/// scanner work on it exactly as on a live process.
#[derive(Debug)]
pub struct MemorySnapshot {
    base: Address,
    bytes: RwLock<Vec<u8>>,
}

impl MemorySnapshot {
    /// Wraps `bytes` as if they were mapped at `base`
    pub fn new(base: Address, mut bytes: Vec<u8>) -> Self {
        bytes.truncate(usize::MAX - base.as_usize());
        MemorySnapshot {
            base,
            bytes: RwLock::new(bytes),
        }
    }

    /// Copies `region` out of `memory` in a single read
    pub fn capture<M: MemoryAccess + ?Sized>(memory: &M, region: MemoryRegion) -> MemoryResult<Self> {
        let bytes = memory.read_bytes(region.base(), region.size())?;
        debug!("Captured {} bytes at {}", bytes.len(), region.base());
        Ok(MemorySnapshot::new(region.base(), bytes))
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The address range covered by the copy
    pub fn region(&self) -> MemoryRegion {
        MemoryRegion::new(self.base, self.len())
    }

    /// Copy of the current contents
    pub fn to_vec(&self) -> Vec<u8> {
        self.read_guard().clone()
    }

    /// Runs `f` over the contents without copying them
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.read_guard())
    }

    /// First match of `pattern` in the copy, on the rayon pool for large copies
    pub fn scan(&self, pattern: &Pattern, options: &ScanOptions) -> MemoryResult<Option<Address>> {
        self.with_bytes(|bytes| scan_buffer(self.base, bytes, pattern, options))
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        self.bytes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn region_of(&self, len: usize) -> MemoryRegion {
        MemoryRegion::new(self.base, len)
    }

    fn offset_of(&self, address: Address, len: usize, available: usize) -> Option<usize> {
        let offset = address.offset_from(self.base)?;
        (offset <= available && len <= available - offset).then_some(offset)
    }
}

impl MemoryAccess for MemorySnapshot {
    fn read_into(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        let bytes = self.read_guard();
        let offset = self.offset_of(address, buffer.len(), bytes.len()).ok_or_else(|| {
            MemoryError::read_failed(
                address,
                format!("{} bytes outside snapshot {}", buffer.len(), self.region_of(bytes.len())),
            )
        })?;
        buffer.copy_from_slice(&bytes[offset..offset + buffer.len()]);
        Ok(())
    }

    fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        let mut bytes = self.bytes.write().unwrap_or_else(PoisonError::into_inner);
        let offset = self.offset_of(address, data.len(), bytes.len()).ok_or_else(|| {
            MemoryError::write_failed(
                address,
                format!("{} bytes outside snapshot {}", data.len(), self.region_of(bytes.len())),
            )
        })?;
        bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }
}
