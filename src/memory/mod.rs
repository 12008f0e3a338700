//! Memory operations module for reading, writing and scanning process memory
//!
//! Everything here is written against [`MemoryAccess`], implemented by open
//! process handles, in-process snapshots, and bounds-checking wrappers.

pub mod bounded;
pub mod pattern;
pub mod reader;
pub mod scanner;
pub mod signature;
pub mod snapshot;
pub mod writer;

pub use bounded::BoundedMemory;
pub use pattern::{Pattern, PatternToken};
pub use reader::{read_c_bytes, read_primitive, read_string, read_value, MAX_STRING_LENGTH};
pub use scanner::{
    scan_buffer, scan_slice, scan_slice_parallel, PatternScanner, ScanOptions, ScanStats,
    SearchMode,
};
pub use signature::{find_pattern, resolve_signature, scan_module, SignatureOptions, SignatureType};
pub use snapshot::MemorySnapshot;
pub use writer::{write_as, write_primitive, write_value};

use crate::config::Config;
use crate::core::types::{Address, MemoryRegion, MemoryResult, MemoryValue, Primitive, ValueType};

/// Raw byte access to some address space
pub trait MemoryAccess {
    /// Fills `buffer` from `address`; a partial read is an error
    fn read_into(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()>;

    /// Writes all of `data` at `address`; a partial write is an error
    fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()>;

    /// Reads `len` bytes into a new buffer
    fn read_bytes(&self, address: Address, len: usize) -> MemoryResult<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.read_into(address, &mut buffer)?;
        Ok(buffer)
    }
}

impl<M: MemoryAccess + ?Sized> MemoryAccess for &M {
    fn read_into(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        (**self).read_into(address, buffer)
    }

    fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        (**self).write_bytes(address, data)
    }
}

/// Typed reads, writes and scans over one address space
pub struct MemoryOperations<'a, M: MemoryAccess + ?Sized> {
    memory: &'a M,
    max_string_length: usize,
    scan_options: ScanOptions,
}

impl<'a, M: MemoryAccess + ?Sized> MemoryOperations<'a, M> {
    /// Create new memory operations context with default limits
    pub fn new(memory: &'a M) -> Self {
        MemoryOperations {
            memory,
            max_string_length: MAX_STRING_LENGTH,
            scan_options: ScanOptions::default(),
        }
    }

    /// Takes the string bound and scan tuning from `config`
    pub fn with_config(memory: &'a M, config: &Config) -> Self {
        MemoryOperations {
            memory,
            max_string_length: config.memory.max_string_length.min(MAX_STRING_LENGTH),
            scan_options: ScanOptions::from(&config.scanner),
        }
    }

    /// Read a typed value from memory
    pub fn read(&self, address: Address, value_type: ValueType) -> MemoryResult<MemoryValue> {
        match value_type {
            ValueType::String => {
                read_string(self.memory, address, self.max_string_length).map(MemoryValue::String)
            }
            fixed => read_value(self.memory, address, fixed),
        }
    }

    /// Write a value in its own layout
    pub fn write(&self, address: Address, value: &MemoryValue) -> MemoryResult<()> {
        write_value(self.memory, address, value)
    }

    /// Write a value in the layout selected by `value_type`
    pub fn write_as(
        &self,
        address: Address,
        value_type: ValueType,
        value: MemoryValue,
    ) -> MemoryResult<()> {
        write_as(self.memory, address, value_type, value)
    }

    /// Read a null-terminated string
    pub fn read_string(&self, address: Address) -> MemoryResult<String> {
        read_string(self.memory, address, self.max_string_length)
    }

    pub fn read_primitive<T: Primitive>(&self, address: Address) -> MemoryResult<T> {
        read_primitive(self.memory, address)
    }

    pub fn write_primitive<T: Primitive>(&self, address: Address, value: T) -> MemoryResult<()> {
        write_primitive(self.memory, address, value)
    }

    /// Scanner sharing this context's options
    pub fn scanner(&self) -> PatternScanner<'a, M> {
        PatternScanner::with_options(self.memory, self.scan_options.clone())
    }

    /// First match of `pattern` inside `region`
    pub fn scan(&self, region: MemoryRegion, pattern: &Pattern) -> MemoryResult<Option<Address>> {
        self.scanner().scan(region, pattern)
    }
}
