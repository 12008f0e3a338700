//! Core type definitions for procmem
//!
//! Addresses, typed values, process and module snapshots, and the error type
//! shared by every component.

mod address;
mod error;
mod process_info;
mod region;
mod value;

pub use address::Address;
pub use error::{ErrorKind, MemoryError, MemoryResult};
pub use process_info::{ModuleInfo, ProcessInfo, ProcessTarget};
pub use region::MemoryRegion;
pub use value::{MemoryValue, Primitive, ValueType, Vector3, Vector4, BOOL_SIZE};

// Common type aliases
pub type ProcessId = u32;
pub type ThreadId = u32;
