//! Core module containing fundamental types for procmem

pub mod types;

pub use types::{
    Address, ErrorKind, MemoryError, MemoryRegion, MemoryResult, MemoryValue, ModuleInfo,
    ProcessId, ProcessInfo, ProcessTarget, ValueType,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
compile_error!("procmem only supports Windows and Linux targets");
