//! procmem: inspect and modify the memory of other processes
//!
//! Processes are opened through [`process`], their memory is read, written
//! and scanned through [`memory`], and [`runtime`] offers the same calls as
//! futures.

pub mod config;
pub mod core;
pub mod memory;
pub mod process;
pub mod runtime;

#[cfg(windows)]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(windows)]
pub(crate) use crate::windows as os;

#[cfg(target_os = "linux")]
pub(crate) use crate::linux as os;

pub use crate::core::types::{
    Address, ErrorKind, MemoryError, MemoryRegion, MemoryResult, MemoryValue, ModuleInfo,
    ProcessId, ProcessInfo, ProcessTarget, ThreadId, ValueType, Vector3, Vector4,
};
pub use crate::core::{AUTHORS, VERSION};
pub use crate::memory::{
    find_pattern, MemoryAccess, MemoryOperations, MemorySnapshot, Pattern, PatternScanner,
    ScanOptions, SignatureOptions, SignatureType,
};
pub use crate::runtime::AsyncProcess;
pub use crate::process::{
    close_process, find_module, list_modules, list_processes, main_module, open_process,
    HandleId, HandleTable, ProcessAccess, ProcessHandle, RetryPolicy,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(AUTHORS, env!("CARGO_PKG_AUTHORS"));
    }

    #[test]
    fn test_error_kinds_reexport() {
        let err = MemoryError::ProcessNotFound("notepad.exe".to_string());
        assert_eq!(err.kind(), ErrorKind::ProcessNotFound);
        assert!(err.to_string().contains("Process not found"));

        let err = "zz".parse::<Pattern>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_value_reexport() {
        let value = MemoryValue::Dword(42);
        assert_eq!(value.value_type(), ValueType::Dword);
        assert_eq!(value.size(), 4);
        assert_eq!(ValueType::String.size(), None);
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_open_missing_pid() {
        let err = open_process(u32::MAX - 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProcessNotFound);
    }
}
