//! Windows API layer for process memory access
//!
//! Provides safe wrappers around Windows API functions for process
//! and memory operations. All unsafe FFI calls are contained within
//! this module with proper error handling and validation.

pub mod bindings;
pub mod types;
pub mod utils;

pub use bindings::toolhelp::{snapshot_modules, snapshot_processes};
pub use types::Handle;
pub use utils::{ErrorCode, WinError};

use crate::core::types::{MemoryError, MemoryResult, ProcessId};
use crate::process::ProcessAccess;
use bindings::kernel32;

/// An open Win32 process handle
pub struct OsProcess {
    handle: Handle,
    pid: ProcessId,
}

impl OsProcess {
    /// Open a process with specified access rights
    pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        let handle = kernel32::open_process(pid, access.bits())?;
        Ok(OsProcess { handle, pid })
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// True while `GetExitCodeProcess` reports `STILL_ACTIVE`
    pub fn is_running(&self) -> bool {
        matches!(
            unsafe { kernel32::get_exit_code_process(self.handle.raw()) },
            Ok(kernel32::STILL_ACTIVE)
        )
    }

    /// Read memory from the process
    pub fn read(&self, address: usize, buffer: &mut [u8]) -> MemoryResult<()> {
        if self.handle.is_null() {
            return Err(MemoryError::InvalidHandle("process handle is null".to_string()));
        }
        unsafe { kernel32::read_process_memory(self.handle.raw(), address, buffer) }
    }

    /// Write memory to the process
    pub fn write(&self, address: usize, data: &[u8]) -> MemoryResult<()> {
        if self.handle.is_null() {
            return Err(MemoryError::InvalidHandle("process handle is null".to_string()));
        }
        unsafe { kernel32::write_process_memory(self.handle.raw(), address, data) }
    }

    /// Releases the OS handle
    pub fn close(self) -> MemoryResult<()> {
        self.handle.close()
    }
}

/// Module names on Windows are case-insensitive
pub fn module_name_matches(module: &str, wanted: &str) -> bool {
    module.eq_ignore_ascii_case(wanted)
}
