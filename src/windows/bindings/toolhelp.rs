//! ToolHelp32 snapshots of processes and modules

use crate::core::types::{Address, MemoryError, MemoryResult, ModuleInfo, ProcessId, ProcessInfo};
use crate::windows::types::Handle;
use crate::windows::utils::{wide_to_path, wide_to_string, ErrorCode, WinError};
use std::mem;
use tracing::trace;
use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Module32FirstW, Module32NextW, Process32FirstW, Process32NextW,
    MODULEENTRY32W, PROCESSENTRY32W, TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32, TH32CS_SNAPPROCESS,
};

/// `ERROR_BAD_LENGTH` means the module list changed under the snapshot
const BAD_LENGTH_RETRIES: u32 = 8;

fn create_snapshot(flags: DWORD, pid: ProcessId) -> Result<Handle, WinError> {
    let handle = Handle::new(unsafe { CreateToolhelp32Snapshot(flags, pid) });
    if handle.is_null() {
        Err(WinError::new("CreateToolhelp32Snapshot"))
    } else {
        Ok(handle)
    }
}

/// Iterator over a process snapshot
pub struct ProcessSnapshot {
    snapshot: Handle,
    first_called: bool,
}

impl ProcessSnapshot {
    /// Captures every process visible to the caller
    pub fn new() -> MemoryResult<Self> {
        let snapshot = create_snapshot(TH32CS_SNAPPROCESS, 0)
            .map_err(WinError::into_enumeration_error)?;
        Ok(ProcessSnapshot {
            snapshot,
            first_called: false,
        })
    }
}

impl Iterator for ProcessSnapshot {
    type Item = ProcessInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let mut entry: PROCESSENTRY32W = unsafe { mem::zeroed() };
        entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as DWORD;

        let success = unsafe {
            if !self.first_called {
                self.first_called = true;
                Process32FirstW(self.snapshot.raw(), &mut entry)
            } else {
                Process32NextW(self.snapshot.raw(), &mut entry)
            }
        };

        if success == FALSE {
            return None;
        }

        Some(ProcessInfo {
            pid: entry.th32ProcessID,
            name: wide_to_string(&entry.szExeFile),
            parent_pid: entry.th32ParentProcessID,
            thread_count: entry.cntThreads,
            base_priority: entry.pcPriClassBase,
        })
    }
}

/// Iterator over a module snapshot of one process
pub struct ModuleSnapshot {
    snapshot: Handle,
    pid: ProcessId,
    first_called: bool,
}

impl ModuleSnapshot {
    /// Captures the modules of `pid`, retrying while the loader list is in flux
    pub fn new(pid: ProcessId) -> MemoryResult<Self> {
        let flags = TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32;
        let mut attempt = 0;
        loop {
            match create_snapshot(flags, pid) {
                Ok(snapshot) => {
                    return Ok(ModuleSnapshot {
                        snapshot,
                        pid,
                        first_called: false,
                    })
                }
                Err(err) if err.code() == ErrorCode::BadLength && attempt < BAD_LENGTH_RETRIES => {
                    attempt += 1;
                    trace!("Module snapshot of PID {} hit ERROR_BAD_LENGTH, retrying", pid);
                }
                Err(err) if err.code() == ErrorCode::AccessDenied => {
                    return Err(MemoryError::access_denied(pid, err.to_string()))
                }
                Err(err) => return Err(err.into_enumeration_error()),
            }
        }
    }
}

impl Iterator for ModuleSnapshot {
    type Item = ModuleInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let mut entry: MODULEENTRY32W = unsafe { mem::zeroed() };
        entry.dwSize = mem::size_of::<MODULEENTRY32W>() as DWORD;

        let success = unsafe {
            if !self.first_called {
                self.first_called = true;
                Module32FirstW(self.snapshot.raw(), &mut entry)
            } else {
                Module32NextW(self.snapshot.raw(), &mut entry)
            }
        };

        if success == FALSE {
            return None;
        }

        let module = ModuleInfo::new(
            wide_to_string(&entry.szModule),
            Address::new(entry.modBaseAddr as usize),
            entry.modBaseSize as usize,
            self.pid,
        )
        .with_path(wide_to_path(&entry.szExePath));
        Some(module)
    }
}

/// Snapshot of all processes, in enumeration order
pub fn snapshot_processes() -> MemoryResult<Vec<ProcessInfo>> {
    Ok(ProcessSnapshot::new()?.collect())
}

/// Snapshot of the modules of `pid`, main image first
pub fn snapshot_modules(pid: ProcessId) -> MemoryResult<Vec<ModuleInfo>> {
    Ok(ModuleSnapshot::new(pid)?.collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_process_snapshot_contains_self() {
        let processes = snapshot_processes().unwrap();
        let own = std::process::id();
        assert!(processes.iter().any(|p| p.pid == own));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_module_snapshot_of_self() {
        let modules = snapshot_modules(std::process::id()).unwrap();
        assert!(!modules.is_empty());
        assert!(modules
            .iter()
            .any(|m| m.name.eq_ignore_ascii_case("kernel32.dll")));
        assert!(modules.iter().all(|m| m.size > 0));
    }
}
