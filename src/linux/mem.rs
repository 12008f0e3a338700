//! Process memory access through `/proc/<pid>/mem`

use super::procfs::{self, ProcStat};
use crate::core::types::{MemoryError, MemoryResult, ProcessId};
use crate::process::ProcessAccess;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;

/// An open `/proc/<pid>/mem` file bound to one process incarnation
pub struct OsProcess {
    mem: File,
    pid: ProcessId,
    starttime: u64,
}

impl OsProcess {
    /// Opens the memory file read-only or read/write according to `access`
    pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        let stat = procfs::read_stat(pid)?;
        if stat.is_defunct() {
            return Err(MemoryError::ProcessNotFound(format!(
                "PID {} is a zombie",
                pid
            )));
        }

        let path = format!("/proc/{}/mem", pid);
        let mem = OpenOptions::new()
            .read(access.contains(ProcessAccess::VM_READ))
            .write(access.contains(ProcessAccess::VM_WRITE))
            .open(&path)
            .map_err(|err| match err.kind() {
                io::ErrorKind::PermissionDenied => MemoryError::access_denied(pid, err.to_string()),
                io::ErrorKind::NotFound => MemoryError::ProcessNotFound(format!("PID {}", pid)),
                _ => MemoryError::InvalidHandle(format!("{}: {}", path, err)),
            })?;

        Ok(OsProcess {
            mem,
            pid,
            starttime: stat.starttime,
        })
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Same pid, same start time, and not a zombie
    pub fn is_running(&self) -> bool {
        match procfs::read_stat(self.pid) {
            Ok(ProcStat { starttime, .. }) if starttime != self.starttime => false,
            Ok(stat) => !stat.is_defunct(),
            Err(_) => false,
        }
    }

    /// Positional read of exactly `buffer.len()` bytes
    pub fn read(&self, address: usize, buffer: &mut [u8]) -> MemoryResult<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        self.mem
            .read_exact_at(buffer, address as u64)
            .map_err(|err| MemoryError::read_failed(format!("0x{:X}", address), err.to_string()))
    }

    /// Positional write of all of `data`
    pub fn write(&self, address: usize, data: &[u8]) -> MemoryResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.mem
            .write_all_at(data, address as u64)
            .map_err(|err| MemoryError::write_failed(format!("0x{:X}", address), err.to_string()))
    }

    /// Releases the memory file
    pub fn close(self) -> MemoryResult<()> {
        drop(self.mem);
        Ok(())
    }
}
