//! Open process handles with RAII semantics

use super::enumerator::resolve_target;
use crate::core::types::{Address, MemoryResult, ProcessId, ProcessInfo, ProcessTarget};
use crate::memory::MemoryAccess;
use crate::os::OsProcess;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use tracing::{debug, info};

/// Access rights for process handles (Win32 `PROCESS_*` values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessAccess(u32);

impl ProcessAccess {
    /// Execute operations
    pub const VM_OPERATION: Self = Self(0x0008);
    /// Read memory access
    pub const VM_READ: Self = Self(0x0010);
    /// Write memory access
    pub const VM_WRITE: Self = Self(0x0020);
    /// Query information access
    pub const QUERY_INFORMATION: Self = Self(0x0400);

    /// Query and read
    pub const READ_ONLY: Self = Self(Self::QUERY_INFORMATION.0 | Self::VM_READ.0);

    /// Everything the engine needs: query, read, write and VM operations
    pub const ENGINE: Self = Self(
        Self::QUERY_INFORMATION.0 | Self::VM_READ.0 | Self::VM_WRITE.0 | Self::VM_OPERATION.0,
    );

    /// Get raw value
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// True when every right in `other` is also in `self`
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ProcessAccess {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// An open process: the OS handle plus the snapshot it was resolved from.
///
/// Dropping the handle releases it; [`ProcessHandle::close`] does the same
/// and reports failures.
pub struct ProcessHandle {
    process: OsProcess,
    info: ProcessInfo,
    access: ProcessAccess,
}

impl ProcessHandle {
    /// Resolves `target` and opens it with `access`
    pub fn open(target: &ProcessTarget, access: ProcessAccess) -> MemoryResult<Self> {
        let info = resolve_target(target)?;
        let process = OsProcess::open(info.pid, access)?;
        info!("Opened process {} (PID {})", info.name, info.pid);

        Ok(ProcessHandle {
            process,
            info,
            access,
        })
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.info.pid
    }

    /// Snapshot of the process taken when it was opened
    pub fn info(&self) -> &ProcessInfo {
        &self.info
    }

    /// Get the access rights
    pub fn access(&self) -> ProcessAccess {
        self.access
    }

    /// Whether the process this handle was opened on is still alive
    pub fn is_running(&self) -> bool {
        self.process.is_running()
    }

    /// Reads exactly `buffer.len()` bytes at `address`
    pub fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        self.process.read(address.as_usize(), buffer)
    }

    /// Writes all of `data` at `address`
    pub fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        self.process.write(address.as_usize(), data)
    }

    /// Releases the OS handle
    pub fn close(self) -> MemoryResult<()> {
        let pid = self.info.pid;
        self.process.close()?;
        info!("Closed process handle for PID {}", pid);
        Ok(())
    }
}

impl MemoryAccess for ProcessHandle {
    fn read_into(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        self.read_memory(address, buffer)
    }

    fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        self.write_memory(address, data)
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.info.pid)
            .field("name", &self.info.name)
            .field("access", &format!("0x{:X}", self.access.bits()))
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessHandle(pid={}, name={})", self.info.pid, self.info.name)
    }
}

/// Opens a process by executable name or pid with the engine's access rights
pub fn open_process(target: impl Into<ProcessTarget>) -> MemoryResult<ProcessHandle> {
    let target = target.into();
    debug!("Opening process {}", target);
    ProcessHandle::open(&target, ProcessAccess::ENGINE)
}

/// Releases a handle returned by [`open_process`]
pub fn close_process(handle: ProcessHandle) -> MemoryResult<()> {
    handle.close()
}
