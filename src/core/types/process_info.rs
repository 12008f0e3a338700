//! Process and module snapshot types

use super::error::{MemoryError, MemoryResult};
use super::region::MemoryRegion;
use super::{Address, ProcessId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Snapshot of a running process taken at enumeration time.
///
/// The process may have exited by the time the snapshot is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: ProcessId,
    pub name: String,
    pub parent_pid: ProcessId,
    pub thread_count: u32,
    pub base_priority: i32,
}

impl ProcessInfo {
    /// Creates a new ProcessInfo with minimal information
    pub fn new(pid: ProcessId, name: impl Into<String>) -> Self {
        ProcessInfo {
            pid,
            name: name.into(),
            parent_pid: 0,
            thread_count: 0,
            base_priority: 0,
        }
    }

    /// Exact comparison against the executable name
    pub fn name_matches(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Snapshot of a module mapped into a process.
///
/// Re-enumerated on every lookup; modules load and unload between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,
    pub path: PathBuf,
    pub base_address: Address,
    pub size: usize,
    pub owning_pid: ProcessId,
}

impl ModuleInfo {
    /// Creates a new ModuleInfo
    pub fn new(name: impl Into<String>, base_address: Address, size: usize, owning_pid: ProcessId) -> Self {
        ModuleInfo {
            name: name.into(),
            path: PathBuf::new(),
            base_address,
            size,
            owning_pid,
        }
    }

    /// Sets the on-disk path of the image
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// The half-open address range `[base, base + size)` of the image
    pub fn region(&self) -> MemoryRegion {
        MemoryRegion::new(self.base_address, self.size)
    }

    /// Checks if an address is within this module
    pub fn contains_address(&self, address: Address) -> bool {
        self.region().contains(address)
    }
}

/// Selects the process to open: an executable name or a process id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessTarget {
    Pid(ProcessId),
    Name(String),
}

impl ProcessTarget {
    /// Rejects selectors that can never resolve
    pub fn validate(&self) -> MemoryResult<()> {
        match self {
            ProcessTarget::Pid(0) => Err(MemoryError::InvalidArgument(
                "process id must be a positive integer".to_string(),
            )),
            ProcessTarget::Name(name) if name.trim().is_empty() => Err(
                MemoryError::InvalidArgument("process name must not be empty".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl From<ProcessId> for ProcessTarget {
    fn from(pid: ProcessId) -> Self {
        ProcessTarget::Pid(pid)
    }
}

impl From<&str> for ProcessTarget {
    fn from(name: &str) -> Self {
        ProcessTarget::Name(name.to_string())
    }
}

impl From<String> for ProcessTarget {
    fn from(name: String) -> Self {
        ProcessTarget::Name(name)
    }
}

impl fmt::Display for ProcessTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessTarget::Pid(pid) => write!(f, "PID {}", pid),
            ProcessTarget::Name(name) => f.write_str(name),
        }
    }
}
