//! Process enumeration and target resolution

use crate::core::types::{MemoryError, MemoryResult, ProcessId, ProcessInfo, ProcessTarget};
use crate::os;
use tracing::debug;

/// Snapshot of every process visible to the caller.
///
/// Either the whole list or an error; never a partial list.
pub fn list_processes() -> MemoryResult<Vec<ProcessInfo>> {
    let processes = os::snapshot_processes()?;
    debug!("Enumerated {} processes", processes.len());
    Ok(processes)
}

/// First process whose executable name equals `name` exactly
pub fn find_process_by_name(name: &str) -> MemoryResult<Option<ProcessInfo>> {
    Ok(list_processes()?
        .into_iter()
        .find(|p| p.name_matches(name)))
}

/// Get process by PID
pub fn get_process_by_pid(pid: ProcessId) -> MemoryResult<Option<ProcessInfo>> {
    Ok(list_processes()?.into_iter().find(|p| p.pid == pid))
}

/// Resolves a selector to the snapshot of the process it names
pub fn resolve_target(target: &ProcessTarget) -> MemoryResult<ProcessInfo> {
    target.validate()?;

    let found = match target {
        ProcessTarget::Pid(pid) => get_process_by_pid(*pid)?,
        ProcessTarget::Name(name) => find_process_by_name(name)?,
    };

    found.ok_or_else(|| MemoryError::ProcessNotFound(target.to_string()))
}
