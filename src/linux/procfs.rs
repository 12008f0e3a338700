//! Parsers for `/proc/<pid>/stat` and `/proc/<pid>/maps`

use crate::core::types::{Address, MemoryError, MemoryResult, ModuleInfo, ProcessId, ProcessInfo};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

const PROC_ROOT: &str = "/proc";
const DELETED_SUFFIX: &str = " (deleted)";

/// Fields of `/proc/<pid>/stat` the engine uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcStat {
    pub pid: ProcessId,
    pub comm: String,
    pub state: char,
    pub ppid: ProcessId,
    pub priority: i32,
    pub num_threads: u32,
    pub starttime: u64,
}

impl ProcStat {
    /// Zombie and dead tasks have no address space left to touch
    pub fn is_defunct(&self) -> bool {
        matches!(self.state, 'Z' | 'X' | 'x')
    }
}

/// Parses one stat line; `comm` may itself contain spaces and parentheses
pub fn parse_stat(contents: &str) -> Option<ProcStat> {
    let open = contents.find('(')?;
    let close = contents.rfind(')')?;
    if close < open {
        return None;
    }

    let pid = contents[..open].trim().parse().ok()?;
    let comm = contents[open + 1..close].to_string();
    let rest: Vec<&str> = contents[close + 1..].split_whitespace().collect();

    Some(ProcStat {
        pid,
        comm,
        state: rest.first()?.chars().next()?,
        ppid: rest.get(1)?.parse().ok()?,
        priority: rest.get(15)?.parse().ok()?,
        num_threads: rest.get(17)?.parse().ok()?,
        starttime: rest.get(19)?.parse().ok()?,
    })
}

fn proc_path(pid: ProcessId, entry: &str) -> PathBuf {
    Path::new(PROC_ROOT).join(pid.to_string()).join(entry)
}

/// Reads and parses `/proc/<pid>/stat`
pub fn read_stat(pid: ProcessId) -> MemoryResult<ProcStat> {
    let contents = fs::read_to_string(proc_path(pid, "stat")).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => MemoryError::ProcessNotFound(format!("PID {}", pid)),
        _ => MemoryError::EnumerationFailed(format!("/proc/{}/stat: {}", pid, err)),
    })?;
    parse_stat(&contents)
        .ok_or_else(|| MemoryError::EnumerationFailed(format!("malformed /proc/{}/stat", pid)))
}

fn strip_deleted(path: &str) -> &str {
    path.strip_suffix(DELETED_SUFFIX).unwrap_or(path)
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Executable file name, falling back to `comm` for kernel threads and
/// processes whose `exe` link is not readable
fn process_name(pid: ProcessId, comm: &str) -> String {
    match fs::read_link(proc_path(pid, "exe")) {
        Ok(target) => file_name(strip_deleted(&target.to_string_lossy())),
        Err(_) => comm.to_string(),
    }
}

/// Snapshot of every process under `/proc`, in directory order.
///
/// Processes that exit during the walk are skipped.
pub fn snapshot_processes() -> MemoryResult<Vec<ProcessInfo>> {
    let entries = fs::read_dir(PROC_ROOT)
        .map_err(|err| MemoryError::EnumerationFailed(format!("{}: {}", PROC_ROOT, err)))?;

    let mut processes = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|err| MemoryError::EnumerationFailed(format!("{}: {}", PROC_ROOT, err)))?;
        let Some(pid) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<ProcessId>().ok())
        else {
            continue;
        };

        let stat = match read_stat(pid) {
            Ok(stat) => stat,
            Err(err) => {
                trace!("Skipping PID {}: {}", pid, err);
                continue;
            }
        };

        processes.push(ProcessInfo {
            pid,
            name: process_name(pid, &stat.comm),
            parent_pid: stat.ppid,
            thread_count: stat.num_threads,
            base_priority: stat.priority,
        });
    }

    Ok(processes)
}

/// One line of `/proc/<pid>/maps`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub start: usize,
    pub end: usize,
    pub perms: String,
    pub inode: u64,
    pub path: Option<String>,
}

/// Parses one maps line; returns `None` for lines that are not mappings
pub fn parse_maps_line(line: &str) -> Option<MapEntry> {
    let mut fields = line.splitn(6, ' ');
    let range = fields.next()?;
    let perms = fields.next()?;
    let _offset = fields.next()?;
    let _device = fields.next()?;
    let inode = fields.next()?.parse().ok()?;
    let path = fields
        .next()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(|path| strip_deleted(path).to_string());

    let (start, end) = range.split_once('-')?;
    Some(MapEntry {
        start: usize::from_str_radix(start, 16).ok()?,
        end: usize::from_str_radix(end, 16).ok()?,
        perms: perms.to_string(),
        inode,
        path,
    })
}

/// Groups file-backed mappings into modules, in first-appearance order.
///
/// Base is the lowest start of a path's mappings, size spans to the highest end.
pub fn parse_maps(contents: &str, pid: ProcessId) -> Vec<ModuleInfo> {
    let mut order: Vec<(String, usize, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in contents.lines().filter_map(parse_maps_line) {
        let Some(path) = entry.path else { continue };
        if entry.inode == 0 || !path.starts_with('/') {
            continue;
        }

        match index.get(&path) {
            Some(&slot) => {
                let (_, lo, hi) = &mut order[slot];
                *lo = (*lo).min(entry.start);
                *hi = (*hi).max(entry.end);
            }
            None => {
                index.insert(path.clone(), order.len());
                order.push((path, entry.start, entry.end));
            }
        }
    }

    order
        .into_iter()
        .map(|(path, lo, hi)| {
            ModuleInfo::new(file_name(&path), Address::new(lo), hi - lo, pid).with_path(path)
        })
        .collect()
}

/// Snapshot of the modules mapped into `pid`, main image first
pub fn snapshot_modules(pid: ProcessId) -> MemoryResult<Vec<ModuleInfo>> {
    let contents = fs::read_to_string(proc_path(pid, "maps")).map_err(|err| match err.kind() {
        io::ErrorKind::PermissionDenied => MemoryError::access_denied(pid, err.to_string()),
        _ => MemoryError::EnumerationFailed(format!("/proc/{}/maps: {}", pid, err)),
    })?;
    Ok(parse_maps(&contents, pid))
}
