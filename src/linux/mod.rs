//! Linux procfs layer for process memory access

mod mem;
pub mod procfs;

pub use mem::OsProcess;
pub use procfs::{snapshot_modules, snapshot_processes};

/// Module names on Linux are case-sensitive file names
pub fn module_name_matches(module: &str, wanted: &str) -> bool {
    module == wanted
}
