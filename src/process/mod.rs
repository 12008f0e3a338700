//! Process discovery, handles and modules
//!
//! This module provides process enumeration, target resolution, process
//! handle management, and module lookup for an open process.

pub mod enumerator;
pub mod handle;
pub mod modules;
pub mod table;

pub use enumerator::{find_process_by_name, get_process_by_pid, list_processes, resolve_target};
pub use handle::{close_process, open_process, ProcessAccess, ProcessHandle};
pub use modules::{find_module, list_modules, main_module, ModuleEnumerator, RetryPolicy};
pub use table::{HandleId, HandleTable};
