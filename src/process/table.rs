//! Integer handle ids for hosts that cannot hold a `ProcessHandle` directly

use super::handle::{open_process, ProcessHandle};
use crate::core::types::{MemoryError, MemoryResult, ProcessTarget};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Platform-width id of an entry in a [`HandleTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(pub usize);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Open process handles keyed by id.
///
/// Ids are never reused, so a stale id always fails with `InvalidHandle`
/// instead of reaching a different process.
pub struct HandleTable {
    handles: Mutex<HashMap<HandleId, Arc<ProcessHandle>>>,
    next_id: AtomicUsize,
}

impl HandleTable {
    pub fn new() -> Self {
        HandleTable {
            handles: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HandleId, Arc<ProcessHandle>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens `target` and registers the handle
    pub fn open(&self, target: impl Into<ProcessTarget>) -> MemoryResult<HandleId> {
        let handle = open_process(target)?;
        Ok(self.insert(handle))
    }

    /// Registers an already open handle
    pub fn insert(&self, handle: ProcessHandle) -> HandleId {
        let id = HandleId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!("Registered {} as handle {}", handle, id);
        self.lock().insert(id, Arc::new(handle));
        id
    }

    /// Looks up an open handle
    pub fn get(&self, id: HandleId) -> MemoryResult<Arc<ProcessHandle>> {
        self.lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| MemoryError::InvalidHandle(format!("handle {} is not open", id)))
    }

    /// Removes and closes a handle; closing the same id twice is an error.
    ///
    /// If another thread still holds the handle from [`HandleTable::get`],
    /// the OS handle is released when that last reference drops.
    pub fn close(&self, id: HandleId) -> MemoryResult<()> {
        let handle = self
            .lock()
            .remove(&id)
            .ok_or_else(|| MemoryError::InvalidHandle(format!("handle {} is not open", id)))?;

        match Arc::try_unwrap(handle) {
            Ok(handle) => handle.close(),
            Err(_) => {
                debug!("Handle {} still borrowed, deferring release", id);
                Ok(())
            }
        }
    }

    /// Closes every handle, reporting the first failure
    pub fn close_all(&self) -> MemoryResult<()> {
        let drained: Vec<(HandleId, Arc<ProcessHandle>)> = self.lock().drain().collect();
        let mut first_error = None;

        for (_, handle) in drained {
            if let Ok(handle) = Arc::try_unwrap(handle) {
                if let Err(err) = handle.close() {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn is_open(&self, id: HandleId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}
