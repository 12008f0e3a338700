//! Module enumeration and lookup

use super::handle::ProcessHandle;
use crate::config::ModuleConfig;
use crate::core::types::{MemoryError, MemoryResult, ModuleInfo};
use crate::os;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Ceiling for [`find_module`]'s re-enumeration loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
    timeout: Option<Duration>,
}

impl RetryPolicy {
    /// At most `max_attempts` enumerations, `interval` apart
    pub fn new(max_attempts: u32, interval: Duration) -> MemoryResult<Self> {
        if max_attempts == 0 {
            return Err(MemoryError::InvalidArgument(
                "retry policy needs at least one attempt".to_string(),
            ));
        }
        Ok(RetryPolicy {
            max_attempts,
            interval,
            timeout: None,
        })
    }

    /// A single enumeration, no waiting
    pub fn once() -> Self {
        RetryPolicy {
            max_attempts: 1,
            interval: Duration::ZERO,
            timeout: None,
        }
    }

    /// Also stop once `timeout` has elapsed since the first attempt
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        match self.timeout {
            Some(timeout) => started.elapsed() + self.interval > timeout,
            None => false,
        }
    }
}

impl From<&ModuleConfig> for RetryPolicy {
    fn from(config: &ModuleConfig) -> Self {
        let policy = RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            interval: Duration::from_millis(config.retry_interval_ms),
            timeout: None,
        };
        match config.timeout_ms {
            0 => policy,
            ms => policy.with_timeout(Duration::from_millis(ms)),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&ModuleConfig::default())
    }
}

/// Enumerates modules loaded in an open process.
///
/// Nothing is cached: every call takes a fresh snapshot.
pub struct ModuleEnumerator<'a> {
    handle: &'a ProcessHandle,
}

impl<'a> ModuleEnumerator<'a> {
    /// Create a new module enumerator for a process
    pub fn new(handle: &'a ProcessHandle) -> Self {
        ModuleEnumerator { handle }
    }

    /// Enumerate all modules in the process, main image first
    pub fn enumerate(&self) -> MemoryResult<Vec<ModuleInfo>> {
        let pid = self.handle.pid();
        if !self.handle.is_running() {
            return Err(MemoryError::ProcessExited(pid));
        }

        let modules = os::snapshot_modules(pid)?;
        debug!("Enumerated {} modules in PID {}", modules.len(), pid);
        Ok(modules)
    }

    /// One enumeration, first module whose name matches
    pub fn find_by_name(&self, name: &str) -> MemoryResult<Option<ModuleInfo>> {
        Ok(self
            .enumerate()?
            .into_iter()
            .find(|m| os::module_name_matches(&m.name, name)))
    }

    /// Re-enumerates until `name` shows up or the policy is exhausted.
    ///
    /// Transient `EnumerationFailed` errors are retried; any other error ends
    /// the lookup immediately.
    pub fn find_with_retry(&self, name: &str, policy: &RetryPolicy) -> MemoryResult<ModuleInfo> {
        if name.is_empty() {
            return Err(MemoryError::InvalidArgument(
                "module name must not be empty".to_string(),
            ));
        }

        let started = Instant::now();
        let mut saw_listing = false;
        let mut last_error = None;

        for attempt in 1..=policy.max_attempts {
            match self.find_by_name(name) {
                Ok(Some(module)) => {
                    debug!(
                        "Found module {} at {} after {} attempt(s)",
                        module.name, module.base_address, attempt
                    );
                    return Ok(module);
                }
                Ok(None) => saw_listing = true,
                Err(err @ MemoryError::EnumerationFailed(_)) => {
                    debug!("Module enumeration attempt {} failed: {}", attempt, err);
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }

            if attempt == policy.max_attempts || policy.deadline_passed(started) {
                break;
            }
            thread::sleep(policy.interval);
        }

        match last_error {
            Some(err) if !saw_listing => Err(err),
            _ => Err(MemoryError::ModuleNotFound(name.to_string())),
        }
    }

    /// The executable image, the first module of the snapshot
    pub fn main_module(&self) -> MemoryResult<ModuleInfo> {
        self.enumerate()?.into_iter().next().ok_or_else(|| {
            MemoryError::ModuleNotFound(format!("main module of PID {}", self.handle.pid()))
        })
    }
}

/// Modules currently mapped into the process
pub fn list_modules(handle: &ProcessHandle) -> MemoryResult<Vec<ModuleInfo>> {
    ModuleEnumerator::new(handle).enumerate()
}

/// Looks up a module by name, re-enumerating within `policy`
pub fn find_module(handle: &ProcessHandle, name: &str, policy: &RetryPolicy) -> MemoryResult<ModuleInfo> {
    ModuleEnumerator::new(handle).find_with_retry(name, policy)
}

/// Base module of the process
pub fn main_module(handle: &ProcessHandle) -> MemoryResult<ModuleInfo> {
    ModuleEnumerator::new(handle).main_module()
}
