//! Async facade over the blocking engine
//!
//! Every call runs on tokio's blocking pool; the engine itself stays
//! synchronous.

use crate::config::Config;
use crate::core::types::{
    Address, MemoryError, MemoryRegion, MemoryResult, MemoryValue, ModuleInfo, ProcessInfo,
    ProcessTarget, ValueType,
};
use crate::memory::{self, MemoryOperations, Pattern, ScanOptions, SignatureOptions};
use crate::process::{self, ProcessHandle, RetryPolicy};
use std::sync::Arc;
use tokio::task;
use tracing::debug;

async fn blocking<T, F>(f: F) -> MemoryResult<T>
where
    F: FnOnce() -> MemoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|err| MemoryError::TaskFailed(err.to_string()))?
}

/// Snapshot of running processes
pub async fn list_processes() -> MemoryResult<Vec<ProcessInfo>> {
    blocking(process::list_processes).await
}

/// A process handle shared with the blocking pool
#[derive(Clone)]
pub struct AsyncProcess {
    handle: Arc<ProcessHandle>,
    config: Arc<Config>,
}

impl AsyncProcess {
    /// Opens `target` with default configuration
    pub async fn open(target: impl Into<ProcessTarget>) -> MemoryResult<Self> {
        Self::open_with_config(target, Config::default()).await
    }

    pub async fn open_with_config(
        target: impl Into<ProcessTarget>,
        config: Config,
    ) -> MemoryResult<Self> {
        let target = target.into();
        let handle = blocking(move || process::open_process(target)).await?;
        Ok(AsyncProcess {
            handle: Arc::new(handle),
            config: Arc::new(config),
        })
    }

    /// Wraps an already open handle
    pub fn from_handle(handle: ProcessHandle, config: Config) -> Self {
        AsyncProcess {
            handle: Arc::new(handle),
            config: Arc::new(config),
        }
    }

    pub fn handle(&self) -> &ProcessHandle {
        &self.handle
    }

    pub fn info(&self) -> &ProcessInfo {
        self.handle.info()
    }

    /// Runs `f` against the handle on the blocking pool
    async fn run<T, F>(&self, f: F) -> MemoryResult<T>
    where
        F: FnOnce(&ProcessHandle, &Config) -> MemoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = Arc::clone(&self.handle);
        let config = Arc::clone(&self.config);
        blocking(move || f(&*handle, &*config)).await
    }

    pub async fn read(&self, address: Address, value_type: ValueType) -> MemoryResult<MemoryValue> {
        self.run(move |handle, config| {
            MemoryOperations::with_config(handle, config).read(address, value_type)
        })
        .await
    }

    pub async fn write(&self, address: Address, value: MemoryValue) -> MemoryResult<()> {
        self.run(move |handle, _| memory::write_value(handle, address, &value))
            .await
    }

    pub async fn write_as(
        &self,
        address: Address,
        value_type: ValueType,
        value: MemoryValue,
    ) -> MemoryResult<()> {
        self.run(move |handle, _| memory::write_as(handle, address, value_type, value))
            .await
    }

    pub async fn read_string(&self, address: Address) -> MemoryResult<String> {
        self.run(move |handle, config| {
            MemoryOperations::with_config(handle, config).read_string(address)
        })
        .await
    }

    pub async fn list_modules(&self) -> MemoryResult<Vec<ModuleInfo>> {
        self.run(|handle, _| process::list_modules(handle)).await
    }

    /// Module lookup using the configured retry policy
    pub async fn find_module(&self, name: &str) -> MemoryResult<ModuleInfo> {
        let name = name.to_string();
        self.run(move |handle, config| {
            process::find_module(handle, &name, &RetryPolicy::from(&config.modules))
        })
        .await
    }

    pub async fn main_module(&self) -> MemoryResult<ModuleInfo> {
        self.run(|handle, _| process::main_module(handle)).await
    }

    pub async fn scan(&self, region: MemoryRegion, pattern: Pattern) -> MemoryResult<Option<Address>> {
        self.run(move |handle, config| {
            MemoryOperations::with_config(handle, config).scan(region, &pattern)
        })
        .await
    }

    pub async fn find_pattern(
        &self,
        module_name: &str,
        signature: &str,
        options: SignatureOptions,
    ) -> MemoryResult<Option<Address>> {
        let module_name = module_name.to_string();
        let signature = signature.to_string();
        self.run(move |handle, config| {
            let scan_options = ScanOptions::from(&config.scanner);
            memory::find_pattern(handle, &module_name, &signature, &options, &scan_options)
        })
        .await
    }

    /// Releases the handle once no other clone holds it
    pub async fn close(self) -> MemoryResult<()> {
        match Arc::try_unwrap(self.handle) {
            Ok(handle) => blocking(move || handle.close()).await,
            Err(shared) => {
                debug!("PID {} still shared, release deferred", shared.pid());
                Ok(())
            }
        }
    }
}
