//! Default configuration values for procmem

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scanner: ScannerDefaults,
    pub modules: ModuleDefaults,
    pub memory: MemoryDefaults,
    pub logging: LoggingDefaults,
}

/// Default scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerDefaults {
    pub chunk_size: usize,
    pub parallel_threshold: usize,
    pub max_threads: usize,
}

/// Default module lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDefaults {
    pub max_attempts: u32,
    pub retry_interval_ms: u64,
    pub timeout_ms: u64,
}

/// Default memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDefaults {
    pub max_string_length: usize,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub with_target: bool,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scanner: ScannerDefaults {
            chunk_size: 4096,
            parallel_threshold: 1048576, // 1MB
            max_threads: num_cpus::get().min(8),
        },
        modules: ModuleDefaults {
            max_attempts: 50,
            retry_interval_ms: 100,
            timeout_ms: 10_000,
        },
        memory: MemoryDefaults {
            max_string_length: 1_000_000,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            with_target: false,
        },
    }
}
