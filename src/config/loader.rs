//! Configuration loader for procmem
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "PROCMEM_CONFIG";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "procmem.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scanner")]
    pub scanner: ScannerConfig,

    #[serde(default = "default_modules")]
    pub modules: ModuleConfig,

    #[serde(default = "default_memory")]
    pub memory: MemoryConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Pattern scanner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
}

/// Module lookup retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Zero disables the wall-clock ceiling; the attempt count still applies
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Typed memory access configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_max_string_length")]
    pub max_string_length: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub with_target: bool,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loader for `$PROCMEM_CONFIG`, or `procmem.toml` when unset
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => ConfigLoader::new(path),
            _ => ConfigLoader::new(DEFAULT_CONFIG_FILE),
        }
    }

    /// Path this loader reads and writes
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults only when the file is missing
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location
pub fn load_config() -> Result<Config, ConfigError> {
    ConfigLoader::from_env().load_or_default()
}

// Default functions for serde
fn default_scanner() -> ScannerConfig {
    let defaults = default_config();
    ScannerConfig {
        chunk_size: defaults.scanner.chunk_size,
        parallel_threshold: defaults.scanner.parallel_threshold,
        max_threads: defaults.scanner.max_threads,
    }
}

fn default_modules() -> ModuleConfig {
    let defaults = default_config();
    ModuleConfig {
        max_attempts: defaults.modules.max_attempts,
        retry_interval_ms: defaults.modules.retry_interval_ms,
        timeout_ms: defaults.modules.timeout_ms,
    }
}

fn default_memory() -> MemoryConfig {
    MemoryConfig {
        max_string_length: default_config().memory.max_string_length,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config();
    LoggingConfig {
        level: defaults.logging.level,
        with_target: defaults.logging.with_target,
    }
}

// Individual field defaults
fn default_chunk_size() -> usize {
    default_config().scanner.chunk_size
}

fn default_parallel_threshold() -> usize {
    default_config().scanner.parallel_threshold
}

fn default_max_threads() -> usize {
    default_config().scanner.max_threads
}

fn default_max_attempts() -> u32 {
    default_config().modules.max_attempts
}

fn default_retry_interval_ms() -> u64 {
    default_config().modules.retry_interval_ms
}

fn default_timeout_ms() -> u64 {
    default_config().modules.timeout_ms
}

fn default_max_string_length() -> usize {
    default_config().memory.max_string_length
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: default_scanner(),
            modules: default_modules(),
            memory: default_memory(),
            logging: default_logging(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        default_scanner()
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        default_modules()
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        default_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scanner.chunk_size, 4096);
        assert_eq!(config.modules.max_attempts, 50);
        assert_eq!(config.memory.max_string_length, 1_000_000);
        assert!(config.scanner.max_threads > 0);
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ConfigLoader::new("nonexistent-procmem.toml");
        let result = loader.load();
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let loader = ConfigLoader::new("nonexistent-procmem.toml");
        let config = loader.load_or_default().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_rejects_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[scanner\nchunk_size = ").unwrap();

        let result = ConfigLoader::new(&config_path).load_or_default();
        assert!(matches!(result.unwrap_err(), ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("procmem.toml");

        let mut config = Config::default();
        config.modules.max_attempts = 3;
        config.logging.level = "debug".to_string();
        let loader = ConfigLoader::new(&config_path);

        loader.save(&config).unwrap();
        assert!(config_path.exists());

        let loaded = loader.load().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [modules]
            max_attempts = 5
            retry_interval_ms = 10
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.modules.max_attempts, 5);
        assert_eq!(config.modules.retry_interval_ms, 10);
        // Check defaults are applied
        assert_eq!(config.modules.timeout_ms, 10_000);
        assert_eq!(config.scanner.chunk_size, 4096);
        assert_eq!(config.logging.level, "info");
    }
}
