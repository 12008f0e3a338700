//! Configuration validator for procmem
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, LoggingConfig, MemoryConfig, ModuleConfig, ScannerConfig};
use crate::memory::MAX_STRING_LENGTH;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_scanner(&config.scanner)?;
        Self::validate_modules(&config.modules)?;
        Self::validate_memory(&config.memory)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates scanner configuration
    fn validate_scanner(scanner: &ScannerConfig) -> Result<(), ConfigError> {
        if scanner.max_threads == 0 {
            return Err(ConfigError::Invalid(
                "Scanner threads must be at least 1".to_string(),
            ));
        }

        if scanner.max_threads > 128 {
            return Err(ConfigError::Invalid(
                "Scanner threads cannot exceed 128".to_string(),
            ));
        }

        if scanner.chunk_size == 0 || !scanner.chunk_size.is_power_of_two() {
            return Err(ConfigError::Invalid(
                "Chunk size must be a power of 2".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates module lookup configuration
    fn validate_modules(modules: &ModuleConfig) -> Result<(), ConfigError> {
        if modules.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "Module lookup needs at least 1 attempt".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates memory configuration
    fn validate_memory(memory: &MemoryConfig) -> Result<(), ConfigError> {
        if memory.max_string_length == 0 {
            return Err(ConfigError::Invalid(
                "Maximum string length must be greater than 0".to_string(),
            ));
        }

        if memory.max_string_length > MAX_STRING_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "Maximum string length cannot exceed {}",
                MAX_STRING_LENGTH
            )));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, LOG_LEVELS
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
