//! Custom error types for procmem

use super::ProcessId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid pattern format: {0}")]
    InvalidPattern(String),

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Access denied to process {pid}: {reason}")]
    AccessDenied { pid: ProcessId, reason: String },

    #[error("Process {0} has exited")]
    ProcessExited(ProcessId),

    #[error("Failed to read memory at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Failed to write memory at {address}: {reason}")]
    WriteFailed { address: String, reason: String },

    #[error("No null terminator within {limit} bytes of {address}")]
    StringTooLong { address: String, limit: usize },

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for engine operations
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Coarse classification of a [`MemoryError`], stable across messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    ProcessNotFound,
    ModuleNotFound,
    AccessDenied,
    ProcessExited,
    ReadFailed,
    WriteFailed,
    StringTooLong,
    InvalidHandle,
    EnumerationFailed,
    Internal,
}

impl MemoryError {
    /// Classifies the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MemoryError::InvalidArgument(_)
            | MemoryError::InvalidPattern(_)
            | MemoryError::Utf8Error(_) => ErrorKind::InvalidArgument,
            MemoryError::ProcessNotFound(_) => ErrorKind::ProcessNotFound,
            MemoryError::ModuleNotFound(_) => ErrorKind::ModuleNotFound,
            MemoryError::AccessDenied { .. } => ErrorKind::AccessDenied,
            MemoryError::ProcessExited(_) => ErrorKind::ProcessExited,
            MemoryError::ReadFailed { .. } => ErrorKind::ReadFailed,
            MemoryError::WriteFailed { .. } => ErrorKind::WriteFailed,
            MemoryError::StringTooLong { .. } => ErrorKind::StringTooLong,
            MemoryError::InvalidHandle(_) => ErrorKind::InvalidHandle,
            MemoryError::EnumerationFailed(_) => ErrorKind::EnumerationFailed,
            MemoryError::TaskFailed(_) => ErrorKind::Internal,
        }
    }

    /// Creates an access denied error for a process
    pub fn access_denied(pid: ProcessId, reason: impl Into<String>) -> Self {
        MemoryError::AccessDenied {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a read failed error
    pub fn read_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::ReadFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a write failed error
    pub fn write_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::WriteFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a string too long error
    pub fn string_too_long(address: impl fmt::Display, limit: usize) -> Self {
        MemoryError::StringTooLong {
            address: address.to_string(),
            limit,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::ProcessNotFound => "ProcessNotFound",
            ErrorKind::ModuleNotFound => "ModuleNotFound",
            ErrorKind::AccessDenied => "AccessDenied",
            ErrorKind::ProcessExited => "ProcessExited",
            ErrorKind::ReadFailed => "ReadFailed",
            ErrorKind::WriteFailed => "WriteFailed",
            ErrorKind::StringTooLong => "StringTooLong",
            ErrorKind::InvalidHandle => "InvalidHandle",
            ErrorKind::EnumerationFailed => "EnumerationFailed",
            ErrorKind::Internal => "Internal",
        };
        f.write_str(name)
    }
}
