//! Windows error code handling utilities

use crate::core::types::MemoryError;
use std::fmt;
use winapi::um::errhandlingapi::GetLastError;

/// Windows error codes the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    AccessDenied,
    InvalidHandle,
    BadLength,
    InvalidParameter,
    PartialCopy,
    InvalidAddress,
    NoAccess,
    Unknown(u32),
}

impl From<u32> for ErrorCode {
    fn from(code: u32) -> Self {
        match code {
            0 => ErrorCode::Success,
            5 => ErrorCode::AccessDenied,
            6 => ErrorCode::InvalidHandle,
            24 => ErrorCode::BadLength,
            87 => ErrorCode::InvalidParameter,
            299 => ErrorCode::PartialCopy,
            487 => ErrorCode::InvalidAddress,
            998 => ErrorCode::NoAccess,
            _ => ErrorCode::Unknown(code),
        }
    }
}

impl ErrorCode {
    /// Get the last Windows error
    pub fn last_error() -> Self {
        unsafe { ErrorCode::from(GetLastError()) }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Success => write!(f, "Success"),
            ErrorCode::AccessDenied => write!(f, "Access denied"),
            ErrorCode::InvalidHandle => write!(f, "Invalid handle"),
            ErrorCode::BadLength => write!(f, "Bad length"),
            ErrorCode::InvalidParameter => write!(f, "Invalid parameter"),
            ErrorCode::PartialCopy => write!(f, "Partial copy"),
            ErrorCode::InvalidAddress => write!(f, "Invalid address"),
            ErrorCode::NoAccess => write!(f, "Invalid access to memory location"),
            ErrorCode::Unknown(code) => write!(f, "Unknown error: {}", code),
        }
    }
}

/// Windows error wrapper
#[derive(Debug)]
pub struct WinError {
    code: ErrorCode,
    context: String,
}

impl WinError {
    /// Create a new Windows error with context
    pub fn new(context: impl Into<String>) -> Self {
        WinError {
            code: ErrorCode::last_error(),
            context: context.into(),
        }
    }

    /// Create with specific error code
    pub fn with_code(code: ErrorCode, context: impl Into<String>) -> Self {
        WinError {
            code,
            context: context.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Convert to the enumeration failure kind
    pub fn into_enumeration_error(self) -> MemoryError {
        MemoryError::EnumerationFailed(self.to_string())
    }
}

impl fmt::Display for WinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.code)
    }
}
