//! Windows utility functions

pub mod error_codes;
pub mod string_conv;

pub use error_codes::{ErrorCode, WinError};
pub use string_conv::{wide_to_path, wide_to_string};
