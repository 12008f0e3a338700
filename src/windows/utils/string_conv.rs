//! String conversion utilities for Windows API

use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use std::path::PathBuf;

/// Convert Windows wide string (UTF-16) to Rust string
pub fn wide_to_string(wide: &[u16]) -> String {
    wide_to_os_string(wide).to_string_lossy().into_owned()
}

/// Convert a fixed-size wide path buffer to a path
pub fn wide_to_path(wide: &[u16]) -> PathBuf {
    PathBuf::from(wide_to_os_string(wide))
}

fn wide_to_os_string(wide: &[u16]) -> OsString {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    OsString::from_wide(&wide[..len])
}
