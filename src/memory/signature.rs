//! Module-scoped signature lookup

use super::pattern::Pattern;
use super::reader::read_primitive;
use super::scanner::{PatternScanner, ScanOptions};
use super::MemoryAccess;
use crate::core::types::{Address, MemoryError, MemoryResult, ModuleInfo};
use crate::process::{ModuleEnumerator, ProcessHandle};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use tracing::debug;

/// Post-processing applied to a signature match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureType(u32);

impl SignatureType {
    /// Return the matched address itself
    pub const NORMAL: Self = Self(0);
    /// Dereference a pointer-sized value at the match
    pub const READ: Self = Self(1);
    /// Make the result relative to the module base
    pub const SUBTRACT: Self = Self(2);

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SignatureType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Flags and offsets for [`resolve_signature`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignatureOptions {
    pub flags: SignatureType,
    /// Added to the match before any dereference
    pub pattern_offset: usize,
    /// Added to the final result
    pub address_offset: usize,
}

impl SignatureOptions {
    pub fn new(flags: SignatureType, pattern_offset: usize, address_offset: usize) -> Self {
        SignatureOptions {
            flags,
            pattern_offset,
            address_offset,
        }
    }
}

/// Scans `module` for `pattern` and applies `options` to the first match.
///
/// Arithmetic wraps at the address-space width.
pub fn resolve_signature<M: MemoryAccess + ?Sized>(
    memory: &M,
    module: &ModuleInfo,
    pattern: &Pattern,
    options: &SignatureOptions,
    scan_options: &ScanOptions,
) -> MemoryResult<Option<Address>> {
    let scanner = PatternScanner::with_options(memory, scan_options.clone());
    let Some(found) = scanner.scan(module.region(), pattern)? else {
        return Ok(None);
    };

    let mut address = found.wrapping_add(options.pattern_offset);
    if options.flags.contains(SignatureType::READ) {
        address = Address::new(read_primitive::<usize, M>(memory, address)?);
    }
    if options.flags.contains(SignatureType::SUBTRACT) {
        address = address.wrapping_sub(module.base_address.as_usize());
    }
    let address = address.wrapping_add(options.address_offset);

    debug!(
        "Signature {} in {} resolved to {} (match at {})",
        pattern, module.name, address, found
    );
    Ok(Some(address))
}

/// Looks up `module_name` once and returns the first match of `pattern` inside it
pub fn scan_module(
    handle: &ProcessHandle,
    module_name: &str,
    pattern: &Pattern,
    options: &ScanOptions,
) -> MemoryResult<Option<Address>> {
    let module = lookup_module(handle, module_name)?;
    PatternScanner::with_options(handle, options.clone()).scan(module.region(), pattern)
}

/// Finds `signature` in the named module of an open process.
///
/// The signature is parsed before the process is touched.
pub fn find_pattern(
    handle: &ProcessHandle,
    module_name: &str,
    signature: &str,
    options: &SignatureOptions,
    scan_options: &ScanOptions,
) -> MemoryResult<Option<Address>> {
    let pattern: Pattern = signature.parse()?;
    let module = lookup_module(handle, module_name)?;
    resolve_signature(handle, &module, &pattern, options, scan_options)
}

fn lookup_module(handle: &ProcessHandle, module_name: &str) -> MemoryResult<ModuleInfo> {
    if module_name.is_empty() {
        return Err(MemoryError::InvalidArgument(
            "module name must not be empty".to_string(),
        ));
    }
    ModuleEnumerator::new(handle)
        .find_by_name(module_name)?
        .ok_or_else(|| MemoryError::ModuleNotFound(module_name.to_string()))
}
