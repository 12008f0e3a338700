//! Kernel32.dll bindings for process and memory operations

use crate::core::types::{MemoryError, MemoryResult, ProcessId};
use crate::windows::types::Handle;
use crate::windows::utils::{ErrorCode, WinError};
use winapi::shared::minwindef::{DWORD, FALSE, LPCVOID, LPVOID};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, WriteProcessMemory};
use winapi::um::processthreadsapi::{GetExitCodeProcess, OpenProcess};
use winapi::um::winnt::HANDLE;

/// Exit code reported by `GetExitCodeProcess` while the process runs
pub const STILL_ACTIVE: DWORD = 259;

/// Safe wrapper for OpenProcess
pub fn open_process(pid: ProcessId, desired_access: u32) -> MemoryResult<Handle> {
    let handle = unsafe { OpenProcess(desired_access, FALSE, pid) };
    if !handle.is_null() {
        return Ok(Handle::new(handle));
    }

    match ErrorCode::last_error() {
        ErrorCode::AccessDenied => Err(MemoryError::access_denied(
            pid,
            format!("OpenProcess refused access mask 0x{:X}", desired_access),
        )),
        ErrorCode::InvalidParameter => Err(MemoryError::ProcessNotFound(format!("PID {}", pid))),
        code => Err(MemoryError::InvalidHandle(
            WinError::with_code(code, format!("OpenProcess({})", pid)).to_string(),
        )),
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle or null
pub unsafe fn close_handle(handle: HANDLE) -> MemoryResult<()> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(MemoryError::InvalidHandle(
            WinError::new("CloseHandle").to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Reads exactly `buffer.len()` bytes; a short read is a failure
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_READ`
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: usize,
    buffer: &mut [u8],
) -> MemoryResult<()> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address as LPCVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result == FALSE {
        Err(MemoryError::read_failed(
            format!("0x{:X}", address),
            WinError::new("ReadProcessMemory").to_string(),
        ))
    } else if bytes_read != buffer.len() {
        Err(MemoryError::read_failed(
            format!("0x{:X}", address),
            format!("short read: {} of {} bytes", bytes_read, buffer.len()),
        ))
    } else {
        Ok(())
    }
}

/// Writes all of `data`; a short write is a failure
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_WRITE | PROCESS_VM_OPERATION`
pub unsafe fn write_process_memory(handle: HANDLE, address: usize, data: &[u8]) -> MemoryResult<()> {
    let mut bytes_written = 0;

    let result = WriteProcessMemory(
        handle,
        address as LPVOID,
        data.as_ptr() as LPCVOID,
        data.len(),
        &mut bytes_written,
    );

    if result == FALSE {
        Err(MemoryError::write_failed(
            format!("0x{:X}", address),
            WinError::new("WriteProcessMemory").to_string(),
        ))
    } else if bytes_written != data.len() {
        Err(MemoryError::write_failed(
            format!("0x{:X}", address),
            format!("short write: {} of {} bytes", bytes_written, data.len()),
        ))
    } else {
        Ok(())
    }
}

/// Safe wrapper for GetExitCodeProcess
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_QUERY_INFORMATION`
pub unsafe fn get_exit_code_process(handle: HANDLE) -> MemoryResult<DWORD> {
    let mut code: DWORD = 0;
    if GetExitCodeProcess(handle, &mut code) == FALSE {
        Err(MemoryError::InvalidHandle(
            WinError::new("GetExitCodeProcess").to_string(),
        ))
    } else {
        Ok(code)
    }
}
