//! Integration tests for process enumeration and handle lifecycle

use procmem::process::{find_process_by_name, resolve_target};
use procmem::{
    close_process, list_processes, open_process, ErrorKind, MemoryError, ProcessAccess,
    ProcessHandle, ProcessTarget,
};

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_snapshot_describes_current_process() {
    let processes = list_processes().unwrap();
    let own = processes
        .iter()
        .find(|p| p.pid == std::process::id())
        .expect("current process missing from snapshot");

    assert!(!own.name.is_empty());
    assert!(own.thread_count >= 1);
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_open_by_name_resolves_first_match() {
    let own = resolve_target(&ProcessTarget::Pid(std::process::id())).unwrap();
    let first = find_process_by_name(&own.name).unwrap().unwrap();

    let handle = open_process(own.name.as_str()).unwrap();
    assert_eq!(handle.pid(), first.pid);
    assert_eq!(handle.info().name, own.name);
    close_process(handle).unwrap();
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_missing_targets() {
    let err = open_process(u32::MAX - 1).unwrap_err();
    assert!(matches!(err, MemoryError::ProcessNotFound(_)));

    let err = open_process("no-such-process-procmem.exe").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProcessNotFound);
}

#[test]
fn test_malformed_targets() {
    for target in [ProcessTarget::Pid(0), ProcessTarget::Name(String::new())] {
        let err = open_process(target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_read_only_handle_cannot_write() {
    let target = ProcessTarget::Pid(std::process::id());
    let handle = ProcessHandle::open(&target, ProcessAccess::READ_ONLY).unwrap();
    let value = Box::new(0x5A5A_5A5Au32);
    let address = procmem::Address::new(&*value as *const u32 as usize);

    let mut buffer = [0u8; 4];
    handle.read_memory(address, &mut buffer).unwrap();
    assert_eq!(u32::from_le_bytes(buffer), 0x5A5A_5A5A);

    assert!(handle.write_memory(address, &[0u8; 4]).is_err());
    handle.close().unwrap();
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_handle_reports_liveness() {
    let handle = open_process(std::process::id()).unwrap();
    assert!(handle.is_running());
    assert!(handle.access().contains(ProcessAccess::VM_WRITE));
    handle.close().unwrap();
}
