//! Integration tests for integer handle ids

use procmem::{Address, HandleTable, MemoryAccess, MemoryError};
use std::sync::Arc;
use std::thread;

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_handle_use_after_close() {
    let table = HandleTable::new();
    let id = table.open(std::process::id()).unwrap();
    assert_eq!(table.len(), 1);

    let value = Box::new(0x1122_3344u32);
    let address = Address::new(&*value as *const u32 as usize);
    let handle = table.get(id).unwrap();
    let bytes = handle.read_bytes(address, 4).unwrap();
    assert_eq!(bytes, 0x1122_3344u32.to_le_bytes());
    drop(handle);

    table.close(id).unwrap();
    assert!(matches!(table.get(id), Err(MemoryError::InvalidHandle(_))));
    assert!(matches!(table.close(id), Err(MemoryError::InvalidHandle(_))));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_close_while_borrowed() {
    let table = HandleTable::new();
    let id = table.open(std::process::id()).unwrap();
    let borrowed = table.get(id).unwrap();

    table.close(id).unwrap();
    assert!(!table.is_open(id));
    assert!(borrowed.is_running());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_shared_between_threads() {
    let table = Arc::new(HandleTable::new());

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let table = Arc::clone(&table);
            thread::spawn(move || table.open(std::process::id()).unwrap())
        })
        .collect();
    let mut ids: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(table.len(), 4);

    table.close_all().unwrap();
    assert!(table.is_empty());
}
