//! Integration tests for typed reads and writes

use pretty_assertions::assert_eq;
use procmem::memory::{read_string, read_value, write_as, write_value, BoundedMemory, MAX_STRING_LENGTH};
use procmem::{
    open_process, Address, ErrorKind, MemoryError, MemoryOperations, MemoryRegion,
    MemorySnapshot, MemoryValue, ValueType, Vector3, Vector4,
};

fn samples() -> Vec<MemoryValue> {
    vec![
        MemoryValue::Int(-123_456),
        MemoryValue::Dword(0xDEAD_BEEF),
        MemoryValue::Long(-42),
        MemoryValue::Float(3.5),
        MemoryValue::Double(-1.0e300),
        MemoryValue::Pointer(0x7FF6_1234_usize),
        MemoryValue::Bool(true),
        MemoryValue::Bool(false),
        MemoryValue::String("player one".to_string()),
        MemoryValue::Vector3(Vector3::new(1.0, -2.5, 1e6)),
        MemoryValue::Vector4(Vector4::new(0.25, 0.5, 0.75, 1.0)),
    ]
}

#[test]
fn test_every_tag_round_trips_on_snapshot() {
    for value in samples() {
        let memory = MemorySnapshot::new(Address::new(0x1000), vec![0u8; 64]);
        let address = Address::new(0x1008);

        write_value(&memory, address, &value).unwrap();
        let read = read_value(&memory, address, value.value_type()).unwrap();
        assert_eq!(read, value);
    }
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_every_tag_round_trips_in_own_process() {
    let handle = open_process(std::process::id()).unwrap();
    let buffer = vec![0u8; 64];
    let address = Address::new(buffer.as_ptr() as usize);

    for value in samples() {
        handle.write_memory(address, &[0u8; 64]).unwrap();
        write_value(&handle, address, &value).unwrap();
        let read = read_value(&handle, address, value.value_type()).unwrap();
        assert_eq!(read, value);
    }

    drop(buffer);
    handle.close().unwrap();
}

#[test]
fn test_bool_uses_one_byte() {
    let memory = MemorySnapshot::new(Address::new(0x1000), vec![0u8, 7, 7, 7]);
    assert_eq!(
        read_value(&memory, Address::new(0x1000), ValueType::Bool).unwrap(),
        MemoryValue::Bool(false)
    );
    assert_eq!(
        read_value(&memory, Address::new(0x1001), ValueType::Bool).unwrap(),
        MemoryValue::Bool(true)
    );

    write_value(&memory, Address::new(0x1000), &MemoryValue::Bool(true)).unwrap();
    assert_eq!(memory.to_vec(), vec![1, 7, 7, 7]);

    // The last byte of the snapshot is still a complete bool
    assert_eq!(
        read_value(&memory, Address::new(0x1003), ValueType::Bool).unwrap(),
        MemoryValue::Bool(true)
    );
}

#[test]
fn test_vector4_memory_order() {
    let memory = MemorySnapshot::new(Address::new(0x1000), vec![0u8; 16]);
    write_value(
        &memory,
        Address::new(0x1000),
        &MemoryValue::Vector4(Vector4::new(1.0, 2.0, 3.0, 4.0)),
    )
    .unwrap();

    let bytes = memory.to_vec();
    assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
    assert_eq!(&bytes[12..16], &4.0f32.to_le_bytes());
}

#[test]
fn test_string_without_terminator_is_too_long() {
    let memory = MemorySnapshot::new(Address::new(0x10000), vec![b'A'; MAX_STRING_LENGTH + 16]);
    let err = read_string(&memory, Address::new(0x10000), MAX_STRING_LENGTH).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StringTooLong);
    assert!(matches!(
        err,
        MemoryError::StringTooLong {
            limit: MAX_STRING_LENGTH,
            ..
        }
    ));
}

#[test]
fn test_string_at_the_limit() {
    let mut bytes = vec![b'z'; MAX_STRING_LENGTH];
    bytes[MAX_STRING_LENGTH - 1] = 0;
    let memory = MemorySnapshot::new(Address::new(0x10000), bytes);

    let value = read_value(&memory, Address::new(0x10000), ValueType::String).unwrap();
    match value {
        MemoryValue::String(s) => assert_eq!(s.len(), MAX_STRING_LENGTH - 1),
        other => panic!("unexpected value {:?}", other),
    }
}

#[test]
fn test_string_ending_at_unreadable_memory() {
    let memory = MemorySnapshot::new(Address::new(0x1000), b"abc".to_vec());
    let err = read_string(&memory, Address::new(0x1000), 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadFailed);
}

#[test]
fn test_invalid_utf8_string() {
    let memory = MemorySnapshot::new(Address::new(0x1000), vec![0xC3, 0x28, 0x00]);
    let err = read_string(&memory, Address::new(0x1000), 16).unwrap_err();
    assert!(matches!(err, MemoryError::Utf8Error(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_read_outside_memory_fails() {
    let memory = MemorySnapshot::new(Address::new(0x1000), vec![0u8; 8]);
    let err = read_value(&memory, Address::new(0x1006), ValueType::Int).unwrap_err();
    assert!(matches!(err, MemoryError::ReadFailed { .. }));

    let err = write_value(&memory, Address::new(0x0FFF), &MemoryValue::Int(1)).unwrap_err();
    assert!(matches!(err, MemoryError::WriteFailed { .. }));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_unmapped_address_in_own_process() {
    let handle = open_process(std::process::id()).unwrap();
    let err = read_value(&handle, Address::new(0x8), ValueType::Double).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadFailed);
}

#[test]
fn test_write_as_coerces() {
    let memory = MemorySnapshot::new(Address::new(0x1000), vec![0u8; 16]);
    write_as(&memory, Address::new(0x1000), ValueType::Double, MemoryValue::Int(7)).unwrap();
    assert_eq!(
        read_value(&memory, Address::new(0x1000), ValueType::Double).unwrap(),
        MemoryValue::Double(7.0)
    );

    let err = write_as(
        &memory,
        Address::new(0x1000),
        ValueType::Dword,
        MemoryValue::Int(-1),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(&memory.to_vec()[..8], &7.0f64.to_le_bytes()[..]);
}

#[test]
fn test_bounded_memory_rejects_spans() {
    let memory = MemorySnapshot::new(Address::new(0x1000), vec![0u8; 64]);
    let bounded = BoundedMemory::new(&memory, MemoryRegion::new(Address::new(0x1010), 16));
    let ops = MemoryOperations::new(&bounded);

    ops.write(Address::new(0x1010), &MemoryValue::Double(2.0)).unwrap();
    assert_eq!(
        ops.read(Address::new(0x1010), ValueType::Double).unwrap(),
        MemoryValue::Double(2.0)
    );

    let err = ops.read(Address::new(0x101C), ValueType::Double).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadFailed);
    let err = ops
        .write(Address::new(0x100F), &MemoryValue::Int(0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WriteFailed);
}

#[test]
fn test_value_type_names() {
    for tag in ValueType::ALL {
        assert_eq!(tag.as_str().parse::<ValueType>().unwrap(), tag);
    }
    assert_eq!("ptr".parse::<ValueType>().unwrap(), ValueType::Pointer);
    assert_eq!("vec3".parse::<ValueType>().unwrap(), ValueType::Vector3);
    let err = "quaternion".parse::<ValueType>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
