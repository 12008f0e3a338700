//! Integration tests for signature parsing and pattern scanning

use pretty_assertions::assert_eq;
use procmem::memory::{scan_slice, scan_slice_parallel, ScanStats};
use procmem::{
    Address, MemoryError, MemoryOperations, MemoryRegion, MemorySnapshot, Pattern, PatternScanner,
    ScanOptions,
};
use proptest::prelude::*;

const SCENARIO: [u8; 16] = [
    0xDE, 0xAD, 0xBE, 0xEF, 0x90, 0x90, 0x90, 0x90, 0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x00,
];

fn scan(memory: &MemorySnapshot, signature: &str) -> Option<Address> {
    let pattern: Pattern = signature.parse().unwrap();
    PatternScanner::new(memory)
        .scan(memory.region(), &pattern)
        .unwrap()
}

#[test]
fn test_reference_scenario() {
    let memory = MemorySnapshot::new(Address::new(0x1000), SCENARIO.to_vec());

    assert_eq!(scan(&memory, "DE AD ?? EF"), Some(Address::new(0x1000)));
    assert_eq!(scan(&memory, "90 90 90 90"), Some(Address::new(0x1004)));
    assert_eq!(scan(&memory, "FF FF"), None);
}

#[test]
fn test_not_found_examines_every_window() {
    let memory = MemorySnapshot::new(Address::new(0x5000), vec![0x11; 1000]);
    let pattern: Pattern = "11 11 22".parse().unwrap();
    let (found, stats) = PatternScanner::new(&memory)
        .scan_with_stats(memory.region(), &pattern)
        .unwrap();

    assert_eq!(found, None);
    assert_eq!(stats.windows_examined, 1000 - 3 + 1);
}

#[test]
fn test_lower_occurrence_wins() {
    let mut bytes = vec![0u8; 256];
    bytes[200..204].copy_from_slice(&[0x48, 0x8B, 0x01, 0xC3]);
    bytes[40..44].copy_from_slice(&[0x48, 0x8B, 0x7F, 0xC3]);
    let memory = MemorySnapshot::new(Address::new(0x7000), bytes);

    assert_eq!(scan(&memory, "48 8B ?? C3"), Some(Address::new(0x7000 + 40)));
}

#[test]
fn test_step_skips_offsets() {
    let mut bytes = vec![0u8; 64];
    bytes[9] = 0xAB;
    bytes[16] = 0xAB;
    let memory = MemorySnapshot::new(Address::new(0x1000), bytes);
    let pattern: Pattern = "AB".parse().unwrap();

    let stepped = PatternScanner::with_options(&memory, ScanOptions::default().with_step(4));
    assert_eq!(
        stepped.scan(memory.region(), &pattern).unwrap(),
        Some(Address::new(0x1010))
    );

    let stepped = PatternScanner::with_options(&memory, ScanOptions::default().with_step(3));
    assert_eq!(
        stepped.scan(memory.region(), &pattern).unwrap(),
        Some(Address::new(0x1009))
    );
}

#[test]
fn test_match_straddling_chunks() {
    let mut bytes = vec![0u8; 100];
    bytes[14..18].copy_from_slice(&[1, 2, 3, 4]);
    let memory = MemorySnapshot::new(Address::new(0x1000), bytes);
    let options = ScanOptions {
        chunk_size: 16,
        ..ScanOptions::default()
    };
    let pattern: Pattern = "01 02 03 04".parse().unwrap();

    let (found, stats) = PatternScanner::with_options(&memory, options)
        .scan_with_stats(memory.region(), &pattern)
        .unwrap();
    assert_eq!(found, Some(Address::new(0x100E)));
    assert_eq!(stats.windows_examined, 15);
    assert!(stats.reads_issued >= 2);
}

#[test]
fn test_scan_subregion_only() {
    let memory = MemorySnapshot::new(Address::new(0x1000), SCENARIO.to_vec());
    let pattern: Pattern = "DE AD".parse().unwrap();
    let region = MemoryRegion::new(Address::new(0x1004), 8);

    let found = PatternScanner::new(&memory).scan(region, &pattern).unwrap();
    assert_eq!(found, None);
}

#[test]
fn test_match_found_before_unreadable_memory() {
    let memory = MemorySnapshot::new(Address::new(0x1000), SCENARIO.to_vec());
    let region = MemoryRegion::new(Address::new(0x1000), 64);

    let pattern: Pattern = "90 90 90 90".parse().unwrap();
    let found = PatternScanner::new(&memory).scan(region, &pattern).unwrap();
    assert_eq!(found, Some(Address::new(0x1004)));

    let pattern: Pattern = "00".parse().unwrap();
    let found = PatternScanner::new(&memory).scan(region, &pattern).unwrap();
    assert_eq!(found, Some(Address::new(0x100C)));
}

#[test]
fn test_unreadable_window_propagates() {
    let memory = MemorySnapshot::new(Address::new(0x1000), SCENARIO.to_vec());
    let pattern: Pattern = "FF".parse().unwrap();
    let region = MemoryRegion::new(Address::new(0x1000), 64);

    let err = PatternScanner::new(&memory).scan(region, &pattern).unwrap_err();
    assert!(matches!(err, MemoryError::ReadFailed { .. }));
}

#[test]
fn test_pattern_longer_than_region() {
    let memory = MemorySnapshot::new(Address::new(0x1000), vec![0xDE, 0xAD]);
    let pattern: Pattern = "DE AD BE".parse().unwrap();
    let (found, stats) = PatternScanner::new(&memory)
        .scan_with_stats(memory.region(), &pattern)
        .unwrap();
    assert_eq!(found, None);
    assert_eq!(stats, ScanStats::default());
}

#[test]
fn test_invalid_signatures() {
    for bad in ["", "   ", "DEAD", "G0", "0", "DE ???", "DE,AD"] {
        let err = bad.parse::<Pattern>().unwrap_err();
        assert!(
            matches!(err, MemoryError::InvalidPattern(_)),
            "{:?} parsed as a pattern",
            bad
        );
    }
}

#[test]
fn test_operations_scan_uses_config() {
    let memory = MemorySnapshot::new(Address::new(0x1000), SCENARIO.to_vec());
    let mut config = procmem::config::Config::default();
    config.scanner.chunk_size = 4;
    let ops = MemoryOperations::with_config(&memory, &config);

    let pattern: Pattern = "CA FE BA BE".parse().unwrap();
    let found = ops.scan(memory.region(), &pattern).unwrap();
    assert_eq!(found, Some(Address::new(0x1008)));
}

fn token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<u8>().prop_map(|b| format!("{:02X}", b)),
        any::<u8>().prop_map(|b| format!("{:02x}", b)),
        Just("??".to_string()),
    ]
}

proptest! {
    #[test]
    fn prop_signature_round_trip(tokens in prop::collection::vec(token_strategy(), 1..24)) {
        let signature = tokens.join(" ");
        let pattern: Pattern = signature.parse().unwrap();
        let reparsed: Pattern = pattern.to_string().parse().unwrap();
        prop_assert_eq!(reparsed.tokens(), pattern.tokens());
        prop_assert_eq!(pattern.to_string(), signature.to_uppercase());
    }

    #[test]
    fn prop_parallel_matches_sequential(
        haystack in prop::collection::vec(0u8..4, 0..512),
        needle in prop::collection::vec(0u8..4, 1..4),
        step in 1usize..5,
    ) {
        let pattern = Pattern::from_bytes(&needle).unwrap();
        let sequential = scan_slice(&haystack, &pattern, step).unwrap();
        let parallel = scan_slice_parallel(&haystack, &pattern, step).unwrap();
        prop_assert_eq!(sequential, parallel);

        let memory = MemorySnapshot::new(Address::new(0x1000), haystack.clone());
        let options = ScanOptions { chunk_size: 8, ..ScanOptions::default() }.with_step(step);
        let chunked = PatternScanner::with_options(&memory, options)
            .scan(memory.region(), &pattern)
            .unwrap();
        prop_assert_eq!(chunked, sequential.map(|offset| Address::new(0x1000 + offset)));
    }
}
