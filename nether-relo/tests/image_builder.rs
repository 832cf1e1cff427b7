//! End-to-end image building scenarios: record graphs in, loader-facing
//! buffers out.

use nether_bits::Endianness;
use nether_relo::{ReloError, Tracker, marshal};

#[test]
fn graph_with_no_children_emits_no_tables() {
    let mut tracker = Tracker::new(16, Endianness::Little).unwrap();
    let chunk = tracker.finalize().unwrap();
    assert_eq!(chunk.instance.len(), 16);
    // Not even a sentinel
    assert_eq!(chunk.relocations.len(), 0);
    assert_eq!(chunk.imports.len(), 0);
}

#[test]
fn relocation_table_size_is_entries_plus_sentinel() {
    for n in 1..=5usize {
        let mut tracker = Tracker::new(4 * n, Endianness::Little).unwrap();
        for i in 0..n {
            tracker.push(Some(4 * i), 4, 1).unwrap();
            tracker.pop().unwrap();
        }
        let chunk = tracker.finalize().unwrap();
        assert_eq!(chunk.relocations.len(), 4 * (n + 1), "{n} children");
        assert_eq!(chunk.imports.len(), 0);
        assert_eq!(chunk.relocation_offsets().len(), n);
    }
}

#[test]
fn embedded_string_scenario_little_endian() {
    // 8-byte root holding one pointer at offset 4 to the string payload
    let mut tracker = Tracker::new(8, Endianness::Little).unwrap();
    {
        let payload = tracker.push(Some(4), 1, 4).unwrap();
        payload[..4].copy_from_slice(b"abc\0");
    }
    tracker.pop().unwrap();
    let chunk = tracker.finalize().unwrap();

    assert_eq!(chunk.instance.len(), 12);
    assert_eq!(chunk.relocations.len(), 8);
    assert_eq!(chunk.imports.len(), 0);
    // The pointer field holds the payload's image offset
    assert_eq!(&chunk.instance[4..8], &8u32.to_le_bytes());
    assert_eq!(&chunk.instance[8..12], b"abc\0");
    // Table: one source offset, then the sentinel
    assert_eq!(&chunk.relocations[0..4], &4u32.to_le_bytes());
    assert_eq!(&chunk.relocations[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn endianness_changes_byte_order_not_offsets() {
    let build = |endianness| {
        let mut tracker = Tracker::new(16, endianness).unwrap();
        marshal::write_string(&mut tracker, 0, "speech").unwrap();
        tracker.push(Some(8), 4, 3).unwrap();
        tracker.pop().unwrap();
        tracker.add_reference(12, 0x1234).unwrap();
        tracker.finalize().unwrap()
    };
    let little = build(Endianness::Little);
    let big = build(Endianness::Big);

    assert_eq!(little.instance.len(), big.instance.len());
    assert_eq!(little.relocations.len(), big.relocations.len());
    assert_eq!(little.imports.len(), big.imports.len());
    // Same offsets in the same order once decoded
    assert_eq!(little.relocation_offsets(), big.relocation_offsets());
    assert_eq!(little.import_offsets(), big.import_offsets());
    // And each multi-byte field is byte-reversed between the two images
    for &offset in &little.relocation_offsets() {
        let offset = offset as usize;
        let le = &little.instance[offset..offset + 4];
        let be = &big.instance[offset..offset + 4];
        let reversed: Vec<u8> = be.iter().rev().copied().collect();
        assert_eq!(le, &reversed[..]);
    }
}

#[test]
fn imports_patch_caller_values() {
    let mut tracker = Tracker::new(8, Endianness::Little).unwrap();
    tracker.add_reference(0, 0xAABB_CCDD).unwrap();
    tracker.add_reference(4, 42).unwrap();
    let chunk = tracker.finalize().unwrap();

    assert_eq!(chunk.relocations.len(), 0);
    assert_eq!(chunk.imports.len(), 12);
    assert_eq!(chunk.import_offsets(), vec![0, 4]);
    assert_eq!(&chunk.instance[0..4], &0xAABB_CCDDu32.to_le_bytes());
    assert_eq!(&chunk.instance[4..8], &42u32.to_le_bytes());
}

#[test]
fn nested_records_resolve_through_the_scope_chain() {
    // root -> list -> item, each linked from its parent
    let mut tracker = Tracker::new(8, Endianness::Little).unwrap();
    tracker.push(Some(0), 8, 1).unwrap();
    tracker.push(Some(4), 4, 1).unwrap();
    tracker.pop().unwrap();
    tracker.pop().unwrap();
    let chunk = tracker.finalize().unwrap();

    assert_eq!(chunk.instance.len(), 20);
    // root[0] -> list at 8; list[4] (image offset 12) -> item at 16
    assert_eq!(chunk.relocation_offsets(), vec![0, 12]);
    assert_eq!(&chunk.instance[0..4], &8u32.to_le_bytes());
    assert_eq!(&chunk.instance[12..16], &16u32.to_le_bytes());
}

#[test]
fn table_order_is_owner_then_target_with_stable_ties() {
    // Children linked from the root out of address order: the table is
    // sorted by (owner, target), so entries come back in target order.
    let mut tracker = Tracker::new(16, Endianness::Little).unwrap();
    tracker.push(Some(8), 4, 1).unwrap(); // slot 1
    tracker.pop().unwrap();
    tracker.push(Some(0), 4, 1).unwrap(); // slot 2
    tracker.pop().unwrap();
    tracker.push(Some(4), 4, 1).unwrap(); // slot 3
    tracker.pop().unwrap();
    let chunk = tracker.finalize().unwrap();

    // Slot offsets: 16, 20, 24 - sources follow target order, not field order
    assert_eq!(chunk.relocation_offsets(), vec![8, 0, 4]);
}

#[test]
fn import_ties_keep_insertion_order() {
    let mut tracker = Tracker::new(12, Endianness::Little).unwrap();
    // Three imports with the same (owner, value) key
    tracker.add_reference(8, 7).unwrap();
    tracker.add_reference(0, 7).unwrap();
    tracker.add_reference(4, 7).unwrap();
    let chunk = tracker.finalize().unwrap();
    assert_eq!(chunk.import_offsets(), vec![8, 0, 4]);
}

#[test]
fn unbalanced_pops_are_rejected() {
    let mut tracker = Tracker::new(8, Endianness::Little).unwrap();
    tracker.push(None, 4, 1).unwrap();
    tracker.pop().unwrap();
    assert_eq!(tracker.pop(), Err(ReloError::StackUnderflow));
    // The root scope is intact and the image still finalizes
    assert!(tracker.finalize().is_ok());
}

#[test]
fn audio_record_shape_round_trips() {
    // The shape this builder exists for: a header with an embedded subtitle
    // string, an opaque codec header blob, and an engine-resolved event id.
    const OFF_SUBTITLE: usize = 4;
    const OFF_BLOB: usize = 12;
    const OFF_EVENT: usize = 16;

    let mut tracker = Tracker::new(20, Endianness::Big).unwrap();
    marshal::write_string(&mut tracker, OFF_SUBTITLE, "DIALOGEVENT:IntroSubTitle").unwrap();
    marshal::write_blob(&mut tracker, OFF_BLOB, &[1, 2, 3, 4, 5, 6]).unwrap();
    tracker.add_reference(OFF_EVENT, 0x0000_BEEF).unwrap();
    let chunk = tracker.finalize().unwrap();

    // 20-byte root + 28-byte string payload (25 + NUL, rounded) + 8-byte blob
    assert_eq!(chunk.instance.len(), 56);
    assert_eq!(chunk.relocation_offsets(), vec![8, 12]);
    assert_eq!(chunk.import_offsets(), vec![16]);
    // Subtitle pointer -> 20, blob pointer -> 48, all big-endian
    assert_eq!(&chunk.instance[8..12], &20u32.to_be_bytes());
    assert_eq!(&chunk.instance[12..16], &48u32.to_be_bytes());
    assert_eq!(&chunk.instance[16..20], &0x0000_BEEFu32.to_be_bytes());
    assert_eq!(&chunk.instance[20..45], b"DIALOGEVENT:IntroSubTitle");
    assert_eq!(chunk.instance[45], 0);
}
