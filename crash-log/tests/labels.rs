mod shared;

use crash_log::{Label, LabelKind, LabelTable};

#[test]
fn resolves_inclusive_bounds() {
    let labels = shared::labels();

    for addr in [0x0040_1000, 0x0040_1001, 0x0040_1040, 0x0040_1080] {
        let label = labels.resolve(addr).expect("address should be labeled");
        assert_eq!(label.name, "Actor::Update");
        assert_eq!(label.offset_of(addr), addr - 0x0040_1000);
    }

    // The end of the range is part of the label
    assert_eq!(labels.resolve(0x0108_0024).unwrap().kind, LabelKind::VTable);
}

#[test]
fn misses_outside_every_range() {
    let labels = shared::labels();

    for addr in [0, 0x0040_0FFF, 0x0040_1081, 0x0040_10FF, 0x0108_0025, u32::MAX] {
        assert!(labels.resolve(addr).is_none(), "{addr:08x} should not resolve");
    }

    assert!(LabelTable::empty().resolve(0x0040_1000).is_none());
}

#[test]
fn first_overlapping_label_wins() {
    let overlapping = [
        Label::new(0x0050_0000, 0x100, "Outer", LabelKind::Subroutine),
        Label::new(0x0050_0080, 0x10, "Inner", LabelKind::Subroutine),
    ];
    let table = LabelTable::new(&overlapping);

    assert_eq!(table.resolve(0x0050_0088).unwrap().name, "Outer");

    let reversed = [overlapping[1], overlapping[0]];
    let table = LabelTable::new(&reversed);

    assert_eq!(table.resolve(0x0050_0088).unwrap().name, "Inner");
    // Only the outer label covers this one
    assert_eq!(table.resolve(0x0050_00F0).unwrap().name, "Outer");
}

#[test]
fn label_at_top_of_address_space() {
    let top = [Label::new(0xFFFF_FF00, 0x1000, "Wraps", LabelKind::Other)];
    let table = LabelTable::new(&top);

    assert_eq!(table.resolve(u32::MAX).unwrap().name, "Wraps");
    // A range extending past the end of the address space must not wrap
    // around to the bottom
    assert!(table.resolve(0x0000_0010).is_none());
}
