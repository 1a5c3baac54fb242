//! Access Descriptor and Identity Tests.
//!
//! Verifies block alignment, flat slot indexing and the `AccessInfo` builder.

use optsim_engine::common::{AccessInfo, LineId, block_address, encode};
use rstest::rstest;

#[rstest]
#[case(0x1047, 64, 0x1040)]
#[case(0x1040, 64, 0x1040)]
#[case(0x103F, 64, 0x1000)]
#[case(0xFFFF, 4096, 0xF000)]
#[case(u64::MAX, 64, 0xFFFF_FFFF_FFFF_FFC0)]
fn block_address_aligns_down(#[case] addr: u64, #[case] line: u64, #[case] expected: u64) {
    assert_eq!(block_address(addr, line), expected);
}

#[test]
fn line_id_flat_index_is_row_major() {
    assert_eq!(LineId::new(0, 0).flat(4), 0);
    assert_eq!(LineId::new(0, 3).flat(4), 3);
    assert_eq!(LineId::new(2, 3).flat(4), 11);
}

#[test]
fn line_ids_order_by_set_then_way() {
    let mut ids = vec![LineId::new(1, 0), LineId::new(0, 2), LineId::new(0, 1)];
    ids.sort();
    assert_eq!(
        ids,
        vec![LineId::new(0, 1), LineId::new(0, 2), LineId::new(1, 0)]
    );
}

#[test]
fn access_without_pc() {
    let access = AccessInfo::new(0x2000);
    assert!(!access.has_pc());
    assert_eq!(access.pc, None);
    assert!(!access.secure);
}

#[test]
fn access_with_pc_and_security_tag() {
    let access = AccessInfo::with_pc(0x1047, 0x800).secure(true);
    assert!(access.has_pc());
    assert_eq!(access.pc, Some(0x800));
    assert!(access.secure);
    assert_eq!(access.block_address(64), 0x1040);
}

#[test]
fn encode_is_addition_modulo_width() {
    assert_eq!(encode(0, 0x800, 12), 0x800);
    assert_eq!(encode(0x800, 0x1040, 12), 0x840);
    assert_eq!(encode(0x840, 0x800, 12), 0x040);
    assert_eq!(encode(0x840, 0x7C0, 12), 0);
}
