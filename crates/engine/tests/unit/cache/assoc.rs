//! Associative Table Tests.
//!
//! Verifies geometry checks, set extraction, the find/victim/insert protocol
//! and that eviction is delegated to the injected policy.

use mockall::predicate::eq;
use optsim_engine::cache::assoc::AssociativeTable;
use optsim_engine::cache::policies::LruPolicy;
use optsim_engine::common::{ConfigError, LineId};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::mocks::MockPolicy;

fn lru_table(entries: usize, assoc: usize) -> AssociativeTable<u32> {
    let sets = entries / assoc;
    AssociativeTable::new(entries, assoc, 0, Box::new(LruPolicy::new(sets, assoc))).unwrap()
}

fn install(table: &mut AssociativeTable<u32>, index: u64, data: u32) -> LineId {
    let id = table.find_victim(index);
    table.insert_entry(index, false, id, data);
    id
}

// ══════════════════════════════════════════════════════════
// 1. Geometry
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0, 4)]
#[case(16, 0)]
#[case(10, 4)]
#[case(12, 4)]
fn bad_geometry_rejected(#[case] entries: usize, #[case] assoc: usize) {
    let policy = Box::new(LruPolicy::new(1, assoc.max(1)));
    assert!(AssociativeTable::new(entries, assoc, 0u32, policy).is_err());
}

#[test]
fn non_power_of_two_sets_reported() {
    let policy = Box::new(LruPolicy::new(3, 4));
    assert!(matches!(
        AssociativeTable::new(12, 4, 0u32, policy),
        Err(ConfigError::NotPowerOfTwo { value: 3, .. })
    ));
}

#[test]
fn geometry_accessors() {
    let table = lru_table(16, 4);
    assert_eq!(table.num_sets(), 4);
    assert_eq!(table.assoc(), 4);
    assert_eq!(table.occupied(), 0);
}

#[rstest]
#[case(0, 0)]
#[case(2, 1)]
#[case(6, 3)]
#[case(8, 1)]
#[case(0x1840, 0)]
fn set_extraction_folds_upper_bits(#[case] index: u64, #[case] set: usize) {
    assert_eq!(lru_table(16, 4).extract_set(index), set);
}

// ══════════════════════════════════════════════════════════
// 2. Lookup protocol
// ══════════════════════════════════════════════════════════

#[test]
fn lookup_after_insert() {
    let mut table = lru_table(16, 4);
    assert_eq!(table.find_entry(42, false), None);

    let id = install(&mut table, 42, 7);
    assert_eq!(table.find_entry(42, false), Some(id));
    assert_eq!(*table.entry(id), 7);
    assert_eq!(table.occupied(), 1);
}

#[test]
fn security_domains_do_not_alias() {
    let mut table = lru_table(16, 4);
    let _ = install(&mut table, 42, 7);
    assert_eq!(table.find_entry(42, true), None);
}

#[test]
fn entries_are_mutable_in_place() {
    let mut table = lru_table(16, 4);
    let id = install(&mut table, 5, 1);
    *table.entry_mut(id) += 10;
    assert_eq!(*table.entry(table.find_entry(5, false).unwrap()), 11);
}

#[test]
fn victim_slot_is_cleared_to_blank() {
    let mut table = lru_table(4, 4);
    for index in 0..4 {
        let _ = install(&mut table, index, 100 + index as u32);
    }
    let victim = table.find_victim(99);
    assert_eq!(*table.entry(victim), 0);
    assert_eq!(table.occupied(), 3);
}

#[test]
fn lru_eviction_spares_recently_accessed() {
    // One set: every index collides.
    let mut table = lru_table(4, 4);
    let first = install(&mut table, 10, 1);
    for index in 11..14 {
        let _ = install(&mut table, index, 1);
    }
    table.access_entry(first);

    let _ = install(&mut table, 14, 1);
    assert!(table.find_entry(10, false).is_some());
    assert_eq!(table.find_entry(11, false), None);
    assert!(table.find_entry(14, false).is_some());
}

// ══════════════════════════════════════════════════════════
// 3. Injected eviction
// ══════════════════════════════════════════════════════════

#[test]
fn eviction_delegates_to_policy() {
    let chosen = LineId::new(0, 2);
    let mut policy = MockPolicy::new();
    policy
        .expect_get_victim()
        .withf(|candidates: &[LineId]| candidates.len() == 4)
        .times(1)
        .return_const(Some(chosen));
    policy
        .expect_invalidate()
        .with(eq(chosen))
        .times(1)
        .return_const(());
    policy
        .expect_reset()
        .with(eq(chosen), eq(42))
        .times(1)
        .return_const(());
    policy
        .expect_touch()
        .with(eq(chosen))
        .times(1)
        .return_const(());

    let mut table = AssociativeTable::new(4, 4, 0u32, Box::new(policy)).unwrap();
    let id = table.find_victim(42);
    assert_eq!(id, chosen);
    table.insert_entry(42, false, id, 9);
    table.access_entry(id);
}

#[test]
fn missing_victim_falls_back_to_way_zero() {
    let mut policy = MockPolicy::new();
    policy.expect_get_victim().return_const(None);
    policy.expect_invalidate().return_const(());

    let mut table = AssociativeTable::new(4, 4, 0u32, Box::new(policy)).unwrap();
    assert_eq!(table.find_victim(1), LineId::new(0, 0));
}
