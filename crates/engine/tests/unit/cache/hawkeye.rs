//! Hawkeye Replacement Policy Tests.
//!
//! Verifies RRPV training from the oracle, fill and invalidate handling,
//! victim selection with aging, and the RRPV bounds.

use optsim_engine::cache::policies::{HawkeyePolicy, ReplacementPolicy};
use optsim_engine::common::{ConfigError, LineId};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::builder::hawkeye;

fn line(way: usize) -> LineId {
    LineId::new(0, way)
}

fn set0(ways: usize) -> Vec<LineId> {
    (0..ways).map(line).collect()
}

/// One set of four ways, 3-bit RRPV, all ways filled.
fn filled() -> HawkeyePolicy {
    let mut policy = HawkeyePolicy::new(1, 4, &hawkeye(3, 8)).unwrap();
    for way in 0..4 {
        policy.reset(line(way), way as u64);
    }
    policy
}

fn touch_n(policy: &mut HawkeyePolicy, way: usize, n: usize) {
    for _ in 0..n {
        policy.touch(line(way));
    }
}

fn rrpvs(policy: &HawkeyePolicy) -> Vec<u32> {
    (0..4).map(|way| policy.rrpv(line(way))).collect()
}

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

#[test]
fn new_policy_has_no_valid_lines() {
    let policy = HawkeyePolicy::new(2, 4, &hawkeye(3, 8)).unwrap();
    assert_eq!(policy.rrpv_max(), 7);
    for set in 0..2 {
        for way in 0..4 {
            assert!(!policy.is_valid(LineId::new(set, way)));
        }
        assert_eq!(policy.oracle(set).unwrap().history_len(), 32);
    }
    assert!(policy.oracle(2).is_none());
}

#[rstest]
#[case(1, 4, 0, 8)]
#[case(1, 4, 33, 8)]
#[case(1, 4, 3, 0)]
#[case(0, 4, 3, 8)]
#[case(1, 0, 3, 8)]
fn invalid_geometry_rejected(
    #[case] sets: usize,
    #[case] ways: usize,
    #[case] bits: u32,
    #[case] mult: usize,
) {
    assert!(HawkeyePolicy::new(sets, ways, &hawkeye(bits, mult)).is_err());
}

#[test]
fn zero_rrpv_width_reports_counter_error() {
    assert!(matches!(
        HawkeyePolicy::new(1, 4, &hawkeye(0, 8)),
        Err(ConfigError::ZeroCounterWidth)
    ));
}

// ══════════════════════════════════════════════════════════
// 2. Fill, touch and invalidate
// ══════════════════════════════════════════════════════════

#[test]
fn fill_starts_at_max_rrpv() {
    let policy = filled();
    assert_eq!(rrpvs(&policy), vec![7, 7, 7, 7]);
    assert!(policy.is_valid(line(2)));
    assert_eq!(policy.tag(line(2)), 2);
}

#[test]
fn first_touch_after_fill_is_averse() {
    let mut policy = filled();
    policy.touch(line(1));
    assert_eq!(policy.rrpv(line(1)), 7);
    assert_eq!(policy.oracle(0).unwrap().tracked_keys(), 1);
}

#[test]
fn friendly_streak_drives_rrpv_to_zero() {
    let mut policy = filled();
    touch_n(&mut policy, 1, 1);
    for expected in (0..7).rev() {
        policy.touch(line(1));
        assert_eq!(policy.rrpv(line(1)), expected);
    }
    touch_n(&mut policy, 1, 3);
    assert_eq!(policy.rrpv(line(1)), 0);
}

#[test]
fn refill_forgets_oracle_history() {
    let mut policy = filled();
    touch_n(&mut policy, 0, 3);
    assert_eq!(policy.rrpv(line(0)), 5);

    policy.reset(line(0), 99);
    assert_eq!(policy.rrpv(line(0)), 7);
    assert_eq!(policy.tag(line(0)), 99);
    assert_eq!(policy.oracle(0).unwrap().tracked_keys(), 0);

    policy.touch(line(0));
    assert_eq!(policy.rrpv(line(0)), 7);
}

#[test]
fn invalidate_clears_validity_and_history() {
    let mut policy = filled();
    touch_n(&mut policy, 3, 2);
    policy.invalidate(line(3));
    assert!(!policy.is_valid(line(3)));
    assert_eq!(policy.oracle(0).unwrap().tracked_keys(), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Victim selection
// ══════════════════════════════════════════════════════════

#[test]
fn empty_candidates_yield_none() {
    let mut policy = filled();
    assert_eq!(policy.get_victim(&[]), None);
}

#[test]
fn invalid_line_chosen_without_aging() {
    let mut policy = HawkeyePolicy::new(1, 4, &hawkeye(3, 8)).unwrap();
    assert_eq!(policy.get_victim(&set0(4)), Some(line(0)));

    let mut policy = filled();
    touch_n(&mut policy, 0, 4);
    policy.invalidate(line(2));
    let before = rrpvs(&policy);
    assert_eq!(policy.get_victim(&set0(4)), Some(line(2)));
    assert_eq!(rrpvs(&policy), before);
}

#[test]
fn invalid_line_found_past_a_max_candidate() {
    let mut policy = filled();
    policy.invalidate(line(3));
    assert_eq!(policy.get_victim(&set0(4)), Some(line(3)));
}

#[test]
fn first_max_rrpv_wins_and_survivors_age() {
    let mut policy = filled();
    touch_n(&mut policy, 1, 3);
    touch_n(&mut policy, 2, 2);
    assert_eq!(rrpvs(&policy), vec![7, 5, 6, 7]);

    assert_eq!(policy.get_victim(&set0(4)), Some(line(0)));
    assert_eq!(rrpvs(&policy), vec![7, 6, 7, 7]);
}

#[test]
fn without_max_the_first_highest_wins() {
    let mut policy = filled();
    touch_n(&mut policy, 0, 3);
    touch_n(&mut policy, 1, 2);
    touch_n(&mut policy, 2, 4);
    touch_n(&mut policy, 3, 2);
    assert_eq!(rrpvs(&policy), vec![5, 6, 4, 6]);

    assert_eq!(policy.get_victim(&set0(4)), Some(line(1)));
    assert_eq!(rrpvs(&policy), vec![6, 6, 5, 7]);
}

#[test]
fn candidates_outside_the_list_are_untouched() {
    let mut policy = filled();
    touch_n(&mut policy, 0, 2);
    touch_n(&mut policy, 3, 2);
    assert_eq!(
        policy.get_victim(&[line(0), line(1)]),
        Some(line(1))
    );
    assert_eq!(rrpvs(&policy), vec![7, 7, 7, 6]);
}

// ══════════════════════════════════════════════════════════
// 4. Properties
// ══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum Op {
    Touch(usize),
    Fill(usize),
    Invalidate(usize),
    Victim,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..4).prop_map(Op::Touch),
        2 => (0usize..4).prop_map(Op::Fill),
        1 => (0usize..4).prop_map(Op::Invalidate),
        2 => Just(Op::Victim),
    ]
}

proptest! {
    #[test]
    fn rrpv_stays_in_range_and_survivors_never_drop(
        bits in 1u32..=4,
        ops in prop::collection::vec(op(), 1..200),
    ) {
        let mut policy = HawkeyePolicy::new(1, 4, &hawkeye(bits, 4)).unwrap();
        let max = (1u32 << bits) - 1;
        for op in ops {
            match op {
                Op::Touch(way) => policy.touch(line(way)),
                Op::Fill(way) => policy.reset(line(way), way as u64),
                Op::Invalidate(way) => policy.invalidate(line(way)),
                Op::Victim => {
                    let before = rrpvs(&policy);
                    let any_invalid = (0..4).any(|w| !policy.is_valid(line(w)));
                    let victim = policy.get_victim(&set0(4)).unwrap();
                    let after = rrpvs(&policy);
                    if any_invalid {
                        prop_assert!(!policy.is_valid(victim));
                    } else {
                        prop_assert_eq!(after[victim.way], *before.iter().max().unwrap());
                    }
                    for way in 0..4 {
                        prop_assert!(after[way] >= before[way]);
                    }
                }
            }
            for way in 0..4 {
                prop_assert!(policy.rrpv(line(way)) <= max);
            }
        }
    }
}
