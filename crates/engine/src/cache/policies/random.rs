//! Random Replacement Policy.
//!
//! This policy evicts a random valid line from the candidates, after any
//! invalid candidate. It uses a xorshift generator, avoiding the overhead of a
//! complex RNG and keeping runs reproducible.

use super::ReplacementPolicy;
use crate::common::LineId;

/// Random Policy state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    /// Validity of each slot, indexed by `set * ways + way`.
    valid: Vec<bool>,
    /// Associativity.
    ways: usize,
    /// Internal state for the pseudo-random number generator.
    state: u64,
}

impl RandomPolicy {
    /// Creates a new Random policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets.
    /// * `ways` - The associativity (number of ways).
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            valid: vec![false; sets * ways],
            ways,
            state: 123456789,
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl ReplacementPolicy for RandomPolicy {
    /// Access patterns do not affect random replacement.
    fn touch(&mut self, _line: LineId) {}

    fn reset(&mut self, line: LineId, _tag: u64) {
        self.valid[line.flat(self.ways)] = true;
    }

    fn invalidate(&mut self, line: LineId) {
        self.valid[line.flat(self.ways)] = false;
    }

    fn get_victim(&mut self, candidates: &[LineId]) -> Option<LineId> {
        if candidates.is_empty() {
            return None;
        }
        if let Some(&empty) = candidates
            .iter()
            .find(|line| !self.valid[line.flat(self.ways)])
        {
            return Some(empty);
        }
        let pick = (self.next() % candidates.len() as u64) as usize;
        Some(candidates[pick])
    }
}
