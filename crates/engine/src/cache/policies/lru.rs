//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the candidate that has not been accessed for the longest
//! time. It maintains a usage stack for each set. When a line is touched or
//! filled, it is moved to the top (Most Recently Used position); an
//! invalidated line sinks to the bottom. Invalid lines are always chosen
//! before valid ones.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()` / `reset()` / `invalidate()`: O(W) where W is the number of ways
//!   - `get_victim()`: O(C × W) where C is the number of candidates
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Best Case:** Accesses with good temporal locality
//! - **Worst Case:** Scanning patterns larger than cache capacity (thrashing)

use super::ReplacementPolicy;
use crate::common::LineId;

/// LRU Policy state.
#[derive(Debug, Clone)]
pub struct LruPolicy {
    /// A vector of usage stacks (one per set).
    /// Index 0 is MRU, last index is LRU.
    usage: Vec<Vec<usize>>,
    /// Validity of each slot, indexed by `set * ways + way`.
    valid: Vec<bool>,
    /// Associativity.
    ways: usize,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets.
    /// * `ways` - The associativity (number of ways).
    pub fn new(sets: usize, ways: usize) -> Self {
        let mut usage = Vec::with_capacity(sets);
        for _ in 0..sets {
            usage.push((0..ways).collect());
        }
        Self {
            usage,
            valid: vec![false; sets * ways],
            ways,
        }
    }

    /// Moves `way` to the MRU end of its set's stack.
    fn promote(&mut self, line: LineId) {
        let stack = &mut self.usage[line.set];
        if let Some(pos) = stack.iter().position(|&x| x == line.way) {
            let _ = stack.remove(pos);
        }
        stack.insert(0, line.way);
    }

    /// Stack depth of `line`; larger is older.
    fn depth(&self, line: LineId) -> usize {
        self.usage[line.set]
            .iter()
            .position(|&x| x == line.way)
            .unwrap_or(usize::MAX)
    }
}

impl ReplacementPolicy for LruPolicy {
    fn touch(&mut self, line: LineId) {
        self.promote(line);
    }

    fn reset(&mut self, line: LineId, _tag: u64) {
        self.valid[line.flat(self.ways)] = true;
        self.promote(line);
    }

    /// Sinks the line to the LRU end of the stack.
    fn invalidate(&mut self, line: LineId) {
        self.valid[line.flat(self.ways)] = false;
        let stack = &mut self.usage[line.set];
        if let Some(pos) = stack.iter().position(|&x| x == line.way) {
            let _ = stack.remove(pos);
        }
        stack.push(line.way);
    }

    /// Returns the first invalid candidate, else the deepest in the usage stack.
    fn get_victim(&mut self, candidates: &[LineId]) -> Option<LineId> {
        if let Some(&empty) = candidates
            .iter()
            .find(|line| !self.valid[line.flat(self.ways)])
        {
            return Some(empty);
        }
        candidates.iter().copied().max_by_key(|&line| self.depth(line))
    }
}
