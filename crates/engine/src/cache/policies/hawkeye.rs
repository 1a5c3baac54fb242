//! Hawkeye Replacement Policy.
//!
//! Hawkeye learns from an OPTgen oracle which lines optimal replacement would
//! have kept and turns that into a per-line re-reference prediction value
//! (RRPV). A line the oracle calls *friendly* is pulled toward RRPV 0 and
//! protected; an *averse* line is pushed toward the maximum and evicted first.
//! Newly filled lines start at the maximum and have to earn protection.
//!
//! Each set owns one oracle. The oracle is keyed by the way a line occupies:
//! a fill clears the way's history, so every arc the oracle sees for a way
//! belongs to the block currently resident in it.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(H) where H is the oracle history length
//!   - `reset()` / `invalidate()`: O(1)
//!   - `get_victim()`: O(C) where C is the number of candidates
//! - **Space Complexity:** O(S × (W + H))

use tracing::{debug, trace};

use super::ReplacementPolicy;
use crate::cache::optgen::OptGen;
use crate::common::{ConfigError, LineId, Result, SatCounter};
use crate::config::HawkeyeConfig;

/// Replacement state of one line slot.
#[derive(Debug, Clone, Copy)]
struct HawkeyeLine {
    valid: bool,
    rrpv: SatCounter,
    set: usize,
    way: usize,
    /// Advisory; eviction never looks at it.
    tag: u64,
}

impl HawkeyeLine {
    const fn key(&self) -> u64 {
        self.way as u64
    }
}

/// Hawkeye policy state.
#[derive(Debug, Clone)]
pub struct HawkeyePolicy {
    /// One entry per slot, indexed by `set * ways + way`.
    lines: Vec<HawkeyeLine>,
    /// One oracle per set.
    oracles: Vec<OptGen>,
    ways: usize,
}

impl HawkeyePolicy {
    /// Creates a Hawkeye policy for `sets × ways` slots.
    ///
    /// # Errors
    ///
    /// Returns an error if `rrpv_bits` is zero or too wide, if the history
    /// multiplier is zero, or if `ways` is zero.
    pub fn new(sets: usize, ways: usize, config: &HawkeyeConfig) -> Result<Self> {
        config.validate()?;
        if sets == 0 {
            return Err(ConfigError::ZeroSize { what: "sets" });
        }
        let rrpv = SatCounter::new(config.rrpv_bits, 0)?;
        let oracle = OptGen::new(ways, config.history_multiplier)?;

        let mut lines = Vec::with_capacity(sets * ways);
        for set in 0..sets {
            for way in 0..ways {
                lines.push(HawkeyeLine {
                    valid: false,
                    rrpv,
                    set,
                    way,
                    tag: 0,
                });
            }
        }
        debug!(
            sets,
            ways,
            rrpv_max = rrpv.max(),
            history = oracle.history_len(),
            "hawkeye ready"
        );

        Ok(Self {
            lines,
            oracles: vec![oracle; sets],
            ways,
        })
    }

    fn line(&self, line: LineId) -> &HawkeyeLine {
        &self.lines[line.flat(self.ways)]
    }

    fn line_mut(&mut self, line: LineId) -> &mut HawkeyeLine {
        &mut self.lines[line.flat(self.ways)]
    }

    /// Current RRPV of `line`.
    pub fn rrpv(&self, line: LineId) -> u32 {
        self.line(line).rrpv.value()
    }

    /// Largest RRPV a line can hold.
    pub fn rrpv_max(&self) -> u32 {
        self.lines.first().map_or(0, |l| l.rrpv.max())
    }

    /// Whether `line` currently holds data.
    pub fn is_valid(&self, line: LineId) -> bool {
        self.line(line).valid
    }

    /// Tag recorded at the last fill of `line`.
    pub fn tag(&self, line: LineId) -> u64 {
        self.line(line).tag
    }

    /// The oracle of `set`.
    pub fn oracle(&self, set: usize) -> Option<&OptGen> {
        self.oracles.get(set)
    }
}

impl ReplacementPolicy for HawkeyePolicy {
    /// Trains the line on its oracle's verdict and records the access.
    fn touch(&mut self, line: LineId) {
        let state = *self.line(line);
        let oracle = &mut self.oracles[state.set];
        let prediction = oracle.predict(state.key());
        let friendly = prediction.is_friendly();
        oracle.insert(state.key(), friendly);

        let entry = self.line_mut(line);
        if friendly {
            entry.rrpv.decrement();
        } else {
            entry.rrpv.increment();
        }
        trace!(
            set = line.set,
            way = line.way,
            ?prediction,
            rrpv = entry.rrpv.value(),
            "hawkeye touch"
        );
    }

    /// Drops the way's stale history and starts the new block cache-averse.
    fn reset(&mut self, line: LineId, tag: u64) {
        let key = self.line(line).key();
        self.oracles[line.set].remove(key);
        let entry = self.line_mut(line);
        entry.rrpv.saturate();
        entry.valid = true;
        entry.tag = tag;
    }

    fn invalidate(&mut self, line: LineId) {
        let key = self.line(line).key();
        self.oracles[line.set].remove(key);
        self.line_mut(line).valid = false;
    }

    /// Picks an invalid candidate if there is one, otherwise the candidate
    /// with the highest RRPV, then ages the survivors.
    fn get_victim(&mut self, candidates: &[LineId]) -> Option<LineId> {
        let mut best: Option<(LineId, u32)> = None;
        let mut at_max: Option<LineId> = None;

        for &candidate in candidates {
            let state = self.line(candidate);
            if !state.valid {
                return Some(candidate);
            }
            let rrpv = state.rrpv.value();
            if at_max.is_none() && state.rrpv.is_saturated() {
                at_max = Some(candidate);
            }
            if best.is_none_or(|(_, top)| rrpv > top) {
                best = Some((candidate, rrpv));
            }
        }

        let victim = at_max.or(best.map(|(line, _)| line))?;

        for &candidate in candidates {
            if candidate == victim {
                continue;
            }
            let entry = self.line_mut(candidate);
            if !entry.rrpv.is_saturated() {
                entry.rrpv.increment();
            }
        }
        Some(victim)
    }
}
