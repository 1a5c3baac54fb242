//! OPTgen: an online reconstruction of Belady's optimal replacement.
//!
//! OPTgen answers one question per access: *would this re-reference have hit
//! under optimal replacement with `ways` lines of capacity?* It keeps a ring
//! of occupancy counters, one slot per access to the set, covering the last
//! `H = ways × multiplier` accesses. When a block is re-referenced and its
//! live range (the arc between its previous access and now) never had `ways`
//! other protected blocks in flight, MIN would have kept it, so the access is
//! a hit and the arc is charged one unit of occupancy.
//!
//! Blocks with no usable history are *averse*: a cold block must prove it is
//! reused before it is protected.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `predict()`: O(H)
//!   - `insert()`: O(H)
//!   - `remove()`: O(1) amortised
//! - **Space Complexity:** O(H + K) where K is the number of tracked keys

use std::collections::HashMap;

use tracing::trace;

use crate::common::error::{ConfigError, Result};

/// Outcome of an oracle query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prediction {
    /// Optimal replacement would have kept the block: protect it.
    Friendly,
    /// Optimal replacement would have evicted the block, or nothing is known.
    Averse,
}

impl Prediction {
    /// Returns `true` for [`Prediction::Friendly`].
    #[inline]
    pub const fn is_friendly(self) -> bool {
        matches!(self, Self::Friendly)
    }
}

impl From<bool> for Prediction {
    fn from(friendly: bool) -> Self {
        if friendly { Self::Friendly } else { Self::Averse }
    }
}

/// Per-set optimal-replacement oracle.
#[derive(Clone, Debug)]
pub struct OptGen {
    /// Occupancy ring; every value stays within `0..=capacity`.
    occupancy: Vec<u32>,
    /// Logical access time of each key's most recent insert.
    last_seen: HashMap<u64, u64>,
    /// Number of inserts since construction or the last reset.
    clock: u64,
    /// Way count; a slot at this value is full.
    capacity: u32,
}

impl OptGen {
    /// Creates an oracle for a set of `ways` ways with a history of
    /// `ways * history_multiplier` accesses.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroSize`] if either argument is zero.
    pub fn new(ways: usize, history_multiplier: usize) -> Result<Self> {
        if ways == 0 {
            return Err(ConfigError::ZeroSize { what: "ways" });
        }
        if history_multiplier == 0 {
            return Err(ConfigError::ZeroSize {
                what: "history_multiplier",
            });
        }
        Ok(Self {
            occupancy: vec![0; ways * history_multiplier],
            last_seen: HashMap::new(),
            clock: 0,
            capacity: u32::try_from(ways).unwrap_or(u32::MAX),
        })
    }

    /// Ring length `H`.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.occupancy.len()
    }

    /// Way count the oracle simulates.
    #[inline]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Current ring write position.
    #[inline]
    pub fn cursor(&self) -> usize {
        (self.clock % self.occupancy.len() as u64) as usize
    }

    /// Occupancy counter at ring position `slot`, if in range.
    pub fn occupancy(&self, slot: usize) -> Option<u32> {
        self.occupancy.get(slot).copied()
    }

    /// Number of keys with a recorded position.
    pub fn tracked_keys(&self) -> usize {
        self.last_seen.len()
    }

    /// Ring position of `key`'s previous access, if it is still inside the window.
    ///
    /// A position older than `H` accesses has been overwritten by the ring and
    /// no longer describes the key's live range.
    fn live_start(&self, key: u64) -> Option<usize> {
        let seen = *self.last_seen.get(&key)?;
        let len = self.occupancy.len() as u64;
        (self.clock - seen < len).then_some((seen % len) as usize)
    }

    /// Predicts whether a re-reference of `key` now would hit under MIN.
    ///
    /// Walks `last_seen + 1 ..= cursor`; an empty arc is friendly.
    pub fn predict(&self, key: u64) -> Prediction {
        let Some(start) = self.live_start(key) else {
            trace!(key, "optgen: no history, averse");
            return Prediction::Averse;
        };
        let len = self.occupancy.len();
        let cursor = self.cursor();
        let mut slot = start;
        while slot != cursor {
            slot = (slot + 1) % len;
            if self.occupancy[slot] >= self.capacity {
                trace!(key, slot, "optgen: arc full, averse");
                return Prediction::Averse;
            }
        }
        Prediction::Friendly
    }

    /// Records an access to `key`.
    ///
    /// Opens a fresh slot for this access. When the key has a live range in
    /// the window and the access was predicted friendly, every slot strictly
    /// between the previous access and the new one is charged, saturating at
    /// the way count.
    pub fn insert(&mut self, key: u64, was_friendly: bool) {
        let start = self.live_start(key);
        let len = self.occupancy.len();

        self.clock += 1;
        let cursor = self.cursor();
        self.occupancy[cursor] = 0;

        if let (Some(start), true) = (start, was_friendly) {
            let mut slot = (start + 1) % len;
            while slot != cursor {
                if self.occupancy[slot] < self.capacity {
                    self.occupancy[slot] += 1;
                }
                slot = (slot + 1) % len;
            }
        }

        let _ = self.last_seen.insert(key, self.clock);
    }

    /// Forgets `key`'s position; counters are left to age out with the ring.
    pub fn remove(&mut self, key: u64) {
        let _ = self.last_seen.remove(&key);
    }

    /// Clears all history.
    pub fn reset(&mut self) {
        self.occupancy.fill(0);
        self.last_seen.clear();
        self.clock = 0;
    }
}
