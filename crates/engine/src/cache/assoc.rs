//! Tagged set-associative table.
//!
//! Fixed-capacity slot storage for predictor metadata. The table only knows
//! how to index, tag and store; which slot to give up on a miss is decided by
//! an injected [`ReplacementPolicy`], the same capability interface the cache
//! itself uses. This keeps the table's own recency bookkeeping independent of
//! whatever the stored entries predict.
//!
//! The set index is a hashed function of the full index and the tag is the
//! full index, so two indices never alias inside a set.

use super::policies::ReplacementPolicy;
use crate::common::{ConfigError, LineId, Result};

/// One slot of an [`AssociativeTable`].
#[derive(Debug, Clone)]
struct Slot<E> {
    tag: u64,
    secure: bool,
    valid: bool,
    data: E,
}

/// A tagged set-associative table of `E` with pluggable eviction.
#[derive(Debug)]
pub struct AssociativeTable<E> {
    slots: Vec<Slot<E>>,
    assoc: usize,
    set_bits: u32,
    set_mask: u64,
    /// Entry a slot is returned to when it is victimised.
    blank: E,
    policy: Box<dyn ReplacementPolicy>,
}

impl<E: Clone> AssociativeTable<E> {
    /// Creates a table of `entries` slots grouped into sets of `assoc` ways.
    ///
    /// # Arguments
    ///
    /// * `entries` - Total slot count.
    /// * `assoc` - Ways per set; `entries / assoc` must be a power of two.
    /// * `blank` - Value every slot starts with and is reset to on eviction.
    /// * `policy` - Eviction strategy sized for `entries / assoc` sets.
    ///
    /// # Errors
    ///
    /// Returns an error for zero sizes, uneven sets, or a non-power-of-two
    /// set count.
    pub fn new(
        entries: usize,
        assoc: usize,
        blank: E,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Result<Self> {
        if entries == 0 {
            return Err(ConfigError::ZeroSize { what: "entries" });
        }
        if assoc == 0 {
            return Err(ConfigError::ZeroSize { what: "assoc" });
        }
        if entries % assoc != 0 {
            return Err(ConfigError::UnevenSets { entries, assoc });
        }
        let sets = entries / assoc;
        if !sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "table sets",
                value: sets,
            });
        }
        let slot = Slot {
            tag: 0,
            secure: false,
            valid: false,
            data: blank.clone(),
        };
        Ok(Self {
            slots: vec![slot; entries],
            assoc,
            set_bits: sets.trailing_zeros(),
            set_mask: sets as u64 - 1,
            blank,
            policy,
        })
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        (self.set_mask + 1) as usize
    }

    /// Ways per set.
    pub const fn assoc(&self) -> usize {
        self.assoc
    }

    /// Set selected by `index`.
    pub const fn extract_set(&self, index: u64) -> usize {
        let hash1 = index >> 1;
        let hash2 = hash1 >> self.set_bits;
        ((hash1 ^ hash2) & self.set_mask) as usize
    }

    fn candidates(&self, set: usize) -> Vec<LineId> {
        (0..self.assoc).map(|way| LineId::new(set, way)).collect()
    }

    fn slot(&self, id: LineId) -> &Slot<E> {
        &self.slots[id.flat(self.assoc)]
    }

    fn slot_mut(&mut self, id: LineId) -> &mut Slot<E> {
        &mut self.slots[id.flat(self.assoc)]
    }

    /// Looks up the valid slot tagged `index` in the given security domain.
    pub fn find_entry(&self, index: u64, secure: bool) -> Option<LineId> {
        let set = self.extract_set(index);
        (0..self.assoc).map(|way| LineId::new(set, way)).find(|&id| {
            let slot = self.slot(id);
            slot.valid && slot.tag == index && slot.secure == secure
        })
    }

    /// Asks the eviction strategy for a slot in `index`'s set and clears it.
    ///
    /// The returned slot is invalid and holds the blank entry until
    /// [`AssociativeTable::insert_entry`] fills it.
    pub fn find_victim(&mut self, index: u64) -> LineId {
        let set = self.extract_set(index);
        let candidates = self.candidates(set);
        let victim = self
            .policy
            .get_victim(&candidates)
            .unwrap_or(LineId::new(set, 0));
        self.policy.invalidate(victim);
        let blank = self.blank.clone();
        let slot = self.slot_mut(victim);
        slot.valid = false;
        slot.data = blank;
        victim
    }

    /// Installs `data` in slot `id` under `index`.
    pub fn insert_entry(&mut self, index: u64, secure: bool, id: LineId, data: E) {
        let slot = self.slot_mut(id);
        slot.tag = index;
        slot.secure = secure;
        slot.valid = true;
        slot.data = data;
        self.policy.reset(id, index);
    }

    /// Marks slot `id` as recently used for the table's own eviction.
    pub fn access_entry(&mut self, id: LineId) {
        self.policy.touch(id);
    }

    /// Entry stored in slot `id`.
    pub fn entry(&self, id: LineId) -> &E {
        &self.slot(id).data
    }

    /// Mutable entry stored in slot `id`.
    pub fn entry_mut(&mut self, id: LineId) -> &mut E {
        &mut self.slot_mut(id).data
    }

    /// Number of valid slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.valid).count()
    }
}
