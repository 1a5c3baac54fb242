//! Dead-Block Correlating Prefetcher (DBCP).
//!
//! DBCP predicts that a resident block has seen its last use and, when it is
//! confident, invalidates it and prefetches the block that follows it.
//!
//! Two structures cooperate:
//! - An untagged **history table**, indexed by a hash of the block address,
//!   whose entry seeds the signature of each access: the program counter and
//!   (first-time) address are folded into a copy of it. The entry is cleared
//!   when its block is predicted dead. Aliasing between blocks is accepted.
//! - A tagged **dead-block table** addressed by
//!   `block XOR encode(previous signature, pc)`. Keying on the access context
//!   rather than the address alone lets one block carry different predictions
//!   under different reuse patterns. Each entry stores the signature it
//!   expects next and a confidence counter.
//!
//! A table hit whose stored signature equals the freshly computed one is a
//! *signature match* and raises confidence; anything else lowers it, and once
//! confidence falls below the threshold the stale signature is replaced.
//! Only a match at or above the threshold triggers a dead-block prediction.
//! New entries start with the blank signature, so a context repeated three
//! times is the earliest that can be predicted dead.
//!
//! # Performance
//!
//! - **Time Complexity:** O(A) per access where A is the table associativity
//! - **Space Complexity:** O(T + E) where T is the history table size and E the
//!   dead-block table size

use std::collections::HashSet;

use tracing::{debug, trace};

use super::{BlockInvalidator, Prefetcher};
use crate::cache::assoc::AssociativeTable;
use crate::cache::policies::LruPolicy;
use crate::common::{AccessInfo, ConfigError, Result, SatCounter, encode, hash_index};
use crate::config::DbcpConfig;

/// Signature history of one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryEntry {
    signature: u64,
    prior_addresses: HashSet<u64>,
}

impl HistoryEntry {
    /// Current signature.
    pub const fn signature(&self) -> u64 {
        self.signature
    }

    /// Addresses seen during the block's current life.
    pub fn prior_addresses(&self) -> &HashSet<u64> {
        &self.prior_addresses
    }

    /// Ends the block's current life.
    pub fn invalidate(&mut self) {
        self.signature = 0;
        self.prior_addresses.clear();
    }

    /// Folds an access into the signature.
    ///
    /// The program counter is always folded in; the address only the first
    /// time it is seen in this life.
    ///
    /// # Returns
    ///
    /// The updated signature.
    pub fn update_signature(&mut self, addr: u64, pc: u64, bits: u32) -> u64 {
        let first_seen = self.prior_addresses.insert(addr);
        self.signature = encode(self.signature, pc, bits);
        if first_seen {
            self.signature = encode(self.signature, addr, bits);
        }
        self.signature
    }
}

/// Dead-block table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadBlockEntry {
    /// Signature expected on the next access in this context.
    pub signature: u64,
    /// How reliably the signature has recurred.
    pub confidence: SatCounter,
    /// Last block address this entry caused to be prefetched.
    pub prediction: u64,
}

impl DeadBlockEntry {
    const fn new(confidence: SatCounter) -> Self {
        Self {
            signature: 0,
            confidence,
            prediction: 0,
        }
    }
}

/// Activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DbcpStats {
    /// Dead-block table hits.
    pub table_hits: u64,
    /// Dead-block table misses (new entries installed).
    pub table_misses: u64,
    /// Hits whose stored signature matched.
    pub signature_matches: u64,
    /// Signatures replaced after confidence fell below threshold.
    pub signature_overwrites: u64,
    /// Blocks predicted dead (one prefetch each).
    pub dead_predictions: u64,
}

/// DBCP prefetcher state.
#[derive(Debug)]
pub struct DbcpPrefetcher {
    line_bytes: u64,
    signature_bits: u32,
    threshold: f64,
    history: Vec<HistoryEntry>,
    table: AssociativeTable<DeadBlockEntry>,
    init_confidence: SatCounter,
    stats: DbcpStats,
}

impl DbcpPrefetcher {
    /// Creates a DBCP prefetcher for blocks of `line_bytes` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid: zero-sized tables,
    /// entries that do not split into a power-of-two number of sets, a bad
    /// confidence counter, or a threshold above 100 %.
    pub fn new(line_bytes: usize, config: &DbcpConfig) -> Result<Self> {
        if !line_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "line_bytes",
                value: line_bytes,
            });
        }
        config.validate()?;
        let init_confidence = SatCounter::new(config.confidence_bits, config.initial_confidence)?;
        let sets = config.table_entries / config.table_assoc;
        let table = AssociativeTable::new(
            config.table_entries,
            config.table_assoc,
            DeadBlockEntry::new(init_confidence),
            Box::new(LruPolicy::new(sets, config.table_assoc)),
        )?;
        debug!(
            history = config.history_table_size,
            entries = config.table_entries,
            assoc = config.table_assoc,
            threshold = config.confidence_threshold,
            "dbcp ready"
        );

        Ok(Self {
            line_bytes: line_bytes as u64,
            signature_bits: config.signature_bits,
            threshold: config.threshold_fraction(),
            history: vec![HistoryEntry::default(); config.history_table_size],
            table,
            init_confidence,
            stats: DbcpStats::default(),
        })
    }

    /// Activity counters.
    pub const fn stats(&self) -> DbcpStats {
        self.stats
    }

    /// History entry that `block_addr` maps to.
    pub fn history_entry(&self, block_addr: u64) -> &HistoryEntry {
        &self.history[hash_index(block_addr, self.history.len())]
    }

    /// Dead-block table index for an access to `block_addr` from `pc` given
    /// the block's current history.
    pub fn deadblock_index(&self, block_addr: u64, pc: u64) -> u64 {
        let prior = self.history_entry(block_addr).signature();
        block_addr ^ encode(prior, pc, self.signature_bits)
    }

    /// Dead-block table entry at `index`, if present.
    pub fn table_entry(&self, index: u64, secure: bool) -> Option<&DeadBlockEntry> {
        self.table
            .find_entry(index, secure)
            .map(|id| self.table.entry(id))
    }

    /// Trains on one access and returns the blocks to prefetch.
    ///
    /// Accesses without a program counter are ignored. A dead-block
    /// prediction invalidates the accessed block through `cache`.
    pub fn calculate_prefetch(
        &mut self,
        access: &AccessInfo,
        cache: &mut dyn BlockInvalidator,
    ) -> Vec<u64> {
        let Some(pc) = access.pc else {
            trace!(addr = access.addr, "dbcp: ignoring request with no pc");
            return Vec::new();
        };

        let block = access.block_address(self.line_bytes);
        let secure = access.secure;
        let slot = hash_index(block, self.history.len());
        // Signatures are folded into a copy; the stored entry is only
        // written when the block dies, so a repeating context keeps one
        // index and one signature.
        let mut snapshot = self.history[slot].clone();
        let index = block ^ encode(snapshot.signature(), pc, self.signature_bits);
        let new_signature = snapshot.update_signature(block, pc, self.signature_bits);

        let Some(id) = self.table.find_entry(index, secure) else {
            self.stats.table_misses += 1;
            debug!(pc, block, secure, index, "dbcp miss");
            let victim = self.table.find_victim(index);
            self.table.insert_entry(
                index,
                secure,
                victim,
                DeadBlockEntry::new(self.init_confidence),
            );
            return Vec::new();
        };

        self.stats.table_hits += 1;
        self.table.access_entry(id);
        let threshold = self.threshold;
        let entry = self.table.entry_mut(id);

        let signature_match = entry.signature == new_signature && new_signature != 0;
        if signature_match {
            self.stats.signature_matches += 1;
            entry.confidence.increment();
        } else {
            entry.confidence.decrement();
            if entry.confidence.saturation() < threshold {
                entry.signature = new_signature;
                self.stats.signature_overwrites += 1;
            }
        }
        debug!(
            pc,
            block,
            secure,
            signature = new_signature,
            matched = signature_match,
            confidence = entry.confidence.value(),
            "dbcp hit"
        );

        if entry.confidence.saturation() < threshold || !signature_match {
            return Vec::new();
        }

        let target = block.wrapping_add(self.line_bytes);
        entry.prediction = target;
        self.stats.dead_predictions += 1;
        self.history[slot].invalidate();
        let dropped = cache.invalidate_block(block, secure);
        trace!(block, target, dropped, "dbcp: block predicted dead");
        vec![target]
    }
}

impl Prefetcher for DbcpPrefetcher {
    fn observe(
        &mut self,
        access: &AccessInfo,
        _hit: bool,
        cache: &mut dyn BlockInvalidator,
    ) -> Vec<u64> {
        self.calculate_prefetch(access, cache)
    }
}
