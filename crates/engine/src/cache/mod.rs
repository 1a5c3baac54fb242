//! Set-Associative Cache Container.
//!
//! This module hosts the prediction engine. `CacheSim` keeps tags and
//! validity for a set-associative cache, asks its replacement policy for
//! victims, and feeds every demand access to an optional prefetcher. It
//! models residency only: there is no latency, no dirty state and no
//! next level.
//!
//! The oracle (`optgen`) and the tagged predictor table (`assoc`) live here
//! as well because both are indexed the way the cache is.

/// Tagged set-associative table with pluggable eviction.
pub mod assoc;

/// OPTgen optimal-replacement oracle.
pub mod optgen;

/// Cache replacement policy implementations (LRU, Random, Hawkeye).
pub mod policies;

use tracing::{debug, trace};

use self::policies::{ReplacementPolicy, instantiate};
use crate::common::{AccessInfo, LineId, Result, block_address};
use crate::config::{CacheConfig, Prefetcher as PrefetcherType};
use crate::prefetch::{BlockInvalidator, DbcpPrefetcher, NextLinePrefetcher, Prefetcher};
use crate::stats::CacheStats;

/// Tag and validity of one cache line, kept per security domain.
///
/// A secure and a non-secure copy of the same block are distinct lines.
#[derive(Clone, Copy, Debug, Default)]
struct CacheLine {
    tag: u64,
    secure: bool,
    valid: bool,
}

/// Result of one demand access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Whether the block was resident.
    pub hit: bool,
    /// Block address displaced by the demand fill, if any.
    pub evicted: Option<u64>,
    /// Prefetch candidates returned by the prefetcher.
    pub prefetches: Vec<u64>,
}

/// Tags, validity and replacement state.
///
/// Split from [`CacheSim`] so the prefetcher can be handed the tag store as a
/// [`BlockInvalidator`] while the container still owns the prefetcher.
#[derive(Debug)]
struct TagStore {
    lines: Vec<CacheLine>,
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    policy: Box<dyn ReplacementPolicy>,
    stats: CacheStats,
}

impl TagStore {
    /// Splits `addr` into `(set, tag)`.
    const fn locate(&self, addr: u64) -> (usize, u64) {
        let set = ((addr as usize) / self.line_bytes) % self.num_sets;
        let tag = addr / (self.line_bytes * self.num_sets) as u64;
        (set, tag)
    }

    /// Block address held by a line with `tag` in `set`.
    const fn rebuild(&self, set: usize, tag: u64) -> u64 {
        (tag * self.num_sets as u64 + set as u64) * self.line_bytes as u64
    }

    fn find(&self, addr: u64, secure: bool) -> Option<LineId> {
        let (set, tag) = self.locate(addr);
        (0..self.ways).map(|way| LineId::new(set, way)).find(|id| {
            let line = &self.lines[id.flat(self.ways)];
            line.valid && line.tag == tag && line.secure == secure
        })
    }

    /// Installs the block containing `addr`, returning the displaced block.
    fn install(&mut self, addr: u64, secure: bool) -> Option<u64> {
        let (set, tag) = self.locate(addr);
        let candidates: Vec<LineId> = (0..self.ways).map(|way| LineId::new(set, way)).collect();
        let victim = self
            .policy
            .get_victim(&candidates)
            .unwrap_or(LineId::new(set, 0));

        let slot = victim.flat(self.ways);
        let evicted = self.lines[slot]
            .valid
            .then(|| self.rebuild(set, self.lines[slot].tag));
        if evicted.is_some() {
            self.stats.evictions += 1;
        }

        self.lines[slot] = CacheLine {
            tag,
            secure,
            valid: true,
        };
        self.policy.reset(victim, tag);
        self.stats.fills += 1;
        evicted
    }

    fn drop_line(&mut self, id: LineId) {
        self.lines[id.flat(self.ways)].valid = false;
        self.policy.invalidate(id);
        self.stats.invalidations += 1;
    }

    fn drop_block(&mut self, block_addr: u64, secure: bool) -> bool {
        self.find(block_addr, secure).is_some_and(|id| {
            self.drop_line(id);
            true
        })
    }
}

/// Only prefetchers reach the tag store through this interface, so every
/// call is a dead-block prediction.
impl BlockInvalidator for TagStore {
    fn invalidate_block(&mut self, block_addr: u64, secure: bool) -> bool {
        self.stats.dead_predictions += 1;
        self.drop_block(block_addr, secure)
    }
}

/// Cache simulator hosting a replacement policy and an optional prefetcher.
#[derive(Debug)]
pub struct CacheSim {
    /// When false, accesses bypass this cache and report a miss.
    pub enabled: bool,
    tags: TagStore,
    prefetcher: Option<Box<dyn Prefetcher>>,
}

impl CacheSim {
    /// Creates a new cache simulator with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Cache configuration specifying size, associativity,
    ///   line size, replacement policy, and prefetcher
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry or the selected predictor section is
    /// invalid.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let num_sets = config.num_sets();
        let ways = config.ways;

        let policy = instantiate(config.policy, num_sets, ways, &config.hawkeye)?;

        let prefetcher: Option<Box<dyn Prefetcher>> = match config.prefetcher {
            PrefetcherType::NextLine => Some(Box::new(NextLinePrefetcher::new(
                config.line_bytes,
                config.prefetch_degree,
            ))),
            PrefetcherType::Dbcp => Some(Box::new(DbcpPrefetcher::new(
                config.line_bytes,
                &config.dbcp,
            )?)),
            PrefetcherType::None => None,
        };
        debug!(
            num_sets,
            ways,
            line_bytes = config.line_bytes,
            policy = ?config.policy,
            prefetcher = ?config.prefetcher,
            "cache ready"
        );

        Ok(Self {
            enabled: config.enabled,
            tags: TagStore {
                lines: vec![CacheLine::default(); num_sets * ways],
                num_sets,
                ways,
                line_bytes: config.line_bytes,
                policy,
                stats: CacheStats::default(),
            },
            prefetcher,
        })
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        self.tags.num_sets
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.tags.ways
    }

    /// Collected statistics.
    pub const fn stats(&self) -> CacheStats {
        self.tags.stats
    }

    /// Set index of `addr`.
    pub const fn set_of(&self, addr: u64) -> usize {
        self.tags.locate(addr).0
    }

    /// Slot currently holding the non-secure copy of `addr`, if resident.
    pub fn line_of(&self, addr: u64) -> Option<LineId> {
        self.line_in(addr, false)
    }

    /// Slot currently holding `addr` in the given security domain.
    pub fn line_in(&self, addr: u64, secure: bool) -> Option<LineId> {
        if !self.enabled {
            return None;
        }
        self.tags.find(addr, secure)
    }

    /// Checks if the cache contains the non-secure copy of `addr`.
    pub fn contains(&self, addr: u64) -> bool {
        self.line_of(addr).is_some()
    }

    /// Checks if the cache contains `addr` in the given security domain.
    pub fn contains_in(&self, addr: u64, secure: bool) -> bool {
        self.line_in(addr, secure).is_some()
    }

    /// Accesses the cache.
    ///
    /// On a hit the line is touched; on a miss a victim is chosen and the
    /// block is filled. The prefetcher then observes the access, and any
    /// candidate not already resident is filled without being touched.
    pub fn access(&mut self, access: AccessInfo) -> AccessOutcome {
        if !self.enabled {
            return AccessOutcome::default();
        }
        self.tags.stats.accesses += 1;

        let resident = self.tags.find(access.addr, access.secure);
        let hit = resident.is_some();
        let evicted = match resident {
            Some(line) => {
                self.tags.stats.hits += 1;
                self.tags.policy.touch(line);
                None
            }
            None => {
                self.tags.stats.misses += 1;
                self.tags.install(access.addr, access.secure)
            }
        };
        trace!(addr = access.addr, secure = access.secure, hit, ?evicted, "cache access");

        let prefetches = match self.prefetcher.as_mut() {
            Some(pref) => pref.observe(&access, hit, &mut self.tags),
            None => Vec::new(),
        };
        self.tags.stats.prefetches_issued += prefetches.len() as u64;

        for &target in &prefetches {
            if self.tags.find(target, access.secure).is_none() {
                let _ = self.tags.install(target, access.secure);
                self.tags.stats.prefetch_fills += 1;
            }
        }

        AccessOutcome {
            hit,
            evicted,
            prefetches,
        }
    }

    /// Invalidates the non-secure copy of the block containing `addr`.
    ///
    /// # Returns
    ///
    /// `true` if the block was resident.
    pub fn invalidate(&mut self, addr: u64) -> bool {
        self.invalidate_in(addr, false)
    }

    /// Invalidates the block containing `addr` in the given security domain.
    ///
    /// # Returns
    ///
    /// `true` if the block was resident.
    pub fn invalidate_in(&mut self, addr: u64, secure: bool) -> bool {
        if !self.enabled {
            return false;
        }
        let block = block_address(addr, self.tags.line_bytes as u64);
        self.tags.drop_block(block, secure)
    }

    /// Invalidates every valid line.
    pub fn flush(&mut self) {
        if !self.enabled {
            return;
        }
        for set in 0..self.tags.num_sets {
            for way in 0..self.tags.ways {
                let id = LineId::new(set, way);
                if self.tags.lines[id.flat(self.tags.ways)].valid {
                    self.tags.drop_line(id);
                }
            }
        }
    }
}
