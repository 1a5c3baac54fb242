//! Cache and predictor statistics.
//!
//! This module tracks what the cache container observed while the engine ran:
//! 1. **Demand traffic:** Accesses, hits and misses.
//! 2. **Residency:** Fills, evictions and invalidations.
//! 3. **Prefetching:** Dead-block predictions, candidates issued and lines
//!    actually filled.

use std::fmt;

use serde::Serialize;

/// Counters collected by a [`CacheSim`](crate::cache::CacheSim).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Demand accesses serviced while enabled.
    pub accesses: u64,
    /// Demand hits.
    pub hits: u64,
    /// Demand misses.
    pub misses: u64,
    /// Lines installed, demand and prefetch.
    pub fills: u64,
    /// Valid lines displaced by a fill.
    pub evictions: u64,
    /// Lines dropped on request (dead-block predictions, explicit invalidates).
    pub invalidations: u64,
    /// Blocks the prefetcher predicted dead, resident or not.
    pub dead_predictions: u64,
    /// Prefetch candidates returned by the prefetcher.
    pub prefetches_issued: u64,
    /// Prefetch candidates that were not resident and got filled.
    pub prefetch_fills: u64,
}

impl CacheStats {
    /// Fraction of demand accesses that hit, `0.0` before the first access.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            return 0.0;
        }
        self.hits as f64 / self.accesses as f64
    }

    /// Serialises the counters as a JSON object.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CACHE")?;
        writeln!(f, "  accesses               {}", self.accesses)?;
        writeln!(
            f,
            "  hits                   {} ({:.2}%)",
            self.hits,
            self.hit_rate() * 100.0
        )?;
        writeln!(f, "  misses                 {}", self.misses)?;
        writeln!(f, "  fills                  {}", self.fills)?;
        writeln!(f, "  evictions              {}", self.evictions)?;
        writeln!(f, "  invalidations          {}", self.invalidations)?;
        writeln!(f, "  prefetch.dead          {}", self.dead_predictions)?;
        writeln!(f, "  prefetch.issued        {}", self.prefetches_issued)?;
        write!(f, "  prefetch.filled        {}", self.prefetch_fills)
    }
}
