//! Online cache-behaviour prediction engine.
//!
//! This crate models a set-associative cache as a residency oracle and plugs
//! learned predictors into it:
//! 1. **Oracle:** OPTgen, an online reconstruction of Belady's optimal replacement.
//! 2. **Replacement:** Hawkeye, which trains per-line RRPVs on the oracle's verdicts,
//!    alongside LRU and Random baselines.
//! 3. **Prefetch:** the dead-block correlating prefetcher (DBCP), which invalidates
//!    blocks it predicts dead and prefetches their successors, plus a next-line baseline.
//! 4. **Infrastructure:** saturating counters, a tagged set-associative table,
//!    JSON configuration, and statistics.

/// Cache container, OPTgen oracle, tagged table, and replacement policies.
pub mod cache;
/// Common types (line identities, access descriptors, counters, hashing, errors).
pub mod common;
/// Engine configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Prefetcher interface and implementations.
pub mod prefetch;
/// Cache statistics collection and reporting.
pub mod stats;

/// Cache simulator; construct with `CacheSim::new`.
pub use crate::cache::CacheSim;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
