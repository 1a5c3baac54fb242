//! Hardware Prefetcher implementations.
//!
//! This module contains the prefetcher interface and its implementations.
//! A prefetcher observes every demand access and returns block addresses to
//! bring into the cache. Dead-block prediction also needs to act on the
//! cache itself, so prefetchers receive a narrow [`BlockInvalidator`] handle
//! rather than the whole container.

/// Dead-block correlating prefetcher.
pub mod dbcp;

/// Next-line prefetcher (prefetches sequential cache lines).
pub mod next_line;

use std::fmt;

pub use self::dbcp::DbcpPrefetcher;
pub use self::next_line::NextLinePrefetcher;

use crate::common::AccessInfo;

/// Cache-side capability to drop a resident block.
pub trait BlockInvalidator {
    /// Invalidates the block at `block_addr` if it is resident in the
    /// `secure` (or non-secure) domain.
    ///
    /// # Returns
    ///
    /// `true` if a line was invalidated.
    fn invalidate_block(&mut self, block_addr: u64, secure: bool) -> bool;
}

/// Trait for cache prefetcher implementations.
pub trait Prefetcher: Send + Sync + fmt::Debug {
    /// Observes a demand access and generates prefetch addresses.
    ///
    /// # Arguments
    ///
    /// * `access` - The access being serviced.
    /// * `hit` - Whether the access hit in the cache.
    /// * `cache` - Handle used to invalidate blocks predicted dead.
    ///
    /// # Returns
    ///
    /// Block addresses to prefetch. Empty if no prefetches are needed.
    fn observe(
        &mut self,
        access: &AccessInfo,
        hit: bool,
        cache: &mut dyn BlockInvalidator,
    ) -> Vec<u64>;
}
