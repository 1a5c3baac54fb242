//! Next-Line Prefetcher.
//!
//! A simple spatial prefetcher that fetches the next sequential cache line(s)
//! whenever a cache access occurs. It is the baseline the dead-block
//! correlator is compared against: same trigger, no prediction of which
//! block is dying.

use super::{BlockInvalidator, Prefetcher};
use crate::common::AccessInfo;

/// Next-Line Prefetcher state.
#[derive(Debug, Clone)]
pub struct NextLinePrefetcher {
    /// Size of a cache line in bytes.
    line_bytes: u64,
    /// Number of subsequent lines to prefetch (prefetch degree).
    degree: usize,
}

impl NextLinePrefetcher {
    /// Creates a new Next-Line prefetcher.
    ///
    /// # Arguments
    ///
    /// * `line_bytes` - The size of a cache line in bytes.
    /// * `degree` - The number of lines to prefetch ahead; zero is treated as one.
    pub fn new(line_bytes: usize, degree: usize) -> Self {
        Self {
            line_bytes: line_bytes as u64,
            degree: degree.max(1),
        }
    }
}

impl Prefetcher for NextLinePrefetcher {
    /// Returns the `degree` blocks following the accessed one.
    fn observe(
        &mut self,
        access: &AccessInfo,
        _hit: bool,
        _cache: &mut dyn BlockInvalidator,
    ) -> Vec<u64> {
        let base = access.block_address(self.line_bytes);
        (1..=self.degree as u64)
            .map(|k| base.wrapping_add(self.line_bytes * k))
            .collect()
    }
}
