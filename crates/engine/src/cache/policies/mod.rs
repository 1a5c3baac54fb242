//! Cache Replacement Policies.
//!
//! Every policy implements the same capability interface: it is told when a
//! line is touched, filled (`reset`) or invalidated, and asked to pick a
//! victim among a set of candidate slots. Per-line replacement state is owned
//! by the policy and index-linked to the slot through [`LineId`]; the cache
//! never holds a pointer into it.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used.
//! - `Random`: Random selection.
//! - `Hawkeye`: OPTgen-trained re-reference prediction.

/// Hawkeye replacement policy.
pub mod hawkeye;

/// Least Recently Used replacement policy.
pub mod lru;

/// Random replacement policy.
pub mod random;

use std::fmt;

use tracing::debug;

pub use hawkeye::HawkeyePolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;

use crate::common::{LineId, Result};
use crate::config::{HawkeyeConfig, ReplacementPolicy as PolicyKind};

/// Trait for cache replacement policies.
pub trait ReplacementPolicy: Send + Sync + fmt::Debug {
    /// Updates the policy state when a resident line is accessed.
    fn touch(&mut self, line: LineId);

    /// Initialises the state of a line that has just been filled with `tag`.
    fn reset(&mut self, line: LineId, tag: u64);

    /// Marks a line invalid so it becomes the preferred victim.
    fn invalidate(&mut self, line: LineId);

    /// Chooses the line to evict among `candidates`.
    ///
    /// # Returns
    ///
    /// `None` only when `candidates` is empty.
    fn get_victim(&mut self, candidates: &[LineId]) -> Option<LineId>;
}

/// Builds the policy selected by `kind` for a structure of `sets × ways` slots.
///
/// # Errors
///
/// Returns an error if the Hawkeye section is invalid or the geometry is
/// empty.
pub fn instantiate(
    kind: PolicyKind,
    sets: usize,
    ways: usize,
    hawkeye: &HawkeyeConfig,
) -> Result<Box<dyn ReplacementPolicy>> {
    debug!(?kind, sets, ways, "instantiating replacement policy");
    Ok(match kind {
        PolicyKind::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyKind::Random => Box::new(RandomPolicy::new(sets, ways)),
        PolicyKind::Hawkeye => Box::new(HawkeyePolicy::new(sets, ways, hawkeye)?),
    })
}
