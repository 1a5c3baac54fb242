//! Block addresses and line identities.
//!
//! The engine never looks at byte offsets: every structure is indexed by the
//! block-aligned address or by the `(set, way)` slot a block occupies.

/// Identity of a line slot inside a set-associative structure.
///
/// Replacement state is index-linked to the slot rather than pointed to from
/// the line, so the identity doubles as the handle passed to policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LineId {
    /// Set index.
    pub set: usize,
    /// Way index within the set.
    pub way: usize,
}

impl LineId {
    /// Creates a line identity.
    #[inline(always)]
    pub const fn new(set: usize, way: usize) -> Self {
        Self { set, way }
    }

    /// Flat slot index for a structure with `ways` ways per set.
    #[inline(always)]
    pub const fn flat(self, ways: usize) -> usize {
        self.set * ways + self.way
    }
}

/// Aligns `addr` down to the start of its block.
///
/// # Arguments
///
/// * `addr` - Byte address.
/// * `line_bytes` - Block size in bytes; must be a power of two.
///
/// # Returns
///
/// The block-aligned address.
#[inline(always)]
pub const fn block_address(addr: u64, line_bytes: u64) -> u64 {
    addr & !(line_bytes - 1)
}
