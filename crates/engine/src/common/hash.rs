//! Index hashing and signature encoding.
//!
//! Two kinds of mixing are needed. Untagged tables spread block addresses
//! over their slots with a strong 64-bit finaliser, while correlation
//! signatures fold an unbounded access history into a small fixed-width
//! value with a cheap order-sensitive combiner.

/// splitmix64 finaliser.
#[inline]
pub const fn mix64(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}

/// Maps `key` onto `0..size`.
///
/// `size` must be non-zero; table constructors reject zero sizes.
#[inline]
pub const fn hash_index(key: u64, size: usize) -> usize {
    (mix64(key) % size as u64) as usize
}

/// Folds `b` into the running signature `a`, truncated to `bits` bits.
///
/// Addition modulo `2^bits`: a repeated program counter walks the signature
/// around the ring, so an access history that recurs with the same period
/// reproduces the same sequence of signatures.
#[inline]
pub const fn encode(a: u64, b: u64, bits: u32) -> u64 {
    let mask = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
    a.wrapping_add(b) & mask
}
