//! Common building blocks shared by the oracle, the policies and the prefetchers.
//!
//! This module provides:
//! 1. **Identities:** Block addresses and `(set, way)` line identities.
//! 2. **Access Descriptors:** The per-access record handed to policies and prefetchers.
//! 3. **Saturating Counters:** The configurable-width counter used for RRPVs and confidence.
//! 4. **Hashing:** Index mixing and the signature combiner used by the correlator.
//! 5. **Error Handling:** Configuration errors raised at construction time.

/// Block address helpers and cache line identities.
pub mod addr;

/// Saturating counter primitive.
pub mod counter;

/// Per-access descriptor.
pub mod data;

/// Configuration error type.
pub mod error;

/// Index hashing and signature encoding.
pub mod hash;

pub use addr::{LineId, block_address};
pub use counter::SatCounter;
pub use data::AccessInfo;
pub use error::{ConfigError, Result};
pub use hash::{encode, hash_index, mix64};
