//! Configuration errors.
//!
//! Every structure in the engine validates its parameters once, at
//! construction. A bad parameter is a precondition failure of the caller:
//! it is reported through [`ConfigError`] and never recovered from inside
//! the engine. Runtime conditions such as a missing program counter or an
//! unknown block key are not errors; they take a documented default branch.

use thiserror::Error;

/// Errors raised while building policies, tables and caches.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A saturating counter was configured with zero bits.
    #[error("counter width must be at least one bit")]
    ZeroCounterWidth,

    /// A saturating counter was configured wider than the engine supports.
    #[error("counter width of {bits} bits exceeds the supported maximum of {max}")]
    CounterTooWide {
        /// Requested width.
        bits: u32,
        /// Largest supported width.
        max: u32,
    },

    /// The initial value of a counter does not fit in its width.
    #[error("initial counter value {initial} exceeds the maximum {max}")]
    InitialOutOfRange {
        /// Requested initial value.
        initial: u32,
        /// Largest representable value.
        max: u32,
    },

    /// A structure that must hold at least one element was sized to zero.
    #[error("{what} must not be zero")]
    ZeroSize {
        /// Name of the offending parameter.
        what: &'static str,
    },

    /// An associative table whose entry count is not a multiple of its associativity.
    #[error("{entries} entries cannot be split into sets of {assoc} ways")]
    UnevenSets {
        /// Total entries requested.
        entries: usize,
        /// Associativity requested.
        assoc: usize,
    },

    /// A size that has to be a power of two is not.
    #[error("{what} must be a power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending parameter.
        what: &'static str,
        /// Value supplied.
        value: usize,
    },

    /// A percentage outside `0..=100`.
    #[error("{what} must be a percentage in 0..=100, got {value}")]
    PercentOutOfRange {
        /// Name of the offending parameter.
        what: &'static str,
        /// Value supplied.
        value: u32,
    },

    /// The configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result alias for fallible construction.
pub type Result<T> = std::result::Result<T, ConfigError>;
