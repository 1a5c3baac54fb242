//! Configuration for the prediction engine.
//!
//! This module defines every knob the engine exposes. It provides:
//! 1. **Defaults:** Baseline geometry and predictor parameters.
//! 2. **Structures:** Cache geometry plus per-predictor sections (`hawkeye`, `dbcp`).
//! 3. **Enums:** Replacement policy and prefetcher selection.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built with
//! `Config::default()`. Validation happens in `Config::from_json` and again in
//! every constructor, so a hand-built structure cannot bypass it.

use serde::Deserialize;

use crate::common::error::{ConfigError, Result};

/// Default configuration constants.
mod defaults {
    /// Default cache size in bytes (32 KiB).
    pub const CACHE_SIZE: usize = 32 * 1024;

    /// Default cache line size in bytes (64 bytes).
    pub const CACHE_LINE: usize = 64;

    /// Default cache associativity.
    pub const CACHE_WAYS: usize = 8;

    /// Default prefetch degree (1 line per trigger).
    pub const PREFETCH_DEGREE: usize = 1;

    /// Width of the Hawkeye re-reference prediction value.
    pub const RRPV_BITS: u32 = 3;

    /// OPTgen history length as a multiple of the associativity.
    pub const HISTORY_MULTIPLIER: usize = 8;

    /// DBCP history table entries.
    pub const HISTORY_TABLE_SIZE: usize = 256;

    /// DBCP dead-block table entries.
    pub const DEADBLOCK_TABLE_ENTRIES: usize = 256;

    /// DBCP dead-block table associativity.
    pub const DEADBLOCK_TABLE_ASSOC: usize = 4;

    /// DBCP confidence counter width.
    pub const CONFIDENCE_BITS: u32 = 3;

    /// DBCP confidence value for freshly installed entries.
    pub const INITIAL_CONFIDENCE: u32 = 4;

    /// DBCP confidence threshold, percent of full scale.
    pub const CONFIDENCE_THRESHOLD: u32 = 50;

    /// DBCP signature width in bits.
    pub const SIGNATURE_BITS: u32 = 12;
}

/// Cache replacement policy algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ReplacementPolicy {
    /// Least Recently Used.
    #[default]
    #[serde(alias = "LRU")]
    Lru,
    /// Random victim among valid lines.
    Random,
    /// Hawkeye: OPTgen-trained RRPV aging.
    #[serde(alias = "HawkEye")]
    Hawkeye,
}

/// Hardware prefetcher types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Prefetcher {
    /// No prefetching.
    #[default]
    None,
    /// Next-line prefetcher.
    NextLine,
    /// Dead-block correlating prefetcher.
    #[serde(alias = "DBCP")]
    Dbcp,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use optsim_engine::config::{Config, Prefetcher, ReplacementPolicy};
///
/// let json = r#"{
///     "cache": {
///         "enabled": true,
///         "size_bytes": 16384,
///         "ways": 4,
///         "policy": "Hawkeye",
///         "prefetcher": "Dbcp",
///         "dbcp": { "confidence_threshold": 75 }
///     }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cache.policy, ReplacementPolicy::Hawkeye);
/// assert_eq!(config.cache.prefetcher, Prefetcher::Dbcp);
/// assert_eq!(config.cache.dbcp.confidence_threshold, 75);
/// assert_eq!(config.cache.hawkeye.rrpv_bits, 3);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache under study.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the relevant
    /// validation error for out-of-range parameters.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()
    }
}

/// Cache geometry and predictor selection.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Enable this cache.
    #[serde(default)]
    pub enabled: bool,

    /// Total cache size in bytes.
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes.
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways).
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Replacement policy.
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Hardware prefetcher type.
    #[serde(default)]
    pub prefetcher: Prefetcher,

    /// Prefetch degree for the next-line prefetcher.
    #[serde(default = "CacheConfig::default_prefetch_degree")]
    pub prefetch_degree: usize,

    /// Hawkeye parameters; ignored by the other policies.
    #[serde(default)]
    pub hawkeye: HawkeyeConfig,

    /// DBCP parameters; ignored by the other prefetchers.
    #[serde(default)]
    pub dbcp: DbcpConfig,
}

impl CacheConfig {
    /// Returns the default cache size in bytes.
    const fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    const fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default associativity.
    const fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default prefetch degree.
    const fn default_prefetch_degree() -> usize {
        defaults::PREFETCH_DEGREE
    }

    /// Number of sets implied by the geometry.
    pub const fn num_sets(&self) -> usize {
        if self.line_bytes == 0 || self.ways == 0 {
            return 0;
        }
        self.size_bytes / self.line_bytes / self.ways
    }

    /// Validates the geometry and the selected predictor sections.
    ///
    /// # Errors
    ///
    /// Returns an error for zero or non-power-of-two line sizes, zero ways,
    /// a size too small for one set, or an invalid predictor section.
    pub fn validate(&self) -> Result<()> {
        if !self.line_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "line_bytes",
                value: self.line_bytes,
            });
        }
        if self.ways == 0 {
            return Err(ConfigError::ZeroSize { what: "ways" });
        }
        if self.num_sets() == 0 {
            return Err(ConfigError::ZeroSize { what: "sets" });
        }
        if self.policy == ReplacementPolicy::Hawkeye {
            self.hawkeye.validate()?;
        }
        if self.prefetcher == Prefetcher::Dbcp {
            self.dbcp.validate()?;
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            policy: ReplacementPolicy::default(),
            prefetcher: Prefetcher::default(),
            prefetch_degree: defaults::PREFETCH_DEGREE,
            hawkeye: HawkeyeConfig::default(),
            dbcp: DbcpConfig::default(),
        }
    }
}

/// Hawkeye replacement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HawkeyeConfig {
    /// Width of the per-line RRPV counter.
    #[serde(default = "HawkeyeConfig::default_rrpv_bits")]
    pub rrpv_bits: u32,

    /// OPTgen history length as a multiple of the associativity.
    #[serde(default = "HawkeyeConfig::default_history_multiplier")]
    pub history_multiplier: usize,
}

impl HawkeyeConfig {
    const fn default_rrpv_bits() -> u32 {
        defaults::RRPV_BITS
    }

    const fn default_history_multiplier() -> usize {
        defaults::HISTORY_MULTIPLIER
    }

    /// Validates the section.
    ///
    /// # Errors
    ///
    /// Returns an error if `rrpv_bits` or `history_multiplier` is zero.
    pub const fn validate(&self) -> Result<()> {
        if self.rrpv_bits == 0 {
            return Err(ConfigError::ZeroCounterWidth);
        }
        if self.history_multiplier == 0 {
            return Err(ConfigError::ZeroSize {
                what: "history_multiplier",
            });
        }
        Ok(())
    }
}

impl Default for HawkeyeConfig {
    fn default() -> Self {
        Self {
            rrpv_bits: defaults::RRPV_BITS,
            history_multiplier: defaults::HISTORY_MULTIPLIER,
        }
    }
}

/// Dead-block correlating prefetcher parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DbcpConfig {
    /// Entries in the untagged per-block history table.
    #[serde(default = "DbcpConfig::default_history_table_size")]
    pub history_table_size: usize,

    /// Total entries in the tagged dead-block table.
    #[serde(default = "DbcpConfig::default_table_entries")]
    pub table_entries: usize,

    /// Associativity of the dead-block table.
    #[serde(default = "DbcpConfig::default_table_assoc")]
    pub table_assoc: usize,

    /// Width of the confidence counters.
    #[serde(default = "DbcpConfig::default_confidence_bits")]
    pub confidence_bits: u32,

    /// Confidence given to a freshly installed entry.
    #[serde(default = "DbcpConfig::default_initial_confidence")]
    pub initial_confidence: u32,

    /// Minimum confidence, in percent of full scale, required to act.
    #[serde(default = "DbcpConfig::default_confidence_threshold")]
    pub confidence_threshold: u32,

    /// Width of correlation signatures.
    #[serde(default = "DbcpConfig::default_signature_bits")]
    pub signature_bits: u32,
}

impl DbcpConfig {
    const fn default_history_table_size() -> usize {
        defaults::HISTORY_TABLE_SIZE
    }

    const fn default_table_entries() -> usize {
        defaults::DEADBLOCK_TABLE_ENTRIES
    }

    const fn default_table_assoc() -> usize {
        defaults::DEADBLOCK_TABLE_ASSOC
    }

    const fn default_confidence_bits() -> u32 {
        defaults::CONFIDENCE_BITS
    }

    const fn default_initial_confidence() -> u32 {
        defaults::INITIAL_CONFIDENCE
    }

    const fn default_confidence_threshold() -> u32 {
        defaults::CONFIDENCE_THRESHOLD
    }

    const fn default_signature_bits() -> u32 {
        defaults::SIGNATURE_BITS
    }

    /// Confidence threshold as a fraction of full scale.
    pub fn threshold_fraction(&self) -> f64 {
        f64::from(self.confidence_threshold) / 100.0
    }

    /// Validates the section.
    ///
    /// # Errors
    ///
    /// Returns an error for zero-sized tables, an entry count that does not
    /// split into whole sets, a zero or over-wide signature, or a threshold
    /// outside `0..=100`. Counter width and initial value are checked when
    /// the counter is built.
    pub const fn validate(&self) -> Result<()> {
        if self.history_table_size == 0 {
            return Err(ConfigError::ZeroSize {
                what: "history_table_size",
            });
        }
        if self.table_entries == 0 {
            return Err(ConfigError::ZeroSize {
                what: "table_entries",
            });
        }
        if self.table_assoc == 0 {
            return Err(ConfigError::ZeroSize { what: "table_assoc" });
        }
        if self.table_entries % self.table_assoc != 0 {
            return Err(ConfigError::UnevenSets {
                entries: self.table_entries,
                assoc: self.table_assoc,
            });
        }
        if self.signature_bits == 0 {
            return Err(ConfigError::ZeroSize {
                what: "signature_bits",
            });
        }
        if self.signature_bits > 64 {
            return Err(ConfigError::CounterTooWide {
                bits: self.signature_bits,
                max: 64,
            });
        }
        if self.confidence_threshold > 100 {
            return Err(ConfigError::PercentOutOfRange {
                what: "confidence_threshold",
                value: self.confidence_threshold,
            });
        }
        Ok(())
    }
}

impl Default for DbcpConfig {
    fn default() -> Self {
        Self {
            history_table_size: defaults::HISTORY_TABLE_SIZE,
            table_entries: defaults::DEADBLOCK_TABLE_ENTRIES,
            table_assoc: defaults::DEADBLOCK_TABLE_ASSOC,
            confidence_bits: defaults::CONFIDENCE_BITS,
            initial_confidence: defaults::INITIAL_CONFIDENCE,
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            signature_bits: defaults::SIGNATURE_BITS,
        }
    }
}
