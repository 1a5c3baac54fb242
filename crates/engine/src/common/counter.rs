//! Saturating counter primitive.
//!
//! A counter of configurable width that clamps at `0` and `2^bits - 1`
//! instead of wrapping. It backs both the Hawkeye re-reference prediction
//! values and the dead-block confidence counters.
//!
//! # Performance
//!
//! - **Time Complexity:** O(1) for every operation
//! - **Space Complexity:** 12 bytes per counter

use super::error::{ConfigError, Result};

/// Widest counter the engine accepts.
pub const MAX_COUNTER_BITS: u32 = 32;

/// A saturating up/down counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SatCounter {
    value: u32,
    initial: u32,
    max: u32,
}

impl SatCounter {
    /// Creates a counter of width `bits` starting at `initial`.
    ///
    /// # Arguments
    ///
    /// * `bits` - Counter width, `1..=32`.
    /// * `initial` - Value restored by [`SatCounter::reset`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `bits` is zero or too wide, or if
    /// `initial` does not fit in `bits` bits.
    pub fn new(bits: u32, initial: u32) -> Result<Self> {
        if bits == 0 {
            return Err(ConfigError::ZeroCounterWidth);
        }
        if bits > MAX_COUNTER_BITS {
            return Err(ConfigError::CounterTooWide {
                bits,
                max: MAX_COUNTER_BITS,
            });
        }
        let max = u32::MAX >> (MAX_COUNTER_BITS - bits);
        if initial > max {
            return Err(ConfigError::InitialOutOfRange { initial, max });
        }
        Ok(Self {
            value: initial,
            initial,
            max,
        })
    }

    /// Current value.
    #[inline(always)]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Largest representable value.
    #[inline(always)]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Increments by one, clamping at the maximum.
    #[inline]
    pub const fn increment(&mut self) {
        if self.value < self.max {
            self.value += 1;
        }
    }

    /// Decrements by one, clamping at zero.
    #[inline]
    pub const fn decrement(&mut self) {
        self.value = self.value.saturating_sub(1);
    }

    /// Jumps straight to the maximum.
    #[inline]
    pub const fn saturate(&mut self) {
        self.value = self.max;
    }

    /// Restores the initial value.
    #[inline]
    pub const fn reset(&mut self) {
        self.value = self.initial;
    }

    /// Returns `true` when the counter sits at its maximum.
    #[inline]
    pub const fn is_saturated(&self) -> bool {
        self.value == self.max
    }

    /// Normalised position in the range, `value / max`, in `[0.0, 1.0]`.
    ///
    /// Confidence thresholds are expressed as fractions of full scale so they
    /// stay meaningful when the counter width changes.
    #[inline]
    pub fn saturation(&self) -> f64 {
        f64::from(self.value) / f64::from(self.max)
    }
}
