//! Fixed-point conversion between physical quantities and register words.
//!
//! Words are produced with `floor`, matching the truncation the firmware and
//! chips apply, so quantization error is always biased negative. Range
//! checks are the caller's job: by the time a value reaches [`encode`] the
//! legal interval for the current mode has already been resolved.
//!
//! Widths from 1 to 64 bits are supported.

use crate::error::{DriverError, Result};

/// An unsigned register word of a given significant width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointWord {
    pub bit_width: u32,
    pub value: u64,
}

impl FixedPointWord {
    /// Largest value representable in `bit_width` bits.
    pub fn max_value(bit_width: u32) -> u64 {
        1u64.checked_shl(bit_width).map_or(u64::MAX, |steps| steps - 1)
    }

    /// Shift the word into the top of a wider transport slot.
    ///
    /// The DAC delivers 14 significant bits in a 16 bit data register, so the
    /// low two bits of the register stay zero.
    pub fn left_justified(self, transport_width: u32) -> u64 {
        debug_assert!(transport_width >= self.bit_width);
        self.value
            .checked_shl(transport_width.saturating_sub(self.bit_width))
            .unwrap_or(0)
    }

    /// Undo [`left_justified`](Self::left_justified), discarding the padding bits.
    pub fn from_left_justified(raw: u64, bit_width: u32, transport_width: u32) -> Self {
        Self {
            bit_width,
            value: raw
                .checked_shr(transport_width.saturating_sub(bit_width))
                .unwrap_or(0),
        }
    }
}

/// Convert `desired` into a `bit_width` word relative to `full_scale`.
///
/// With `bipolar_offset` the symmetric interval `[-full_scale, full_scale]` is
/// re-centred onto `[0, 1)`; otherwise `[0, full_scale]` is. An input exactly
/// at the top of the interval yields the maximum word rather than wrapping.
pub fn encode(desired: f64, full_scale: f64, bit_width: u32, bipolar_offset: bool) -> FixedPointWord {
    let fraction = if bipolar_offset {
        (desired + full_scale) / (2.0 * full_scale)
    } else {
        desired / full_scale
    };

    // u128 so that one past a 64 bit maximum is still representable;
    // float to int casts saturate, so negative fractions land on 0
    let raw = (fraction * steps(bit_width)).floor() as u128;
    let max = u128::from(FixedPointWord::max_value(bit_width));
    let value = if raw == max + 1 { max } else { raw & max };

    FixedPointWord {
        bit_width,
        value: value as u64,
    }
}

/// Physical value at the bottom edge of the quantization step for `word`.
pub fn decode(word: FixedPointWord, full_scale: f64, bipolar_offset: bool) -> f64 {
    let fraction = word.value as f64 / steps(word.bit_width);
    if bipolar_offset {
        fraction * 2.0 * full_scale - full_scale
    } else {
        fraction * full_scale
    }
}

/// Size of one quantization step.
pub fn step_size(full_scale: f64, bit_width: u32, bipolar_offset: bool) -> f64 {
    let span = if bipolar_offset { 2.0 * full_scale } else { full_scale };
    span / steps(bit_width)
}

/// Number of quantization steps in `bit_width` bits, `2^bit_width`.
fn steps(bit_width: u32) -> f64 {
    2f64.powi(bit_width as i32)
}

/// Reject `value` unless it is finite and within `[min, max]`.
pub(crate) fn check_range(quantity: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(DriverError::out_of_range(quantity, value, min, max))
    }
}

/// Full-scale reference must be a positive finite number.
pub(crate) fn check_reference(quantity: &'static str, reference: f64) -> Result<()> {
    if reference.is_finite() && reference > 0.0 {
        Ok(())
    } else {
        Err(DriverError::out_of_range(quantity, reference, f64::MIN_POSITIVE, f64::MAX))
    }
}
