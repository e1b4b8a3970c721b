//! Conversions between the 256-bit fixed-point sqrt ratio (`√price · 2^128`)
//! and the 96-bit compact float the protocol stores on-chain.
//!
//! The compact float keeps 2 exponent bits and 94 mantissa bits; the
//! fixed value is `mantissa << (2 + 32 * exponent)`.

use crate::error::StateError;
use alloy_primitives::U256;

/// Smallest representable sqrt ratio, `to_sqrt_ratio(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([447090492618908, 1, 0, 0]);
/// Largest representable sqrt ratio, `to_sqrt_ratio(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([0, 7567914946021818368, 18446296994052723738, 0]);

/// Compact float encoding of [`MIN_SQRT_RATIO`].
pub const MIN_FLOAT_SQRT_RATIO: u128 = 4611797791050542631;
/// Compact float encoding of [`MAX_SQRT_RATIO`].
pub const MAX_FLOAT_SQRT_RATIO: u128 = 79227682466138141934206691491;

/// `2^128`, the fixed-point one.
pub const ONE_X128: U256 = U256::from_limbs([0, 0, 1, 0]);

const MANTISSA_BITS: usize = 94;
const MANTISSA_MASK: u128 = (1 << MANTISSA_BITS) - 1;

/// Expands a compact float sqrt ratio into its fixed-point value.
#[inline]
pub fn float_sqrt_ratio_to_fixed(float: u128) -> U256 {
    let exponent = ((float >> MANTISSA_BITS) & 0b11) as usize;
    U256::from(float & MANTISSA_MASK) << (2 + 32 * exponent)
}

/// Packs a fixed-point sqrt ratio into the compact float, choosing the
/// smallest exponent that can hold it.
///
/// With `round_up` the discarded low bits round the mantissa up, so the
/// float never falls below `value`. Values needing more than 94 mantissa
/// bits at the largest exponent fail with `SqrtRatioContainerOverflow`.
pub fn fixed_sqrt_ratio_to_float(value: U256, round_up: bool) -> Result<u128, StateError> {
    for exponent in 0..4usize {
        let shift = 2 + 32 * exponent;
        let addend = if round_up {
            (U256::ONE << shift) - U256::ONE
        } else {
            U256::ZERO
        };

        let Some(adjusted) = value.checked_add(addend) else {
            break;
        };

        if adjusted < U256::ONE << (MANTISSA_BITS + shift) {
            let mantissa = adjusted >> shift;
            let limbs = mantissa.as_limbs();
            let mantissa = ((limbs[1] as u128) << 64) | limbs[0] as u128;
            return Ok(((exponent as u128) << MANTISSA_BITS) | mantissa);
        }
    }

    Err(StateError::SqrtRatioContainerOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_round_trip_through_float() {
        assert_eq!(
            fixed_sqrt_ratio_to_float(MIN_SQRT_RATIO, false).unwrap(),
            MIN_FLOAT_SQRT_RATIO
        );
        assert_eq!(
            fixed_sqrt_ratio_to_float(MAX_SQRT_RATIO, false).unwrap(),
            MAX_FLOAT_SQRT_RATIO
        );
        assert_eq!(float_sqrt_ratio_to_fixed(MIN_FLOAT_SQRT_RATIO), MIN_SQRT_RATIO);
        assert_eq!(float_sqrt_ratio_to_fixed(MAX_FLOAT_SQRT_RATIO), MAX_SQRT_RATIO);
    }

    #[test]
    fn one_needs_exponent_two() {
        let float = fixed_sqrt_ratio_to_float(ONE_X128, false).unwrap();
        assert_eq!(float, 39614081261743854815199363072);
        assert_eq!(float >> 94, 2);
        assert_eq!(float_sqrt_ratio_to_fixed(float), ONE_X128);
    }

    #[test]
    fn rounding_direction() {
        // 2^100 + 1 needs exponent 1 and loses its lowest 34 bits
        let value = (U256::ONE << 100) + U256::ONE;
        let down = float_sqrt_ratio_to_fixed(fixed_sqrt_ratio_to_float(value, false).unwrap());
        let up = float_sqrt_ratio_to_fixed(fixed_sqrt_ratio_to_float(value, true).unwrap());
        assert_eq!(down, U256::ONE << 100);
        assert_eq!(up, (U256::ONE << 100) + (U256::ONE << 34));
    }

    #[test]
    fn small_values_are_exact_at_exponent_zero() {
        let value = U256::from(0x1234u32) << 2;
        let float = fixed_sqrt_ratio_to_float(value, true).unwrap();
        assert_eq!(float >> 94, 0);
        assert_eq!(float_sqrt_ratio_to_fixed(float), value);
    }

    #[test]
    fn overflow_past_largest_exponent() {
        let result = fixed_sqrt_ratio_to_float(U256::MAX, false);
        assert!(matches!(result, Err(StateError::SqrtRatioContainerOverflow)));
    }
}
