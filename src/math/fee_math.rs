use crate::error::MathError;
use crate::math::math_helpers::{div_rounding_up, to_u128};
use alloy_primitives::U256;

/// Fees are fractions of `2^64`.
pub const FEE_DENOMINATOR: U256 = U256::from_limbs([0, 1, 0, 0]);

/// Fee owed on `amount` at rate `fee / 2^64`, rounded up.
#[inline]
pub fn compute_fee(amount: u128, fee: u64) -> u128 {
    let product = U256::from(amount) * U256::from(fee) + U256::from(u64::MAX);
    let limbs = (product >> 64usize).into_limbs();
    // never exceeds `amount`
    ((limbs[1] as u128) << 64) | limbs[0] as u128
}

/// Smallest gross amount which, after the fee is taken, still leaves
/// `amount_after_fee`. Fails with `Overflow` when it would not fit in 128 bits.
#[inline]
pub fn amount_before_fee(amount_after_fee: u128, fee: u64) -> Result<u128, MathError> {
    let numerator = U256::from(amount_after_fee) << 64;
    let denominator = FEE_DENOMINATOR - U256::from(fee);
    to_u128(div_rounding_up(numerator, denominator)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: u64 = 1 << 63;

    #[test]
    fn compute_fee_rounds_up() {
        assert_eq!(compute_fee(10_000, HALF), 5_000);
        assert_eq!(compute_fee(1, HALF), 1);
        assert_eq!(compute_fee(1, 1), 1);
        assert_eq!(compute_fee(0, HALF), 0);
        assert_eq!(compute_fee(123_456, 0), 0);
    }

    #[test]
    fn compute_fee_never_exceeds_amount() {
        let fee = compute_fee(u128::MAX, u64::MAX);
        assert_eq!(fee, 340282366920938463444927863358058659840);
    }

    #[test]
    fn amount_before_fee_inverts_compute_fee() {
        let gross = amount_before_fee(5_000, HALF).unwrap();
        assert_eq!(gross, 10_000);
        assert_eq!(gross - compute_fee(gross, HALF), 5_000);

        assert_eq!(amount_before_fee(777, 0).unwrap(), 777);
    }

    #[test]
    fn amount_before_fee_overflow() {
        let result = amount_before_fee(u128::MAX, HALF);
        assert!(matches!(result, Err(MathError::Overflow)));
    }
}
