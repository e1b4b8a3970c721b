use crate::error::MathError;
use crate::math::math_helpers::{div_rounding_up, mul_div, mul_div_rounding_up, to_u128};
use crate::math::sqrt_ratio::ONE_X128;
use alloy_primitives::U256;

/// Amount of token0 between two sqrt ratios for `liquidity`:
/// `L · (hi − lo) / (hi · lo)` in 128.128 fixed point.
///
/// The arguments may come in any order. Fails with `DivisionByZero` if the
/// lower ratio is zero and with `Overflow` if the result needs more than
/// 128 bits.
pub fn amount0_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, MathError> {
    let (lower, upper) = if sqrt_ratio_a < sqrt_ratio_b {
        (sqrt_ratio_a, sqrt_ratio_b)
    } else {
        (sqrt_ratio_b, sqrt_ratio_a)
    };

    if lower.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    if liquidity == 0 || lower == upper {
        return Ok(0);
    }

    let numerator1 = U256::from(liquidity) << 128;
    let numerator2 = upper - lower;

    let result = if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, upper)?, lower)?
    } else {
        mul_div(numerator1, numerator2, upper)? / lower
    };

    to_u128(result)
}

/// Amount of token1 between two sqrt ratios for `liquidity`:
/// `L · (hi − lo)` in 128.128 fixed point.
pub fn amount1_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, MathError> {
    let difference = if sqrt_ratio_a < sqrt_ratio_b {
        sqrt_ratio_b - sqrt_ratio_a
    } else {
        sqrt_ratio_a - sqrt_ratio_b
    };

    if liquidity == 0 || difference.is_zero() {
        return Ok(0);
    }

    let result = if round_up {
        mul_div_rounding_up(difference, U256::from(liquidity), ONE_X128)?
    } else {
        mul_div(difference, U256::from(liquidity), ONE_X128)?
    };

    to_u128(result)
}

/// Sqrt ratio after moving `amount` of token0 into (`amount > 0`) or out of
/// (`amount < 0`) the pool. The price only ever rounds up.
///
/// `None` means the move is not representable: zero liquidity, more output
/// than the liquidity holds, or an intermediate overflow.
pub fn next_sqrt_ratio_from_amount0(
    sqrt_ratio: U256,
    liquidity: u128,
    amount: i128,
) -> Option<U256> {
    if amount == 0 {
        return Some(sqrt_ratio);
    }
    if liquidity == 0 || sqrt_ratio.is_zero() {
        return None;
    }

    let numerator1 = U256::from(liquidity) << 128;
    let amount_abs = U256::from(amount.unsigned_abs());

    if amount < 0 {
        let product = sqrt_ratio.checked_mul(amount_abs)?;
        if product >= numerator1 {
            return None;
        }
        mul_div_rounding_up(numerator1, sqrt_ratio, numerator1 - product).ok()
    } else {
        let denominator = (numerator1 / sqrt_ratio).checked_add(amount_abs)?;
        div_rounding_up(numerator1, denominator).ok()
    }
}

/// Sqrt ratio after moving `amount` of token1 into (`amount > 0`) or out of
/// (`amount < 0`) the pool. The price only ever rounds down.
pub fn next_sqrt_ratio_from_amount1(
    sqrt_ratio: U256,
    liquidity: u128,
    amount: i128,
) -> Option<U256> {
    if amount == 0 {
        return Some(sqrt_ratio);
    }
    if liquidity == 0 {
        return None;
    }

    let shifted: U256 = U256::from(amount.unsigned_abs()) << 128;
    let (quotient, remainder) = shifted.div_rem(U256::from(liquidity));

    if amount < 0 {
        if quotient > sqrt_ratio {
            return None;
        }
        let result = sqrt_ratio - quotient;
        if remainder.is_zero() {
            Some(result)
        } else if result.is_zero() {
            None
        } else {
            Some(result - U256::ONE)
        }
    } else {
        sqrt_ratio.checked_add(quotient)
    }
}
