use crate::error::{Error, MathError, SwapError};
use crate::math::fee_math::{amount_before_fee, compute_fee};
use crate::math::sqrt_price_math::{
    amount0_delta, amount1_delta, next_sqrt_ratio_from_amount0, next_sqrt_ratio_from_amount1,
};
use alloy_primitives::U256;

/// Outcome of a single swap step that does not cross an initialized tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapStep {
    /// Portion of the specified amount used by this step, with the same sign.
    pub consumed_amount: i128,
    /// Output for exact-in steps, required input (fees included) for exact-out.
    pub calculated_amount: u128,
    pub sqrt_ratio_next: U256,
    pub fee_amount: u128,
}

impl SwapStep {
    #[inline]
    fn noop(sqrt_ratio_next: U256) -> Self {
        Self {
            consumed_amount: 0,
            calculated_amount: 0,
            sqrt_ratio_next,
            fee_amount: 0,
        }
    }
}

/// Returns whether the price moves up for a swap of `amount` (positive for
/// exact input, negative for exact output) of token1 or token0.
#[inline(always)]
pub fn is_price_increasing(amount: i128, is_token1: bool) -> bool {
    is_token1 != (amount < 0)
}

/// Computes one swap step from `sqrt_ratio` toward `sqrt_ratio_limit` with
/// constant `liquidity`.
///
/// The step either consumes the whole `amount` before reaching the limit or
/// stops exactly at the limit. Rounding always favors the pool. A limit on
/// the wrong side of the current price fails with
/// `SwapError::WrongSwapDirection`; amounts that would not fit the on-chain
/// integer widths fail with `MathError::Overflow`.
pub fn compute_step(
    sqrt_ratio: U256,
    liquidity: u128,
    sqrt_ratio_limit: U256,
    amount: i128,
    is_token1: bool,
    fee: u64,
) -> Result<SwapStep, Error> {
    if amount == 0 || sqrt_ratio == sqrt_ratio_limit {
        return Ok(SwapStep::noop(sqrt_ratio));
    }

    let increasing = is_price_increasing(amount, is_token1);

    if (sqrt_ratio_limit > sqrt_ratio) != increasing {
        return Err(SwapError::WrongSwapDirection.into());
    }

    if liquidity == 0 {
        return Ok(SwapStep::noop(sqrt_ratio_limit));
    }

    let exact_output = amount < 0;

    let price_impact_amount = if exact_output {
        amount
    } else {
        // the fee never exceeds the amount, so this stays non-negative
        amount - compute_fee(amount.unsigned_abs(), fee) as i128
    };

    let sqrt_ratio_next = if is_token1 {
        next_sqrt_ratio_from_amount1(sqrt_ratio, liquidity, price_impact_amount)
    } else {
        next_sqrt_ratio_from_amount0(sqrt_ratio, liquidity, price_impact_amount)
    };

    if let Some(sqrt_ratio_next) = sqrt_ratio_next.filter(|&next| {
        if increasing {
            next <= sqrt_ratio_limit
        } else {
            next >= sqrt_ratio_limit
        }
    }) {
        if sqrt_ratio_next == sqrt_ratio {
            return Ok(SwapStep {
                consumed_amount: amount,
                calculated_amount: 0,
                sqrt_ratio_next: sqrt_ratio,
                fee_amount: amount.unsigned_abs(),
            });
        }

        let calculated_amount_excluding_fee = if is_token1 {
            amount0_delta(sqrt_ratio_next, sqrt_ratio, liquidity, exact_output)?
        } else {
            amount1_delta(sqrt_ratio_next, sqrt_ratio, liquidity, exact_output)?
        };

        return Ok(if exact_output {
            let including_fee = amount_before_fee(calculated_amount_excluding_fee, fee)?;
            SwapStep {
                consumed_amount: amount,
                calculated_amount: including_fee,
                sqrt_ratio_next,
                fee_amount: including_fee - calculated_amount_excluding_fee,
            }
        } else {
            SwapStep {
                consumed_amount: amount,
                calculated_amount: calculated_amount_excluding_fee,
                sqrt_ratio_next,
                fee_amount: (amount - price_impact_amount).unsigned_abs(),
            }
        });
    }

    // the limit is binding
    let (specified_amount_delta, calculated_amount_delta) = if is_token1 {
        (
            amount1_delta(sqrt_ratio_limit, sqrt_ratio, liquidity, !exact_output)?,
            amount0_delta(sqrt_ratio_limit, sqrt_ratio, liquidity, exact_output)?,
        )
    } else {
        (
            amount0_delta(sqrt_ratio_limit, sqrt_ratio, liquidity, !exact_output)?,
            amount1_delta(sqrt_ratio_limit, sqrt_ratio, liquidity, exact_output)?,
        )
    };

    if exact_output {
        let including_fee = amount_before_fee(calculated_amount_delta, fee)?;
        let consumed = i128::try_from(specified_amount_delta).map_err(|_| MathError::Overflow)?;
        Ok(SwapStep {
            consumed_amount: -consumed,
            calculated_amount: including_fee,
            sqrt_ratio_next: sqrt_ratio_limit,
            fee_amount: including_fee - calculated_amount_delta,
        })
    } else {
        let including_fee = amount_before_fee(specified_amount_delta, fee)?;
        let consumed = i128::try_from(including_fee).map_err(|_| MathError::Overflow)?;
        Ok(SwapStep {
            consumed_amount: consumed,
            calculated_amount: calculated_amount_delta,
            sqrt_ratio_next: sqrt_ratio_limit,
            fee_amount: including_fee - specified_amount_delta,
        })
    }
}
