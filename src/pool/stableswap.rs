use crate::config::GasCosts;
use crate::error::{Error, MathError, StateError};
use crate::event::PoolEvent;
use crate::math::liquidity_math::add_delta;
use crate::math::sqrt_ratio::{fixed_sqrt_ratio_to_float, MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use crate::math::swap_math::{compute_step, is_price_increasing};
use crate::math::tick_math::{to_sqrt_ratio, MAX_TICK, MIN_TICK};
use crate::pool::full_range::{range_balances, FullRangePoolState, FullRangePoolSwapState};
use crate::pool::key::{PoolKey, PoolTypeConfig};
use crate::pool::quote::{Quote, SwapInfo};
use crate::pool::{targets, Pool};
use alloy_primitives::U256;
use std::sync::Arc;
use tracing::trace;

/// Tick range `[center - width, center + width]` with
/// `width = MAX_TICK >> amplification_factor`, clamped to the valid ticks.
pub fn stableswap_bounds(center_tick: i32, amplification_factor: u8) -> [i32; 2] {
    let width = MAX_TICK
        .checked_shr(u32::from(amplification_factor))
        .unwrap_or(0);

    [
        center_tick.saturating_sub(width).max(MIN_TICK),
        center_tick.saturating_add(width).min(MAX_TICK),
    ]
}

/// Full-range style pool whose liquidity only exists between two prices
/// derived from the pool's center tick and amplification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StableswapPool {
    key: Arc<PoolKey>,
    state: FullRangePoolState,
    gas: GasCosts,
    lower_price: U256,
    upper_price: U256,
}

impl StableswapPool {
    pub fn new(key: Arc<PoolKey>, state: FullRangePoolState, gas: GasCosts) -> Result<Self, Error> {
        let PoolTypeConfig::Stableswap {
            center_tick,
            amplification_factor,
        } = key.config().type_config
        else {
            return Err(StateError::InvalidPoolTypeConfig {
                extension: "none",
                pool_type: key.config().type_config.name(),
            }
            .into());
        };

        let [lower, upper] = stableswap_bounds(center_tick, amplification_factor);

        Ok(Self {
            lower_price: to_sqrt_ratio(lower)?,
            upper_price: to_sqrt_ratio(upper)?,
            key,
            state,
            gas,
        })
    }

    /// Sqrt ratios bounding the active liquidity.
    #[inline]
    pub fn price_bounds(&self) -> [U256; 2] {
        [self.lower_price, self.upper_price]
    }

    #[inline]
    pub fn liquidity(&self) -> u128 {
        self.state.liquidity
    }
}

impl Pool for StableswapPool {
    type SwapState = FullRangePoolSwapState;
    type State = FullRangePoolState;

    fn key(&self) -> &PoolKey {
        &self.key
    }

    fn state(&self) -> FullRangePoolState {
        self.state
    }

    fn swap_state(&self) -> FullRangePoolSwapState {
        self.state.swap_state
    }

    fn set_swap_state(&mut self, state: FullRangePoolSwapState) {
        self.state.swap_state = state;
    }

    fn apply_event(&mut self, event: &PoolEvent, _block_timestamp: u64) -> Result<(), Error> {
        match *event {
            PoolEvent::Swapped {
                pool_id,
                sqrt_ratio_after,
                liquidity_after,
                ..
            } if targets(&self.key, pool_id) => {
                self.state.swap_state.sqrt_ratio = sqrt_ratio_after;
                self.state.liquidity = liquidity_after;
            }
            PoolEvent::PositionUpdated {
                pool_id,
                liquidity_delta,
                ..
            } if liquidity_delta != 0 && targets(&self.key, pool_id) => {
                self.state.liquidity = add_delta(self.state.liquidity, liquidity_delta)?;
            }
            _ => {}
        }

        Ok(())
    }

    fn quote(&self, amount: i128, is_token1: bool) -> Result<Quote<FullRangePoolSwapState>, Error> {
        let is_increasing = is_price_increasing(amount, is_token1);
        let sqrt_ratio_limit = if is_increasing {
            MAX_SQRT_RATIO
        } else {
            MIN_SQRT_RATIO
        };
        let fee = self.key.fee();
        let (lower, upper) = (self.lower_price, self.upper_price);

        let mut sqrt_ratio = self.state.swap_state.sqrt_ratio;
        let mut amount_remaining = amount;
        let mut calculated_amount: u128 = 0;
        let mut fees_paid: u128 = 0;
        let mut bounds_crossed: u32 = 0;

        while amount_remaining != 0 && sqrt_ratio != sqrt_ratio_limit {
            // outside the range the price glides to the next bound for free
            let (liquidity, step_limit) = if is_increasing {
                if sqrt_ratio < lower {
                    (0, lower.min(sqrt_ratio_limit))
                } else if sqrt_ratio < upper {
                    (self.state.liquidity, upper.min(sqrt_ratio_limit))
                } else {
                    (0, sqrt_ratio_limit)
                }
            } else if sqrt_ratio > upper {
                (0, upper.max(sqrt_ratio_limit))
            } else if sqrt_ratio > lower {
                (self.state.liquidity, lower.max(sqrt_ratio_limit))
            } else {
                (0, sqrt_ratio_limit)
            };

            let step = compute_step(
                sqrt_ratio,
                liquidity,
                step_limit,
                amount_remaining,
                is_token1,
                fee,
            )?;

            amount_remaining = amount_remaining
                .checked_sub(step.consumed_amount)
                .ok_or(MathError::Overflow)?;
            calculated_amount = calculated_amount
                .checked_add(step.calculated_amount)
                .ok_or(MathError::Overflow)?;
            fees_paid = fees_paid
                .checked_add(step.fee_amount)
                .ok_or(MathError::Overflow)?;
            sqrt_ratio = step.sqrt_ratio_next;

            trace!(
                consumed = step.consumed_amount,
                calculated = step.calculated_amount,
                %sqrt_ratio,
                liquidity,
                "stableswap step"
            );

            if step_limit != sqrt_ratio_limit && sqrt_ratio == step_limit {
                bounds_crossed += 1;
            }
        }

        Ok(Quote {
            consumed_amount: amount - amount_remaining,
            calculated_amount,
            fees_paid,
            gas: self.gas.base_stableswap_swap
                + u64::from(bounds_crossed) * self.gas.initialized_tick_crossed,
            swap_info: SwapInfo {
                skip_ahead: 0,
                is_token1,
                price_limit: fixed_sqrt_ratio_to_float(sqrt_ratio_limit, is_increasing)?,
                swap_state_after: FullRangePoolSwapState { sqrt_ratio },
                tick_spacings_crossed: 0,
                initialized_ticks_crossed: bounds_crossed,
            },
        })
    }

    fn calc_balances(&self) -> Result<[U256; 2], Error> {
        range_balances(
            self.state.swap_state.sqrt_ratio,
            self.state.liquidity,
            self.lower_price,
            self.upper_price,
        )
    }
}
