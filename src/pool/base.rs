use crate::config::GasCosts;
use crate::error::{Error, MathError, StateError};
use crate::event::PoolEvent;
use crate::math::liquidity_math::{add_delta, cross_tick};
use crate::math::sqrt_price_math::{amount0_delta, amount1_delta};
use crate::math::sqrt_ratio::{fixed_sqrt_ratio_to_float, MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use crate::math::swap_math::{compute_step, is_price_increasing};
use crate::math::tick_math::{
    approximate_number_of_tick_spacings_crossed, to_sqrt_ratio, MAX_TICK, MIN_TICK,
};
use crate::pool::key::PoolKey;
use crate::pool::quote::{Quote, SwapInfo};
use crate::pool::tick::{nearest_initialized_tick_index, Tick};
use crate::pool::{targets, Pool};
use alloy_primitives::U256;
use std::sync::Arc;
use tracing::{debug, trace, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BasePoolSwapState {
    pub sqrt_ratio: U256,
    pub liquidity: u128,
    /// Greatest initialized tick at or below the price, if any.
    pub active_tick_index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasePoolState {
    pub swap_state: BasePoolSwapState,
    /// Strictly ascending. Shared between clones until modified.
    pub sorted_ticks: Arc<Vec<Tick>>,
    /// Range whose ticks are known; the two bound ticks carry the net
    /// liquidity of everything outside it.
    pub tick_bounds: [i32; 2],
    pub active_tick: i32,
}

impl BasePoolState {
    /// Adds `liquidity_delta` at `tick_number` (negated for an upper bound).
    ///
    /// A tick whose delta reaches zero is removed unless it is one of the
    /// bounds. Without `force_insert`, a new tick outside the known range is
    /// folded into the nearest bound instead of being inserted.
    pub fn update_tick(
        &mut self,
        tick_number: i32,
        liquidity_delta: i128,
        upper: bool,
        force_insert: bool,
    ) -> Result<(), MathError> {
        let liquidity_delta = if upper {
            liquidity_delta.checked_neg().ok_or(MathError::Overflow)?
        } else {
            liquidity_delta
        };

        let tick_bounds = self.tick_bounds;
        let active_tick = self.active_tick;
        let active_tick_index = &mut self.swap_state.active_tick_index;
        let ticks = Arc::make_mut(&mut self.sorted_ticks);

        let nearest = nearest_initialized_tick_index(ticks, tick_number);

        match nearest {
            Some(index) if ticks[index].number == tick_number => {
                let tick = &mut ticks[index];
                tick.liquidity_delta = tick
                    .liquidity_delta
                    .checked_add(liquidity_delta)
                    .ok_or(MathError::Overflow)?;

                if tick.liquidity_delta == 0 && !tick_bounds.contains(&tick_number) {
                    ticks.remove(index);
                    debug!(tick = tick_number, "removed tick");

                    if active_tick >= tick_number {
                        *active_tick_index = active_tick_index.and_then(|i| i.checked_sub(1));
                    }
                }
            }
            _ if !force_insert && !ticks.is_empty() && nearest.map_or(true, |i| i == ticks.len() - 1) => {
                let index = if nearest.is_none() { 0 } else { ticks.len() - 1 };
                let tick = &mut ticks[index];
                tick.liquidity_delta = tick
                    .liquidity_delta
                    .checked_add(liquidity_delta)
                    .ok_or(MathError::Overflow)?;
            }
            _ => {
                let insert_at = nearest.map_or(0, |i| i + 1);
                ticks.insert(insert_at, Tick::new(tick_number, liquidity_delta));
                debug!(tick = tick_number, liquidity_delta, "inserted tick");

                if active_tick >= tick_number {
                    *active_tick_index = Some(active_tick_index.map_or(0, |i| i + 1));
                }
            }
        }

        Ok(())
    }

    /// Inserts the two bound ticks with deltas that reconcile the known ticks
    /// with the active liquidity, so the deltas sum to zero and liquidity
    /// outside the known range is accounted for.
    pub fn add_liquidity_cutoffs(&mut self) -> Result<(), MathError> {
        let liquidity =
            i128::try_from(self.swap_state.liquidity).map_err(|_| MathError::Overflow)?;

        let mut current_liquidity: i128 = 0;
        let mut below_active_tick = true;
        let mut active_tick_index = None;
        // net liquidity of ticks below the lower bound
        let mut liquidity_delta_min: i128 = 0;

        for (i, tick) in self.sorted_ticks.iter().enumerate() {
            if below_active_tick && self.active_tick < tick.number {
                below_active_tick = false;
                active_tick_index = i.checked_sub(1);
                liquidity_delta_min = liquidity
                    .checked_sub(current_liquidity)
                    .ok_or(MathError::Overflow)?;
                // from here on, track what has to be cut off at the upper bound
                current_liquidity = liquidity;
            }

            current_liquidity = current_liquidity
                .checked_add(tick.liquidity_delta)
                .ok_or(MathError::Overflow)?;
        }

        if below_active_tick {
            active_tick_index = self.sorted_ticks.len().checked_sub(1);
            liquidity_delta_min = liquidity
                .checked_sub(current_liquidity)
                .ok_or(MathError::Overflow)?;
            current_liquidity = liquidity;
        }

        self.swap_state.active_tick_index = active_tick_index;

        let [lower, upper] = self.tick_bounds;
        self.update_tick(lower, liquidity_delta_min, false, true)?;
        self.update_tick(upper, current_liquidity, true, true)
    }

    /// Reserves held by all ticks, each segment valued against the current
    /// price. Rounded down.
    pub fn calc_balances(&self) -> Result<[U256; 2], Error> {
        let state_sqrt_ratio = self.swap_state.sqrt_ratio;

        let mut balances = [U256::ZERO; 2];
        let mut liquidity: u128 = 0;
        let mut sqrt_ratio = MIN_SQRT_RATIO;

        for tick in self.sorted_ticks.iter() {
            let tick_sqrt_ratio = to_sqrt_ratio(tick.number)?;

            let min_amount1_sqrt_ratio = tick_sqrt_ratio.min(state_sqrt_ratio);
            let max_amount0_sqrt_ratio = state_sqrt_ratio.max(sqrt_ratio);

            if sqrt_ratio < min_amount1_sqrt_ratio {
                balances[1] += U256::from(amount1_delta(
                    sqrt_ratio,
                    min_amount1_sqrt_ratio,
                    liquidity,
                    false,
                )?);
            }
            if max_amount0_sqrt_ratio < tick_sqrt_ratio {
                balances[0] += U256::from(amount0_delta(
                    max_amount0_sqrt_ratio,
                    tick_sqrt_ratio,
                    liquidity,
                    false,
                )?);
            }

            sqrt_ratio = tick_sqrt_ratio;
            liquidity = add_delta(liquidity, tick.liquidity_delta)?;
        }

        Ok(balances)
    }
}

/// Point-in-time data for a concentrated liquidity pool, as fetched from
/// chain. Ticks outside `tick_bounds` may be missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcentratedPoolSnapshot {
    pub sqrt_ratio: U256,
    pub liquidity: u128,
    pub active_tick: i32,
    pub ticks: Vec<Tick>,
    pub tick_bounds: [i32; 2],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasePool {
    key: Arc<PoolKey>,
    state: BasePoolState,
    gas: GasCosts,
}

impl BasePool {
    /// Wraps an already consistent state.
    pub fn new(key: Arc<PoolKey>, state: BasePoolState, gas: GasCosts) -> Self {
        Self { key, state, gas }
    }

    /// Builds the pool from a fetched snapshot, repairing tick order and
    /// adding the liquidity cutoffs at the bounds.
    pub fn from_snapshot(
        key: Arc<PoolKey>,
        snapshot: ConcentratedPoolSnapshot,
        gas: GasCosts,
    ) -> Result<Self, Error> {
        let ConcentratedPoolSnapshot {
            sqrt_ratio,
            liquidity,
            active_tick,
            mut ticks,
            tick_bounds,
        } = snapshot;

        if sqrt_ratio < MIN_SQRT_RATIO || sqrt_ratio > MAX_SQRT_RATIO {
            return Err(StateError::SqrtRatioOutOfBounds.into());
        }
        if tick_bounds[0] < MIN_TICK || tick_bounds[1] > MAX_TICK || tick_bounds[0] > tick_bounds[1]
        {
            return Err(StateError::TickOutOfBounds.into());
        }

        if !ticks.windows(2).all(|pair| pair[0].number < pair[1].number) {
            warn!(pool_id = %key.num_id(), "snapshot ticks not strictly ascending, sorting");
            ticks.sort_by_key(|tick| tick.number);

            let mut merged: Vec<Tick> = Vec::with_capacity(ticks.len());
            for tick in ticks {
                match merged.last_mut() {
                    Some(last) if last.number == tick.number => {
                        last.liquidity_delta = last
                            .liquidity_delta
                            .checked_add(tick.liquidity_delta)
                            .ok_or(MathError::Overflow)?;
                    }
                    _ => merged.push(tick),
                }
            }
            ticks = merged;
        }

        let mut state = BasePoolState {
            swap_state: BasePoolSwapState {
                sqrt_ratio,
                liquidity,
                active_tick_index: None,
            },
            sorted_ticks: Arc::new(ticks),
            tick_bounds,
            active_tick,
        };

        state.add_liquidity_cutoffs()?;
        state.swap_state.active_tick_index =
            nearest_initialized_tick_index(&state.sorted_ticks, active_tick);

        Ok(Self::new(key, state, gas))
    }

    #[inline]
    pub fn key_arc(&self) -> &Arc<PoolKey> {
        &self.key
    }

    #[inline]
    pub fn gas(&self) -> &GasCosts {
        &self.gas
    }

    #[inline]
    pub fn state_ref(&self) -> &BasePoolState {
        &self.state
    }

    #[inline]
    pub fn active_tick(&self) -> i32 {
        self.state.active_tick
    }

    #[inline]
    pub fn sorted_ticks(&self) -> &[Tick] {
        &self.state.sorted_ticks
    }

    fn apply_position_update(
        state: &mut BasePoolState,
        lower: i32,
        upper: i32,
        liquidity_delta: i128,
    ) -> Result<(), Error> {
        state.update_tick(lower, liquidity_delta, false, false)?;
        state.update_tick(upper, liquidity_delta, true, false)?;

        state.swap_state.active_tick_index =
            nearest_initialized_tick_index(&state.sorted_ticks, state.active_tick);

        if state.active_tick >= lower && state.active_tick < upper {
            state.swap_state.liquidity = add_delta(state.swap_state.liquidity, liquidity_delta)?;
        }

        Ok(())
    }
}

impl Pool for BasePool {
    type SwapState = BasePoolSwapState;
    type State = BasePoolState;

    fn key(&self) -> &PoolKey {
        &self.key
    }

    fn state(&self) -> BasePoolState {
        self.state.clone()
    }

    fn swap_state(&self) -> BasePoolSwapState {
        self.state.swap_state
    }

    fn set_swap_state(&mut self, state: BasePoolSwapState) {
        self.state.swap_state = state;
    }

    fn apply_event(&mut self, event: &PoolEvent, _block_timestamp: u64) -> Result<(), Error> {
        match *event {
            PoolEvent::Swapped {
                pool_id,
                sqrt_ratio_after,
                tick_after,
                liquidity_after,
            } => {
                if !targets(&self.key, pool_id) {
                    return Ok(());
                }

                self.state.active_tick = tick_after;
                self.state.swap_state = BasePoolSwapState {
                    sqrt_ratio: sqrt_ratio_after,
                    liquidity: liquidity_after,
                    active_tick_index: nearest_initialized_tick_index(
                        &self.state.sorted_ticks,
                        tick_after,
                    ),
                };
            }
            PoolEvent::PositionUpdated {
                pool_id,
                lower,
                upper,
                liquidity_delta,
            } => {
                if liquidity_delta == 0 || !targets(&self.key, pool_id) {
                    return Ok(());
                }

                // all or nothing
                let mut state = self.state.clone();
                Self::apply_position_update(&mut state, lower, upper, liquidity_delta)?;
                self.state = state;
            }
            _ => {}
        }

        Ok(())
    }

    fn quote(&self, amount: i128, is_token1: bool) -> Result<Quote<BasePoolSwapState>, Error> {
        let BasePoolSwapState {
            mut sqrt_ratio,
            mut liquidity,
            mut active_tick_index,
        } = self.state.swap_state;
        let sorted_ticks = &self.state.sorted_ticks;
        let fee = self.key.fee();

        let is_increasing = is_price_increasing(amount, is_token1);
        let sqrt_ratio_limit = if is_increasing {
            MAX_SQRT_RATIO
        } else {
            MIN_SQRT_RATIO
        };

        let mut calculated_amount: u128 = 0;
        let mut fees_paid: u128 = 0;
        let mut initialized_ticks_crossed: u32 = 0;
        let mut amount_remaining = amount;

        let starting_sqrt_ratio = sqrt_ratio;

        while amount_remaining != 0 && sqrt_ratio != sqrt_ratio_limit {
            let next_initialized_tick = if is_increasing {
                let index = active_tick_index.map_or(0, |i| i + 1);
                sorted_ticks.get(index).map(|tick| (index, tick))
            } else {
                active_tick_index.and_then(|i| sorted_ticks.get(i).map(|tick| (i, tick)))
            };

            let next_initialized_tick = match next_initialized_tick {
                Some((index, tick)) => Some((index, tick, to_sqrt_ratio(tick.number)?)),
                None => None,
            };

            let step_sqrt_ratio_limit = match next_initialized_tick {
                Some((_, _, tick_sqrt_ratio))
                    if (tick_sqrt_ratio < sqrt_ratio_limit) == is_increasing =>
                {
                    tick_sqrt_ratio
                }
                _ => sqrt_ratio_limit,
            };

            let step = compute_step(
                sqrt_ratio,
                liquidity,
                step_sqrt_ratio_limit,
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
                "swap step"
            );

            if let Some((index, tick, tick_sqrt_ratio)) = next_initialized_tick {
                if sqrt_ratio == tick_sqrt_ratio {
                    active_tick_index = if is_increasing {
                        Some(index)
                    } else {
                        index.checked_sub(1)
                    };
                    initialized_ticks_crossed += 1;
                    liquidity = cross_tick(liquidity, tick.liquidity_delta, is_increasing)?;
                }
            }
        }

        let tick_spacing = self.key.tick_spacing();
        let tick_spacings_crossed =
            approximate_number_of_tick_spacings_crossed(starting_sqrt_ratio, sqrt_ratio, tick_spacing);

        let skip_ahead = tick_spacings_crossed
            .checked_div(initialized_ticks_crossed)
            .unwrap_or(0);

        let [lower_bound, upper_bound] = self.state.tick_bounds;
        let price_limit = if is_increasing {
            match upper_bound.checked_add(1) {
                Some(tick) if tick < MAX_TICK => to_sqrt_ratio(tick)?,
                _ => sqrt_ratio_limit,
            }
        } else {
            match lower_bound.checked_sub(1) {
                Some(tick) if tick > MIN_TICK => to_sqrt_ratio(tick)?,
                _ => sqrt_ratio_limit,
            }
        };

        let gas = self.gas.base_concentrated_liquidity_swap
            + u64::from(initialized_ticks_crossed) * self.gas.initialized_tick_crossed
            + u64::from(tick_spacings_crossed) * self.gas.tick_spacing_crossed;

        Ok(Quote {
            consumed_amount: amount - amount_remaining,
            calculated_amount,
            fees_paid,
            gas,
            swap_info: SwapInfo {
                skip_ahead,
                is_token1,
                price_limit: fixed_sqrt_ratio_to_float(price_limit, is_increasing)?,
                swap_state_after: BasePoolSwapState {
                    sqrt_ratio,
                    liquidity,
                    active_tick_index,
                },
                tick_spacings_crossed,
                initialized_ticks_crossed,
            },
        })
    }

    fn calc_balances(&self) -> Result<[U256; 2], Error> {
        self.state.calc_balances()
    }
}
