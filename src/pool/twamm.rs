use crate::config::GasCosts;
use crate::error::{Error, MathError, StateError};
use crate::event::PoolEvent;
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::to_u128;
use crate::math::sqrt_ratio::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use crate::math::twamm_math::calculate_next_sqrt_ratio;
use crate::pool::full_range::{FullRangePool, FullRangePoolState, FullRangePoolSwapState};
use crate::pool::key::PoolKey;
use crate::pool::quote::{Quote, SwapInfo};
use crate::pool::timed::{apply_rate_window, reconcile_execution_time, TimeRateDelta};
use crate::pool::{targets, Pool};
use alloy_primitives::U256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TwammPoolSwapState {
    pub full_range: FullRangePoolSwapState,
    pub token0_sale_rate: u128,
    pub token1_sale_rate: u128,
    pub last_execution_time: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwammPoolState {
    pub full_range: FullRangePoolState,
    pub token0_sale_rate: u128,
    pub token1_sale_rate: u128,
    pub last_execution_time: u64,
    /// Sale rate changes after `last_execution_time`, ascending by time.
    pub virtual_order_deltas: Arc<Vec<TimeRateDelta>>,
}

impl TwammPoolState {
    /// Builds the state from on-chain data, where the last execution time is
    /// only stored as its low 32 bits.
    pub fn from_onchain(
        full_range: FullRangePoolState,
        token0_sale_rate: u128,
        token1_sale_rate: u128,
        truncated_last_execution_time: u32,
        block_timestamp: u64,
        virtual_order_deltas: Vec<TimeRateDelta>,
    ) -> Self {
        Self {
            full_range,
            token0_sale_rate,
            token1_sale_rate,
            last_execution_time: reconcile_execution_time(
                block_timestamp,
                truncated_last_execution_time,
            ),
            virtual_order_deltas: Arc::new(virtual_order_deltas),
        }
    }
}

/// Full-range pool with time-weighted virtual orders that trade against it
/// continuously between executions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwammPool {
    full_range: FullRangePool,
    sale_rates: (u128, u128),
    last_execution_time: u64,
    virtual_order_deltas: Arc<Vec<TimeRateDelta>>,
}

#[inline]
fn to_amount(value: U256) -> Result<i128, MathError> {
    i128::try_from(to_u128(value)?).map_err(|_| MathError::Overflow)
}

impl TwammPool {
    pub fn new(key: Arc<PoolKey>, state: TwammPoolState, gas: GasCosts) -> Self {
        Self {
            full_range: FullRangePool::new(key, state.full_range, gas),
            sale_rates: (state.token0_sale_rate, state.token1_sale_rate),
            last_execution_time: state.last_execution_time,
            virtual_order_deltas: state.virtual_order_deltas,
        }
    }

    #[inline]
    pub fn full_range(&self) -> &FullRangePool {
        &self.full_range
    }

    #[inline]
    pub fn virtual_order_deltas(&self) -> &[TimeRateDelta] {
        &self.virtual_order_deltas
    }

    /// Quotes a swap executed at `timestamp`, after all virtual orders up to
    /// that time have traded against the pool.
    ///
    /// Timestamps before the last execution are treated as the last
    /// execution time.
    pub fn quote_at(
        &self,
        amount: i128,
        is_token1: bool,
        timestamp: u64,
    ) -> Result<Quote<TwammPoolSwapState>, Error> {
        let current_time = timestamp.max(self.last_execution_time);
        let liquidity = self.full_range.liquidity();
        let fee = self.full_range.key().fee();
        let deltas = &self.virtual_order_deltas;

        let mut next_sqrt_ratio = self.full_range.swap_state().sqrt_ratio;
        let (mut token0_sale_rate, mut token1_sale_rate) = self.sale_rates;
        let mut last_execution_time = self.last_execution_time;

        let mut next_delta_index = deltas.partition_point(|delta| delta.time <= last_execution_time);
        let mut deltas_crossed: u64 = 0;
        let mut override_state: Option<FullRangePoolSwapState> = None;

        while last_execution_time != current_time {
            let sale_rate_delta = deltas.get(next_delta_index);
            let next_execution_time =
                sale_rate_delta.map_or(current_time, |delta| delta.time.min(current_time));

            let time_elapsed = u32::try_from(next_execution_time - last_execution_time)
                .map_err(|_| StateError::TimeElapsedTooLarge)?;

            let amount0: U256 = (U256::from(token0_sale_rate) * U256::from(time_elapsed)) >> 32;
            let amount1: U256 = (U256::from(token1_sale_rate) * U256::from(time_elapsed)) >> 32;

            if !amount0.is_zero() && !amount1.is_zero() {
                let current_sqrt_ratio = next_sqrt_ratio.clamp(MIN_SQRT_RATIO, MAX_SQRT_RATIO);

                next_sqrt_ratio = calculate_next_sqrt_ratio(
                    current_sqrt_ratio,
                    liquidity,
                    token0_sale_rate,
                    token1_sale_rate,
                    time_elapsed,
                    fee,
                )?;

                let is_token1 = current_sqrt_ratio < next_sqrt_ratio;
                let amount = to_amount(if is_token1 { amount1 } else { amount0 })?;

                let quote = self.full_range.quote_with_limit_and_override(
                    amount,
                    is_token1,
                    Some(next_sqrt_ratio),
                    override_state,
                )?;
                override_state = Some(quote.swap_info.swap_state_after);
            } else if !amount0.is_zero() || !amount1.is_zero() {
                // one-sided: sells straight into the pool
                let is_token1 = amount0.is_zero();
                let amount = to_amount(if is_token1 { amount1 } else { amount0 })?;

                let quote = self.full_range.quote_with_limit_and_override(
                    amount,
                    is_token1,
                    None,
                    override_state,
                )?;
                let after = quote.swap_info.swap_state_after;
                next_sqrt_ratio = after.sqrt_ratio;
                override_state = Some(after);
            }

            if let Some(delta) = sale_rate_delta.filter(|delta| delta.time == next_execution_time) {
                token0_sale_rate = add_delta(token0_sale_rate, delta.delta0)?;
                token1_sale_rate = add_delta(token1_sale_rate, delta.delta1)?;
                next_delta_index += 1;
                deltas_crossed += 1;
            }

            last_execution_time = next_execution_time;
        }

        if current_time > self.last_execution_time {
            debug!(
                from = self.last_execution_time,
                to = current_time,
                deltas_crossed,
                "executed virtual orders"
            );
        }

        let final_quote =
            self.full_range
                .quote_with_limit_and_override(amount, is_token1, None, override_state)?;

        let gas = self.full_range.gas();
        let executed = u64::from(current_time > self.last_execution_time);

        Ok(Quote {
            consumed_amount: final_quote.consumed_amount,
            calculated_amount: final_quote.calculated_amount,
            fees_paid: final_quote.fees_paid,
            gas: final_quote.gas
                + deltas_crossed * gas.virtual_order_delta
                + executed * gas.executing_virtual_orders,
            swap_info: SwapInfo {
                skip_ahead: 0,
                is_token1,
                price_limit: final_quote.swap_info.price_limit,
                swap_state_after: TwammPoolSwapState {
                    full_range: final_quote.swap_info.swap_state_after,
                    token0_sale_rate,
                    token1_sale_rate,
                    last_execution_time: current_time,
                },
                tick_spacings_crossed: 0,
                initialized_ticks_crossed: 0,
            },
        })
    }
}

impl Pool for TwammPool {
    type SwapState = TwammPoolSwapState;
    type State = TwammPoolState;

    fn key(&self) -> &PoolKey {
        self.full_range.key()
    }

    fn state(&self) -> TwammPoolState {
        TwammPoolState {
            full_range: self.full_range.state(),
            token0_sale_rate: self.sale_rates.0,
            token1_sale_rate: self.sale_rates.1,
            last_execution_time: self.last_execution_time,
            virtual_order_deltas: Arc::clone(&self.virtual_order_deltas),
        }
    }

    fn swap_state(&self) -> TwammPoolSwapState {
        TwammPoolSwapState {
            full_range: self.full_range.swap_state(),
            token0_sale_rate: self.sale_rates.0,
            token1_sale_rate: self.sale_rates.1,
            last_execution_time: self.last_execution_time,
        }
    }

    fn set_swap_state(&mut self, state: TwammPoolSwapState) {
        self.full_range.set_swap_state(state.full_range);
        self.sale_rates = (state.token0_sale_rate, state.token1_sale_rate);
        self.last_execution_time = state.last_execution_time;
    }

    fn apply_event(&mut self, event: &PoolEvent, block_timestamp: u64) -> Result<(), Error> {
        match *event {
            PoolEvent::VirtualOrdersExecuted {
                pool_id,
                sale_rate_token0,
                sale_rate_token1,
            } => {
                if !targets(self.full_range.key(), pool_id) {
                    return Ok(());
                }
                if block_timestamp == 0 {
                    return Err(StateError::MissingBlockTimestamp.into());
                }

                self.last_execution_time = block_timestamp;
                self.sale_rates = (sale_rate_token0, sale_rate_token1);
            }
            PoolEvent::OrderUpdated {
                order_key,
                sale_rate_delta,
            } => {
                let key = self.full_range.key();
                if sale_rate_delta == 0 {
                    return Ok(());
                }
                if order_key.token0 != key.token0()
                    || order_key.token1 != key.token1()
                    || order_key.fee != key.fee()
                {
                    debug!(?order_key, "ignoring order for another pool");
                    return Ok(());
                }

                let (delta0, delta1) = if order_key.sells_token1 {
                    (0, sale_rate_delta)
                } else {
                    (sale_rate_delta, 0)
                };

                let mut deltas = Arc::clone(&self.virtual_order_deltas);
                let mut sale_rates = self.sale_rates;
                apply_rate_window(
                    Arc::make_mut(&mut deltas),
                    &mut sale_rates,
                    self.last_execution_time,
                    order_key.start_time,
                    order_key.end_time,
                    delta0,
                    delta1,
                )?;

                self.virtual_order_deltas = deltas;
                self.sale_rates = sale_rates;
            }
            _ => self.full_range.apply_event(event, block_timestamp)?,
        }

        Ok(())
    }

    /// Quotes at the current wall-clock time.
    fn quote(&self, amount: i128, is_token1: bool) -> Result<Quote<TwammPoolSwapState>, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);

        self.quote_at(amount, is_token1, now)
    }

    fn calc_balances(&self) -> Result<[U256; 2], Error> {
        self.full_range.calc_balances()
    }
}
