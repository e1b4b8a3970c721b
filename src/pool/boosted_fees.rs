use crate::error::{Error, MathError, StateError};
use crate::event::PoolEvent;
use crate::math::liquidity_math::add_delta;
use crate::pool::base::{BasePool, BasePoolState, BasePoolSwapState};
use crate::pool::key::PoolKey;
use crate::pool::quote::Quote;
use crate::pool::timed::{apply_rate_window, TimeRateDelta};
use crate::pool::{targets, Pool};
use alloy_primitives::U256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoostedFeesPoolSwapState {
    pub base: BasePoolSwapState,
    pub donate_rate0: u128,
    pub donate_rate1: u128,
    pub last_donate_time: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoostedFeesPoolState {
    pub base: BasePoolState,
    pub donate_rate0: u128,
    pub donate_rate1: u128,
    pub last_donate_time: u64,
    /// Donation rate changes after `last_donate_time`, ascending by time.
    pub donate_rate_deltas: Arc<Vec<TimeRateDelta>>,
}

/// Concentrated pool whose fees are topped up by a continuous donation
/// stream. Donations do not move the price; they only have to be settled
/// before a swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoostedFeesPool {
    base: BasePool,
    donate_rates: (u128, u128),
    last_donate_time: u64,
    donate_rate_deltas: Arc<Vec<TimeRateDelta>>,
}

impl BoostedFeesPool {
    pub fn new(base: BasePool, donate_rates: (u128, u128), last_donate_time: u64) -> Self {
        Self::with_deltas(base, donate_rates, last_donate_time, Vec::new())
    }

    pub fn with_deltas(
        base: BasePool,
        donate_rates: (u128, u128),
        last_donate_time: u64,
        donate_rate_deltas: Vec<TimeRateDelta>,
    ) -> Self {
        Self {
            base,
            donate_rates,
            last_donate_time,
            donate_rate_deltas: Arc::new(donate_rate_deltas),
        }
    }

    #[inline]
    pub fn base(&self) -> &BasePool {
        &self.base
    }

    #[inline]
    pub fn donate_rate_deltas(&self) -> &[TimeRateDelta] {
        &self.donate_rate_deltas
    }

    /// Quotes a swap executed at `timestamp`, after settling donations up to
    /// that time.
    pub fn quote_at(
        &self,
        amount: i128,
        is_token1: bool,
        timestamp: u64,
    ) -> Result<Quote<BoostedFeesPoolSwapState>, Error> {
        let current_time = timestamp.max(self.last_donate_time);
        let (mut donate_rate0, mut donate_rate1) = self.donate_rates;

        let start = self
            .donate_rate_deltas
            .partition_point(|delta| delta.time <= self.last_donate_time);
        let mut deltas_crossed: u64 = 0;

        for delta in self.donate_rate_deltas[start..]
            .iter()
            .take_while(|delta| delta.time <= current_time)
        {
            donate_rate0 = add_delta(donate_rate0, delta.delta0)?;
            donate_rate1 = add_delta(donate_rate1, delta.delta1)?;
            deltas_crossed += 1;
        }

        if current_time > self.last_donate_time {
            debug!(
                from = self.last_donate_time,
                to = current_time,
                deltas_crossed,
                "settled donations"
            );
        }

        let gas = self.base.gas();
        let donated = u64::from(current_time > self.last_donate_time);
        let extra_gas =
            deltas_crossed * gas.boosted_fees_donate_rate_delta + donated * gas.executing_boosted_fees;

        let mut quote = self.base.quote(amount, is_token1)?;
        quote.gas += extra_gas;

        Ok(quote.map_state(|base| BoostedFeesPoolSwapState {
            base,
            donate_rate0,
            donate_rate1,
            last_donate_time: current_time,
        }))
    }
}

impl Pool for BoostedFeesPool {
    type SwapState = BoostedFeesPoolSwapState;
    type State = BoostedFeesPoolState;

    fn key(&self) -> &PoolKey {
        self.base.key()
    }

    fn state(&self) -> BoostedFeesPoolState {
        BoostedFeesPoolState {
            base: self.base.state(),
            donate_rate0: self.donate_rates.0,
            donate_rate1: self.donate_rates.1,
            last_donate_time: self.last_donate_time,
            donate_rate_deltas: Arc::clone(&self.donate_rate_deltas),
        }
    }

    fn swap_state(&self) -> BoostedFeesPoolSwapState {
        BoostedFeesPoolSwapState {
            base: self.base.swap_state(),
            donate_rate0: self.donate_rates.0,
            donate_rate1: self.donate_rates.1,
            last_donate_time: self.last_donate_time,
        }
    }

    fn set_swap_state(&mut self, state: BoostedFeesPoolSwapState) {
        self.base.set_swap_state(state.base);
        self.donate_rates = (state.donate_rate0, state.donate_rate1);
        self.last_donate_time = state.last_donate_time;
    }

    fn apply_event(&mut self, event: &PoolEvent, block_timestamp: u64) -> Result<(), Error> {
        match *event {
            PoolEvent::FeesDonated {
                pool_id,
                donate_rate0,
                donate_rate1,
            } => {
                if !targets(self.base.key(), pool_id) {
                    return Ok(());
                }
                if block_timestamp == 0 {
                    return Err(StateError::MissingBlockTimestamp.into());
                }

                self.last_donate_time = block_timestamp;
                self.donate_rates = (donate_rate0, donate_rate1);
            }
            PoolEvent::PoolBoosted {
                pool_id,
                start_time,
                end_time,
                rate0,
                rate1,
            } => {
                if !targets(self.base.key(), pool_id) {
                    return Ok(());
                }

                let rate0 = i128::try_from(rate0).map_err(|_| MathError::Overflow)?;
                let rate1 = i128::try_from(rate1).map_err(|_| MathError::Overflow)?;

                let mut deltas = Arc::clone(&self.donate_rate_deltas);
                let mut donate_rates = self.donate_rates;
                apply_rate_window(
                    Arc::make_mut(&mut deltas),
                    &mut donate_rates,
                    self.last_donate_time,
                    start_time,
                    end_time,
                    rate0,
                    rate1,
                )?;

                self.donate_rate_deltas = deltas;
                self.donate_rates = donate_rates;
            }
            _ => self.base.apply_event(event, block_timestamp)?,
        }

        Ok(())
    }

    /// Quotes at the current wall-clock time.
    fn quote(&self, amount: i128, is_token1: bool) -> Result<Quote<BoostedFeesPoolSwapState>, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);

        self.quote_at(amount, is_token1, now)
    }

    fn calc_balances(&self) -> Result<[U256; 2], Error> {
        self.base.calc_balances()
    }
}
