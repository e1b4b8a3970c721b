use crate::error::{Error, MathError};
use crate::event::PoolEvent;
use crate::math::fee_math::{amount_before_fee, compute_fee};
use crate::math::tick_math::approximate_sqrt_ratio_to_tick;
use crate::pool::base::{BasePool, BasePoolState, BasePoolSwapState};
use crate::pool::key::PoolKey;
use crate::pool::quote::Quote;
use crate::pool::Pool;
use alloy_primitives::U256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MevCapturePoolState {
    pub base: BasePoolState,
    /// Tick at the start of the current block.
    pub last_tick: i32,
    pub swapped_this_block: bool,
}

/// Concentrated pool charging an extra fee proportional to how far a swap
/// moves the price away from where the block started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MevCapturePool {
    base: BasePool,
    last_tick: i32,
    swapped_this_block: bool,
}

impl MevCapturePool {
    pub fn new(base: BasePool) -> Self {
        Self {
            last_tick: base.active_tick(),
            base,
            swapped_this_block: false,
        }
    }

    #[inline]
    pub fn base(&self) -> &BasePool {
        &self.base
    }

    /// Extra fee for ending the swap at `tick_after`: the pool fee scaled by
    /// the number of tick spacings moved since the start of the block.
    fn additional_fee(&self, tick_after: i32) -> u64 {
        let key = self.base.key();
        let tick_spacing = key.tick_spacing();
        if tick_spacing == 0 {
            return 0;
        }

        let multiplier =
            (f64::from(tick_after) - f64::from(self.last_tick)).abs() / f64::from(tick_spacing);

        // float to int casts saturate
        (multiplier * key.fee() as f64).round() as u64
    }
}

impl Pool for MevCapturePool {
    type SwapState = BasePoolSwapState;
    type State = MevCapturePoolState;

    fn key(&self) -> &PoolKey {
        self.base.key()
    }

    fn state(&self) -> MevCapturePoolState {
        MevCapturePoolState {
            base: self.base.state(),
            last_tick: self.last_tick,
            swapped_this_block: self.swapped_this_block,
        }
    }

    fn swap_state(&self) -> BasePoolSwapState {
        self.base.swap_state()
    }

    fn set_swap_state(&mut self, state: BasePoolSwapState) {
        self.base.set_swap_state(state);
        self.swapped_this_block = true;
    }

    fn apply_event(&mut self, event: &PoolEvent, block_timestamp: u64) -> Result<(), Error> {
        self.base.apply_event(event, block_timestamp)?;

        if let PoolEvent::Swapped { pool_id, .. } = *event {
            if pool_id == self.base.key().num_id() {
                self.swapped_this_block = true;
            }
        }

        Ok(())
    }

    fn new_block(&mut self) {
        self.swapped_this_block = false;
        self.last_tick = self.base.active_tick();
    }

    fn quote(&self, amount: i128, is_token1: bool) -> Result<Quote<BasePoolSwapState>, Error> {
        let mut quote = self.base.quote(amount, is_token1)?;

        let tick_after = approximate_sqrt_ratio_to_tick(quote.swap_info.swap_state_after.sqrt_ratio);
        let additional_fee = self.additional_fee(tick_after);

        if additional_fee != 0 {
            if amount >= 0 {
                // charged on the output, outside `fees_paid` which is in input units
                quote.calculated_amount -= compute_fee(quote.calculated_amount, additional_fee);
            } else {
                let input_amount = quote.calculated_amount
                    - compute_fee(quote.calculated_amount, self.base.key().fee());
                let extra_fee = amount_before_fee(input_amount, additional_fee)? - input_amount;

                quote.calculated_amount = quote
                    .calculated_amount
                    .checked_add(extra_fee)
                    .ok_or(MathError::Overflow)?;
                quote.fees_paid = quote
                    .fees_paid
                    .checked_add(extra_fee)
                    .ok_or(MathError::Overflow)?;
            }
        }

        let gas = self.base.gas();
        quote.gas += gas.extra_base_mev_capture_swap;
        if !self.swapped_this_block {
            quote.gas += gas.accumulating_mev_capture_fees;
        }

        Ok(quote)
    }

    fn calc_balances(&self) -> Result<[U256; 2], Error> {
        self.base.calc_balances()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GasCosts;
    use crate::math::sqrt_ratio::ONE_X128;
    use crate::pool::base::ConcentratedPoolSnapshot;
    use crate::pool::key::{PoolConfig, PoolTypeConfig};
    use crate::pool::tick::Tick;
    use alloy_primitives::{address, Address};
    use std::sync::Arc;

    fn base_pool(fee: u64) -> BasePool {
        let key = PoolKey::new(
            Address::ZERO,
            Address::with_last_byte(1),
            PoolConfig {
                extension: address!("5555ff9ff2757500bf4ee020dcfd0210cffa41be"),
                fee,
                type_config: PoolTypeConfig::Concentrated { tick_spacing: 100 },
            },
        )
        .unwrap();

        BasePool::from_snapshot(
            Arc::new(key),
            ConcentratedPoolSnapshot {
                sqrt_ratio: ONE_X128,
                liquidity: 1_000_000_000_000,
                active_tick: 0,
                ticks: vec![
                    Tick::new(-100_000, 1_000_000_000_000),
                    Tick::new(100_000, -1_000_000_000_000),
                ],
                tick_bounds: [-100_000, 100_000],
            },
            GasCosts::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_no_extra_fee_without_pool_fee() {
        let base = base_pool(0);
        let pool = MevCapturePool::new(base.clone());

        let base_quote = base.quote(1_000_000_000, true).unwrap();
        let quote = pool.quote(1_000_000_000, true).unwrap();

        assert_eq!(quote.calculated_amount, base_quote.calculated_amount);
        assert_eq!(
            quote.gas,
            base_quote.gas
                + GasCosts::default().extra_base_mev_capture_swap
                + GasCosts::default().accumulating_mev_capture_fees
        );
    }

    #[test]
    fn test_price_movement_costs_extra() {
        let fee = 1 << 50;
        let base = base_pool(fee);
        let pool = MevCapturePool::new(base.clone());

        let base_in = base.quote(1_000_000_000, true).unwrap();
        let mev_in = pool.quote(1_000_000_000, true).unwrap();
        assert!(mev_in.calculated_amount > 0);
        assert!(mev_in.calculated_amount < base_in.calculated_amount);
        assert_eq!(
            mev_in.swap_info.swap_state_after,
            base_in.swap_info.swap_state_after
        );

        let base_out = base.quote(-1_000_000_000, false).unwrap();
        let mev_out = pool.quote(-1_000_000_000, false).unwrap();
        assert!(mev_out.calculated_amount > base_out.calculated_amount);
        assert!(mev_out.fees_paid > base_out.fees_paid);
    }

    #[test]
    fn test_additional_fee_scales_with_ticks_moved() {
        let pool = MevCapturePool::new(base_pool(1_000));

        assert_eq!(pool.additional_fee(0), 0);
        assert_eq!(pool.additional_fee(50), 500);
        assert_eq!(pool.additional_fee(-250), 2_500);
        assert_eq!(pool.additional_fee(15), 150);
    }

    #[test]
    fn test_block_bookkeeping() {
        let mut pool = MevCapturePool::new(base_pool(0));
        let gas = GasCosts::default();

        let first = pool.quote(1_000, true).unwrap();
        pool.set_swap_state(first.swap_info.swap_state_after);
        assert!(pool.state().swapped_this_block);
        assert_eq!(
            pool.quote(1_000, true).unwrap().gas,
            pool.base().quote(1_000, true).unwrap().gas + gas.extra_base_mev_capture_swap
        );

        let pool_id = pool.key().num_id();
        pool.apply_event(
            &PoolEvent::Swapped {
                pool_id,
                sqrt_ratio_after: ONE_X128,
                tick_after: 1_234,
                liquidity_after: 1_000_000_000_000,
            },
            0,
        )
        .unwrap();
        assert_eq!(pool.state().last_tick, 0);

        pool.new_block();
        let state = pool.state();
        assert!(!state.swapped_this_block);
        assert_eq!(state.last_tick, 1_234);
    }
}
