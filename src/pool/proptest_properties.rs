//! Property-based tests for the pool quoting invariants.
//!
//! 1. **Conservation**: liquidity cutoffs leave tick deltas summing to zero,
//!    and a quote never consumes more than specified nor pays out more than
//!    the pool holds.
//! 2. **Price direction**: selling token1 never lowers the price, selling
//!    token0 never raises it.
//! 3. **Zero-fee round trip**: buying back the output of an exact-in swap
//!    never costs more than the original input (up to one unit of rounding),
//!    and swapping it back never returns more.
//! 4. **Zero amount**: quoting nothing leaves everything untouched.
//! 5. **Checkpoint split**: executing virtual orders in one go or in two
//!    parts split at a checkpoint gives the same result.

use proptest::prelude::*;

use crate::config::GasCosts;
use crate::math::sqrt_ratio::{MAX_SQRT_RATIO, MIN_SQRT_RATIO, ONE_X128};
use crate::math::swap_math::compute_step;
use crate::math::tick_math::to_sqrt_ratio;
use crate::pool::base::{BasePool, BasePoolState, BasePoolSwapState, ConcentratedPoolSnapshot};
use crate::pool::full_range::{FullRangePool, FullRangePoolState};
use crate::pool::key::{PoolConfig, PoolKey, PoolTypeConfig};
use crate::pool::tick::Tick;
use crate::pool::timed::TimeRateDelta;
use crate::pool::twamm::{TwammPool, TwammPoolState};
use crate::pool::Pool;
use alloy_primitives::{Address, U256};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Pool factories
// ---------------------------------------------------------------------------

fn make_key(fee: u64, type_config: PoolTypeConfig) -> Arc<PoolKey> {
    let Ok(key) = PoolKey::new(
        Address::ZERO,
        Address::with_last_byte(1),
        PoolConfig {
            extension: Address::ZERO,
            fee,
            type_config,
        },
    ) else {
        panic!("valid pool key");
    };
    Arc::new(key)
}

/// Two stacked positions around tick 0, the inner one `inner` ticks wide.
fn make_concentrated(liquidity: u128, inner: i32, fee: u64) -> BasePool {
    let outer = inner * 4;
    let delta = liquidity as i128;
    let Ok(pool) = BasePool::from_snapshot(
        make_key(fee, PoolTypeConfig::Concentrated { tick_spacing: 1 }),
        ConcentratedPoolSnapshot {
            sqrt_ratio: ONE_X128,
            liquidity: liquidity * 2,
            active_tick: 0,
            ticks: vec![
                Tick::new(-outer, delta),
                Tick::new(-inner, delta),
                Tick::new(inner, -delta),
                Tick::new(outer, -delta),
            ],
            tick_bounds: [-outer, outer],
        },
        GasCosts::default(),
    ) else {
        panic!("valid concentrated pool");
    };
    pool
}

fn make_full_range(liquidity: u128, tick: i32, fee: u64) -> FullRangePool {
    let Ok(sqrt_ratio) = to_sqrt_ratio(tick) else {
        panic!("valid tick");
    };
    let Ok(state) = FullRangePoolState::new(sqrt_ratio, liquidity) else {
        panic!("valid full range state");
    };
    FullRangePool::new(make_key(fee, PoolTypeConfig::FullRange), state, GasCosts::default())
}

fn liquidity_strategy() -> impl Strategy<Value = u128> {
    1_000_000u128..1_000_000_000_000_000_000
}

fn amount_strategy() -> impl Strategy<Value = i128> {
    1i128..1_000_000_000_000_000_000_000
}

// ---------------------------------------------------------------------------
// Conservation and price direction
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_cutoffs_balance_deltas(
        raw_ticks in prop::collection::btree_map(-999i32..999, -1_000_000_000_000i128..1_000_000_000_000, 0..16),
        liquidity in 0u128..1_000_000_000_000_000,
        active_tick in -1_000i32..1_000,
    ) {
        let ticks = raw_ticks
            .into_iter()
            .filter(|&(_, delta)| delta != 0)
            .map(|(number, delta)| Tick::new(number, delta))
            .collect::<Vec<_>>();
        let mut state = BasePoolState {
            swap_state: BasePoolSwapState {
                sqrt_ratio: ONE_X128,
                liquidity,
                active_tick_index: None,
            },
            sorted_ticks: Arc::new(ticks),
            tick_bounds: [-1_000, 1_000],
            active_tick,
        };
        if state.add_liquidity_cutoffs().is_err() {
            return Ok(());
        }

        let sum: i128 = state.sorted_ticks.iter().map(|tick| tick.liquidity_delta).sum();
        prop_assert_eq!(sum, 0);
        prop_assert!(state.sorted_ticks.windows(2).all(|w| w[0].number < w[1].number));
    }

    #[test]
    fn prop_quote_conserves_amounts(
        liquidity in liquidity_strategy(),
        inner in 10i32..50_000,
        amount in amount_strategy(),
        is_token1 in any::<bool>(),
        fee in 0u64..(1 << 62),
    ) {
        let pool = make_concentrated(liquidity, inner, fee);
        let Ok(quote) = pool.quote(amount, is_token1) else {
            return Ok(());
        };
        let Ok(balances) = pool.calc_balances() else {
            return Ok(());
        };

        prop_assert!(quote.consumed_amount >= 0 && quote.consumed_amount <= amount);
        prop_assert!(quote.fees_paid <= quote.consumed_amount as u128);

        let reserve_out = if is_token1 { balances[0] } else { balances[1] };
        prop_assert!(
            U256::from(quote.calculated_amount) <= reserve_out,
            "paid out {} but pool holds {}",
            quote.calculated_amount, reserve_out
        );
    }

    #[test]
    fn prop_price_moves_with_input(
        liquidity in liquidity_strategy(),
        inner in 10i32..50_000,
        amount in amount_strategy(),
        is_token1 in any::<bool>(),
        exact_out in any::<bool>(),
    ) {
        let pool = make_concentrated(liquidity, inner, 0);
        let specified = if exact_out { -amount } else { amount };
        let Ok(quote) = pool.quote(specified, is_token1) else {
            return Ok(());
        };

        let before = pool.swap_state().sqrt_ratio;
        let after = quote.swap_info.swap_state_after.sqrt_ratio;

        // token1 in, or token0 out
        if is_token1 != exact_out {
            prop_assert!(after >= before);
        } else {
            prop_assert!(after <= before);
        }
    }
}

// ---------------------------------------------------------------------------
// Round trips and no-ops
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_zero_fee_round_trip(
        liquidity in liquidity_strategy(),
        tick in -100_000i32..100_000,
        amount in 1_000i128..1_000_000_000_000,
        is_token1 in any::<bool>(),
    ) {
        let pool = make_full_range(liquidity, tick, 0);
        let Ok(exact_in) = pool.quote(amount, is_token1) else {
            return Ok(());
        };
        let output = exact_in.calculated_amount;
        if output == 0 || exact_in.consumed_amount != amount {
            return Ok(());
        }

        let Ok(exact_out) = pool.quote(-(output as i128), !is_token1) else {
            return Ok(());
        };
        prop_assert!(
            exact_out.calculated_amount <= amount as u128 + 1,
            "buying {} back costs {} > {}",
            output, exact_out.calculated_amount, amount
        );

        let mut swapped = pool.clone_state();
        swapped.set_swap_state(exact_in.swap_info.swap_state_after);
        let Ok(back) = swapped.quote(output as i128, !is_token1) else {
            return Ok(());
        };
        prop_assert!(back.calculated_amount <= amount as u128);
    }

    #[test]
    fn prop_zero_amount_is_noop(
        liquidity in liquidity_strategy(),
        inner in 10i32..50_000,
        is_token1 in any::<bool>(),
    ) {
        let pool = make_concentrated(liquidity, inner, 1 << 60);
        let Ok(quote) = pool.quote(0, is_token1) else {
            return Err(TestCaseError::fail("zero quote failed"));
        };

        prop_assert_eq!(quote.consumed_amount, 0);
        prop_assert_eq!(quote.calculated_amount, 0);
        prop_assert_eq!(quote.fees_paid, 0);
        prop_assert_eq!(quote.swap_info.swap_state_after, pool.swap_state());
    }

    #[test]
    fn prop_zero_amount_step_is_noop(
        tick in -1_000_000i32..1_000_000,
        liquidity in any::<u128>(),
        to_max in any::<bool>(),
        is_token1 in any::<bool>(),
        fee in any::<u64>(),
    ) {
        let Ok(sqrt_ratio) = to_sqrt_ratio(tick) else {
            return Ok(());
        };
        let limit = if to_max { MAX_SQRT_RATIO } else { MIN_SQRT_RATIO };
        let Ok(step) = compute_step(sqrt_ratio, liquidity, limit, 0, is_token1, fee) else {
            return Err(TestCaseError::fail("zero step failed"));
        };

        prop_assert_eq!(step.consumed_amount, 0);
        prop_assert_eq!(step.calculated_amount, 0);
        prop_assert_eq!(step.fee_amount, 0);
        prop_assert_eq!(step.sqrt_ratio_next, sqrt_ratio);
    }
}

// ---------------------------------------------------------------------------
// Virtual order execution
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_twamm_split_at_checkpoint(
        tick in -1_000i32..1_000,
        liquidity in 1_000_000_000u128..1_000_000_000_000_000,
        rate0 in 16u128..256,
        rate1 in 16u128..256,
        checkpoint in 1u64..60,
        delta in -16i128..256,
        amount in 0i128..1_000_000,
        is_token1 in any::<bool>(),
    ) {
        let Ok(sqrt_ratio) = to_sqrt_ratio(tick) else {
            return Ok(());
        };
        let Ok(full_range) = FullRangePoolState::new(sqrt_ratio, liquidity) else {
            return Ok(());
        };
        let pool = TwammPool::new(
            make_key(0, PoolTypeConfig::FullRange),
            TwammPoolState {
                full_range,
                token0_sale_rate: rate0 << 32,
                token1_sale_rate: rate1 << 32,
                last_execution_time: 0,
                virtual_order_deltas: Arc::new(vec![TimeRateDelta {
                    time: checkpoint,
                    delta0: delta << 32,
                    delta1: 0,
                }]),
            },
            GasCosts::default(),
        );

        let Ok(direct) = pool.quote_at(amount, is_token1, 64) else {
            return Ok(());
        };

        let mut split = pool.clone_state();
        let Ok(partial) = split.quote_at(0, is_token1, checkpoint) else {
            return Ok(());
        };
        split.set_swap_state(partial.swap_info.swap_state_after);
        let Ok(resumed) = split.quote_at(amount, is_token1, 64) else {
            return Ok(());
        };

        prop_assert_eq!(resumed.calculated_amount, direct.calculated_amount);
        prop_assert_eq!(
            resumed.swap_info.swap_state_after,
            direct.swap_info.swap_state_after
        );
    }
}
