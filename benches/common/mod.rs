#![allow(dead_code)]

use criterion::{black_box, Criterion};
use ekubo_swap_math::math::math_helpers::{mul_div, mul_div_rounding_up};
use ekubo_swap_math::math::sqrt_price_math::{
    amount0_delta, amount1_delta, next_sqrt_ratio_from_amount0, next_sqrt_ratio_from_amount1,
};
use ekubo_swap_math::math::sqrt_ratio::{fixed_sqrt_ratio_to_float, MAX_SQRT_RATIO, ONE_X128};
use ekubo_swap_math::math::swap_math::compute_step;
use ekubo_swap_math::math::tick_math::{approximate_sqrt_ratio_to_tick, to_sqrt_ratio};
use ekubo_swap_math::math::twamm_math::calculate_next_sqrt_ratio;
use ekubo_swap_math::pool::base::{BasePool, ConcentratedPoolSnapshot};
use ekubo_swap_math::pool::tick::Tick;
use ekubo_swap_math::pool::timed::TimeRateDelta;
use ekubo_swap_math::pool::twamm::{TwammPool, TwammPoolState};
use ekubo_swap_math::pool::full_range::FullRangePoolState;
use ekubo_swap_math::{Address, GasCosts, Pool, PoolConfig, PoolKey, PoolTypeConfig, U256};
use std::sync::Arc;

const LIQUIDITY: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn pool_key(fee: u64, type_config: PoolTypeConfig) -> Arc<PoolKey> {
    let key = PoolKey::new(
        Address::ZERO,
        Address::with_last_byte(1),
        PoolConfig {
            extension: Address::ZERO,
            fee,
            type_config,
        },
    )
    .unwrap();
    Arc::new(key)
}

/// Concentrated pool with `positions` nested positions around tick 0, one
/// tick spacing apart.
pub fn concentrated_pool(positions: i32) -> BasePool {
    let tick_spacing = 100;
    let mut ticks = Vec::new();
    for i in 1..=positions {
        ticks.push(Tick::new(-i * tick_spacing, LIQUIDITY as i128));
        ticks.push(Tick::new(i * tick_spacing, -(LIQUIDITY as i128)));
    }

    BasePool::from_snapshot(
        pool_key(1 << 55, PoolTypeConfig::Concentrated { tick_spacing: 100 }),
        ConcentratedPoolSnapshot {
            sqrt_ratio: ONE_X128,
            liquidity: LIQUIDITY * positions as u128,
            active_tick: 0,
            ticks,
            tick_bounds: [-positions * tick_spacing, positions * tick_spacing],
        },
        GasCosts::default(),
    )
    .unwrap()
}

/// TWAMM pool with both sale streams active and `checkpoints` rate changes
/// before `checkpoints * 16`.
pub fn twamm_pool(checkpoints: u64) -> TwammPool {
    let deltas = (1..=checkpoints)
        .map(|i| TimeRateDelta {
            time: i * 16,
            delta0: 1 << 32,
            delta1: -(1 << 30),
        })
        .collect();

    TwammPool::new(
        pool_key(1 << 55, PoolTypeConfig::FullRange),
        TwammPoolState {
            full_range: FullRangePoolState::new(ONE_X128, LIQUIDITY).unwrap(),
            token0_sale_rate: 1 << 40,
            token1_sale_rate: 1 << 40,
            last_execution_time: 0,
            virtual_order_deltas: Arc::new(deltas),
        },
        GasCosts::default(),
    )
}

// ---------------------------------------------------------------------------
// Math
// ---------------------------------------------------------------------------

pub fn bench_tick_math(c: &mut Criterion) {
    c.bench_function("to_sqrt_ratio", |b| {
        b.iter(|| to_sqrt_ratio(black_box(-887_272)).unwrap())
    });

    let sqrt_ratio = to_sqrt_ratio(123_456).unwrap();
    c.bench_function("approximate_sqrt_ratio_to_tick", |b| {
        b.iter(|| approximate_sqrt_ratio_to_tick(black_box(sqrt_ratio)))
    });
}

pub fn bench_sqrt_price_math(c: &mut Criterion) {
    let lower = to_sqrt_ratio(-10_000).unwrap();
    let upper = to_sqrt_ratio(10_000).unwrap();

    c.bench_function("amount0_delta", |b| {
        b.iter(|| amount0_delta(black_box(lower), black_box(upper), LIQUIDITY, true).unwrap())
    });
    c.bench_function("amount1_delta", |b| {
        b.iter(|| amount1_delta(black_box(lower), black_box(upper), LIQUIDITY, false).unwrap())
    });
    c.bench_function("next_sqrt_ratio_from_amount0", |b| {
        b.iter(|| next_sqrt_ratio_from_amount0(black_box(ONE_X128), LIQUIDITY, black_box(1_000_000)))
    });
    c.bench_function("next_sqrt_ratio_from_amount1", |b| {
        b.iter(|| next_sqrt_ratio_from_amount1(black_box(ONE_X128), LIQUIDITY, black_box(-1_000_000)))
    });
}

pub fn bench_swap_math(c: &mut Criterion) {
    c.bench_function("compute_step_exact_in", |b| {
        b.iter(|| {
            compute_step(
                black_box(ONE_X128),
                LIQUIDITY,
                MAX_SQRT_RATIO,
                black_box(1_000_000_000),
                true,
                1 << 55,
            )
            .unwrap()
        })
    });
    c.bench_function("compute_step_exact_out", |b| {
        b.iter(|| {
            compute_step(
                black_box(ONE_X128),
                LIQUIDITY,
                MAX_SQRT_RATIO,
                black_box(-1_000_000_000),
                false,
                1 << 55,
            )
            .unwrap()
        })
    });
}

pub fn bench_math_helpers(c: &mut Criterion) {
    let a = U256::from(u128::MAX);
    let b_val = U256::from(u64::MAX);
    let denominator = U256::from(12_345_678_901u64);

    c.bench_function("mul_div", |b| {
        b.iter(|| mul_div(black_box(a), black_box(b_val), black_box(denominator)).unwrap())
    });
    c.bench_function("mul_div_rounding_up", |b| {
        b.iter(|| mul_div_rounding_up(black_box(a), black_box(b_val), black_box(denominator)).unwrap())
    });
    c.bench_function("fixed_sqrt_ratio_to_float", |b| {
        b.iter(|| fixed_sqrt_ratio_to_float(black_box(ONE_X128), false).unwrap())
    });
}

pub fn bench_twamm_math(c: &mut Criterion) {
    c.bench_function("calculate_next_sqrt_ratio", |b| {
        b.iter(|| {
            calculate_next_sqrt_ratio(
                black_box(ONE_X128),
                LIQUIDITY,
                black_box(1 << 40),
                black_box(1 << 42),
                black_box(3_600),
                1 << 55,
            )
            .unwrap()
        })
    });
}

// ---------------------------------------------------------------------------
// Pools
// ---------------------------------------------------------------------------

pub fn bench_base_quote(c: &mut Criterion) {
    let pool = concentrated_pool(50);

    c.bench_function("base_quote_within_tick", |b| {
        b.iter(|| pool.quote(black_box(1_000_000), true).unwrap())
    });
    c.bench_function("base_quote_crossing_ticks", |b| {
        b.iter(|| pool.quote(black_box(LIQUIDITY as i128), false).unwrap())
    });
}

pub fn bench_twamm_quote(c: &mut Criterion) {
    let pool = twamm_pool(16);

    c.bench_function("twamm_quote_execute_virtual_orders", |b| {
        b.iter(|| pool.quote_at(black_box(1_000_000), true, black_box(512)).unwrap())
    });
}
