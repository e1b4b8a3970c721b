use crate::config::GasCosts;
use crate::error::{Error, StateError};
use crate::event::PoolEvent;
use crate::math::liquidity_math::add_delta;
use crate::math::sqrt_price_math::{amount0_delta, amount1_delta};
use crate::math::sqrt_ratio::{fixed_sqrt_ratio_to_float, MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use crate::math::swap_math::{compute_step, is_price_increasing};
use crate::pool::key::PoolKey;
use crate::pool::quote::{Quote, SwapInfo};
use crate::pool::{targets, Pool};
use alloy_primitives::U256;
use std::sync::Arc;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FullRangePoolSwapState {
    pub sqrt_ratio: U256,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FullRangePoolState {
    pub swap_state: FullRangePoolSwapState,
    pub liquidity: u128,
}

impl FullRangePoolState {
    pub fn new(sqrt_ratio: U256, liquidity: u128) -> Result<Self, StateError> {
        if sqrt_ratio < MIN_SQRT_RATIO || sqrt_ratio > MAX_SQRT_RATIO {
            return Err(StateError::SqrtRatioOutOfBounds);
        }
        Ok(Self {
            swap_state: FullRangePoolSwapState { sqrt_ratio },
            liquidity,
        })
    }
}

/// Token amounts held by `liquidity` spread over `[lower, upper]` at the
/// given price. The price is clamped into the range; both amounts round down.
pub fn range_balances(
    sqrt_ratio: U256,
    liquidity: u128,
    sqrt_ratio_lower: U256,
    sqrt_ratio_upper: U256,
) -> Result<[U256; 2], Error> {
    let clamped = sqrt_ratio.clamp(sqrt_ratio_lower, sqrt_ratio_upper);

    let amount0 = amount0_delta(clamped, sqrt_ratio_upper, liquidity, false)?;
    let amount1 = amount1_delta(sqrt_ratio_lower, clamped, liquidity, false)?;

    Ok([U256::from(amount0), U256::from(amount1)])
}

/// Liquidity over the whole price range: one swap step per quote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullRangePool {
    key: Arc<PoolKey>,
    state: FullRangePoolState,
    gas: GasCosts,
}

impl FullRangePool {
    pub fn new(key: Arc<PoolKey>, state: FullRangePoolState, gas: GasCosts) -> Self {
        Self { key, state, gas }
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
    pub fn liquidity(&self) -> u128 {
        self.state.liquidity
    }

    /// Quotes against an explicit price limit and, optionally, a starting
    /// price other than the committed one.
    ///
    /// The limit defaults to the end of the price range in the swap
    /// direction.
    pub fn quote_with_limit_and_override(
        &self,
        amount: i128,
        is_token1: bool,
        sqrt_ratio_limit: Option<U256>,
        override_state: Option<FullRangePoolSwapState>,
    ) -> Result<Quote<FullRangePoolSwapState>, Error> {
        let sqrt_ratio = override_state.unwrap_or(self.state.swap_state).sqrt_ratio;
        let is_increasing = is_price_increasing(amount, is_token1);

        let sqrt_ratio_limit = sqrt_ratio_limit.unwrap_or(if is_increasing {
            MAX_SQRT_RATIO
        } else {
            MIN_SQRT_RATIO
        });

        let step = compute_step(
            sqrt_ratio,
            self.state.liquidity,
            sqrt_ratio_limit,
            amount,
            is_token1,
            self.key.fee(),
        )?;

        trace!(
            consumed = step.consumed_amount,
            calculated = step.calculated_amount,
            sqrt_ratio_next = %step.sqrt_ratio_next,
            "full range step"
        );

        Ok(Quote {
            consumed_amount: step.consumed_amount,
            calculated_amount: step.calculated_amount,
            fees_paid: step.fee_amount,
            gas: self.gas.base_full_range_swap,
            swap_info: SwapInfo {
                skip_ahead: 0,
                is_token1,
                price_limit: fixed_sqrt_ratio_to_float(sqrt_ratio_limit, is_increasing)?,
                swap_state_after: FullRangePoolSwapState {
                    sqrt_ratio: step.sqrt_ratio_next,
                },
                tick_spacings_crossed: 0,
                initialized_ticks_crossed: 0,
            },
        })
    }
}

impl Pool for FullRangePool {
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
        self.quote_with_limit_and_override(amount, is_token1, None, None)
    }

    fn calc_balances(&self) -> Result<[U256; 2], Error> {
        range_balances(
            self.state.swap_state.sqrt_ratio,
            self.state.liquidity,
            MIN_SQRT_RATIO,
            MAX_SQRT_RATIO,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MathError, SwapError};
    use crate::math::sqrt_ratio::ONE_X128;
    use crate::pool::key::{PoolConfig, PoolTypeConfig};
    use alloy_primitives::{address, Address};
    use std::str::FromStr;

    fn key(token0: Address, token1: Address, fee: u64) -> Arc<PoolKey> {
        Arc::new(
            PoolKey::new(
                token0,
                token1,
                PoolConfig {
                    extension: Address::ZERO,
                    fee,
                    type_config: PoolTypeConfig::FullRange,
                },
            )
            .unwrap(),
        )
    }

    fn pool(sqrt_ratio: U256, liquidity: u128, fee: u64) -> FullRangePool {
        FullRangePool::new(
            key(Address::ZERO, Address::with_last_byte(1), fee),
            FullRangePoolState::new(sqrt_ratio, liquidity).unwrap(),
            GasCosts::default(),
        )
    }

    #[test]
    fn test_token0_input_at_parity() {
        let pool = pool(ONE_X128, 1_000_000, 0);
        let quote = pool.quote(1_000, false).unwrap();

        assert_eq!(quote.calculated_amount, 999);
        assert_eq!(quote.consumed_amount, 1_000);
        assert_eq!(quote.gas, GasCosts::default().base_full_range_swap);
        assert!(quote.swap_info.swap_state_after.sqrt_ratio < ONE_X128);
    }

    #[test]
    fn test_zero_fee_round_trip_at_price_four() {
        let pool = pool(ONE_X128 << 1, 1_000_000_000_000_000_000, 0);

        // (input, sells token1, output)
        let cases: [(i128, bool, u128); 2] = [
            (1_000_000_000_000, true, 249_999_875_000),
            (1_000_000_000_000, false, 3_999_992_000_015),
        ];

        for (amount, is_token1, output) in cases {
            let exact_in = pool.quote(amount, is_token1).unwrap();
            assert_eq!(exact_in.consumed_amount, amount);
            assert_eq!(exact_in.calculated_amount, output, "token1 {is_token1}");
            assert_eq!(exact_in.fees_paid, 0);

            let exact_out = pool.quote(-(output as i128), !is_token1).unwrap();
            assert_eq!(exact_out.consumed_amount, -(output as i128));
            assert_eq!(exact_out.calculated_amount, amount as u128, "token1 {is_token1}");
            assert_eq!(exact_out.fees_paid, 0);
        }
    }

    #[test]
    fn test_eth_ekubo_quotes() {
        let pool = FullRangePool::new(
            key(
                Address::ZERO,
                address!("04c46e830bb56ce22735d5d8fc9cb90309317d0f"),
                184467440737095516,
            ),
            FullRangePoolState::new(
                U256::from_str("6805254927144693263794887740749196034048").unwrap(),
                59382833771552102,
            )
            .unwrap(),
            GasCosts::default(),
        );

        let cases: [(i128, bool, u128); 4] = [
            (1_000_000, false, 395954099),
            (1_000_000_000_000_000, false, 296948572606173404),
            (1_000_000_000_000_000_000, true, 1349942920865004),
            (10_000_000_000_000_000_000_000, true, 2968956746821686),
        ];

        for (amount, is_token1, expected) in cases {
            assert_eq!(
                pool.quote(amount, is_token1).unwrap().calculated_amount,
                expected,
                "amount {amount} token1 {is_token1}"
            );
        }
    }

    #[test]
    fn test_explicit_limit_and_override() {
        let pool = pool(ONE_X128, 1_000_000, 0);
        let limit = ONE_X128 + (ONE_X128 >> 10);

        let quote = pool
            .quote_with_limit_and_override(1_000_000_000, true, Some(limit), None)
            .unwrap();
        assert_eq!(quote.swap_info.swap_state_after.sqrt_ratio, limit);
        assert!(quote.consumed_amount < 1_000_000_000);

        let wrong_side = pool.quote_with_limit_and_override(1_000, false, Some(limit), None);
        assert!(matches!(
            wrong_side,
            Err(Error::SwapError(SwapError::WrongSwapDirection))
        ));

        let overridden = pool
            .quote_with_limit_and_override(
                1_000,
                false,
                None,
                Some(FullRangePoolSwapState { sqrt_ratio: limit }),
            )
            .unwrap();
        assert_ne!(
            overridden.calculated_amount,
            pool.quote(1_000, false).unwrap().calculated_amount
        );
    }

    #[test]
    fn test_events() {
        let mut pool = pool(ONE_X128, 1_000, 0);
        let pool_id = pool.key().num_id();

        pool.apply_event(
            &PoolEvent::PositionUpdated {
                pool_id,
                lower: -88722835,
                upper: 88722835,
                liquidity_delta: 500,
            },
            0,
        )
        .unwrap();
        assert_eq!(pool.liquidity(), 1_500);

        pool.apply_event(
            &PoolEvent::Swapped {
                pool_id,
                sqrt_ratio_after: ONE_X128 << 1,
                tick_after: 1386295,
                liquidity_after: 1_400,
            },
            0,
        )
        .unwrap();
        assert_eq!(pool.swap_state().sqrt_ratio, ONE_X128 << 1);
        assert_eq!(pool.liquidity(), 1_400);

        // another pool
        pool.apply_event(
            &PoolEvent::PositionUpdated {
                pool_id: Default::default(),
                lower: 0,
                upper: 0,
                liquidity_delta: 1,
            },
            0,
        )
        .unwrap();
        assert_eq!(pool.liquidity(), 1_400);

        let result = pool.apply_event(
            &PoolEvent::PositionUpdated {
                pool_id,
                lower: 0,
                upper: 0,
                liquidity_delta: -2_000,
            },
            0,
        );
        assert!(matches!(result, Err(Error::MathError(MathError::Underflow))));
        assert_eq!(pool.liquidity(), 1_400);
    }

    #[test]
    fn test_range_balances() {
        let [amount0, amount1] = range_balances(ONE_X128, 1_000_000, ONE_X128 >> 1, ONE_X128 << 1)
            .unwrap();
        // L * (1 - 1/2) in both tokens
        assert_eq!(amount0, U256::from(500_000));
        assert_eq!(amount1, U256::from(500_000));

        let [amount0, amount1] =
            range_balances(ONE_X128 << 2, 1_000_000, ONE_X128 >> 1, ONE_X128 << 1).unwrap();
        assert_eq!(amount0, U256::ZERO);
        assert_eq!(amount1, U256::from(1_500_000));
    }

    #[test]
    fn test_rejects_out_of_range_price() {
        assert!(matches!(
            FullRangePoolState::new(MIN_SQRT_RATIO - U256::from(1), 0),
            Err(StateError::SqrtRatioOutOfBounds)
        ));
    }
}
