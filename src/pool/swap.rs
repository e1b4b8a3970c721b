//! Variant-erased pools, built from a key, its extension type and a state
//! snapshot.

use crate::config::{ExtensionType, GasCosts, QuoterConfig};
use crate::error::{Error, MathError, StateError, SwapError};
use crate::event::PoolEvent;
use crate::pool::base::{BasePool, BasePoolState, BasePoolSwapState, ConcentratedPoolSnapshot};
use crate::pool::boosted_fees::{BoostedFeesPool, BoostedFeesPoolState, BoostedFeesPoolSwapState};
use crate::pool::full_range::{FullRangePool, FullRangePoolState, FullRangePoolSwapState};
use crate::pool::key::{PoolKey, PoolTypeConfig};
use crate::pool::mev_capture::{MevCapturePool, MevCapturePoolState};
use crate::pool::oracle::{OraclePool, OraclePoolState};
use crate::pool::quote::Quote;
use crate::pool::stableswap::StableswapPool;
use crate::pool::timed::TimeRateDelta;
use crate::pool::twamm::{TwammPool, TwammPoolState, TwammPoolSwapState};
use crate::pool::Pool;
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tracing::warn;

/// On-chain state a pool is constructed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolSnapshot {
    /// Concentrated pools, with or without MEV capture.
    Concentrated(ConcentratedPoolSnapshot),
    /// Full-range, stableswap and oracle pools.
    FullRange(FullRangePoolState),
    BoostedFees {
        base: ConcentratedPoolSnapshot,
        donate_rate0: u128,
        donate_rate1: u128,
        last_donate_time: u64,
        donate_rate_deltas: Vec<TimeRateDelta>,
    },
    Twamm(TwammPoolState),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyPool {
    Base(BasePool),
    FullRange(FullRangePool),
    Stableswap(StableswapPool),
    Oracle(OraclePool),
    MevCapture(MevCapturePool),
    BoostedFees(BoostedFeesPool),
    Twamm(TwammPool),
}

/// Post-swap state of any variant. Stableswap and oracle pools share the
/// full-range shape; MEV capture shares the concentrated one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AnySwapState {
    Base(BasePoolSwapState),
    FullRange(FullRangePoolSwapState),
    BoostedFees(BoostedFeesPoolSwapState),
    Twamm(TwammPoolSwapState),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyPoolState {
    Base(BasePoolState),
    FullRange(FullRangePoolState),
    Oracle(OraclePoolState),
    MevCapture(MevCapturePoolState),
    BoostedFees(BoostedFeesPoolState),
    Twamm(TwammPoolState),
}

macro_rules! dispatch {
    ($pool:expr, $inner:ident => $body:expr) => {
        match $pool {
            AnyPool::Base($inner) => $body,
            AnyPool::FullRange($inner) => $body,
            AnyPool::Stableswap($inner) => $body,
            AnyPool::Oracle($inner) => $body,
            AnyPool::MevCapture($inner) => $body,
            AnyPool::BoostedFees($inner) => $body,
            AnyPool::Twamm($inner) => $body,
        }
    };
}

impl AnyPool {
    /// Builds the variant selected by `extension` and the key's pool type.
    ///
    /// Oracle and TWAMM pools must be full range, MEV capture and boosted
    /// fees pools concentrated, and the snapshot must fit the variant.
    /// Anything else, including unknown extensions, fails with
    /// `StateError::InvalidPoolTypeConfig`.
    pub fn new(
        key: PoolKey,
        extension: ExtensionType,
        snapshot: PoolSnapshot,
        gas: GasCosts,
    ) -> Result<Self, Error> {
        let type_config = key.config().type_config;
        let invalid = StateError::InvalidPoolTypeConfig {
            extension: extension.name(),
            pool_type: type_config.name(),
        };
        let key = Arc::new(key);

        let pool = match (extension, type_config, snapshot) {
            (
                ExtensionType::NoSwapCallPoints,
                PoolTypeConfig::Concentrated { .. },
                PoolSnapshot::Concentrated(snapshot),
            ) => AnyPool::Base(BasePool::from_snapshot(key, snapshot, gas)?),
            (
                ExtensionType::NoSwapCallPoints,
                PoolTypeConfig::FullRange,
                PoolSnapshot::FullRange(state),
            ) => AnyPool::FullRange(FullRangePool::new(key, state, gas)),
            (
                ExtensionType::NoSwapCallPoints,
                PoolTypeConfig::Stableswap { .. },
                PoolSnapshot::FullRange(state),
            ) => AnyPool::Stableswap(StableswapPool::new(key, state, gas)?),
            (ExtensionType::Oracle, PoolTypeConfig::FullRange, PoolSnapshot::FullRange(state)) => {
                AnyPool::Oracle(OraclePool::new(key, state, gas))
            }
            (
                ExtensionType::MevCapture,
                PoolTypeConfig::Concentrated { .. },
                PoolSnapshot::Concentrated(snapshot),
            ) => AnyPool::MevCapture(MevCapturePool::new(BasePool::from_snapshot(
                key, snapshot, gas,
            )?)),
            (
                ExtensionType::BoostedFeesConcentrated,
                PoolTypeConfig::Concentrated { .. },
                PoolSnapshot::BoostedFees {
                    base,
                    donate_rate0,
                    donate_rate1,
                    last_donate_time,
                    donate_rate_deltas,
                },
            ) => AnyPool::BoostedFees(BoostedFeesPool::with_deltas(
                BasePool::from_snapshot(key, base, gas)?,
                (donate_rate0, donate_rate1),
                last_donate_time,
                donate_rate_deltas,
            )),
            (ExtensionType::Twamm, PoolTypeConfig::FullRange, PoolSnapshot::Twamm(state)) => {
                AnyPool::Twamm(TwammPool::new(key, state, gas))
            }
            _ => return Err(invalid.into()),
        };

        Ok(pool)
    }

    /// Like [`AnyPool::new`], resolving the extension and gas costs from
    /// `config`.
    pub fn from_config(
        key: PoolKey,
        snapshot: PoolSnapshot,
        config: &QuoterConfig,
    ) -> Result<Self, Error> {
        let extension = config.extension_type(key.extension());
        Self::new(key, extension, snapshot, config.gas)
    }

    /// Quotes selling exactly `amount_in` of `token_in`.
    pub fn calc_amount_out(
        &self,
        token_in: Address,
        amount_in: u128,
    ) -> Result<Quote<AnySwapState>, Error> {
        let is_token1 = self.key().is_token1(token_in)?;
        let amount = i128::try_from(amount_in).map_err(|_| MathError::Overflow)?;

        self.quote_nonzero(amount, is_token1)
    }

    /// Quotes buying exactly `amount_out` of `token_out`. The calculated
    /// amount is the input required, fees included.
    pub fn calc_amount_in(
        &self,
        token_out: Address,
        amount_out: u128,
    ) -> Result<Quote<AnySwapState>, Error> {
        let is_token1 = self.key().is_token1(token_out)?;
        let amount = i128::try_from(amount_out)
            .ok()
            .and_then(i128::checked_neg)
            .ok_or(MathError::Overflow)?;

        self.quote_nonzero(amount, is_token1)
    }

    fn quote_nonzero(&self, amount: i128, is_token1: bool) -> Result<Quote<AnySwapState>, Error> {
        let quote = self.quote(amount, is_token1)?;
        if quote.calculated_amount == 0 {
            return Err(SwapError::ZeroAmount.into());
        }
        Ok(quote)
    }
}

impl Pool for AnyPool {
    type SwapState = AnySwapState;
    type State = AnyPoolState;

    fn key(&self) -> &PoolKey {
        dispatch!(self, pool => pool.key())
    }

    fn state(&self) -> AnyPoolState {
        match self {
            AnyPool::Base(pool) => AnyPoolState::Base(pool.state()),
            AnyPool::FullRange(pool) => AnyPoolState::FullRange(pool.state()),
            AnyPool::Stableswap(pool) => AnyPoolState::FullRange(pool.state()),
            AnyPool::Oracle(pool) => AnyPoolState::Oracle(pool.state()),
            AnyPool::MevCapture(pool) => AnyPoolState::MevCapture(pool.state()),
            AnyPool::BoostedFees(pool) => AnyPoolState::BoostedFees(pool.state()),
            AnyPool::Twamm(pool) => AnyPoolState::Twamm(pool.state()),
        }
    }

    fn swap_state(&self) -> AnySwapState {
        match self {
            AnyPool::Base(pool) => AnySwapState::Base(pool.swap_state()),
            AnyPool::FullRange(pool) => AnySwapState::FullRange(pool.swap_state()),
            AnyPool::Stableswap(pool) => AnySwapState::FullRange(pool.swap_state()),
            AnyPool::Oracle(pool) => AnySwapState::FullRange(pool.swap_state()),
            AnyPool::MevCapture(pool) => AnySwapState::Base(pool.swap_state()),
            AnyPool::BoostedFees(pool) => AnySwapState::BoostedFees(pool.swap_state()),
            AnyPool::Twamm(pool) => AnySwapState::Twamm(pool.swap_state()),
        }
    }

    /// Commits a state quoted from this pool. A state of another shape is
    /// dropped with a warning.
    fn set_swap_state(&mut self, state: AnySwapState) {
        match (self, state) {
            (AnyPool::Base(pool), AnySwapState::Base(state)) => pool.set_swap_state(state),
            (AnyPool::MevCapture(pool), AnySwapState::Base(state)) => pool.set_swap_state(state),
            (AnyPool::FullRange(pool), AnySwapState::FullRange(state)) => {
                pool.set_swap_state(state)
            }
            (AnyPool::Stableswap(pool), AnySwapState::FullRange(state)) => {
                pool.set_swap_state(state)
            }
            (AnyPool::Oracle(pool), AnySwapState::FullRange(state)) => pool.set_swap_state(state),
            (AnyPool::BoostedFees(pool), AnySwapState::BoostedFees(state)) => {
                pool.set_swap_state(state)
            }
            (AnyPool::Twamm(pool), AnySwapState::Twamm(state)) => pool.set_swap_state(state),
            (pool, state) => {
                warn!(pool_id = %pool.key().num_id(), ?state, "swap state does not fit pool variant");
            }
        }
    }

    fn apply_event(&mut self, event: &PoolEvent, block_timestamp: u64) -> Result<(), Error> {
        dispatch!(self, pool => pool.apply_event(event, block_timestamp))
    }

    fn new_block(&mut self) {
        dispatch!(self, pool => pool.new_block())
    }

    fn quote(&self, amount: i128, is_token1: bool) -> Result<Quote<AnySwapState>, Error> {
        Ok(match self {
            AnyPool::Base(pool) => pool.quote(amount, is_token1)?.map_state(AnySwapState::Base),
            AnyPool::FullRange(pool) => pool
                .quote(amount, is_token1)?
                .map_state(AnySwapState::FullRange),
            AnyPool::Stableswap(pool) => pool
                .quote(amount, is_token1)?
                .map_state(AnySwapState::FullRange),
            AnyPool::Oracle(pool) => pool
                .quote(amount, is_token1)?
                .map_state(AnySwapState::FullRange),
            AnyPool::MevCapture(pool) => pool
                .quote(amount, is_token1)?
                .map_state(AnySwapState::Base),
            AnyPool::BoostedFees(pool) => pool
                .quote(amount, is_token1)?
                .map_state(AnySwapState::BoostedFees),
            AnyPool::Twamm(pool) => pool.quote(amount, is_token1)?.map_state(AnySwapState::Twamm),
        })
    }

    fn calc_balances(&self) -> Result<[U256; 2], Error> {
        dispatch!(self, pool => pool.calc_balances())
    }
}
