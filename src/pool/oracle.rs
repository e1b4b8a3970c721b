use crate::config::GasCosts;
use crate::error::Error;
use crate::event::PoolEvent;
use crate::pool::full_range::{FullRangePool, FullRangePoolState, FullRangePoolSwapState};
use crate::pool::key::PoolKey;
use crate::pool::quote::Quote;
use crate::pool::Pool;
use alloy_primitives::U256;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OraclePoolState {
    pub full_range: FullRangePoolState,
    pub swapped_this_block: bool,
}

/// Full-range pool whose first swap in a block also writes a price snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OraclePool {
    full_range: FullRangePool,
    swapped_this_block: bool,
}

impl OraclePool {
    pub fn new(key: Arc<PoolKey>, state: FullRangePoolState, gas: GasCosts) -> Self {
        Self {
            full_range: FullRangePool::new(key, state, gas),
            swapped_this_block: false,
        }
    }

    #[inline]
    pub fn full_range(&self) -> &FullRangePool {
        &self.full_range
    }
}

impl Pool for OraclePool {
    type SwapState = FullRangePoolSwapState;
    type State = OraclePoolState;

    fn key(&self) -> &PoolKey {
        self.full_range.key()
    }

    fn state(&self) -> OraclePoolState {
        OraclePoolState {
            full_range: self.full_range.state(),
            swapped_this_block: self.swapped_this_block,
        }
    }

    fn swap_state(&self) -> FullRangePoolSwapState {
        self.full_range.swap_state()
    }

    fn set_swap_state(&mut self, state: FullRangePoolSwapState) {
        self.full_range.set_swap_state(state);
        self.swapped_this_block = true;
    }

    fn apply_event(&mut self, event: &PoolEvent, block_timestamp: u64) -> Result<(), Error> {
        self.full_range.apply_event(event, block_timestamp)?;

        if let PoolEvent::Swapped { pool_id, .. } = *event {
            if pool_id == self.full_range.key().num_id() {
                self.swapped_this_block = true;
            }
        }

        Ok(())
    }

    fn new_block(&mut self) {
        self.swapped_this_block = false;
    }

    fn quote(&self, amount: i128, is_token1: bool) -> Result<Quote<FullRangePoolSwapState>, Error> {
        let mut quote = self.full_range.quote(amount, is_token1)?;

        if !self.swapped_this_block {
            quote.gas += self.full_range.gas().accumulating_oracle_snapshot;
        }

        Ok(quote)
    }

    fn calc_balances(&self) -> Result<[U256; 2], Error> {
        self.full_range.calc_balances()
    }
}
