//! Pool state machines.
//!
//! Every variant implements [`Pool`]. Quoting borrows the pool immutably and
//! returns the post-swap state inside the [`Quote`]; nothing changes until the
//! owner commits it with [`Pool::set_swap_state`]. Cloning a pool is cheap:
//! tick lists and rate checkpoints sit behind `Arc` and are only copied when
//! an event modifies a shared instance.

pub mod key;
pub mod quote;
pub mod tick;
pub mod timed;

pub mod base;
pub mod full_range;
pub mod stableswap;

pub mod boosted_fees;
pub mod mev_capture;
pub mod oracle;
pub mod twamm;

pub mod swap;

#[cfg(test)]
mod proptest_properties;

use crate::error::Error;
use crate::event::{EventKind, PoolEvent};
use crate::pool::key::PoolKey;
use crate::pool::quote::Quote;
use alloy_primitives::{B256, U256};
use std::fmt;
use tracing::debug;

pub trait Pool: Clone {
    /// The part of the state a swap changes.
    type SwapState: Clone + fmt::Debug + PartialEq;
    /// Full state, including ticks and checkpoints.
    type State: Clone + fmt::Debug;

    fn key(&self) -> &PoolKey;

    fn state(&self) -> Self::State;

    fn swap_state(&self) -> Self::SwapState;

    /// Commits the `swap_state_after` of a quote taken from this pool.
    fn set_swap_state(&mut self, state: Self::SwapState);

    /// Applies an on-chain event. Events addressed to other pools are ignored.
    fn apply_event(&mut self, event: &PoolEvent, block_timestamp: u64) -> Result<(), Error>;

    /// Decodes a raw log payload and applies it.
    fn apply_raw_event(
        &mut self,
        kind: EventKind,
        data: &[u8],
        block_timestamp: u64,
    ) -> Result<(), Error> {
        match PoolEvent::decode(kind, data)? {
            Some(event) => self.apply_event(&event, block_timestamp),
            None => Ok(()),
        }
    }

    /// Resets per-block bookkeeping.
    fn new_block(&mut self) {}

    /// Quotes a swap of `amount` of token1 (or token0). Positive amounts are
    /// exact input, negative amounts exact output.
    fn quote(&self, amount: i128, is_token1: bool) -> Result<Quote<Self::SwapState>, Error>;

    /// Token reserves `[amount0, amount1]` implied by the current state.
    fn calc_balances(&self) -> Result<[U256; 2], Error>;

    /// Independent copy for speculative quoting and commits.
    #[inline]
    fn clone_state(&self) -> Self {
        self.clone()
    }
}

/// Whether an event for `pool_id` concerns the pool with `key`.
pub(crate) fn targets(key: &PoolKey, pool_id: B256) -> bool {
    let expected = key.num_id();
    if expected != pool_id {
        debug!(%pool_id, %expected, "ignoring event for another pool");
        return false;
    }
    true
}
