//! Core-contract and extension events that move pool state, and decoding of
//! their raw log payloads.
//!
//! Swapped, VirtualOrdersExecuted and FeesDonated are emitted as packed
//! bytes; the remaining events use standard ABI words.

use crate::abi::{EncodedOrderKey, OrderUpdatedData, PoolBoostedData, PositionUpdatedData};
use crate::error::EventError;
use crate::math::sqrt_ratio::float_sqrt_ratio_to_fixed;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolType;
use serde::{Deserialize, Serialize};

const SWAPPED_LEN: usize = 116;
const RATES_LEN: usize = 60;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Swapped,
    PositionUpdated,
    VirtualOrdersExecuted,
    OrderUpdated,
    FeesDonated,
    PoolBoosted,
}

/// Identifies a TWAMM order. Orders are matched to pools by token pair and
/// fee rather than by pool id.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub token0: Address,
    pub token1: Address,
    pub fee: u64,
    pub sells_token1: bool,
    pub start_time: u64,
    pub end_time: u64,
}

impl OrderKey {
    /// Unpacks `fee (8) | sells_token1 (1) | unused (7) | start (8) | end (8)`.
    pub fn from_encoded(key: &EncodedOrderKey) -> Self {
        let config = key.config;
        Self {
            token0: key.token0,
            token1: key.token1,
            fee: U256::from_be_slice(&config[0..8]).to::<u64>(),
            sells_token1: config[8] != 0,
            start_time: U256::from_be_slice(&config[16..24]).to::<u64>(),
            end_time: U256::from_be_slice(&config[24..32]).to::<u64>(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    Swapped {
        pool_id: B256,
        sqrt_ratio_after: U256,
        tick_after: i32,
        liquidity_after: u128,
    },
    PositionUpdated {
        pool_id: B256,
        lower: i32,
        upper: i32,
        liquidity_delta: i128,
    },
    VirtualOrdersExecuted {
        pool_id: B256,
        sale_rate_token0: u128,
        sale_rate_token1: u128,
    },
    OrderUpdated {
        order_key: OrderKey,
        sale_rate_delta: i128,
    },
    FeesDonated {
        pool_id: B256,
        donate_rate0: u128,
        donate_rate1: u128,
    },
    PoolBoosted {
        pool_id: B256,
        start_time: u64,
        end_time: u64,
        rate0: u128,
        rate1: u128,
    },
}

impl PoolEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PoolEvent::Swapped { .. } => EventKind::Swapped,
            PoolEvent::PositionUpdated { .. } => EventKind::PositionUpdated,
            PoolEvent::VirtualOrdersExecuted { .. } => EventKind::VirtualOrdersExecuted,
            PoolEvent::OrderUpdated { .. } => EventKind::OrderUpdated,
            PoolEvent::FeesDonated { .. } => EventKind::FeesDonated,
            PoolEvent::PoolBoosted { .. } => EventKind::PoolBoosted,
        }
    }

    /// Pool the event targets. `OrderUpdated` carries an order key instead.
    pub fn pool_id(&self) -> Option<B256> {
        match *self {
            PoolEvent::Swapped { pool_id, .. }
            | PoolEvent::PositionUpdated { pool_id, .. }
            | PoolEvent::VirtualOrdersExecuted { pool_id, .. }
            | PoolEvent::FeesDonated { pool_id, .. }
            | PoolEvent::PoolBoosted { pool_id, .. } => Some(pool_id),
            PoolEvent::OrderUpdated { .. } => None,
        }
    }

    /// Decodes a raw log payload.
    ///
    /// Returns `Ok(None)` for payloads that carry nothing to apply: truncated
    /// swap logs and zero-valued position, order or boost updates.
    pub fn decode(kind: EventKind, data: &[u8]) -> Result<Option<Self>, EventError> {
        match kind {
            EventKind::Swapped => {
                if data.len() < SWAPPED_LEN {
                    return Ok(None);
                }

                Ok(Some(PoolEvent::Swapped {
                    pool_id: B256::from_slice(&data[20..52]),
                    sqrt_ratio_after: float_sqrt_ratio_to_fixed(
                        U256::from_be_slice(&data[84..96]).to::<u128>(),
                    ),
                    tick_after: i32::from_be_bytes([data[96], data[97], data[98], data[99]]),
                    liquidity_after: U256::from_be_slice(&data[100..116]).to::<u128>(),
                }))
            }
            EventKind::PositionUpdated => {
                let event = decode_abi::<PositionUpdatedData>(data)?;
                if event.liquidityDelta == 0 {
                    return Ok(None);
                }

                let params = event.params;
                Ok(Some(PoolEvent::PositionUpdated {
                    pool_id: event.poolId,
                    lower: i32::from_be_bytes([params[24], params[25], params[26], params[27]]),
                    upper: i32::from_be_bytes([params[28], params[29], params[30], params[31]]),
                    liquidity_delta: event.liquidityDelta,
                }))
            }
            EventKind::VirtualOrdersExecuted => {
                let (pool_id, rate0, rate1) = packed_rates(data)?;

                Ok(Some(PoolEvent::VirtualOrdersExecuted {
                    pool_id,
                    sale_rate_token0: rate0,
                    sale_rate_token1: rate1,
                }))
            }
            EventKind::FeesDonated => {
                let (pool_id, rate0, rate1) = packed_rates(data)?;

                Ok(Some(PoolEvent::FeesDonated {
                    pool_id,
                    donate_rate0: rate0,
                    donate_rate1: rate1,
                }))
            }
            EventKind::OrderUpdated => {
                let event = decode_abi::<OrderUpdatedData>(data)?;
                if event.saleRateDelta == 0 {
                    return Ok(None);
                }

                Ok(Some(PoolEvent::OrderUpdated {
                    order_key: OrderKey::from_encoded(&event.orderKey),
                    sale_rate_delta: event.saleRateDelta,
                }))
            }
            EventKind::PoolBoosted => {
                let event = decode_abi::<PoolBoostedData>(data)?;
                if event.rate0 == 0 && event.rate1 == 0 {
                    return Ok(None);
                }

                Ok(Some(PoolEvent::PoolBoosted {
                    pool_id: event.poolId,
                    start_time: event.startTime,
                    end_time: event.endTime,
                    rate0: event.rate0,
                    rate1: event.rate1,
                }))
            }
        }
    }
}

#[inline]
fn ensure_len(data: &[u8], expected: usize) -> Result<(), EventError> {
    if data.len() < expected {
        return Err(EventError::PayloadTooShort {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Decodes a static ABI layout, rejecting words that do not fit their
/// declared Solidity type.
fn decode_abi<T: SolType>(data: &[u8]) -> Result<T::RustType, EventError> {
    let expected = T::ENCODED_SIZE.unwrap_or_default();
    ensure_len(data, expected)?;
    T::abi_decode_validate(&data[..expected]).map_err(|_| EventError::ValueOutOfRange)
}

/// `pool id (32) | rate0 (14) | rate1 (14)`.
fn packed_rates(data: &[u8]) -> Result<(B256, u128, u128), EventError> {
    ensure_len(data, RATES_LEN)?;
    Ok((
        B256::from_slice(&data[0..32]),
        U256::from_be_slice(&data[32..46]).to::<u128>(),
        U256::from_be_slice(&data[46..60]).to::<u128>(),
    ))
}
