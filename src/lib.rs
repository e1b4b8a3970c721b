//! Bit-exact off-chain quoting for Ekubo-style pools in pure Rust.
//!
//! This crate exposes:
//! - Low-level math primitives (`math::*`) for sqrt ratios, ticks, fees and
//!   TWAMM price evolution, all matching the on-chain integer rounding.
//! - In-memory pool state machines (`pool::*`) for concentrated, full-range,
//!   stableswap, oracle, MEV-capture, boosted-fees and TWAMM pools.
//! - Event decoding (`event`) to keep those pools in sync with chain logs.
//!
//! # Examples
//!
//! ## Pure math
//! ```no_run
//! use ekubo_swap_math::{math::tick_math, math::sqrt_ratio::ONE_X128};
//!
//! let sqrt_ratio = tick_math::to_sqrt_ratio(0).unwrap();
//! assert_eq!(sqrt_ratio, ONE_X128);
//! ```
//!
//! ## Quoting a swap
//! ```no_run
//! use ekubo_swap_math::{
//!     pool::full_range::{FullRangePool, FullRangePoolState},
//!     pool::key::{PoolConfig, PoolKey, PoolTypeConfig},
//!     Address, GasCosts, Pool, U256,
//! };
//! use std::sync::Arc;
//!
//! let key = PoolKey::new(
//!     Address::ZERO,
//!     Address::with_last_byte(1),
//!     PoolConfig {
//!         extension: Address::ZERO,
//!         fee: 0,
//!         type_config: PoolTypeConfig::FullRange,
//!     },
//! )
//! .unwrap();
//! let state = FullRangePoolState::new(U256::from(1u8) << 128, 1_000_000).unwrap();
//! let mut pool = FullRangePool::new(Arc::new(key), state, GasCosts::default());
//!
//! let quote = pool.quote(1_000, true).unwrap();
//! println!("out: {}, gas: {}", quote.calculated_amount, quote.gas);
//!
//! // nothing changes until the swap is committed
//! pool.set_swap_state(quote.swap_info.swap_state_after);
//! ```

pub use alloy_primitives::{Address, B256, I256, U256};

pub mod abi;
pub mod config;
pub mod error;
pub mod event;
pub mod math;
pub mod pool;

pub use config::{ExtensionType, GasCosts, QuoterConfig};
pub use error::Error;
pub use event::{EventKind, PoolEvent};
pub use pool::key::{PoolConfig, PoolKey, PoolTypeConfig};
pub use pool::quote::{Quote, SwapInfo};
pub use pool::swap::{AnyPool, AnySwapState, PoolSnapshot};
pub use pool::Pool;
