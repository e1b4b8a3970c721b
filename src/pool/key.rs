use crate::abi::EncodedPoolKey;
use crate::error::{StateError, SwapError};
use alloy_primitives::{keccak256, Address, B256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const CONCENTRATED_FLAG: u32 = 0x8000_0000;
const CENTER_TICK_STEP: i32 = 16;

/// How liquidity is distributed over the price range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolTypeConfig {
    FullRange,
    /// Liquidity confined around `center_tick`, narrower for larger
    /// `amplification_factor`.
    Stableswap {
        center_tick: i32,
        amplification_factor: u8,
    },
    Concentrated {
        tick_spacing: u32,
    },
}

impl PoolTypeConfig {
    pub fn name(self) -> &'static str {
        match self {
            PoolTypeConfig::FullRange => "full_range",
            PoolTypeConfig::Stableswap { .. } => "stableswap",
            PoolTypeConfig::Concentrated { .. } => "concentrated",
        }
    }

    /// Packs the type config into the trailing 4 bytes of the config word.
    pub fn encode(self) -> u32 {
        match self {
            PoolTypeConfig::FullRange => 0,
            PoolTypeConfig::Stableswap {
                center_tick,
                amplification_factor,
            } => {
                let center = (center_tick / CENTER_TICK_STEP) as u32 & 0x00ff_ffff;
                (u32::from(amplification_factor) << 24) | center
            }
            PoolTypeConfig::Concentrated { tick_spacing } => {
                CONCENTRATED_FLAG | (tick_spacing & !CONCENTRATED_FLAG)
            }
        }
    }

    pub fn decode(word: u32) -> Self {
        if word & CONCENTRATED_FLAG != 0 {
            return PoolTypeConfig::Concentrated {
                tick_spacing: word & !CONCENTRATED_FLAG,
            };
        }

        let amplification_factor = (word >> 24) as u8;
        // sign-extend the 24-bit center
        let center_tick = ((word << 8) as i32 >> 8) * CENTER_TICK_STEP;

        if amplification_factor == 0 && center_tick == 0 {
            PoolTypeConfig::FullRange
        } else {
            PoolTypeConfig::Stableswap {
                center_tick,
                amplification_factor,
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolConfig {
    pub extension: Address,
    /// Fraction of 2^64 charged on the input amount.
    pub fee: u64,
    pub type_config: PoolTypeConfig,
}

impl PoolConfig {
    /// `extension (20 bytes) | fee (8 bytes) | type config (4 bytes)`.
    pub fn to_word(&self) -> B256 {
        B256::from_slice(&(self.extension, self.fee, self.type_config.encode()).abi_encode_packed())
    }

    pub fn from_word(word: B256) -> Self {
        let bytes = word.as_slice();
        let mut fee = [0u8; 8];
        fee.copy_from_slice(&bytes[20..28]);
        let mut type_config = [0u8; 4];
        type_config.copy_from_slice(&bytes[28..]);

        Self {
            extension: Address::from_slice(&bytes[..20]),
            fee: u64::from_be_bytes(fee),
            type_config: PoolTypeConfig::decode(u32::from_be_bytes(type_config)),
        }
    }
}

/// Identifies a pool. The numeric id is computed on first use and cached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolKey {
    token0: Address,
    token1: Address,
    config: PoolConfig,
    #[serde(skip)]
    num_id: OnceLock<B256>,
}

impl PartialEq for PoolKey {
    fn eq(&self, other: &Self) -> bool {
        self.token0 == other.token0 && self.token1 == other.token1 && self.config == other.config
    }
}

impl Eq for PoolKey {}

/// Returns the pair in canonical `(token0, token1)` order.
#[inline]
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl PoolKey {
    /// Fails with `TokenOrderInvalid` unless `token0 < token1`.
    pub fn new(token0: Address, token1: Address, config: PoolConfig) -> Result<Self, StateError> {
        if token0 >= token1 {
            return Err(StateError::TokenOrderInvalid);
        }

        Ok(Self {
            token0,
            token1,
            config,
            num_id: OnceLock::new(),
        })
    }

    #[inline]
    pub fn token0(&self) -> Address {
        self.token0
    }

    #[inline]
    pub fn token1(&self) -> Address {
        self.token1
    }

    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    #[inline]
    pub fn fee(&self) -> u64 {
        self.config.fee
    }

    #[inline]
    pub fn extension(&self) -> Address {
        self.config.extension
    }

    /// Tick spacing for concentrated pools, zero otherwise.
    pub fn tick_spacing(&self) -> u32 {
        match self.config.type_config {
            PoolTypeConfig::Concentrated { tick_spacing } => tick_spacing,
            _ => 0,
        }
    }

    /// `keccak256(abi.encode(token0, token1, config))`.
    pub fn num_id(&self) -> B256 {
        *self.num_id.get_or_init(|| {
            let encoded = EncodedPoolKey {
                token0: self.token0,
                token1: self.token1,
                config: self.config.to_word(),
            };
            keccak256(encoded.abi_encode())
        })
    }

    /// Whether `token` is token1 of this pool. Fails for tokens outside the pair.
    pub fn is_token1(&self, token: Address) -> Result<bool, SwapError> {
        if token == self.token1 {
            Ok(true)
        } else if token == self.token0 {
            Ok(false)
        } else {
            Err(SwapError::TokenNotInPool)
        }
    }
}
