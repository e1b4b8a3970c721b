//! Quoter configuration: which extension contracts map to which pool
//! variant, and the relative gas costs reported with every quote.
//!
//! ```toml
//! [extensions]
//! "0x51d02a5948496a67827242eabc5725531342527c" = "oracle"
//!
//! [gas]
//! initialized_tick_crossed = 20000
//! ```

use crate::error::ConfigError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Pool behavior selected by the extension in a pool's key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionType {
    /// No extension, or one that never hooks into swaps.
    NoSwapCallPoints,
    Oracle,
    MevCapture,
    Twamm,
    BoostedFeesConcentrated,
    Unknown,
}

impl ExtensionType {
    pub fn name(self) -> &'static str {
        match self {
            ExtensionType::NoSwapCallPoints => "no_swap_call_points",
            ExtensionType::Oracle => "oracle",
            ExtensionType::MevCapture => "mev_capture",
            ExtensionType::Twamm => "twamm",
            ExtensionType::BoostedFeesConcentrated => "boosted_fees_concentrated",
            ExtensionType::Unknown => "unknown",
        }
    }
}

/// Relative gas costs. Only their ratios matter to a router comparing
/// quotes; they are not meant to predict an exact receipt.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasCosts {
    pub base_concentrated_liquidity_swap: u64,
    pub base_full_range_swap: u64,
    pub base_stableswap_swap: u64,
    pub initialized_tick_crossed: u64,
    pub tick_spacing_crossed: u64,
    pub accumulating_oracle_snapshot: u64,
    pub extra_base_mev_capture_swap: u64,
    pub accumulating_mev_capture_fees: u64,
    pub executing_virtual_orders: u64,
    pub virtual_order_delta: u64,
    pub executing_boosted_fees: u64,
    pub boosted_fees_donate_rate_delta: u64,
}

impl Default for GasCosts {
    fn default() -> Self {
        Self {
            base_concentrated_liquidity_swap: 24_000,
            base_full_range_swap: 14_000,
            base_stableswap_swap: 16_000,
            initialized_tick_crossed: 20_000,
            tick_spacing_crossed: 4_000,
            accumulating_oracle_snapshot: 10_000,
            extra_base_mev_capture_swap: 10_000,
            accumulating_mev_capture_fees: 12_000,
            executing_virtual_orders: 15_000,
            virtual_order_delta: 25_000,
            executing_boosted_fees: 10_000,
            boosted_fees_donate_rate_delta: 15_000,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoterConfig {
    /// Extension contract address to pool variant.
    pub extensions: HashMap<Address, ExtensionType>,
    pub gas: GasCosts,
}

impl QuoterConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Resolves the variant for `extension`. The zero address never hooks
    /// into swaps; unregistered addresses are `Unknown`.
    pub fn extension_type(&self, extension: Address) -> ExtensionType {
        if extension.is_zero() {
            return ExtensionType::NoSwapCallPoints;
        }
        self.extensions
            .get(&extension)
            .copied()
            .unwrap_or(ExtensionType::Unknown)
    }
}
