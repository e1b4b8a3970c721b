//! Solidity layouts of the pool key and of the ABI-encoded event payloads.
//!
//! Swapped, VirtualOrdersExecuted and FeesDonated are emitted as packed bytes
//! and have no ABI layout; see [`crate::event`].

use alloy_sol_macro::sol;

sol! {
    /// `config` packs `extension (20) | fee (8) | type config (4)`.
    struct EncodedPoolKey {
        address token0;
        address token1;
        bytes32 config;
    }

    /// `config` packs `fee (8) | sells token1 (1) | unused (7) | start (8) | end (8)`.
    struct EncodedOrderKey {
        address token0;
        address token1;
        bytes32 config;
    }

    /// `params` carries the lower and upper tick in its last 8 bytes.
    struct PositionUpdatedData {
        address locker;
        bytes32 poolId;
        bytes32 params;
        int128 liquidityDelta;
    }

    struct OrderUpdatedData {
        address owner;
        bytes32 salt;
        EncodedOrderKey orderKey;
        int128 saleRateDelta;
    }

    struct PoolBoostedData {
        bytes32 poolId;
        uint64 startTime;
        uint64 endTime;
        uint128 rate0;
        uint128 rate1;
    }
}
