/// Execution details a router needs besides the amounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapInfo<S> {
    /// Tick spacings that can be skipped per initialized tick lookup.
    pub skip_ahead: u32,
    pub is_token1: bool,
    /// Furthest price the quote was computed against, in compact float form.
    pub price_limit: u128,
    /// State to commit with `set_swap_state` if the swap goes through.
    pub swap_state_after: S,
    pub tick_spacings_crossed: u32,
    /// Initialized ticks (or stableswap range bounds) the price moved across.
    pub initialized_ticks_crossed: u32,
}

/// Result of quoting a swap. Never mutates the pool it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quote<S> {
    /// Portion of the specified amount that was used, with the same sign.
    pub consumed_amount: i128,
    /// Output for exact input, required input (fees included) for exact output.
    pub calculated_amount: u128,
    pub fees_paid: u128,
    /// Relative gas estimate.
    pub gas: u64,
    pub swap_info: SwapInfo<S>,
}

impl<S> Quote<S> {
    /// Re-wraps the post-swap state, keeping every other field.
    #[inline]
    pub fn map_state<T>(self, f: impl FnOnce(S) -> T) -> Quote<T> {
        let SwapInfo {
            skip_ahead,
            is_token1,
            price_limit,
            swap_state_after,
            tick_spacings_crossed,
            initialized_ticks_crossed,
        } = self.swap_info;

        Quote {
            consumed_amount: self.consumed_amount,
            calculated_amount: self.calculated_amount,
            fees_paid: self.fees_paid,
            gas: self.gas,
            swap_info: SwapInfo {
                skip_ahead,
                is_token1,
                price_limit,
                swap_state_after: f(swap_state_after),
                tick_spacings_crossed,
                initialized_ticks_crossed,
            },
        }
    }

    #[inline]
    pub fn swap_state_after(&self) -> &S {
        &self.swap_info.swap_state_after
    }
}
