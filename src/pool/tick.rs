use serde::{Deserialize, Serialize};

/// An initialized tick. Crossing it upward adds `liquidity_delta` to the
/// active liquidity; crossing it downward subtracts it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub number: i32,
    pub liquidity_delta: i128,
}

impl Tick {
    #[inline]
    pub const fn new(number: i32, liquidity_delta: i128) -> Self {
        Self {
            number,
            liquidity_delta,
        }
    }
}

/// Index of the greatest tick with `number <= tick_number`, or `None` when
/// every tick lies above it. `sorted_ticks` must be strictly ascending.
#[inline]
pub fn nearest_initialized_tick_index(sorted_ticks: &[Tick], tick_number: i32) -> Option<usize> {
    match sorted_ticks.binary_search_by(|tick| tick.number.cmp(&tick_number)) {
        Ok(index) => Some(index),
        Err(index) => index.checked_sub(1),
    }
}
