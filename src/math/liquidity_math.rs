use crate::error::MathError;

/// Applies a signed liquidity delta, failing instead of wrapping.
#[inline]
pub fn add_delta(liquidity: u128, delta: i128) -> Result<u128, MathError> {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(MathError::Underflow)
    } else {
        liquidity
            .checked_add(delta.unsigned_abs())
            .ok_or(MathError::Overflow)
    }
}

/// Liquidity after crossing an initialized tick: the tick's delta applies
/// as-is when the price moves up and negated when it moves down.
#[inline]
pub fn cross_tick(liquidity: u128, delta: i128, increasing: bool) -> Result<u128, MathError> {
    if increasing == (delta > 0) {
        liquidity
            .checked_add(delta.unsigned_abs())
            .ok_or(MathError::Overflow)
    } else {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(MathError::Underflow)
    }
}
