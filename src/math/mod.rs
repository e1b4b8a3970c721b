pub mod math_helpers;
pub mod sqrt_price_math;
pub mod sqrt_ratio;
pub mod swap_math;
pub mod tick_math;

pub mod fee_math;
pub mod liquidity_math;

pub mod twamm_math;
