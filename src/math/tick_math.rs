use crate::error::StateError;
use crate::math::math_helpers::u256_to_f64;
use crate::math::sqrt_ratio::{fixed_sqrt_ratio_to_float, float_sqrt_ratio_to_fixed};
use alloy_primitives::U256;

/// Ticks are spaced by a price factor of `1.000001`.
pub const MIN_TICK: i32 = -88722835;
pub const MAX_TICK: i32 = -MIN_TICK;

/// Natural log of the sqrt-price step between two adjacent ticks.
pub const LOG_BASE_SQRT_TICK_SIZE: f64 = 4.99999875000010e-7;

/// Returns the sqrt ratio (`√(1.000001^tick) · 2^128`) at `tick`, or
/// `StateError::TickOutOfBounds` if the tick is outside
/// `[MIN_TICK, MAX_TICK]`.
///
/// The result is normalized through the compact float representation
/// (rounding down), so every returned value is exactly storable on-chain.
pub fn to_sqrt_ratio(tick: i32) -> Result<U256, StateError> {
    let abs_tick = tick.unsigned_abs();

    if abs_tick > MAX_TICK as u32 {
        return Err(StateError::TickOutOfBounds);
    }

    // Start with ratio based on bit 0
    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_limbs([8987818235631183931, 18446734850344432284, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };

    macro_rules! apply_multiplier {
        ($bit:expr, $l0:expr, $l1:expr) => {
            if abs_tick & $bit != 0 {
                ratio = ratio.wrapping_mul(U256::from_limbs([$l0, $l1, 0, 0])) >> 128;
            }
        };
    }

    apply_multiplier!(0x2, 1390292817054524432, 18446725626983924632);
    apply_multiplier!(0x4, 6106104599673403081, 18446707180276744355);
    apply_multiplier!(0x8, 11001558419889720088, 18446670286917723849);
    apply_multiplier!(0x10, 11758220747761187196, 18446596500421042512);
    apply_multiplier!(0x20, 13410380190397192564, 18446448928313114404);
    apply_multiplier!(0x40, 16901990496071521224, 18446153787638963396);
    apply_multiplier!(0x80, 2628633744169581664, 18445563520457217769);
    apply_multiplier!(0x100, 16741406942698519205, 18444383042757836574);
    apply_multiplier!(0x200, 8444515413536692068, 18442022313998591526);
    apply_multiplier!(0x400, 9306074004969915320, 18437301762902803792);
    apply_multiplier!(0x800, 1215727185815661655, 18427864285319361663);
    apply_multiplier!(0x1000, 4836152305972799785, 18409003819927758022);
    apply_multiplier!(0x2000, 465769373252535706, 18371340779054097314);
    apply_multiplier!(0x4000, 11626538800767970419, 18296245704473805246);
    apply_multiplier!(0x8000, 13511344043162985703, 18146975181141493926);
    apply_multiplier!(0x10000, 17542275577360126846, 17852077684229624197);
    apply_multiplier!(0x20000, 9306072323298629247, 17276581513264360642);
    apply_multiplier!(0x40000, 8354374849381600509, 16180647793008867682);
    apply_multiplier!(0x80000, 1840363272369915117, 14192930847592841948);
    apply_multiplier!(0x100000, 16571633202497044730, 10920045577671636999);
    apply_multiplier!(0x200000, 7981864148337927882, 6464414258794766152);
    apply_multiplier!(0x400000, 4190795360855086819, 2265367348423649960);
    apply_multiplier!(0x800000, 14440677137918516476, 278200272243057167);
    apply_multiplier!(0x1000000, 11954280435123913168, 4195612578938288);
    apply_multiplier!(0x2000000, 1943989925737446246, 954269482040);
    apply_multiplier!(0x4000000, 6723154418996326713, 49365);

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    Ok(float_sqrt_ratio_to_fixed(fixed_sqrt_ratio_to_float(
        ratio, false,
    )?))
}

/// Floating-point estimate of the tick at `sqrt_ratio`, rounded down.
///
/// This is not the exact inverse of [`to_sqrt_ratio`]; it is only used where
/// the protocol itself approximates tick movement.
pub fn approximate_sqrt_ratio_to_tick(sqrt_ratio: U256) -> i32 {
    let price = u256_to_f64(sqrt_ratio) / 2f64.powi(128);
    (price.ln() / LOG_BASE_SQRT_TICK_SIZE).floor() as i32
}

/// Approximates how many multiples of `tick_spacing` lie between two sqrt
/// ratios. Returns 0 for a zero spacing.
pub fn approximate_number_of_tick_spacings_crossed(
    sqrt_ratio_start: U256,
    sqrt_ratio_end: U256,
    tick_spacing: u32,
) -> u32 {
    if tick_spacing == 0 {
        return 0;
    }

    let log_start = u256_to_f64(sqrt_ratio_start).ln();
    let log_end = u256_to_f64(sqrt_ratio_end).ln();
    let ticks_crossed = (log_start - log_end).abs() / LOG_BASE_SQRT_TICK_SIZE;

    (ticks_crossed / tick_spacing as f64) as u32
}
