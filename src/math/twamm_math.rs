//! Closed-form price evolution for two continuous, opposing TWAMM sale
//! streams against full-range liquidity.

use crate::error::MathError;
use crate::math::fee_math::compute_fee;
use crate::math::math_helpers::{isqrt, mul_div};
use crate::math::sqrt_ratio::ONE_X128;
use alloy_primitives::U256;

/// Exponents at or above this (64 in 64.64 fixed point) saturate to the
/// sale ratio.
const EXPONENT_LIMIT: U256 = U256::from_limbs([0, 0x40, 0, 0]);

/// Seconds to the 64.64 exponent scale: `2^64 · 2 / ln 2 / 2^32`.
const TIME_EXPONENT_MULTIPLIER: u64 = 12392656037;

/// `EXP2_FACTORS[i] = 2^128 · 2^(2^-(i+1))`, rounded down.
static EXP2_FACTORS: [U256; 64] = [
    U256::from_limbs([12896923290648804670, 7640891576956012808, 1, 0]),
    U256::from_limbs([10185530680776453612, 3490255227380126430, 1, 0]),
    U256::from_limbs([17854737389604993312, 1669572981167730125, 1, 0]),
    U256::from_limbs([10057302232697242468, 816707133613602345, 1, 0]),
    U256::from_limbs([8958942473441515518, 403931097166463918, 1, 0]),
    U256::from_limbs([17855306115364535785, 200871872941133542, 1, 0]),
    U256::from_limbs([5361163942339934784, 100163996173424344, 1, 0]),
    U256::from_limbs([3002515481205445956, 50014196964519265, 1, 0]),
    U256::from_limbs([18381954890662373276, 24990171141283489, 1, 0]),
    U256::from_limbs([7863777292665987088, 12490856599448656, 1, 0]),
    U256::from_limbs([2935407722259146208, 6244371414720417, 1, 0]),
    U256::from_limbs([4099144763823068966, 3121921530820282, 1, 0]),
    U256::from_limbs([7830867710921767998, 1560894726863213, 1, 0]),
    U256::from_limbs([15030865137112770483, 780430854493329, 1, 0]),
    U256::from_limbs([6072397496287043622, 390211300099399, 1, 0]),
    U256::from_limbs([439311289473205244, 195104618273796, 1, 0]),
    U256::from_limbs([3381501736036650924, 97552051194286, 1, 0]),
    U256::from_limbs([11878183186495682505, 48775961111660, 1, 0]),
    U256::from_limbs([436289341605138797, 24387964434481, 1, 0]),
    U256::from_limbs([15706463035261523811, 12193978186905, 1, 0]),
    U256::from_limbs([10951006159863813672, 6096988085869, 1, 0]),
    U256::from_limbs([100320500613761580, 3048493791039, 1, 0]),
    U256::from_limbs([10331567486136386213, 1524246832545, 1, 0]),
    U256::from_limbs([5442291021268196351, 762123400529, 1, 0]),
    U256::from_limbs([14320987186005390064, 381061696328, 1, 0]),
    U256::from_limbs([7754798478847538042, 190530847180, 1, 0]),
    U256::from_limbs([4025998895411732230, 95265423344, 1, 0]),
    U256::from_limbs([11273524327873463545, 47632711610, 1, 0]),
    U256::from_limbs([17175265786997884963, 23816355789, 1, 0]),
    U256::from_limbs([2248886808180014672, 11908177891, 1, 0]),
    U256::from_limbs([11068971934550065103, 5954088944, 1, 0]),
    U256::from_limbs([1103089072964130132, 2977044472, 1, 0]),
    U256::from_limbs([17890439386703286701, 1488522235, 1, 0]),
    U256::from_limbs([17891629424345511116, 744261117, 1, 0]),
    U256::from_limbs([18099946172563701162, 372130558, 1, 0]),
    U256::from_limbs([9032662942166067631, 186065279, 1, 0]),
    U256::from_limbs([13735375971908885711, 93032639, 1, 0]),
    U256::from_limbs([16089978138801990413, 46516319, 1, 0]),
    U256::from_limbs([17268090635253964293, 23258159, 1, 0]),
    U256::from_limbs([17857349736731306316, 11629079, 1, 0]),
    U256::from_limbs([18152030000782816062, 5814539, 1, 0]),
    U256::from_limbs([18299382811136780613, 2907269, 1, 0]),
    U256::from_limbs([18373062385895815308, 1453634, 1, 0]),
    U256::from_limbs([9186530928816069952, 726817, 1, 0]),
    U256::from_limbs([13816637435229851358, 363408, 1, 0]),
    U256::from_limbs([6908318701106685823, 181704, 1, 0]),
    U256::from_limbs([3454159346426282947, 90852, 1, 0]),
    U256::from_limbs([1727079672181376482, 45426, 1, 0]),
    U256::from_limbs([863539835832746993, 22713, 1, 0]),
    U256::from_limbs([9655141954706663992, 11356, 1, 0]),
    U256::from_limbs([4827570977337210668, 5678, 1, 0]),
    U256::from_limbs([2413785488664575002, 2839, 1, 0]),
    U256::from_limbs([10430264781186055726, 1419, 1, 0]),
    U256::from_limbs([14438504427447551775, 709, 1, 0]),
    U256::from_limbs([16442624250578488721, 354, 1, 0]),
    U256::from_limbs([8221312125289228617, 177, 1, 0]),
    U256::from_limbs([13334028099499386180, 88, 1, 0]),
    U256::from_limbs([6667014049749692106, 44, 1, 0]),
    U256::from_limbs([3333507024874845807, 22, 1, 0]),
    U256::from_limbs([1666753512437422842, 11, 1, 0]),
    U256::from_limbs([10056748793073487213, 5, 1, 0]),
    U256::from_limbs([14251746433391519410, 2, 1, 0]),
    U256::from_limbs([7125873216695759704, 1, 1, 0]),
    U256::from_limbs([12786308645202655660, 0, 1, 0]),
];

/// `2^x` for a 64.64 fixed-point `x < 64`, returned in 64.64 fixed point.
///
/// Callers must keep `x` below [`EXPONENT_LIMIT`].
pub fn exp2(x: U256) -> U256 {
    debug_assert!(x < EXPONENT_LIMIT);

    let fraction = x.as_limbs()[0];
    let integer = x.as_limbs()[1];

    let mut result: U256 = U256::ONE << 127;
    for (i, factor) in EXP2_FACTORS.iter().enumerate() {
        if fraction & (1u64 << (63 - i)) != 0 {
            result = result.wrapping_mul(*factor) >> 128;
        }
    }

    result >> (63 - integer as usize)
}

/// The sqrt ratio at which the two sale streams balance:
/// `√(sale_rate_token1 / sale_rate_token0) · 2^128`.
///
/// Precision is traded for range in three bands so the square root never
/// overflows.
pub fn compute_sqrt_sale_ratio(
    sale_rate_token0: u128,
    sale_rate_token1: u128,
) -> Result<U256, MathError> {
    let sale_ratio: U256 = (U256::from(sale_rate_token1) << 128usize)
        .checked_div(U256::from(sale_rate_token0))
        .ok_or(MathError::DivisionByZero)?;

    Ok(if sale_ratio <= U256::from(u128::MAX) {
        isqrt(sale_ratio << 128)
    } else if sale_ratio < U256::ONE << 192 {
        isqrt(sale_ratio << 64) << 32
    } else {
        isqrt(sale_ratio << 16) << 56
    })
}

/// Sqrt ratio after `time_elapsed` seconds of both sale streams trading
/// against `liquidity`, starting from `sqrt_ratio`.
///
/// The price decays exponentially from `sqrt_ratio` toward the sale ratio.
/// With no liquidity, no distance to cover, or an exponent too large to
/// evaluate, the sale ratio itself is returned.
pub fn calculate_next_sqrt_ratio(
    sqrt_ratio: U256,
    liquidity: u128,
    sale_rate_token0: u128,
    sale_rate_token1: u128,
    time_elapsed: u32,
    fee: u64,
) -> Result<U256, MathError> {
    let sqrt_sale_ratio = compute_sqrt_sale_ratio(sale_rate_token0, sale_rate_token1)?;

    let distance = if sqrt_ratio > sqrt_sale_ratio {
        sqrt_ratio - sqrt_sale_ratio
    } else {
        sqrt_sale_ratio - sqrt_ratio
    };
    let c = mul_div(distance, ONE_X128, sqrt_ratio + sqrt_sale_ratio)?;

    if c.is_zero() || liquidity == 0 {
        return Ok(sqrt_sale_ratio);
    }

    let sale_rate = isqrt(U256::from(sale_rate_token0) * U256::from(sale_rate_token1));
    let sale_rate_after_fee =
        sale_rate - U256::from(compute_fee(sale_rate.saturating_to::<u128>(), fee));

    let exponent = sale_rate_after_fee
        * U256::from(time_elapsed)
        * U256::from(TIME_EXPONENT_MULTIPLIER)
        / U256::from(liquidity);

    if exponent >= EXPONENT_LIMIT {
        return Ok(sqrt_sale_ratio);
    }

    let e = exp2(exponent) << 64;

    if sqrt_ratio < sqrt_sale_ratio {
        mul_div(sqrt_sale_ratio, e - c, e + c)
    } else {
        mul_div(sqrt_sale_ratio, e + c, e - c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::to_sqrt_ratio;
    use std::str::FromStr;

    fn u256(value: &str) -> U256 {
        U256::from_str(value).unwrap()
    }

    #[test]
    fn exp2_known_points() {
        let one = U256::ONE << 64;
        assert_eq!(exp2(U256::ZERO), one);
        assert_eq!(exp2(one), one << 1);
        // 2^0.5
        assert_eq!(exp2(one >> 1), u256("26087635650665564424"));
        // just below the limit
        assert_eq!(
            exp2(EXPONENT_LIMIT - U256::ONE),
            u256("340282366920938463450588298786565555737")
        );
    }

    #[test]
    fn sqrt_sale_ratio_bands() {
        assert_eq!(compute_sqrt_sale_ratio(1, 1).unwrap(), ONE_X128);
        assert_eq!(compute_sqrt_sale_ratio(1, 4).unwrap(), ONE_X128 << 1);
        assert_eq!(compute_sqrt_sale_ratio(4, 1).unwrap(), ONE_X128 >> 1);
        assert_eq!(
            compute_sqrt_sale_ratio(1 << 32, 1_000_000_000_000_000_000_000_000_000_000 << 32)
                .unwrap(),
            ONE_X128 * U256::from(1_000_000_000_000_000u64)
        );
        assert!(matches!(
            compute_sqrt_sale_ratio(0, 1),
            Err(MathError::DivisionByZero)
        ));
    }

    #[test]
    fn balanced_streams_stay_put() {
        let next = calculate_next_sqrt_ratio(ONE_X128, 1_000_000_000_000_000_000, 1 << 32, 1 << 32, 0, 0)
            .unwrap();
        assert_eq!(next, ONE_X128);
    }

    #[test]
    fn zero_liquidity_jumps_to_sale_ratio() {
        let next = calculate_next_sqrt_ratio(ONE_X128, 0, 1 << 32, 4 << 32, 10, 0).unwrap();
        assert_eq!(next, ONE_X128 << 1);
    }

    #[test]
    fn moves_toward_sale_ratio() {
        let next =
            calculate_next_sqrt_ratio(ONE_X128, 1_000_000_000_000_000_000, 1 << 32, 4 << 32, 3600, 0)
                .unwrap();
        assert_eq!(next, u256("340282366920942138497515948103789155264"));
        assert!(next > ONE_X128 && next < ONE_X128 << 1);
    }

    #[test]
    fn matches_onchain_execution() {
        let next = calculate_next_sqrt_ratio(
            to_sqrt_ratio(693147).unwrap(),
            70710696755630728101718334,
            10526880627450980392156862745,
            10526880627450980392156862745,
            2040,
            0,
        )
        .unwrap();
        assert_eq!(next, u256("481207752340104468440230394611216485600"));
    }
}
