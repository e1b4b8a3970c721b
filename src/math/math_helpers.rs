use crate::error::MathError;
use alloy_primitives::{aliases::U512, U256};

/// Narrows a 512-bit intermediate back to 256 bits, or `None` if any of
/// the upper limbs is set.
#[inline(always)]
fn narrow(value: U512) -> Option<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|&limb| limb != 0) {
        return None;
    }
    Some(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// Computes `a * b / denominator` with full 512‑bit intermediate
/// precision, returning a `MathError` on overflow or division by zero.
///
/// This mirrors the on-chain `FullMath.mulDiv` behavior and underpins
/// the amount-delta and TWAMM price calculations.
#[inline(always)]
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let product = U512::from(a) * U512::from(b);
    narrow(product / U512::from(denominator)).ok_or(MathError::Overflow)
}

/// Like [`mul_div`], but rounds the result up when there is a
/// non‑zero remainder, returning an overflow error if the result
/// would exceed `U256::MAX`.
#[inline(always)]
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let product = U512::from(a) * U512::from(b);
    let (quotient, remainder) = product.div_rem(U512::from(denominator));
    let quotient = narrow(quotient).ok_or(MathError::Overflow)?;

    if remainder.is_zero() {
        Ok(quotient)
    } else {
        quotient.checked_add(U256::ONE).ok_or(MathError::Overflow)
    }
}

/// Divides `a` by `b`, rounding the result up to the next integer
/// when there is a non‑zero remainder.
#[inline(always)]
pub fn div_rounding_up(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let (quotient, remainder) = a.div_rem(b);
    Ok(if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::ONE
    })
}

/// Converts a 256-bit value into `u128`, failing with `Overflow` when
/// any of the upper 128 bits is set.
#[inline(always)]
pub fn to_u128(value: U256) -> Result<u128, MathError> {
    let limbs = value.as_limbs();
    if limbs[2] != 0 || limbs[3] != 0 {
        return Err(MathError::Overflow);
    }
    Ok(((limbs[1] as u128) << 64) | limbs[0] as u128)
}

/// Floor of the square root.
#[inline(always)]
pub fn isqrt(value: U256) -> U256 {
    value.root(2)
}

/// Converts to the nearest `f64` (ties to even), like a hardware
/// integer-to-float conversion would.
pub fn u256_to_f64(value: U256) -> f64 {
    let bits = value.bit_len();
    if bits <= 64 {
        return value.as_limbs()[0] as f64;
    }

    let shift = bits - 64;
    let mut top = (value >> shift).as_limbs()[0];
    // Keep a sticky bit so the u64 -> f64 rounding sees the discarded tail.
    if !(value & ((U256::ONE << shift) - U256::ONE)).is_zero() {
        top |= 1;
    }
    top as f64 * 2f64.powi(shift as i32)
}
