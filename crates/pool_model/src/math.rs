//! Widening math utilities shared by the unit and settlement modules.

use crate::state::PoolError;

/// Multiply two u64 values and return u128
#[inline]
pub fn mul_u64(a: u64, b: u64) -> u128 {
    (a as u128) * (b as u128)
}

/// Floor-divide a u128 numerator by a u64 denominator.
///
/// Returns `DivideByZero` on a zero denominator; callers that treat a zero
/// denominator as "no claim exists" convert the error themselves.
#[inline]
pub fn div_floor(numerator: u128, denominator: u64) -> Result<u128, PoolError> {
    if denominator == 0 {
        return Err(PoolError::DivideByZero);
    }
    Ok(numerator / (denominator as u128))
}

/// Narrow a u128 back to u64, failing with `Overflow` if it does not fit.
#[inline]
pub fn narrow(value: u128) -> Result<u64, PoolError> {
    u64::try_from(value).map_err(|_| PoolError::Overflow)
}

/// floor(a * b / d) with u128 intermediates.
#[inline]
pub fn mul_div_floor(a: u64, b: u64, d: u64) -> Result<u64, PoolError> {
    narrow(div_floor(mul_u64(a, b), d)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floor_rounds_down() {
        assert_eq!(mul_div_floor(500, 1000, 2000).unwrap(), 250);
        assert_eq!(mul_div_floor(5, 3, 2).unwrap(), 7); // 7.5 floors to 7
    }

    #[test]
    fn test_mul_div_floor_zero_denominator() {
        assert_eq!(mul_div_floor(1, 1, 0), Err(PoolError::DivideByZero));
    }

    #[test]
    fn test_narrow_overflow() {
        assert_eq!(narrow(u64::MAX as u128), Ok(u64::MAX));
        assert_eq!(narrow(u64::MAX as u128 + 1), Err(PoolError::Overflow));
    }
}
