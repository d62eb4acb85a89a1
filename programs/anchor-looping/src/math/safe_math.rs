//! Checked arithmetic for token amounts
//!
//! Every amount handed to a CPI passes through these helpers so that
//! overflow aborts the transaction instead of wrapping.

use anchor_lang::prelude::*;
use crate::errors::LoopingError;

/// Safely convert u128 to u64, erroring on overflow
#[inline]
pub fn safe_u128_to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| LoopingError::AmountOverflow.into())
}

/// Checked addition with custom error
#[inline]
pub fn checked_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or_else(|| LoopingError::MathOverflow.into())
}

/// Checked subtraction with custom error
#[inline]
pub fn checked_sub(a: u64, b: u64) -> Result<u64> {
    a.checked_sub(b).ok_or_else(|| LoopingError::MathUnderflow.into())
}

/// Multiply then divide, rounding DOWN
/// Order: (a * b) / c, computed in u128
pub fn mul_div_down(a: u64, b: u64, c: u64) -> Result<u64> {
    if c == 0 {
        return Err(LoopingError::DivisionByZero.into());
    }
    let product = (a as u128) * (b as u128);
    safe_u128_to_u64(product / c as u128)
}

/// Multiply then divide, rounding UP
/// Formula: (a * b + c - 1) / c, computed in u128
pub fn mul_div_up(a: u64, b: u64, c: u64) -> Result<u64> {
    if c == 0 {
        return Err(LoopingError::DivisionByZero.into());
    }
    let product = (a as u128) * (b as u128);
    // u64 * u64 + u64 cannot overflow u128
    safe_u128_to_u64((product + (c as u128 - 1)) / c as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_u128_to_u64_within_range() {
        assert_eq!(safe_u128_to_u64(0).unwrap(), 0u64);
        assert_eq!(safe_u128_to_u64(1000).unwrap(), 1000u64);
        assert_eq!(safe_u128_to_u64(u64::MAX as u128).unwrap(), u64::MAX);
    }

    #[test]
    fn test_safe_u128_to_u64_overflow() {
        assert!(safe_u128_to_u64(u64::MAX as u128 + 1).is_err());
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(checked_add(1, 2).unwrap(), 3);
        assert!(checked_add(u64::MAX, 1).is_err());
    }

    #[test]
    fn test_checked_sub() {
        assert_eq!(checked_sub(5, 3).unwrap(), 2);
        assert!(checked_sub(3, 5).is_err());
    }

    #[test]
    fn test_mul_div_down() {
        // 100 * 200 / 300 = 66.666... → 66
        assert_eq!(mul_div_down(100, 200, 300).unwrap(), 66);
        assert_eq!(mul_div_down(0, 100, 50).unwrap(), 0);
        assert!(mul_div_down(100, 200, 0).is_err());
    }

    #[test]
    fn test_mul_div_up() {
        // 100 * 200 / 300 = 66.666... → 67
        assert_eq!(mul_div_up(100, 200, 300).unwrap(), 67);
        assert_eq!(mul_div_up(100, 200, 200).unwrap(), 100);
        assert!(mul_div_up(1, 1, 0).is_err());
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // Intermediate product exceeds u64 but the result fits
        assert_eq!(mul_div_down(u64::MAX, 2, 2).unwrap(), u64::MAX);
        assert!(mul_div_up(u64::MAX, 2, 1).is_err());
    }
}
