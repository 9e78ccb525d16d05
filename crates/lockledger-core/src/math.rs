//! # Range-Checked Arithmetic
//!
//! Overflow guards for the position fields. All operations return errors
//! instead of wrapping or truncating, and a failed check leaves the caller
//! free to abort with state untouched.
//!
//! The standalone-amount check and the combined-sum check fail with
//! distinct errors: a caller can tell "this amount could never be held"
//! apart from "this amount does not fit next to the existing balance".

use crate::constants::{MAX_BALANCE, MAX_LOCK_TIME};
use crate::errors::{LedgerError, LedgerResult};

/// Check that a standalone amount fits the balance field
pub fn check_amount(amount: u128) -> LedgerResult<u128> {
    if amount > MAX_BALANCE {
        return Err(LedgerError::ValueTooLarge);
    }
    Ok(amount)
}

/// Add an incoming amount to an existing balance, rejecting sums that
/// leave the balance field
pub fn add_balances(existing: u128, incoming: u128) -> LedgerResult<u128> {
    let sum = existing
        .checked_add(incoming)
        .ok_or(LedgerError::SumOverflow)?;
    if sum > MAX_BALANCE {
        return Err(LedgerError::SumOverflow);
    }
    Ok(sum)
}

/// Subtract an amount from an existing balance
pub fn sub_balance(existing: u128, amount: u128) -> LedgerResult<u128> {
    existing
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientBalance)
}

/// Check that a lock time fits the unlock-time field, narrowing it to the
/// stored width
pub fn check_lock_time(value: u64) -> LedgerResult<u32> {
    if value > MAX_LOCK_TIME {
        return Err(LedgerError::LockTimeTooLarge);
    }
    Ok(value as u32)
}

/// Ceiling division. The merged lock time must never resolve earlier than
/// the exact average, so every division here rounds up.
pub fn div_ceil(numerator: u128, denominator: u128) -> u128 {
    debug_assert!(denominator != 0);
    let quotient = numerator / denominator;
    if numerator % denominator == 0 {
        quotient
    } else {
        quotient + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_check_amount_boundary() {
        assert_eq!(check_amount(0).unwrap(), 0);
        assert_eq!(check_amount(MAX_BALANCE).unwrap(), MAX_BALANCE);
        assert_eq!(
            check_amount(MAX_BALANCE + 1),
            Err(LedgerError::ValueTooLarge)
        );
        assert_eq!(check_amount(u128::MAX), Err(LedgerError::ValueTooLarge));
    }

    #[test]
    fn test_add_balances_boundary() {
        assert_eq!(add_balances(1, 2).unwrap(), 3);
        assert_eq!(add_balances(MAX_BALANCE, 0).unwrap(), MAX_BALANCE);
        assert_eq!(
            add_balances(MAX_BALANCE, 1),
            Err(LedgerError::SumOverflow)
        );
        // Two half-capacity balances overflow by one
        let half = (MAX_BALANCE + 1) / 2;
        assert_eq!(add_balances(half, half), Err(LedgerError::SumOverflow));
        assert_eq!(add_balances(half, half - 1).unwrap(), MAX_BALANCE);
        // Native u128 overflow is also caught
        assert_eq!(
            add_balances(u128::MAX, u128::MAX),
            Err(LedgerError::SumOverflow)
        );
    }

    #[test]
    fn test_sub_balance() {
        assert_eq!(sub_balance(10, 4).unwrap(), 6);
        assert_eq!(sub_balance(10, 10).unwrap(), 0);
        assert_eq!(sub_balance(4, 10), Err(LedgerError::InsufficientBalance));
    }

    #[test]
    fn test_check_lock_time_boundary() {
        assert_eq!(check_lock_time(0).unwrap(), 0);
        assert_eq!(check_lock_time(MAX_LOCK_TIME).unwrap(), u32::MAX);
        assert_eq!(
            check_lock_time(MAX_LOCK_TIME + 1),
            Err(LedgerError::LockTimeTooLarge)
        );
    }

    #[test]
    fn test_div_ceil() {
        assert_eq!(div_ceil(0, 3), 0);
        assert_eq!(div_ceil(6, 3), 2);
        assert_eq!(div_ceil(7, 3), 3);
        assert_eq!(div_ceil(70_000, 3_000), 24);
    }

    proptest! {
        #[test]
        fn prop_add_balances_never_exceeds_field(
            a in 0..=MAX_BALANCE,
            b in 0..=MAX_BALANCE,
        ) {
            match add_balances(a, b) {
                Ok(sum) => {
                    prop_assert_eq!(sum, a + b);
                    prop_assert!(sum <= MAX_BALANCE);
                }
                Err(e) => {
                    prop_assert_eq!(e, LedgerError::SumOverflow);
                    prop_assert!(a + b > MAX_BALANCE);
                }
            }
        }

        #[test]
        fn prop_div_ceil_rounds_up(n in 0u128..1 << 100, d in 1u128..1 << 40) {
            let q = div_ceil(n, d);
            prop_assert!(q * d >= n);
            prop_assert!(q == 0 || (q - 1) * d < n);
        }
    }
}
