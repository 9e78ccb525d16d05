//! # Ledger Error Types
//!
//! One error enum shared by the arithmetic guards, the merge policies and
//! the ledger entry points. Every variant aborts the in-flight operation
//! (and any enclosing batch) with state unchanged.

use thiserror::Error;

/// Errors raised by the lock-time accounting engine
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    // ========================================================================
    // Range Errors
    // ========================================================================
    /// A single amount already exceeds the balance field width
    #[error("amount exceeds the balance field width")]
    ValueTooLarge,

    /// A combined balance would exceed the balance field width
    #[error("combined balance exceeds the balance field width")]
    SumOverflow,

    /// A lock time exceeds the unlock-time field width
    #[error("lock time exceeds the unlock-time field width")]
    LockTimeTooLarge,

    // ========================================================================
    // Lock Guard Errors
    // ========================================================================
    /// The position is still locked at the time of transfer
    #[error("position is still locked")]
    Unexpired,

    /// The merge or transfer would violate lock-time ordering
    #[error("lock-time ordering violated")]
    LockTimeOrder,

    // ========================================================================
    // Bookkeeping Errors
    // ========================================================================
    /// Burn or transfer amount exceeds the available balance
    #[error("amount exceeds the available balance")]
    InsufficientBalance,
}

/// Result type using ledger errors
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", LedgerError::Unexpired),
            "position is still locked"
        );
        assert_eq!(
            format!("{}", LedgerError::LockTimeOrder),
            "lock-time ordering violated"
        );
    }
}
