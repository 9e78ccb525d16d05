//! # Lock Guard
//!
//! Permission checks for balance-changing operations. Every check runs
//! against pre-mutation state; a rejection leaves both positions exactly
//! as they were.
//!
//! A position is `Locked` while `now < unlock_at` and `Unlocked` from
//! `unlock_at` on. The transition is driven purely by time, and `now` is
//! read once per operation, so a single operation's checks cannot flip
//! mid-flight.

use crate::errors::{LedgerError, LedgerResult};
use crate::policy::LockPolicy;
use crate::position::Position;

/// Authorize moving balance out of `source` at time `now`.
///
/// Under [`LockPolicy::Timelock`] the source must have unlocked. Under
/// [`LockPolicy::Maturity`] outbound movement has no waiting requirement
/// of its own; the blocking condition lives entirely in the inbound
/// ordering check.
pub fn authorize_outbound(
    policy: LockPolicy,
    source: &Position,
    now: u64,
) -> LedgerResult<()> {
    match policy {
        LockPolicy::Timelock => {
            if source.is_locked(now) {
                return Err(LedgerError::Unexpired);
            }
            Ok(())
        }
        LockPolicy::Maturity => Ok(()),
    }
}

/// Authorize merging balance with unlock time `incoming_unlock` into
/// `dest`.
///
/// Under [`LockPolicy::Maturity`] a held destination only accepts
/// incoming balance that is at least as mature: an incoming unlock later
/// than the destination's current unlock would extend a lock observers
/// already rely on, and is rejected. An empty destination accepts any
/// unlock time. Under [`LockPolicy::Timelock`] merges are always
/// permitted, since merging is exactly how the lock is recomputed.
pub fn authorize_inbound(
    policy: LockPolicy,
    dest: &Position,
    incoming_unlock: u32,
) -> LedgerResult<()> {
    match policy {
        LockPolicy::Timelock => Ok(()),
        LockPolicy::Maturity => {
            if !dest.is_empty() && incoming_unlock > dest.unlock_at {
                return Err(LedgerError::LockTimeOrder);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(balance: u128, unlock_at: u32) -> Position {
        Position { balance, unlock_at }
    }

    #[test]
    fn test_timelock_outbound_waits_for_unlock() {
        let source = held(1_000, 100);
        assert_eq!(
            authorize_outbound(LockPolicy::Timelock, &source, 99),
            Err(LedgerError::Unexpired)
        );
        // Unlock is inclusive
        assert!(authorize_outbound(LockPolicy::Timelock, &source, 100).is_ok());
        assert!(authorize_outbound(LockPolicy::Timelock, &source, 101).is_ok());
    }

    #[test]
    fn test_maturity_outbound_is_unrestricted() {
        let source = held(1_000, u32::MAX);
        assert!(authorize_outbound(LockPolicy::Maturity, &source, 0).is_ok());
    }

    #[test]
    fn test_timelock_inbound_is_unrestricted() {
        let dest = held(1_000, 50);
        assert!(authorize_inbound(LockPolicy::Timelock, &dest, u32::MAX).is_ok());
    }

    #[test]
    fn test_maturity_inbound_ordering() {
        let dest = held(1_000, 100);
        // Equal or earlier incoming unlock is fine
        assert!(authorize_inbound(LockPolicy::Maturity, &dest, 100).is_ok());
        assert!(authorize_inbound(LockPolicy::Maturity, &dest, 10).is_ok());
        // Later incoming unlock would extend the destination's lock
        assert_eq!(
            authorize_inbound(LockPolicy::Maturity, &dest, 101),
            Err(LedgerError::LockTimeOrder)
        );
        // An empty destination accepts anything
        assert!(authorize_inbound(LockPolicy::Maturity, &Position::ZERO, u32::MAX).is_ok());
    }
}
