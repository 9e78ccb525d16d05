//! # Merge Policies
//!
//! The pluggable rule for combining an existing position with an incoming
//! amount and lock time. The policy is selected once at ledger
//! construction and applies to every merge (mint into a held position,
//! or transfer into a held position).
//!
//! Both policies share the same arithmetic guards; only the lock-time
//! computation differs. Merging into an empty position adopts the
//! incoming lock unchanged.

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, LedgerResult};
use crate::math;
use crate::position::Position;

/// Ledger-wide merge policy, fixed at construction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockPolicy {
    /// Transfers wait for the unlock time; merges recompute the lock as
    /// the supply-weighted average of the remaining durations, rounded up
    Timelock,

    /// Merges keep the later unlock time; the lock guard rejects merges
    /// that would violate maturity ordering
    Maturity,
}

impl LockPolicy {
    /// Merge `amount` with unlock time `incoming_unlock` into `existing`
    /// at time `now`, returning the combined position.
    ///
    /// `now` is the single time reading of the enclosing operation; the
    /// weighted average uses the durations as encoded relative to it, so
    /// repeated merges within one operation stay associative.
    pub fn merge(
        &self,
        existing: Position,
        amount: u128,
        incoming_unlock: u32,
        now: u64,
    ) -> LedgerResult<Position> {
        math::check_amount(amount)?;
        let balance = math::add_balances(existing.balance, amount)?;

        if existing.is_empty() {
            return Ok(Position {
                balance,
                unlock_at: incoming_unlock,
            });
        }

        let unlock_at = match self {
            LockPolicy::Maturity => existing.unlock_at.max(incoming_unlock),
            LockPolicy::Timelock => {
                let duration =
                    weighted_remaining(&existing, amount, incoming_unlock, now)?;
                let unlock = now
                    .checked_add(duration)
                    .ok_or(LedgerError::LockTimeTooLarge)?;
                math::check_lock_time(unlock)?
            }
        };

        Ok(Position { balance, unlock_at })
    }
}

/// Supply-weighted average of the two remaining durations, rounded up.
///
/// Rounding up means the merged position never unlocks earlier than the
/// exact average would allow. A large, nearly unlocked batch therefore
/// cannot pull a small long-locked batch below a one-second residual.
fn weighted_remaining(
    existing: &Position,
    amount: u128,
    incoming_unlock: u32,
    now: u64,
) -> LedgerResult<u64> {
    let existing_duration = existing.remaining(now) as u128;
    let incoming_duration = (incoming_unlock as u64).saturating_sub(now) as u128;

    let weighted = existing
        .balance
        .checked_mul(existing_duration)
        .and_then(|lhs| {
            amount
                .checked_mul(incoming_duration)
                .and_then(|rhs| lhs.checked_add(rhs))
        })
        .ok_or(LedgerError::SumOverflow)?;

    // Caller guarantees a nonzero existing balance
    let total = existing.balance + amount;
    Ok(math::div_ceil(weighted, total) as u64)
}
