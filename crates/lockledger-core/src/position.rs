//! # Positions
//!
//! A position is one holder's balance of one asset together with its
//! unlock timestamp. In storage the two fields share a single `u128`
//! word (96-bit balance low, 32-bit unlock time high); in memory they
//! are explicit typed fields and every mutation goes through range
//! checks rather than bit slicing.

use serde::{Deserialize, Serialize};

use crate::constants::{BALANCE_MASK, LOCK_TIME_SHIFT};
use crate::errors::LedgerResult;
use crate::math;

/// Integer identifier of one asset in the ledger
pub type AssetId = u64;

/// One holder's balance of one asset, plus its unlock time.
///
/// A zero-balance position has no observable lock: readers treat its
/// unlock time as irrelevant and a fresh mint adopts the incoming lock
/// unconditionally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Balance, always within the 96-bit balance field
    pub balance: u128,

    /// Absolute timestamp at which the position unlocks
    pub unlock_at: u32,
}

impl Position {
    /// The empty position
    pub const ZERO: Self = Self {
        balance: 0,
        unlock_at: 0,
    };

    /// Build a position from an unchecked amount and lock time
    pub fn new(balance: u128, lock_time: u64) -> LedgerResult<Self> {
        Ok(Self {
            balance: math::check_amount(balance)?,
            unlock_at: math::check_lock_time(lock_time)?,
        })
    }

    /// Whether the position holds no balance
    pub fn is_empty(&self) -> bool {
        self.balance == 0
    }

    /// Whether the position is still locked at `now`. Unlock is
    /// inclusive: a position with `unlock_at == now` already moves
    /// freely.
    pub fn is_locked(&self, now: u64) -> bool {
        now < self.unlock_at as u64
    }

    /// Remaining lock duration at `now`, zero once unlocked
    pub fn remaining(&self, now: u64) -> u64 {
        (self.unlock_at as u64).saturating_sub(now)
    }

    // ========================================================================
    // Packed Word Codec
    // ========================================================================

    /// Encode into the persisted single-word layout
    pub fn to_word(&self) -> u128 {
        debug_assert!(self.balance <= BALANCE_MASK);
        ((self.unlock_at as u128) << LOCK_TIME_SHIFT) | self.balance
    }

    /// Decode from the persisted single-word layout
    pub fn from_word(word: u128) -> Self {
        Self {
            balance: word & BALANCE_MASK,
            unlock_at: (word >> LOCK_TIME_SHIFT) as u32,
        }
    }
}
