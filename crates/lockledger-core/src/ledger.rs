//! # Ledger Entry Points
//!
//! [`LockLedger`] owns the positions, the per-asset supply counters, the
//! merge policy and the time source, and exposes the balance-changing
//! entry points. Every operation:
//!
//! 1. reads the positions involved and samples the clock once,
//! 2. asks the lock guard whether the mutation is permitted,
//! 3. computes the new balances through the range-checked arithmetic and
//!    the new lock time through the merge policy,
//! 4. writes everything back, or writes nothing at all on rejection.
//!
//! Batched entry points apply their sub-operations strictly in
//! submission order against one clock reading; a failure anywhere rolls
//! the whole batch back to its pre-batch state.
//!
//! All mutation goes through `&mut self`, so operations on one ledger
//! are serialized by construction and no partial write is ever
//! observable.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::errors::LedgerResult;
use crate::guard;
use crate::math;
use crate::policy::LockPolicy;
use crate::position::{AssetId, Position};
use crate::supply::SupplyIndex;
use crate::time::{TimeSource, WallClock};

/// Multi-asset ledger with per-position lock times
#[derive(Debug)]
pub struct LockLedger<H, C = WallClock> {
    policy: LockPolicy,
    clock: C,
    positions: HashMap<(H, AssetId), Position>,
    supply: SupplyIndex,
}

/// Pre-batch state of every entry a batch may touch, for rollback
struct Snapshot<H> {
    positions: Vec<((H, AssetId), Option<Position>)>,
    supplies: Vec<(AssetId, Option<u128>)>,
}

impl<H> LockLedger<H, WallClock>
where
    H: Clone + Eq + Hash + fmt::Debug,
{
    /// Timelock-variant ledger on the system clock
    pub fn timelock() -> Self {
        Self::new(LockPolicy::Timelock, WallClock)
    }

    /// Maturity-variant ledger on the system clock
    pub fn maturity() -> Self {
        Self::new(LockPolicy::Maturity, WallClock)
    }
}

impl<H, C> LockLedger<H, C>
where
    H: Clone + Eq + Hash + fmt::Debug,
    C: TimeSource,
{
    pub fn new(policy: LockPolicy, clock: C) -> Self {
        Self {
            policy,
            clock,
            positions: HashMap::new(),
            supply: SupplyIndex::new(),
        }
    }

    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    // ========================================================================
    // Read Accessors
    // ========================================================================

    /// The full position of a holder, zero if never touched
    pub fn position_of(&self, holder: &H, id: AssetId) -> Position {
        self.positions
            .get(&(holder.clone(), id))
            .copied()
            .unwrap_or(Position::ZERO)
    }

    pub fn balance_of(&self, holder: &H, id: AssetId) -> u128 {
        self.position_of(holder, id).balance
    }

    /// Balances for a list of (holder, asset) queries
    pub fn balance_of_batch(&self, queries: &[(H, AssetId)]) -> Vec<u128> {
        queries
            .iter()
            .map(|(holder, id)| self.balance_of(holder, *id))
            .collect()
    }

    /// Unlock time of a holder's position. A zero-balance position has
    /// no observable lock and reads as 0.
    pub fn lock_time_of(&self, holder: &H, id: AssetId) -> u64 {
        let position = self.position_of(holder, id);
        if position.is_empty() {
            0
        } else {
            position.unlock_at as u64
        }
    }

    /// Outstanding supply of an asset
    pub fn supply_of(&self, id: AssetId) -> u128 {
        self.supply.supply_of(id)
    }

    /// Whether any units of the asset are outstanding
    pub fn exists(&self, id: AssetId) -> bool {
        self.supply.exists(id)
    }

    // ========================================================================
    // Mint
    // ========================================================================

    /// Mint `amount` units of `id` to `to`, locked until `lock_time`.
    ///
    /// Minting into a held position merges under the ledger's policy;
    /// minting into an empty position adopts `lock_time` unchanged.
    pub fn mint(
        &mut self,
        to: &H,
        id: AssetId,
        amount: u128,
        lock_time: u64,
    ) -> LedgerResult<()> {
        let now = self.clock.now();
        self.mint_at(to, id, amount, lock_time, now)
    }

    /// Mint several assets to one holder at a shared lock time, as one
    /// atomic unit
    pub fn mint_batch(
        &mut self,
        to: &H,
        entries: &[(AssetId, u128)],
        lock_time: u64,
    ) -> LedgerResult<()> {
        let now = self.clock.now();
        let snapshot = self.snapshot(
            entries.iter().map(|(id, _)| (to.clone(), *id)),
            entries.iter().map(|(id, _)| *id),
        );
        for (id, amount) in entries {
            if let Err(err) = self.mint_at(to, *id, *amount, lock_time, now) {
                self.restore(snapshot);
                return Err(err);
            }
        }
        Ok(())
    }

    fn mint_at(
        &mut self,
        to: &H,
        id: AssetId,
        amount: u128,
        lock_time: u64,
        now: u64,
    ) -> LedgerResult<()> {
        math::check_amount(amount)?;
        let unlock = math::check_lock_time(lock_time)?;

        let existing = self.position_of(to, id);
        guard::authorize_inbound(self.policy, &existing, unlock)?;
        let merged = self.policy.merge(existing, amount, unlock, now)?;

        self.supply.record_mint(id, amount)?;
        self.put_position(to, id, merged);
        debug!(
            holder = ?to,
            asset = id,
            amount = %amount,
            unlock = merged.unlock_at,
            "mint"
        );
        Ok(())
    }

    // ========================================================================
    // Burn
    // ========================================================================

    /// Burn `amount` units from `from`. The lock time of a surviving
    /// balance is untouched; burning to zero removes the position, so a
    /// later mint starts from a clean slate.
    pub fn burn(&mut self, from: &H, id: AssetId, amount: u128) -> LedgerResult<()> {
        self.burn_one(from, id, amount)
    }

    /// Burn several assets from one holder as one atomic unit
    pub fn burn_batch(
        &mut self,
        from: &H,
        entries: &[(AssetId, u128)],
    ) -> LedgerResult<()> {
        let snapshot = self.snapshot(
            entries.iter().map(|(id, _)| (from.clone(), *id)),
            entries.iter().map(|(id, _)| *id),
        );
        for (id, amount) in entries {
            if let Err(err) = self.burn_one(from, *id, *amount) {
                self.restore(snapshot);
                return Err(err);
            }
        }
        Ok(())
    }

    fn burn_one(&mut self, from: &H, id: AssetId, amount: u128) -> LedgerResult<()> {
        let existing = self.position_of(from, id);
        let balance = math::sub_balance(existing.balance, amount)?;

        self.supply.record_burn(id, amount)?;
        self.put_position(
            from,
            id,
            Position {
                balance,
                unlock_at: existing.unlock_at,
            },
        );
        debug!(holder = ?from, asset = id, amount = %amount, "burn");
        Ok(())
    }

    // ========================================================================
    // Transfer
    // ========================================================================

    /// Move `amount` units of `id` from `from` to `to`. The transferred
    /// batch carries the source's unlock time into the destination
    /// merge; the source's own lock is untouched by the debit.
    pub fn transfer(
        &mut self,
        from: &H,
        to: &H,
        id: AssetId,
        amount: u128,
    ) -> LedgerResult<()> {
        let now = self.clock.now();
        self.transfer_at(from, to, id, amount, now)
    }

    /// Move several assets between the same pair of holders as one
    /// atomic unit
    pub fn transfer_batch(
        &mut self,
        from: &H,
        to: &H,
        entries: &[(AssetId, u128)],
    ) -> LedgerResult<()> {
        let now = self.clock.now();
        let snapshot = self.snapshot(
            entries.iter().flat_map(|(id, _)| {
                [(from.clone(), *id), (to.clone(), *id)]
            }),
            std::iter::empty(),
        );
        for (id, amount) in entries {
            if let Err(err) = self.transfer_at(from, to, *id, *amount, now) {
                self.restore(snapshot);
                return Err(err);
            }
        }
        Ok(())
    }

    fn transfer_at(
        &mut self,
        from: &H,
        to: &H,
        id: AssetId,
        amount: u128,
        now: u64,
    ) -> LedgerResult<()> {
        let source = self.position_of(from, id);
        guard::authorize_outbound(self.policy, &source, now)?;
        let debited = Position {
            balance: math::sub_balance(source.balance, amount)?,
            unlock_at: source.unlock_at,
        };

        let dest = if from == to {
            debited
        } else {
            self.position_of(to, id)
        };
        guard::authorize_inbound(self.policy, &dest, source.unlock_at)?;
        let merged = self.policy.merge(dest, amount, source.unlock_at, now)?;

        if from == to {
            self.put_position(from, id, merged);
        } else {
            self.put_position(from, id, debited);
            self.put_position(to, id, merged);
        }
        debug!(
            from = ?from,
            to = ?to,
            asset = id,
            amount = %amount,
            "transfer"
        );
        Ok(())
    }

    // ========================================================================
    // Batch Rollback
    // ========================================================================

    fn snapshot(
        &self,
        position_keys: impl IntoIterator<Item = (H, AssetId)>,
        supply_ids: impl IntoIterator<Item = AssetId>,
    ) -> Snapshot<H> {
        let mut seen_keys = HashSet::new();
        let mut positions = Vec::new();
        for key in position_keys {
            if seen_keys.insert(key.clone()) {
                let entry = self.positions.get(&key).copied();
                positions.push((key, entry));
            }
        }

        let mut seen_ids = HashSet::new();
        let mut supplies = Vec::new();
        for id in supply_ids {
            if seen_ids.insert(id) {
                supplies.push((id, self.supply.raw(id)));
            }
        }

        Snapshot {
            positions,
            supplies,
        }
    }

    fn restore(&mut self, snapshot: Snapshot<H>) {
        for (key, entry) in snapshot.positions {
            match entry {
                Some(position) => self.positions.insert(key, position),
                None => self.positions.remove(&key),
            };
        }
        for (id, entry) in snapshot.supplies {
            self.supply.set_raw(id, entry);
        }
    }

    fn put_position(&mut self, holder: &H, id: AssetId, position: Position) {
        let key = (holder.clone(), id);
        if position.is_empty() {
            self.positions.remove(&key);
        } else {
            self.positions.insert(key, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_BALANCE;
    use crate::errors::LedgerError;
    use crate::time::ManualClock;

    fn ledger(policy: LockPolicy) -> LockLedger<&'static str, ManualClock> {
        LockLedger::new(policy, ManualClock::new(1_000))
    }

    #[test]
    fn test_mint_then_read_back() {
        let mut book = ledger(LockPolicy::Timelock);
        book.mint(&"alice", 7, 250, 1_030).unwrap();
        assert_eq!(book.balance_of(&"alice", 7), 250);
        assert_eq!(book.lock_time_of(&"alice", 7), 1_030);
        assert_eq!(book.supply_of(7), 250);
        assert!(book.exists(7));
    }

    #[test]
    fn test_mint_batch_rolls_back_on_failure() {
        let mut book = ledger(LockPolicy::Timelock);
        book.mint(&"alice", 1, 10, 0).unwrap();
        let err = book
            .mint_batch(&"alice", &[(1, 5), (2, MAX_BALANCE + 1)], 0)
            .unwrap_err();
        assert_eq!(err, LedgerError::ValueTooLarge);
        // First sub-operation rolled back with the batch
        assert_eq!(book.balance_of(&"alice", 1), 10);
        assert_eq!(book.supply_of(1), 10);
        assert_eq!(book.balance_of(&"alice", 2), 0);
        assert_eq!(book.supply_of(2), 0);
    }

    #[test]
    fn test_transfer_batch_rolls_back_on_failure() {
        let mut book = ledger(LockPolicy::Timelock);
        book.mint_batch(&"alice", &[(1, 10), (2, 20)], 0).unwrap();
        let err = book
            .transfer_batch(&"alice", &"bob", &[(1, 10), (2, 21)])
            .unwrap_err();
        assert_eq!(err, LedgerError::InsufficientBalance);
        assert_eq!(book.balance_of(&"alice", 1), 10);
        assert_eq!(book.balance_of(&"bob", 1), 0);
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut book = ledger(LockPolicy::Maturity);
        book.mint(&"alice", 3, 100, 1_500).unwrap();
        book.transfer(&"alice", &"alice", 3, 40).unwrap();
        assert_eq!(book.balance_of(&"alice", 3), 100);
        assert_eq!(book.lock_time_of(&"alice", 3), 1_500);
        assert_eq!(book.supply_of(3), 100);
    }

    #[test]
    fn test_balance_of_batch() {
        let mut book = ledger(LockPolicy::Maturity);
        book.mint(&"alice", 1, 5, 0).unwrap();
        book.mint(&"bob", 2, 9, 0).unwrap();
        assert_eq!(
            book.balance_of_batch(&[("alice", 1), ("bob", 2), ("carol", 1)]),
            vec![5, 9, 0]
        );
    }
}
