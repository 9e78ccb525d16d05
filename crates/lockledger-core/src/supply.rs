//! # Supply Overlay
//!
//! Per-asset cumulative supply bookkeeping, observed on mint and burn
//! only and independent of lock-time logic. An asset exists exactly
//! while its outstanding supply is above zero; full burn returns it to
//! nonexistence.

use std::collections::HashMap;

use crate::errors::{LedgerError, LedgerResult};
use crate::position::AssetId;

/// Running total of outstanding balance per asset
#[derive(Debug, Default, Clone)]
pub struct SupplyIndex {
    totals: HashMap<AssetId, u128>,
}

impl SupplyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding supply of an asset
    pub fn supply_of(&self, id: AssetId) -> u128 {
        self.totals.get(&id).copied().unwrap_or(0)
    }

    /// Whether any units of the asset are outstanding
    pub fn exists(&self, id: AssetId) -> bool {
        self.supply_of(id) > 0
    }

    /// Record a mint of `amount` units
    pub fn record_mint(&mut self, id: AssetId, amount: u128) -> LedgerResult<()> {
        let total = self
            .supply_of(id)
            .checked_add(amount)
            .ok_or(LedgerError::SumOverflow)?;
        self.totals.insert(id, total);
        Ok(())
    }

    /// Record a burn of `amount` units
    pub fn record_burn(&mut self, id: AssetId, amount: u128) -> LedgerResult<()> {
        let total = self
            .supply_of(id)
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance)?;
        if total == 0 {
            self.totals.remove(&id);
        } else {
            self.totals.insert(id, total);
        }
        Ok(())
    }

    // Raw entry access for batch rollback
    pub(crate) fn raw(&self, id: AssetId) -> Option<u128> {
        self.totals.get(&id).copied()
    }

    pub(crate) fn set_raw(&mut self, id: AssetId, entry: Option<u128>) {
        match entry {
            Some(total) => self.totals.insert(id, total),
            None => self.totals.remove(&id),
        };
    }
}
