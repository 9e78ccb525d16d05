//! # LockLedger Core - Lock-Time Accounting Engine
//!
//! This crate contains the balance and lock-time accounting logic for the
//! LockLedger multi-asset ledger. Every position (one holder's balance of
//! one asset) carries an unlock timestamp, and the ledger enforces one of
//! two merge policies whenever additional units arrive for a position that
//! is already held:
//!
//! - [`LockPolicy::Timelock`]: transfers out are forbidden until the
//!   position unlocks; merges recompute the lock as a supply-weighted
//!   average of the remaining durations, rounded up.
//! - [`LockPolicy::Maturity`]: merges keep the later of the two unlock
//!   times, and an ordering check rejects any merge that would let a
//!   less mature position contaminate a more mature one.
//!
//! The crate provides:
//!
//! - Range-checked position arithmetic (no wraparound, ever)
//! - The two merge policies behind a single construction-time switch
//! - Permission checks evaluated against pre-mutation state
//! - Per-asset cumulative supply bookkeeping
//! - Atomic batched mint/burn/transfer entry points

// Re-export all modules
pub mod constants;
pub mod errors;
pub mod guard;
pub mod ledger;
pub mod math;
pub mod policy;
pub mod position;
pub mod supply;
pub mod time;

// Re-export commonly used items
pub use errors::{LedgerError, LedgerResult};
pub use ledger::LockLedger;
pub use policy::LockPolicy;
pub use position::{AssetId, Position};
pub use supply::SupplyIndex;
pub use time::{ManualClock, TimeSource, WallClock};
