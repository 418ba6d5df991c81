//! Count-based retention and bulk purge for cataloged backups.
//!
//! Both operations delete the remote object before its catalog row, so a
//! failure can leave an orphaned row but never an orphaned object. Rows left
//! behind are retried by the next pass for the trigger:
//!
//! 1. [`RetentionEnforcer`] runs after every save and keeps the newest
//!    `keep_backups` records for the saved record's trigger
//! 2. [`BulkPurger`] destroys every backup for a trigger on request
//!
//! Passes for the same trigger are serialized through [`TriggerLocks`].

mod destroy;
mod enforcer;
mod error;
mod locks;
mod policy;
mod purger;
#[cfg(test)]
pub(crate) mod testing;

pub use enforcer::{RetentionEnforcer, RetentionReport};
pub use error::RetentionError;
pub use locks::TriggerLocks;
pub use policy::select_victims;
pub use purger::{BulkPurger, PurgeReport};
