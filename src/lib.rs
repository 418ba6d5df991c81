//! Backup artifact catalog with per-trigger retention and bulk purge.
//!
//! Each stored artifact gets a [`models::BackupRecord`] in the catalog. After
//! a record is saved, [`retention::RetentionEnforcer`] removes the oldest
//! backups beyond the job's limit from the remote store and then from the
//! catalog. [`retention::BulkPurger`] removes every backup for a trigger.

#[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
compile_error!("cairn needs at least one of `database-sqlite` or `database-postgres`");

pub mod config;
pub mod db;
pub mod models;
#[cfg(feature = "cli")]
pub mod observability;
pub mod retention;
pub mod services;
pub mod storage;
