mod backups;
mod common;

pub use backups::SqliteBackupRepo;
