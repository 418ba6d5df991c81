//! Victim selection for count-based retention.

use crate::models::BackupRecord;

/// Split a trigger's records, newest first, into the ones to keep and the
/// ones to destroy.
///
/// Positions `0..keep_backups` are kept and everything after is a victim.
/// `keep_backups = 0` makes every record a victim, including the newest.
/// The caller owns the ordering; this function only slices.
pub fn select_victims(
    newest_first: &[BackupRecord],
    keep_backups: u32,
) -> (&[BackupRecord], &[BackupRecord]) {
    let keep = usize::try_from(keep_backups)
        .unwrap_or(usize::MAX)
        .min(newest_first.len());
    newest_first.split_at(keep)
}
