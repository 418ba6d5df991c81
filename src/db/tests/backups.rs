//! Shared tests for BackupRepo implementations
//!
//! Tests are written as async functions that take `&dyn BackupRepo`,
//! allowing the same test logic to run against both SQLite and PostgreSQL.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    db::repos::{BackupRepo, SortOrder},
    models::CreateBackupRecord,
};

// ============================================================================
// Test Input Helpers
// ============================================================================

fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap() + Duration::seconds(offset_secs)
}

fn backup_input(trigger: &str, filename: &str, created_at: DateTime<Utc>) -> CreateBackupRecord {
    CreateBackupRecord {
        trigger: trigger.to_string(),
        adapter: "postgresql".to_string(),
        filename: filename.to_string(),
        bucket: "nightly".to_string(),
        created_at: Some(created_at),
    }
}

// ============================================================================
// Shared Test Functions
// These are called by both SQLite and PostgreSQL test implementations
// ============================================================================

pub async fn test_create_backup(repo: &dyn BackupRepo) {
    let record = repo
        .create(backup_input("daily", "daily-1.sql.gz", at(0)))
        .await
        .expect("Failed to create backup record");

    assert!(!record.id.is_nil());
    assert_eq!(record.trigger, "daily");
    assert_eq!(record.adapter, "postgresql");
    assert_eq!(record.filename, "daily-1.sql.gz");
    assert_eq!(record.bucket, "nightly");
    assert_eq!(record.created_at, at(0));
}

pub async fn test_create_defaults_created_at(repo: &dyn BackupRepo) {
    let before = Utc::now() - Duration::seconds(5);
    let mut input = backup_input("daily", "now.sql.gz", at(0));
    input.created_at = None;

    let record = repo.create(input).await.expect("Failed to create record");
    assert!(record.created_at >= before);
    assert!(record.created_at <= Utc::now() + Duration::seconds(5));
}

pub async fn test_get_roundtrip(repo: &dyn BackupRepo) {
    let created = repo
        .create(backup_input("daily", "a.tar", at(10)))
        .await
        .expect("Failed to create record");

    let fetched = repo
        .get(created.id)
        .await
        .expect("Failed to get record")
        .expect("Record should exist");

    assert_eq!(fetched, created);
}

pub async fn test_get_not_found(repo: &dyn BackupRepo) {
    let result = repo.get(Uuid::new_v4()).await.expect("Query should succeed");
    assert!(result.is_none());
}

pub async fn test_list_empty_trigger(repo: &dyn BackupRepo) {
    let records = repo
        .list_by_trigger("nothing-here", SortOrder::Desc)
        .await
        .expect("Failed to list");
    assert!(records.is_empty());
}

pub async fn test_list_newest_first(repo: &dyn BackupRepo) {
    // Inserted out of chronological order on purpose
    for (name, offset) in [("b", 20), ("a", 10), ("c", 30)] {
        repo.create(backup_input("daily", name, at(offset)))
            .await
            .expect("Failed to create record");
    }

    let desc = repo
        .list_by_trigger("daily", SortOrder::Desc)
        .await
        .expect("Failed to list");
    let names: Vec<_> = desc.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["c", "b", "a"]);

    let asc = repo
        .list_by_trigger("daily", SortOrder::Asc)
        .await
        .expect("Failed to list");
    let names: Vec<_> = asc.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
}

pub async fn test_list_subsecond_ordering(repo: &dyn BackupRepo) {
    let base = at(0);
    repo.create(backup_input("daily", "whole", base))
        .await
        .expect("Failed to create record");
    repo.create(backup_input("daily", "later", base + Duration::milliseconds(250)))
        .await
        .expect("Failed to create record");

    let records = repo
        .list_by_trigger("daily", SortOrder::Desc)
        .await
        .expect("Failed to list");
    assert_eq!(records[0].filename, "later");
    assert_eq!(records[1].filename, "whole");
}

pub async fn test_inserting_older_record_only_changes_its_rank(repo: &dyn BackupRepo) {
    for (name, offset) in [("a", 10), ("b", 20), ("c", 30)] {
        repo.create(backup_input("daily", name, at(offset)))
            .await
            .expect("Failed to create record");
    }
    repo.create(backup_input("daily", "imported", at(15)))
        .await
        .expect("Failed to create record");

    let records = repo
        .list_by_trigger("daily", SortOrder::Desc)
        .await
        .expect("Failed to list");
    let names: Vec<_> = records.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["c", "b", "imported", "a"]);
}

pub async fn test_list_scoped_to_trigger(repo: &dyn BackupRepo) {
    repo.create(backup_input("daily", "d1", at(0)))
        .await
        .expect("Failed to create record");
    repo.create(backup_input("weekly", "w1", at(1)))
        .await
        .expect("Failed to create record");
    repo.create(backup_input("daily", "d2", at(2)))
        .await
        .expect("Failed to create record");

    let daily = repo
        .list_by_trigger("daily", SortOrder::Desc)
        .await
        .expect("Failed to list");
    assert_eq!(daily.len(), 2);
    assert!(daily.iter().all(|r| r.trigger == "daily"));

    assert_eq!(repo.count_by_trigger("daily").await.unwrap(), 2);
    assert_eq!(repo.count_by_trigger("weekly").await.unwrap(), 1);
    assert_eq!(repo.count_by_trigger("monthly").await.unwrap(), 0);
}

pub async fn test_list_triggers(repo: &dyn BackupRepo) {
    assert!(repo.list_triggers().await.unwrap().is_empty());

    repo.create(backup_input("weekly", "w1", at(5)))
        .await
        .expect("Failed to create record");
    repo.create(backup_input("daily", "d1", at(1)))
        .await
        .expect("Failed to create record");
    repo.create(backup_input("daily", "d2", at(9)))
        .await
        .expect("Failed to create record");

    let summaries = repo.list_triggers().await.expect("Failed to list triggers");
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].trigger, "daily");
    assert_eq!(summaries[0].count, 2);
    assert_eq!(summaries[0].latest_at, at(9));
    assert_eq!(summaries[1].trigger, "weekly");
    assert_eq!(summaries[1].count, 1);
}

pub async fn test_delete(repo: &dyn BackupRepo) {
    let record = repo
        .create(backup_input("daily", "gone.tar", at(0)))
        .await
        .expect("Failed to create record");

    assert!(repo.delete(record.id).await.expect("Delete should succeed"));
    assert!(repo.get(record.id).await.unwrap().is_none());
}

pub async fn test_delete_is_idempotent(repo: &dyn BackupRepo) {
    let record = repo
        .create(backup_input("daily", "twice.tar", at(0)))
        .await
        .expect("Failed to create record");

    assert!(repo.delete(record.id).await.unwrap());
    assert!(!repo.delete(record.id).await.unwrap());
    assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
    assert_eq!(repo.count_by_trigger("daily").await.unwrap(), 0);
}

// ============================================================================
// SQLite Tests - Fast, in-memory
// ============================================================================

#[cfg(feature = "database-sqlite")]
mod sqlite_tests {
    use crate::db::{
        sqlite::SqliteBackupRepo,
        tests::harness::{create_sqlite_pool, run_sqlite_migrations},
    };

    macro_rules! sqlite_test {
        ($name:ident) => {
            #[tokio::test]
            async fn $name() {
                let pool = create_sqlite_pool().await;
                run_sqlite_migrations(&pool).await;
                let repo = SqliteBackupRepo::new(pool);
                super::$name(&repo).await;
            }
        };
    }

    sqlite_test!(test_create_backup);
    sqlite_test!(test_create_defaults_created_at);
    sqlite_test!(test_get_roundtrip);
    sqlite_test!(test_get_not_found);
    sqlite_test!(test_list_empty_trigger);
    sqlite_test!(test_list_newest_first);
    sqlite_test!(test_list_subsecond_ordering);
    sqlite_test!(test_inserting_older_record_only_changes_its_rank);
    sqlite_test!(test_list_scoped_to_trigger);
    sqlite_test!(test_list_triggers);
    sqlite_test!(test_delete);
    sqlite_test!(test_delete_is_idempotent);
}

// ============================================================================
// PostgreSQL Tests - Requires Docker
// ============================================================================

#[cfg(feature = "database-postgres")]
mod postgres_tests {
    use crate::db::{
        postgres::PostgresBackupRepo,
        tests::harness::postgres::{create_isolated_postgres_pool, run_postgres_migrations},
    };

    macro_rules! postgres_test {
        ($name:ident) => {
            #[tokio::test]
            #[ignore = "Requires Docker - run with `cargo test -- --ignored`"]
            async fn $name() {
                let pool = create_isolated_postgres_pool().await;
                run_postgres_migrations(&pool).await;
                let repo = PostgresBackupRepo::new(pool);
                super::$name(&repo).await;
            }
        };
    }

    postgres_test!(test_create_backup);
    postgres_test!(test_create_defaults_created_at);
    postgres_test!(test_get_roundtrip);
    postgres_test!(test_get_not_found);
    postgres_test!(test_list_empty_trigger);
    postgres_test!(test_list_newest_first);
    postgres_test!(test_list_subsecond_ordering);
    postgres_test!(test_inserting_older_record_only_changes_its_rank);
    postgres_test!(test_list_scoped_to_trigger);
    postgres_test!(test_list_triggers);
    postgres_test!(test_delete);
    postgres_test!(test_delete_is_idempotent);
}
