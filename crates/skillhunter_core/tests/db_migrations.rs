use rusqlite::Connection;
use skillhunter_core::db::migrations::latest_version;
use skillhunter_core::db::{open_db, open_db_in_memory, DbError};
use skillhunter_core::{SlotRepository, SqliteSlotRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "snapshot_slots");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skillhunter.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "snapshot_slots");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reopened_database_upserts_into_existing_slot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slots.db");

    {
        let conn = open_db(&path).unwrap();
        SqliteSlotRepository::new(&conn)
            .save_slot("skillhunter.v3", "{\"a\":1}")
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    repo.save_slot("skillhunter.v3", "{\"a\":2}").unwrap();

    let (rows, updated_at): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), MAX(updated_at) FROM snapshot_slots WHERE slot_key = ?1;",
            ["skillhunter.v3"],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(rows, 1);
    assert!(updated_at > 0);
    assert_eq!(
        repo.load_slot("skillhunter.v3").unwrap().as_deref(),
        Some("{\"a\":2}")
    );

    repo.clear_slot("skillhunter.v3").unwrap();
    assert_eq!(repo.load_slot("skillhunter.v3").unwrap(), None);
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("portfolio.db");

    let conn = open_db(&path).unwrap();
    assert!(path.exists());
    assert_table_exists(&conn, "snapshot_slots");
}

#[test]
fn open_db_reports_blocked_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "not a dir").unwrap();

    let err = open_db(blocker.join("sub").join("portfolio.db")).unwrap_err();
    assert!(matches!(err, DbError::CreateDir { .. }), "{err}");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
