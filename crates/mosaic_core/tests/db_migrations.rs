use mosaic_core::db::migrations::latest_version;
use mosaic_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "entries");
    assert_table_exists(&conn, "settings_documents");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mosaic.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "entries");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn position_index_rejects_duplicate_tiles() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO entries (id, name, message, symbol, created_at, position)
         VALUES ('tile-1', 'a', 'b', 'diya.png', 1, 0);",
        [],
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO entries (id, name, message, symbol, created_at, position)
         VALUES ('other', 'c', 'd', 'diya.png', 2, 0);",
        [],
    );
    assert!(duplicate.is_err());

    conn.execute(
        "INSERT INTO entries (id, name, message, symbol, created_at, position)
         VALUES ('free-1', 'e', 'f', 'diya.png', 3, NULL),
                ('free-2', 'g', 'h', 'diya.png', 4, NULL);",
        [],
    )
    .unwrap();
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
