use rusqlite::Connection;
use userdb_core::db::migrations::latest_version;
use userdb_core::db::{open_db, open_db_in_memory, DbError};

const TABLES: &[&str] = &[
    "account_settings",
    "account_assets",
    "product_details",
    "product_assets",
    "project_details",
    "project_assets",
    "privileges",
    "accounts",
    "products",
    "projects",
    "account_products",
    "account_projects",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn privilege_catalog_is_seeded() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn
        .prepare("SELECT id, name FROM privileges ORDER BY id;")
        .unwrap();
    let rows: Vec<(i64, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        rows,
        vec![
            (1, "Owner".to_string()),
            (2, "Partner".to_string()),
            (3, "User".to_string()),
        ]
    );
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("userdb.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let privileges: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM privileges;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(privileges, 3);
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
fn opening_database_without_owner_privilege_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tampered.sqlite3");

    let conn = open_db(&path).unwrap();
    conn.execute("DELETE FROM privileges WHERE name = 'Owner';", [])
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::MissingOwnerPrivilege));
    assert!(err.to_string().contains("Owner"));
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
