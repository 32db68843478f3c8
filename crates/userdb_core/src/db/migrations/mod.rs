//! Schema registry for the account/product/project store.
//!
//! # Responsibility
//! - Register schema steps in strictly increasing version order.
//! - Apply pending steps inside one transaction.
//! - Verify the privilege seed the ownership rules depend on.
//!
//! # Invariants
//! - Applied version is mirrored to `PRAGMA user_version`.
//! - A store that passes [`apply_migrations`] has exactly one `Owner`
//!   privilege row.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Name of the privilege every product and project must be held by once.
pub const OWNER_PRIVILEGE_NAME: &str = "Owner";

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    label: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        label: "assets_accounts_products_projects",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        label: "privilege_seed",
        sql: include_str!("0002_privileges.sql"),
    },
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the store up to [`latest_version`] and checks the privilege seed.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `MissingOwnerPrivilege` when the seeded `Owner` row is gone.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored = stored_version(conn)?;
    let latest = latest_version();
    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }

    if stored < latest {
        let tx = conn.transaction()?;
        for step in SCHEMA_STEPS.iter().skip_while(|step| step.version <= stored) {
            tx.execute_batch(step.sql)?;
            tx.pragma_update(None, "user_version", step.version)?;
            info!(
                "event=db_migrate module=db status=ok version={} step={}",
                step.version, step.label
            );
        }
        tx.commit()?;
    }

    verify_owner_privilege(conn)
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

fn verify_owner_privilege(conn: &Connection) -> DbResult<()> {
    let owners: i64 = conn.query_row(
        "SELECT COUNT(*) FROM privileges WHERE name = ?1;",
        [OWNER_PRIVILEGE_NAME],
        |row| row.get(0),
    )?;
    if owners != 1 {
        return Err(DbError::MissingOwnerPrivilege);
    }
    Ok(())
}
