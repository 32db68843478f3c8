//! Repository ports and their SQLite implementation.
//!
//! # Responsibility
//! - Define the narrow per-entity read/write contracts used by services.
//! - Classify store failures into typed errors at the adapter boundary.
//!
//! # Invariants
//! - Every repository method runs on an open transaction handle.
//! - Reads report absence as `None`/empty, never as an error.
//! - Single-row writes matching zero rows report `RepoError::NoRowsAffected`.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod account_repo;
pub mod asset_repo;
pub mod privilege_repo;
pub mod product_repo;
pub mod project_repo;
pub mod store;

pub type RepoResult<T> = Result<T, RepoError>;

static UNIQUE_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"UNIQUE constraint failed: (\w+)\.(\w+)").expect("valid unique-column regex")
});

/// Closed set of constraint violations the services react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    DuplicateAccountName,
    DuplicateAccountEmail,
    DuplicateProductName,
    ForeignKey,
    Other,
}

/// Persistence error for repository operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Constraint {
        kind: ConstraintKind,
        source: rusqlite::Error,
    },
    /// A targeted write matched no row. Carries the statement label.
    NoRowsAffected(&'static str),
    InvalidData(String),
}

impl RepoError {
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            Self::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRowsAffected(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Constraint { kind, source } => {
                write!(f, "constraint violation ({kind:?}): {source}")
            }
            Self::NoRowsAffected(what) => write!(f, "no rows affected: {what}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Constraint { source, .. } => Some(source),
            Self::NoRowsAffected(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match classify_constraint(&value) {
            Some(kind) => Self::Constraint {
                kind,
                source: value,
            },
            None => Self::Db(DbError::Sqlite(value)),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(format!("asset payload is not a JSON object: {value}"))
    }
}

/// Maps a SQLite constraint failure to a `ConstraintKind`.
///
/// Returns `None` for every non-constraint error.
pub fn classify_constraint(err: &rusqlite::Error) -> Option<ConstraintKind> {
    let rusqlite::Error::SqliteFailure(failure, message) = err else {
        return None;
    };
    if failure.code != ErrorCode::ConstraintViolation {
        return None;
    }

    match failure.extended_code {
        rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintKind::ForeignKey),
        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            Some(unique_kind(message.as_deref()))
        }
        _ => Some(ConstraintKind::Other),
    }
}

fn unique_kind(message: Option<&str>) -> ConstraintKind {
    let Some(captures) = message.and_then(|text| UNIQUE_COLUMN.captures(text)) else {
        return ConstraintKind::Other;
    };
    match (&captures[1], &captures[2]) {
        ("accounts", "name") => ConstraintKind::DuplicateAccountName,
        ("accounts", "email") => ConstraintKind::DuplicateAccountEmail,
        ("products", "name") => ConstraintKind::DuplicateProductName,
        _ => ConstraintKind::Other,
    }
}

/// Helpers for write results where zero affected rows is acceptable.
pub trait RepoResultExt {
    /// Treats `NoRowsAffected` as success.
    fn allow_no_rows(self) -> RepoResult<()>;
}

impl RepoResultExt for RepoResult<()> {
    fn allow_no_rows(self) -> RepoResult<()> {
        match self {
            Err(err) if err.is_no_rows() => Ok(()),
            other => other,
        }
    }
}

pub(crate) fn expect_changed(changed: usize, what: &'static str) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NoRowsAffected(what));
    }
    Ok(())
}

pub(crate) fn parse_uuid(row: &Row<'_>, column: &str, table: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in {table}.{column}"))
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn parse_bool(row: &Row<'_>, column: &str, table: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {table}.{column}"
        ))),
    }
}
