//! Unit-of-work contract and its SQLite implementation.
//!
//! # Responsibility
//! - Hand out transaction handles that implement every repository port.
//! - Make commit/rollback the only ways to finish a handle.
//!
//! # Invariants
//! - A handle dropped without commit rolls back.
//! - Transactions start with `BEGIN IMMEDIATE` so writers serialize up front.

use super::account_repo::AccountRepository;
use super::asset_repo::AssetRepository;
use super::privilege_repo::PrivilegeRepository;
use super::product_repo::ProductRepository;
use super::project_repo::ProjectRepository;
use super::RepoResult;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Handle that can be finished exactly once.
pub trait Transactional: Sized {
    fn commit(self) -> RepoResult<()>;
    fn rollback(self) -> RepoResult<()>;
}

/// Transaction handle exposing all repository ports.
pub trait RepositoryTx:
    Transactional
    + AssetRepository
    + PrivilegeRepository
    + AccountRepository
    + ProductRepository
    + ProjectRepository
{
}

impl<T> RepositoryTx for T where
    T: Transactional
        + AssetRepository
        + PrivilegeRepository
        + AccountRepository
        + ProductRepository
        + ProjectRepository
{
}

/// Factory for transaction handles.
pub trait UnitOfWork {
    type Tx: RepositoryTx;

    fn begin(&self) -> RepoResult<Self::Tx>;
}

/// SQLite-backed unit of work borrowing one connection.
#[derive(Debug, Clone, Copy)]
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl<'conn> UnitOfWork for SqliteStore<'conn> {
    type Tx = SqliteTx<'conn>;

    fn begin(&self) -> RepoResult<Self::Tx> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        Ok(SqliteTx { tx })
    }
}

/// Open SQLite transaction. Repository impls live next to each port.
pub struct SqliteTx<'conn> {
    pub(crate) tx: Transaction<'conn>,
}

impl SqliteTx<'_> {
    pub(crate) fn conn(&self) -> &Connection {
        &self.tx
    }
}

impl Transactional for SqliteTx<'_> {
    fn commit(self) -> RepoResult<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> RepoResult<()> {
        self.tx.rollback()?;
        Ok(())
    }
}
