//! Domain model for accounts, products, projects and their assets.
//!
//! # Responsibility
//! - Define the row shapes persisted by repositories.
//! - Define the immutable views handed across the service boundary.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID that is never reused.
//! - Asset records belong to exactly one entity field and are never shared.

use std::collections::BTreeMap;
use uuid::Uuid;

pub mod account;
pub mod asset;
pub mod privilege;
pub mod product;
pub mod project;

pub type AccountId = Uuid;
pub type ProductId = Uuid;
pub type ProjectId = Uuid;
pub type AssetId = Uuid;
pub type PrivilegeId = i64;

/// Ownership edges of one resource keyed by account.
pub type OwnerMap = BTreeMap<AccountId, PrivilegeId>;

/// Ownership edges of one account keyed by resource (product or project).
pub type HoldingMap = BTreeMap<Uuid, PrivilegeId>;

/// Successor owner per product, consulted when an owning account is removed.
pub type NomineeMap = BTreeMap<ProductId, AccountId>;

/// Source of fresh identifiers for new rows.
pub trait IdSource {
    fn next_id(&self) -> Uuid;
}

/// Random (v4) identifier source used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
