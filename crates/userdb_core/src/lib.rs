//! Transactional consistency layer for accounts, products and projects.
//! This crate is the single source of truth for ownership and cascade rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::account::AccountView;
pub use model::asset::{Asset, AssetError, AssetKind, DataMap};
pub use model::product::ProductView;
pub use model::project::ProjectView;
pub use model::{AccountId, NomineeMap, OwnerMap, PrivilegeId, ProductId, ProjectId};
pub use repo::store::{SqliteStore, UnitOfWork};
pub use repo::{ConstraintKind, RepoError};
pub use service::account_service::AccountService;
pub use service::error::{ErrorKind, ServiceError, ServiceResult};
pub use service::ownership::{validate_ownership, OwnershipError};
pub use service::privilege_catalog::{load_privilege_catalog, PrivilegeCatalog};
pub use service::product_service::ProductService;
pub use service::project_service::ProjectService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
