//! Domain error taxonomy returned by every public service operation.
//!
//! # Invariants
//! - Conditions the core recognizes surface as dedicated variants, never as
//!   raw store text.
//! - `RollbackFailed` keeps the original cause alongside the rollback error.

use super::ownership::OwnershipError;
use crate::model::asset::{AssetError, AssetKind};
use crate::model::{AccountId, ProductId, ProjectId};
use crate::repo::{ConstraintKind, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse classification for boundary adapters (one response status each).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    DuplicateEntry,
    InvalidOwnership,
    AssetRefNotInitialised,
    NothingToUpdate,
    NotAssociated,
    AuthenticationFailed,
    InvalidRequest,
    Store,
}

/// Errors from lifecycle controllers.
#[derive(Debug)]
pub enum ServiceError {
    AccountNotFound(AccountId),
    AccountEmailNotFound(String),
    ProductNotFound(ProductId),
    ProjectNotFound(ProjectId),
    /// Email already registered (pre-check or store-reported).
    DuplicateEmail(String),
    /// Account name rejected by the store's uniqueness constraint.
    DuplicateAccountName(String),
    ProductExists(String),
    EmptyIdList,
    Ownership(OwnershipError),
    Asset(AssetError),
    /// Asset update or delete matched no row.
    MissingAsset(AssetKind),
    ProductUserNotAssociated {
        product_id: ProductId,
        account_id: AccountId,
    },
    ProjectUserNotAssociated {
        project_id: ProjectId,
        account_id: AccountId,
    },
    AuthenticationFailed,
    /// Privilege catalog lacks a required row.
    CatalogMissing(&'static str),
    /// Injected credential callback failed.
    Credential(String),
    Repo(RepoError),
    RollbackFailed {
        cause: Box<ServiceError>,
        rollback: RepoError,
    },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_)
            | Self::AccountEmailNotFound(_)
            | Self::ProductNotFound(_)
            | Self::ProjectNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateEmail(_) | Self::DuplicateAccountName(_) | Self::ProductExists(_) => {
                ErrorKind::DuplicateEntry
            }
            Self::Ownership(_) => ErrorKind::InvalidOwnership,
            Self::Asset(AssetError::RefNotInitialised) => ErrorKind::AssetRefNotInitialised,
            Self::Asset(AssetError::UnknownKey(_)) => ErrorKind::InvalidRequest,
            Self::MissingAsset(_) => ErrorKind::NothingToUpdate,
            Self::ProductUserNotAssociated { .. } | Self::ProjectUserNotAssociated { .. } => {
                ErrorKind::NotAssociated
            }
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            Self::EmptyIdList | Self::Credential(_) => ErrorKind::InvalidRequest,
            Self::Repo(err) => match err.constraint_kind() {
                Some(
                    ConstraintKind::DuplicateAccountName
                    | ConstraintKind::DuplicateAccountEmail
                    | ConstraintKind::DuplicateProductName,
                ) => ErrorKind::DuplicateEntry,
                _ => ErrorKind::Store,
            },
            Self::CatalogMissing(_) | Self::RollbackFailed { .. } => ErrorKind::Store,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountNotFound(id) => write!(f, "account not found: {id}"),
            Self::AccountEmailNotFound(email) => write!(f, "no account with email `{email}`"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::DuplicateEmail(email) => write!(f, "email already registered: `{email}`"),
            Self::DuplicateAccountName(name) => write!(f, "account name already taken: `{name}`"),
            Self::ProductExists(name) => write!(f, "product already exists: `{name}`"),
            Self::EmptyIdList => write!(f, "id list must not be empty"),
            Self::Ownership(err) => write!(f, "{err}"),
            Self::Asset(err) => write!(f, "{err}"),
            Self::MissingAsset(kind) => write!(f, "nothing to update in {kind}"),
            Self::ProductUserNotAssociated {
                product_id,
                account_id,
            } => write!(
                f,
                "account {account_id} is not associated with product {product_id}"
            ),
            Self::ProjectUserNotAssociated {
                project_id,
                account_id,
            } => write!(
                f,
                "account {account_id} is not associated with project {project_id}"
            ),
            Self::AuthenticationFailed => write!(f, "authentication failed"),
            Self::CatalogMissing(name) => write!(f, "privilege catalog has no `{name}` entry"),
            Self::Credential(message) => write!(f, "credential processing failed: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::RollbackFailed { cause, rollback } => {
                write!(f, "{cause}; rollback also failed: {rollback}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Ownership(err) => Some(err),
            Self::Asset(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::RollbackFailed { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<OwnershipError> for ServiceError {
    fn from(value: OwnershipError) -> Self {
        Self::Ownership(value)
    }
}

impl From<AssetError> for ServiceError {
    fn from(value: AssetError) -> Self {
        Self::Asset(value)
    }
}

/// Remaps a zero-rows write result to a domain error; other errors pass through.
pub(crate) fn on_no_rows<T>(
    result: Result<T, RepoError>,
    remap: impl FnOnce() -> ServiceError,
) -> ServiceResult<T> {
    match result {
        Err(err) if err.is_no_rows() => Err(remap()),
        other => other.map_err(ServiceError::from),
    }
}
