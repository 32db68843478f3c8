//! Ownership-edge mutations shared by the lifecycle controllers.
//!
//! # Responsibility
//! - Share, grant, revoke and transfer edges on products and projects.
//! - Re-check the single-owner rule after every mutation.
//!
//! # Invariants
//! - Callers run these inside an open transaction; a returned error must
//!   roll that transaction back.

use super::error::{on_no_rows, ServiceError, ServiceResult};
use super::ownership::{validate_ownership, OwnershipError};
use super::privilege_catalog::PrivilegeCatalog;
use crate::model::{AccountId, OwnerMap, PrivilegeId, ProductId, ProjectId};
use crate::repo::store::RepositoryTx;
use log::debug;

/// Resource an ownership edge points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Product(ProductId),
    Project(ProjectId),
}

impl Resource {
    fn not_associated(self, account_id: AccountId) -> ServiceError {
        match self {
            Self::Product(product_id) => ServiceError::ProductUserNotAssociated {
                product_id,
                account_id,
            },
            Self::Project(project_id) => ServiceError::ProjectUserNotAssociated {
                project_id,
                account_id,
            },
        }
    }

    fn not_found(self) -> ServiceError {
        match self {
            Self::Product(product_id) => ServiceError::ProductNotFound(product_id),
            Self::Project(project_id) => ServiceError::ProjectNotFound(project_id),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Product(_) => "product",
            Self::Project(_) => "project",
        }
    }
}

pub(crate) fn owners_of<T: RepositoryTx>(tx: &T, resource: Resource) -> ServiceResult<OwnerMap> {
    let owners = match resource {
        Resource::Product(id) => tx.product_owners(id)?,
        Resource::Project(id) => tx.project_owners(id)?,
    };
    Ok(owners)
}

/// Re-reads the owner map and validates it.
pub(crate) fn revalidate<T: RepositoryTx>(
    tx: &T,
    catalog: &PrivilegeCatalog,
    resource: Resource,
) -> ServiceResult<()> {
    let owners = owners_of(tx, resource)?;
    validate_ownership(Some(&owners), catalog)?;
    Ok(())
}

/// Inserts or overwrites the edge between `account_id` and `resource`.
pub(crate) fn grant<T: RepositoryTx>(
    tx: &T,
    resource: Resource,
    account_id: AccountId,
    privilege: PrivilegeId,
) -> ServiceResult<()> {
    match resource {
        Resource::Product(id) => tx.set_product_privilege(id, account_id, privilege)?,
        Resource::Project(id) => tx.set_project_privilege(id, account_id, privilege)?,
    }
    Ok(())
}

/// Grants `privilege` on an existing resource to an existing account.
///
/// The privilege must be in the catalog, and the owner map must still hold
/// exactly one owner afterwards.
pub(crate) fn share<T: RepositoryTx>(
    tx: &T,
    resource: Resource,
    account_id: AccountId,
    privilege: PrivilegeId,
) -> ServiceResult<()> {
    let exists = match resource {
        Resource::Product(id) => tx.product_by_id(id)?.is_some(),
        Resource::Project(id) => tx.project_by_id(id)?.is_some(),
    };
    if !exists {
        return Err(resource.not_found());
    }
    if tx.account_by_id(account_id)?.is_none() {
        return Err(ServiceError::AccountNotFound(account_id));
    }
    let catalog = PrivilegeCatalog::load(tx)?;
    if !catalog.is_valid(privilege) {
        return Err(OwnershipError::UnknownPrivilege {
            privilege,
            account_id,
        }
        .into());
    }
    grant(tx, resource, account_id, privilege)?;
    revalidate(tx, &catalog, resource)?;
    debug!(
        "event=ownership_share module=service status=ok resource={} account={account_id} privilege={privilege}",
        resource.label()
    );
    Ok(())
}

/// Deletes one edge; a missing edge is `*UserNotAssociated`.
pub(crate) fn revoke<T: RepositoryTx>(
    tx: &T,
    resource: Resource,
    account_id: AccountId,
) -> ServiceResult<()> {
    let result = match resource {
        Resource::Product(id) => tx.delete_product_owner(id, account_id),
        Resource::Project(id) => tx.delete_project_owner(id, account_id),
    };
    on_no_rows(result, || resource.not_associated(account_id))
}

/// Hands the `Owner` edge of `resource` from `from` to `to`.
pub(crate) fn transfer<T: RepositoryTx>(
    tx: &T,
    catalog: &PrivilegeCatalog,
    resource: Resource,
    from: AccountId,
    to: AccountId,
) -> ServiceResult<()> {
    if tx.account_by_id(to)?.is_none() {
        return Err(ServiceError::AccountNotFound(to));
    }
    grant(tx, resource, to, catalog.owner())?;
    revoke(tx, resource, from)?;
    revalidate(tx, catalog, resource)?;
    debug!(
        "event=ownership_transfer module=service status=ok resource={} from={from} to={to}",
        resource.label()
    );
    Ok(())
}
