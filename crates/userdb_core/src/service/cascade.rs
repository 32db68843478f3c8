//! Dependent deletes and the account-removal plan.
//!
//! # Responsibility
//! - Remove products and projects together with their edges and assets.
//! - Turn an account's holdings into an ordered list of steps, then run it.
//!
//! # Invariants
//! - Delete order follows foreign keys: edges, entity row, asset rows.
//! - Every step runs in the caller's transaction; the first failing step
//!   aborts the plan.

use super::asset_factory::drop_asset;
use super::edges::{transfer, Resource};
use super::error::{on_no_rows, ServiceError, ServiceResult};
use super::privilege_catalog::PrivilegeCatalog;
use crate::model::account::Account;
use crate::model::asset::AssetKind;
use crate::model::project::Project;
use crate::model::{AccountId, HoldingMap, NomineeMap, ProductId, ProjectId};
use crate::repo::store::RepositoryTx;
use crate::repo::RepoResultExt;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};

/// Deletes one project row with its edges and assets.
fn remove_project_row<T: RepositoryTx>(tx: &T, project: &Project) -> ServiceResult<()> {
    tx.delete_project_owners(project.id).allow_no_rows()?;
    on_no_rows(tx.delete_project(project.id), || {
        ServiceError::ProjectNotFound(project.id)
    })?;
    drop_asset(tx, AssetKind::ProjectDetails, project.details_id)?;
    drop_asset(tx, AssetKind::ProjectAssets, project.assets_id)
}

/// Deletes a single project; unknown ids and edgeless projects are `ProjectNotFound`.
pub(crate) fn remove_project<T: RepositoryTx>(tx: &T, id: ProjectId) -> ServiceResult<()> {
    let project = tx
        .project_by_id(id)?
        .ok_or(ServiceError::ProjectNotFound(id))?;
    on_no_rows(tx.delete_project_owners(id), || {
        ServiceError::ProjectNotFound(id)
    })?;
    on_no_rows(tx.delete_project(id), || ServiceError::ProjectNotFound(id))?;
    drop_asset(tx, AssetKind::ProjectDetails, project.details_id)?;
    drop_asset(tx, AssetKind::ProjectAssets, project.assets_id)
}

/// Deletes every project of a product. No projects is success.
pub(crate) fn remove_projects_for_product<T: RepositoryTx>(
    tx: &T,
    product_id: ProductId,
) -> ServiceResult<usize> {
    let projects = tx.projects_for_product(product_id)?;
    for project in &projects {
        remove_project_row(tx, project)?;
    }
    Ok(projects.len())
}

/// Deletes a product, its projects, edges and assets.
pub(crate) fn remove_product<T: RepositoryTx>(tx: &T, id: ProductId) -> ServiceResult<()> {
    let product = tx
        .product_by_id(id)?
        .ok_or(ServiceError::ProductNotFound(id))?;
    let removed_projects = remove_projects_for_product(tx, id)?;
    on_no_rows(tx.delete_product_owners(id), || {
        ServiceError::ProductNotFound(id)
    })?;
    on_no_rows(tx.delete_product(id), || ServiceError::ProductNotFound(id))?;
    drop_asset(tx, AssetKind::ProductDetails, product.details_id)?;
    drop_asset(tx, AssetKind::ProductAssets, product.assets_id)?;
    debug!("event=product_removed module=service product_id={id} projects={removed_projects}");
    Ok(())
}

/// One compensating unit of an account removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeStep {
    DeleteProduct(ProductId),
    TransferProduct {
        product_id: ProductId,
        from: AccountId,
        to: AccountId,
    },
    DeleteProject(ProjectId),
    TransferProject {
        project_id: ProjectId,
        from: AccountId,
        to: AccountId,
    },
    /// Drops every edge the account still holds.
    ReleaseEdges(AccountId),
    RemoveAccount(Account),
}

/// What an account holds at the moment it is removed.
#[derive(Debug, Clone, Default)]
pub struct Holdings {
    pub products: HoldingMap,
    pub projects: HoldingMap,
    /// Parent product of every project in `projects`.
    pub project_parents: BTreeMap<ProjectId, ProductId>,
}

/// Builds the ordered steps that remove `account`.
///
/// Owned products go to their nominee or are deleted. Owned projects follow
/// the nominee of their parent product, unless that product is deleted
/// anyway.
pub fn plan_account_removal(
    account: Account,
    holdings: &Holdings,
    nominees: &NomineeMap,
    catalog: &PrivilegeCatalog,
) -> Vec<CascadeStep> {
    let mut steps = Vec::new();
    let mut deleted_products = BTreeSet::new();

    for (product_id, privilege) in &holdings.products {
        if !catalog.is_owner(*privilege) {
            continue;
        }
        match nominees.get(product_id) {
            Some(nominee) => steps.push(CascadeStep::TransferProduct {
                product_id: *product_id,
                from: account.id,
                to: *nominee,
            }),
            None => {
                deleted_products.insert(*product_id);
                steps.push(CascadeStep::DeleteProduct(*product_id));
            }
        }
    }

    for (project_id, privilege) in &holdings.projects {
        if !catalog.is_owner(*privilege) {
            continue;
        }
        let parent = holdings.project_parents.get(project_id);
        if parent.is_some_and(|product_id| deleted_products.contains(product_id)) {
            continue;
        }
        match parent.and_then(|product_id| nominees.get(product_id)) {
            Some(nominee) => steps.push(CascadeStep::TransferProject {
                project_id: *project_id,
                from: account.id,
                to: *nominee,
            }),
            None => steps.push(CascadeStep::DeleteProject(*project_id)),
        }
    }

    steps.push(CascadeStep::ReleaseEdges(account.id));
    steps.push(CascadeStep::RemoveAccount(account));
    steps
}

/// Reads everything `plan_account_removal` needs.
pub(crate) fn collect_holdings<T: RepositoryTx>(
    tx: &T,
    account_id: AccountId,
) -> ServiceResult<Holdings> {
    let products = tx.account_products(account_id)?;
    let projects = tx.account_projects(account_id)?;
    let mut project_parents = BTreeMap::new();
    for project_id in projects.keys() {
        let project = tx
            .project_by_id(*project_id)?
            .ok_or(ServiceError::ProjectNotFound(*project_id))?;
        project_parents.insert(project.id, project.product_id);
    }
    Ok(Holdings {
        products,
        projects,
        project_parents,
    })
}

/// Runs the plan in order, stopping at the first failure.
pub(crate) fn execute_plan<T: RepositoryTx>(
    tx: &T,
    catalog: &PrivilegeCatalog,
    steps: Vec<CascadeStep>,
) -> ServiceResult<()> {
    for step in steps {
        match step {
            CascadeStep::DeleteProduct(product_id) => remove_product(tx, product_id)?,
            CascadeStep::TransferProduct {
                product_id,
                from,
                to,
            } => transfer(tx, catalog, Resource::Product(product_id), from, to)?,
            CascadeStep::DeleteProject(project_id) => remove_project(tx, project_id)?,
            CascadeStep::TransferProject {
                project_id,
                from,
                to,
            } => transfer(tx, catalog, Resource::Project(project_id), from, to)?,
            CascadeStep::ReleaseEdges(account_id) => {
                tx.delete_account_product_edges(account_id).allow_no_rows()?;
                tx.delete_account_project_edges(account_id).allow_no_rows()?;
            }
            CascadeStep::RemoveAccount(account) => {
                on_no_rows(tx.delete_account(account.id), || {
                    ServiceError::AccountNotFound(account.id)
                })?;
                drop_asset(tx, AssetKind::AccountSettings, account.settings_id)?;
                drop_asset(tx, AssetKind::AccountAssets, account.assets_id)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn log_plan(account_id: AccountId, steps: &[CascadeStep]) {
    let count = |pred: fn(&CascadeStep) -> bool| steps.iter().filter(|step| pred(step)).count();
    info!(
        "event=account_delete_plan module=service account_id={account_id} delete_products={} transfer_products={} delete_projects={} transfer_projects={}",
        count(|step| matches!(step, CascadeStep::DeleteProduct(_))),
        count(|step| matches!(step, CascadeStep::TransferProduct { .. })),
        count(|step| matches!(step, CascadeStep::DeleteProject(_))),
        count(|step| matches!(step, CascadeStep::TransferProject { .. })),
    );
}
