//! Project lifecycle controller.
//!
//! # Responsibility
//! - Create, read, update and delete projects under a parent product.
//! - Manage project ownership edges.
//!
//! # Invariants
//! - Every committed project has exactly one `Owner` edge.
//! - Deleting all projects of a product succeeds when there are none.

use super::asset_factory::{create_asset, fetch_asset, store_asset};
use super::cascade::{remove_project, remove_projects_for_product};
use super::edges::{revalidate, revoke, share, Resource};
use super::error::{ServiceError, ServiceResult};
use super::privilege_catalog::PrivilegeCatalog;
use super::unit_of_work::run;
use crate::model::asset::{AssetKind, DataMap};
use crate::model::project::{AccountProject, Project, ProjectView, DETAIL_NAME, DETAIL_PUBLIC};
use crate::model::{
    AccountId, AssetId, IdSource, OwnerMap, PrivilegeId, ProductId, ProjectId, RandomIdSource,
};
use crate::repo::account_repo::AccountRepository;
use crate::repo::asset_repo::AssetRepository;
use crate::repo::product_repo::ProductRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::store::{RepositoryTx, UnitOfWork};
use serde_json::Value;

/// Project use-case service.
pub struct ProjectService<U: UnitOfWork> {
    uow: U,
    ids: Box<dyn IdSource>,
}

impl<U: UnitOfWork> ProjectService<U> {
    pub fn new(uow: U) -> Self {
        Self::with_id_source(uow, Box::new(RandomIdSource))
    }

    pub fn with_id_source(uow: U, ids: Box<dyn IdSource>) -> Self {
        Self { uow, ids }
    }

    /// Creates a project under `product_id` owned solely by `owner`.
    ///
    /// `name` and `public` are stored in the details asset.
    pub fn create(
        &self,
        name: &str,
        public: bool,
        owner: AccountId,
        product_id: ProductId,
        path_gen: impl Fn(AssetId) -> String,
    ) -> ServiceResult<ProjectView> {
        let mut initial = DataMap::new();
        initial.insert(DETAIL_NAME.to_string(), Value::String(name.to_string()));
        initial.insert(DETAIL_PUBLIC.to_string(), Value::Bool(public));
        let details = create_asset(Some(initial), self.ids.as_ref(), &path_gen)?;
        let assets = create_asset(Some(DataMap::new()), self.ids.as_ref(), &path_gen)?;
        let project = Project {
            id: self.ids.next_id(),
            product_id,
            details_id: details.id,
            assets_id: assets.id,
        };

        run(&self.uow, "project_create", |tx| {
            if tx.product_by_id(product_id)?.is_none() {
                return Err(ServiceError::ProductNotFound(product_id));
            }
            if tx.account_by_id(owner)?.is_none() {
                return Err(ServiceError::AccountNotFound(owner));
            }
            let catalog = PrivilegeCatalog::load(tx)?;

            tx.insert_asset(AssetKind::ProjectDetails, &details)?;
            tx.insert_asset(AssetKind::ProjectAssets, &assets)?;
            tx.insert_project(&project)?;
            tx.insert_project_owner(project.id, owner, catalog.owner())?;
            Ok(ProjectView::assemble(project, details, assets))
        })
    }

    pub fn get(&self, id: ProjectId) -> ServiceResult<ProjectView> {
        run(&self.uow, "project_get", |tx| {
            let project = tx
                .project_by_id(id)?
                .ok_or(ServiceError::ProjectNotFound(id))?;
            project_view(tx, project)
        })
    }

    /// Reads several projects in input order, skipping unknown ids.
    pub fn get_many(&self, ids: &[ProjectId]) -> ServiceResult<Vec<ProjectView>> {
        let Some(first) = ids.first().copied() else {
            return Err(ServiceError::EmptyIdList);
        };
        run(&self.uow, "project_get_many", |tx| {
            let mut views = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(project) = tx.project_by_id(*id)? {
                    views.push(project_view(tx, project)?);
                }
            }
            if views.is_empty() {
                return Err(ServiceError::ProjectNotFound(first));
            }
            Ok(views)
        })
    }

    pub fn update_details(&self, view: &ProjectView) -> ServiceResult<()> {
        run(&self.uow, "project_update_details", |tx| {
            store_asset(tx, AssetKind::ProjectDetails, &view.details)
        })
    }

    pub fn update_assets(&self, view: &ProjectView) -> ServiceResult<()> {
        run(&self.uow, "project_update_assets", |tx| {
            store_asset(tx, AssetKind::ProjectAssets, &view.assets)
        })
    }

    pub fn delete(&self, id: ProjectId) -> ServiceResult<()> {
        run(&self.uow, "project_delete", |tx| remove_project(tx, id))
    }

    /// Deletes every project of `product_id` and returns how many went.
    pub fn delete_all_for_product(&self, product_id: ProductId) -> ServiceResult<usize> {
        run(&self.uow, "project_delete_all_for_product", |tx| {
            remove_projects_for_product(tx, product_id)
        })
    }

    pub fn owners(&self, id: ProjectId) -> ServiceResult<OwnerMap> {
        run(&self.uow, "project_owners", |tx| {
            if tx.project_by_id(id)?.is_none() {
                return Err(ServiceError::ProjectNotFound(id));
            }
            Ok(tx.project_owners(id)?)
        })
    }

    pub fn list_for_product(&self, product_id: ProductId) -> ServiceResult<Vec<ProjectView>> {
        run(&self.uow, "project_list_for_product", |tx| {
            if tx.product_by_id(product_id)?.is_none() {
                return Err(ServiceError::ProductNotFound(product_id));
            }
            tx.projects_for_product(product_id)?
                .into_iter()
                .map(|project| project_view(tx, project))
                .collect::<ServiceResult<Vec<_>>>()
        })
    }

    pub fn list_for_account(&self, account_id: AccountId) -> ServiceResult<Vec<AccountProject>> {
        run(&self.uow, "project_list_for_account", |tx| {
            if tx.account_by_id(account_id)?.is_none() {
                return Err(ServiceError::AccountNotFound(account_id));
            }
            let mut listed = Vec::new();
            for (project_id, privilege) in tx.account_projects(account_id)? {
                let project = tx
                    .project_by_id(project_id)?
                    .ok_or(ServiceError::ProjectNotFound(project_id))?;
                listed.push(AccountProject {
                    project: project_view(tx, project)?,
                    privilege,
                });
            }
            Ok(listed)
        })
    }

    /// Grants or changes `account_id`'s privilege on a project.
    ///
    /// The resulting owner map must still have exactly one owner.
    pub fn add_ownership(
        &self,
        project_id: ProjectId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> ServiceResult<()> {
        run(&self.uow, "project_add_ownership", |tx| {
            share(tx, Resource::Project(project_id), account_id, privilege)
        })
    }

    /// Removes `account_id`'s edge; a missing edge is `ProjectUserNotAssociated`.
    pub fn remove_ownership(&self, project_id: ProjectId, account_id: AccountId) -> ServiceResult<()> {
        run(&self.uow, "project_remove_ownership", |tx| {
            let catalog = PrivilegeCatalog::load(tx)?;
            let resource = Resource::Project(project_id);
            revoke(tx, resource, account_id)?;
            revalidate(tx, &catalog, resource)
        })
    }
}

pub(crate) fn project_view<T: RepositoryTx>(tx: &T, project: Project) -> ServiceResult<ProjectView> {
    let details = fetch_asset(tx, AssetKind::ProjectDetails, project.details_id)?;
    let assets = fetch_asset(tx, AssetKind::ProjectAssets, project.assets_id)?;
    Ok(ProjectView::assemble(project, details, assets))
}
