//! Product lifecycle controller.
//!
//! # Responsibility
//! - Create, read, update and delete products with their asset records.
//! - Manage the product's ownership map.
//!
//! # Invariants
//! - Every committed product has exactly one `Owner` edge.
//! - A failed create leaves no asset, product or edge row behind.
//! - Product names are unique; store-reported collisions map to
//!   `ProductExists`.

use super::asset_factory::{create_asset, fetch_asset, store_asset};
use super::cascade::remove_product;
use super::error::{ServiceError, ServiceResult};
use super::ownership::validate_ownership;
use super::privilege_catalog::{load_privilege_catalog, PrivilegeCatalog};
use super::unit_of_work::run;
use crate::model::asset::{AssetKind, DataMap};
use crate::model::product::{AccountProduct, Product, ProductView};
use crate::model::{AccountId, AssetId, IdSource, OwnerMap, ProductId, RandomIdSource};
use crate::repo::account_repo::AccountRepository;
use crate::repo::asset_repo::AssetRepository;
use crate::repo::product_repo::ProductRepository;
use crate::repo::store::{RepositoryTx, UnitOfWork};
use crate::repo::{ConstraintKind, RepoError};

/// Product use-case service.
pub struct ProductService<U: UnitOfWork> {
    uow: U,
    ids: Box<dyn IdSource>,
}

impl<U: UnitOfWork> ProductService<U> {
    pub fn new(uow: U) -> Self {
        Self::with_id_source(uow, Box::new(RandomIdSource))
    }

    pub fn with_id_source(uow: U, ids: Box<dyn IdSource>) -> Self {
        Self { uow, ids }
    }

    /// Creates a product owned solely by `owner`.
    ///
    /// # Errors
    /// - `AccountNotFound` when `owner` does not exist.
    /// - `ProductExists` when `name` is taken.
    pub fn create(
        &self,
        name: &str,
        public: bool,
        owner: AccountId,
        path_gen: impl Fn(AssetId) -> String,
    ) -> ServiceResult<ProductView> {
        let details = create_asset(Some(DataMap::new()), self.ids.as_ref(), &path_gen)?;
        let assets = create_asset(Some(DataMap::new()), self.ids.as_ref(), &path_gen)?;
        let product = Product {
            id: self.ids.next_id(),
            name: name.to_string(),
            public,
            details_id: details.id,
            assets_id: assets.id,
        };

        run(&self.uow, "product_create", |tx| {
            let catalog = PrivilegeCatalog::load(tx)?;
            let owners = OwnerMap::from([(owner, catalog.owner())]);
            let view = ProductView::assemble(product, details, assets);
            insert_product(tx, &view, &owners)?;
            Ok(view)
        })
    }

    /// Creates a product with a full ownership map.
    ///
    /// The map is validated before any transaction that writes is opened.
    pub fn create_shared(
        &self,
        name: &str,
        public: bool,
        owners: &OwnerMap,
        path_gen: impl Fn(AssetId) -> String,
    ) -> ServiceResult<ProductView> {
        let catalog = load_privilege_catalog(&self.uow)?;
        validate_ownership(Some(owners), &catalog)?;

        let details = create_asset(Some(DataMap::new()), self.ids.as_ref(), &path_gen)?;
        let assets = create_asset(Some(DataMap::new()), self.ids.as_ref(), &path_gen)?;
        let view = ProductView {
            id: self.ids.next_id(),
            name: name.to_string(),
            public,
            details,
            assets,
        };

        run(&self.uow, "product_create_shared", |tx| {
            insert_product(tx, &view, owners)?;
            Ok(view)
        })
    }

    pub fn get(&self, id: ProductId) -> ServiceResult<ProductView> {
        run(&self.uow, "product_get", |tx| {
            let product = tx
                .product_by_id(id)?
                .ok_or(ServiceError::ProductNotFound(id))?;
            product_view(tx, product)
        })
    }

    /// Reads several products in input order, skipping unknown ids.
    ///
    /// Fails with `ProductNotFound` only when none of the ids exist.
    pub fn get_many(&self, ids: &[ProductId]) -> ServiceResult<Vec<ProductView>> {
        let Some(first) = ids.first().copied() else {
            return Err(ServiceError::EmptyIdList);
        };
        run(&self.uow, "product_get_many", |tx| {
            let mut views = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(product) = tx.product_by_id(*id)? {
                    views.push(product_view(tx, product)?);
                }
            }
            if views.is_empty() {
                return Err(ServiceError::ProductNotFound(first));
            }
            Ok(views)
        })
    }

    pub fn update_details(&self, view: &ProductView) -> ServiceResult<()> {
        run(&self.uow, "product_update_details", |tx| {
            store_asset(tx, AssetKind::ProductDetails, &view.details)
        })
    }

    pub fn update_assets(&self, view: &ProductView) -> ServiceResult<()> {
        run(&self.uow, "product_update_assets", |tx| {
            store_asset(tx, AssetKind::ProductAssets, &view.assets)
        })
    }

    /// Deletes the product, its projects, ownership edges and asset rows.
    pub fn delete(&self, id: ProductId) -> ServiceResult<()> {
        run(&self.uow, "product_delete", |tx| remove_product(tx, id))
    }

    pub fn owners(&self, id: ProductId) -> ServiceResult<OwnerMap> {
        run(&self.uow, "product_owners", |tx| {
            if tx.product_by_id(id)?.is_none() {
                return Err(ServiceError::ProductNotFound(id));
            }
            Ok(tx.product_owners(id)?)
        })
    }

    /// Products `account_id` holds an edge for, with its privilege.
    pub fn list_for_account(&self, account_id: AccountId) -> ServiceResult<Vec<AccountProduct>> {
        run(&self.uow, "product_list_for_account", |tx| {
            if tx.account_by_id(account_id)?.is_none() {
                return Err(ServiceError::AccountNotFound(account_id));
            }
            let mut listed = Vec::new();
            for (product_id, privilege) in tx.account_products(account_id)? {
                let product = tx
                    .product_by_id(product_id)?
                    .ok_or(ServiceError::ProductNotFound(product_id))?;
                listed.push(AccountProduct {
                    product: product_view(tx, product)?,
                    privilege,
                });
            }
            Ok(listed)
        })
    }
}

fn insert_product<T: RepositoryTx>(
    tx: &T,
    view: &ProductView,
    owners: &OwnerMap,
) -> ServiceResult<()> {
    for account_id in owners.keys() {
        if tx.account_by_id(*account_id)?.is_none() {
            return Err(ServiceError::AccountNotFound(*account_id));
        }
    }
    if tx.product_by_name(&view.name)?.is_some() {
        return Err(ServiceError::ProductExists(view.name.clone()));
    }

    tx.insert_asset(AssetKind::ProductDetails, &view.details)?;
    tx.insert_asset(AssetKind::ProductAssets, &view.assets)?;
    tx.insert_product(&Product {
        id: view.id,
        name: view.name.clone(),
        public: view.public,
        details_id: view.details.id,
        assets_id: view.assets.id,
    })
    .map_err(|err| map_duplicate_name(err, &view.name))?;
    for (account_id, privilege) in owners {
        tx.insert_product_owner(view.id, *account_id, *privilege)?;
    }
    Ok(())
}

fn map_duplicate_name(err: RepoError, name: &str) -> ServiceError {
    match err.constraint_kind() {
        Some(ConstraintKind::DuplicateProductName) => ServiceError::ProductExists(name.to_string()),
        _ => err.into(),
    }
}

pub(crate) fn product_view<T: RepositoryTx>(tx: &T, product: Product) -> ServiceResult<ProductView> {
    let details = fetch_asset(tx, AssetKind::ProductDetails, product.details_id)?;
    let assets = fetch_asset(tx, AssetKind::ProductAssets, product.assets_id)?;
    Ok(ProductView::assemble(product, details, assets))
}
