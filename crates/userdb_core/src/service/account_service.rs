//! Account lifecycle controller.
//!
//! # Responsibility
//! - Create, read, update, authenticate and delete accounts.
//! - Resolve product and project ownership when an account is deleted.
//! - Share products by mutating ownership edges.
//!
//! # Invariants
//! - Emails are stored and compared without whitespace.
//! - Account deletion is one transaction: transfers, cascades and the
//!   account row either all persist or none do.
//! - Credentials never reach logs or returned views.

use super::asset_factory::{create_asset, fetch_asset, store_asset};
use super::cascade::{collect_holdings, execute_plan, log_plan, plan_account_removal};
use super::edges::{revalidate, revoke, share, Resource};
use super::error::{ServiceError, ServiceResult};
use super::privilege_catalog::PrivilegeCatalog;
use super::unit_of_work::run;
use crate::model::account::{normalize_email, Account, AccountView};
use crate::model::asset::{AssetKind, DataMap};
use crate::model::{
    AccountId, AssetId, IdSource, NomineeMap, PrivilegeId, ProductId, RandomIdSource,
};
use crate::repo::account_repo::AccountRepository;
use crate::repo::asset_repo::AssetRepository;
use crate::repo::store::{RepositoryTx, UnitOfWork};
use crate::repo::{ConstraintKind, RepoError};
use std::fmt::Display;

/// Account use-case service.
pub struct AccountService<U: UnitOfWork> {
    uow: U,
    ids: Box<dyn IdSource>,
}

impl<U: UnitOfWork> AccountService<U> {
    pub fn new(uow: U) -> Self {
        Self::with_id_source(uow, Box::new(RandomIdSource))
    }

    pub fn with_id_source(uow: U, ids: Box<dyn IdSource>) -> Self {
        Self { uow, ids }
    }

    /// Registers an account with empty settings and assets.
    ///
    /// # Errors
    /// - `DuplicateEmail` when the email is already registered.
    /// - `DuplicateAccountName` when the store rejects the name.
    /// - `Credential` when `encrypt` fails; nothing is written then.
    pub fn create<E: Display>(
        &self,
        name: &str,
        email: &str,
        password: &[u8],
        path_gen: impl Fn(AssetId) -> String,
        encrypt: impl FnOnce(&[u8]) -> Result<Vec<u8>, E>,
    ) -> ServiceResult<AccountView> {
        let email = normalize_email(email);
        let settings = create_asset(Some(DataMap::new()), self.ids.as_ref(), &path_gen)?;
        let assets = create_asset(Some(DataMap::new()), self.ids.as_ref(), &path_gen)?;
        let password = encrypt(password).map_err(|err| ServiceError::Credential(err.to_string()))?;
        let account = Account {
            id: self.ids.next_id(),
            name: name.to_string(),
            email,
            password,
            settings_id: settings.id,
            assets_id: assets.id,
        };

        run(&self.uow, "account_create", |tx| {
            if tx.account_by_email(&account.email)?.is_some() {
                return Err(ServiceError::DuplicateEmail(account.email.clone()));
            }
            tx.insert_asset(AssetKind::AccountSettings, &settings)?;
            tx.insert_asset(AssetKind::AccountAssets, &assets)?;
            tx.insert_account(&account)
                .map_err(|err| map_duplicate(err, &account))?;
            Ok(AccountView::assemble(account, settings, assets))
        })
    }

    pub fn get(&self, id: AccountId) -> ServiceResult<AccountView> {
        run(&self.uow, "account_get", |tx| {
            let account = tx
                .account_by_id(id)?
                .ok_or(ServiceError::AccountNotFound(id))?;
            account_view(tx, account)
        })
    }

    pub fn get_by_email(&self, email: &str) -> ServiceResult<AccountView> {
        let email = normalize_email(email);
        run(&self.uow, "account_get_by_email", |tx| {
            let account = tx
                .account_by_email(&email)?
                .ok_or_else(|| ServiceError::AccountEmailNotFound(email.clone()))?;
            account_view(tx, account)
        })
    }

    /// Reads several accounts in input order, skipping unknown ids.
    pub fn get_many(&self, ids: &[AccountId]) -> ServiceResult<Vec<AccountView>> {
        let Some(first) = ids.first().copied() else {
            return Err(ServiceError::EmptyIdList);
        };
        run(&self.uow, "account_get_many", |tx| {
            let mut views = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(account) = tx.account_by_id(*id)? {
                    views.push(account_view(tx, account)?);
                }
            }
            if views.is_empty() {
                return Err(ServiceError::AccountNotFound(first));
            }
            Ok(views)
        })
    }

    pub fn update_settings(&self, view: &AccountView) -> ServiceResult<()> {
        run(&self.uow, "account_update_settings", |tx| {
            store_asset(tx, AssetKind::AccountSettings, &view.settings)
        })
    }

    pub fn update_assets(&self, view: &AccountView) -> ServiceResult<()> {
        run(&self.uow, "account_update_assets", |tx| {
            store_asset(tx, AssetKind::AccountAssets, &view.assets)
        })
    }

    /// Deletes an account and resolves everything it owns.
    ///
    /// Owned products pass to `nominees[product_id]` when present and are
    /// deleted with their projects otherwise. Owned projects follow their
    /// parent product's nominee. Remaining edges are removed before the
    /// account row.
    ///
    /// # Errors
    /// - `AccountNotFound` for an unknown account or nominee.
    /// - `ProductUserNotAssociated` when a transfer finds no edge to drop.
    pub fn delete(&self, id: AccountId, nominees: &NomineeMap) -> ServiceResult<()> {
        run(&self.uow, "account_delete", |tx| {
            let account = tx
                .account_by_id(id)?
                .ok_or(ServiceError::AccountNotFound(id))?;
            let catalog = PrivilegeCatalog::load(tx)?;
            let holdings = collect_holdings(tx, id)?;
            let steps = plan_account_removal(account, &holdings, nominees, &catalog);
            log_plan(id, &steps);
            execute_plan(tx, &catalog, steps)
        })
    }

    /// Checks an email/password pair for account `id`.
    ///
    /// `compare(plaintext, stored)` decides whether the credential matches.
    pub fn authenticate(
        &self,
        id: AccountId,
        email: &str,
        password: &[u8],
        compare: impl FnOnce(&[u8], &[u8]) -> bool,
    ) -> ServiceResult<()> {
        let email = normalize_email(email);
        let account = run(&self.uow, "account_authenticate", |tx| {
            tx.account_by_id(id)?
                .ok_or(ServiceError::AccountNotFound(id))
        })?;
        if account.email != email || !compare(password, &account.password) {
            return Err(ServiceError::AuthenticationFailed);
        }
        Ok(())
    }

    /// Grants or changes `account_id`'s privilege on a product.
    pub fn add_product_ownership(
        &self,
        product_id: ProductId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> ServiceResult<()> {
        run(&self.uow, "account_add_product_ownership", |tx| {
            share(tx, Resource::Product(product_id), account_id, privilege)
        })
    }

    /// Removes `account_id`'s edge on a product.
    pub fn remove_product_ownership(
        &self,
        product_id: ProductId,
        account_id: AccountId,
    ) -> ServiceResult<()> {
        run(&self.uow, "account_remove_product_ownership", |tx| {
            let catalog = PrivilegeCatalog::load(tx)?;
            let resource = Resource::Product(product_id);
            revoke(tx, resource, account_id)?;
            revalidate(tx, &catalog, resource)
        })
    }
}

fn map_duplicate(err: RepoError, account: &Account) -> ServiceError {
    match err.constraint_kind() {
        Some(ConstraintKind::DuplicateAccountName) => {
            ServiceError::DuplicateAccountName(account.name.clone())
        }
        Some(ConstraintKind::DuplicateAccountEmail) => {
            ServiceError::DuplicateEmail(account.email.clone())
        }
        _ => err.into(),
    }
}

fn account_view<T: RepositoryTx>(tx: &T, account: Account) -> ServiceResult<AccountView> {
    let settings = fetch_asset(tx, AssetKind::AccountSettings, account.settings_id)?;
    let assets = fetch_asset(tx, AssetKind::AccountAssets, account.assets_id)?;
    Ok(AccountView::assemble(account, settings, assets))
}
