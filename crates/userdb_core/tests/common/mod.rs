//! Store wrapper that simulates a concurrent writer winning the race between
//! a service's uniqueness lookup and its insert.
//!
//! Every port delegates to `SqliteTx`, except `product_by_name` and
//! `account_by_email`, which always report "not found" so the insert reaches
//! the UNIQUE index.

use rusqlite::Connection;
use userdb_core::model::account::Account;
use userdb_core::model::asset::{Asset, AssetKind};
use userdb_core::model::privilege::Privilege;
use userdb_core::model::product::Product;
use userdb_core::model::project::Project;
use userdb_core::model::{
    AccountId, AssetId, HoldingMap, OwnerMap, PrivilegeId, ProductId, ProjectId,
};
use userdb_core::repo::account_repo::AccountRepository;
use userdb_core::repo::asset_repo::AssetRepository;
use userdb_core::repo::privilege_repo::PrivilegeRepository;
use userdb_core::repo::product_repo::ProductRepository;
use userdb_core::repo::project_repo::ProjectRepository;
use userdb_core::repo::store::{SqliteStore, SqliteTx, Transactional, UnitOfWork};
use userdb_core::repo::RepoResult;

#[derive(Clone, Copy)]
pub struct StaleLookupStore<'conn> {
    inner: SqliteStore<'conn>,
}

impl<'conn> StaleLookupStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            inner: SqliteStore::new(conn),
        }
    }
}

impl<'conn> UnitOfWork for StaleLookupStore<'conn> {
    type Tx = StaleLookupTx<'conn>;

    fn begin(&self) -> RepoResult<Self::Tx> {
        Ok(StaleLookupTx(self.inner.begin()?))
    }
}

pub struct StaleLookupTx<'conn>(SqliteTx<'conn>);

impl Transactional for StaleLookupTx<'_> {
    fn commit(self) -> RepoResult<()> {
        self.0.commit()
    }

    fn rollback(self) -> RepoResult<()> {
        self.0.rollback()
    }
}

impl AssetRepository for StaleLookupTx<'_> {
    fn insert_asset(&self, kind: AssetKind, asset: &Asset) -> RepoResult<()> {
        self.0.insert_asset(kind, asset)
    }

    fn get_asset(&self, kind: AssetKind, id: AssetId) -> RepoResult<Option<Asset>> {
        self.0.get_asset(kind, id)
    }

    fn update_asset(&self, kind: AssetKind, asset: &Asset) -> RepoResult<()> {
        self.0.update_asset(kind, asset)
    }

    fn delete_asset(&self, kind: AssetKind, id: AssetId) -> RepoResult<()> {
        self.0.delete_asset(kind, id)
    }
}

impl PrivilegeRepository for StaleLookupTx<'_> {
    fn list_privileges(&self) -> RepoResult<Vec<Privilege>> {
        self.0.list_privileges()
    }
}

impl AccountRepository for StaleLookupTx<'_> {
    fn insert_account(&self, account: &Account) -> RepoResult<()> {
        self.0.insert_account(account)
    }

    fn account_by_id(&self, id: AccountId) -> RepoResult<Option<Account>> {
        self.0.account_by_id(id)
    }

    fn account_by_email(&self, _email: &str) -> RepoResult<Option<Account>> {
        Ok(None)
    }

    fn delete_account(&self, id: AccountId) -> RepoResult<()> {
        self.0.delete_account(id)
    }
}

impl ProductRepository for StaleLookupTx<'_> {
    fn insert_product(&self, product: &Product) -> RepoResult<()> {
        self.0.insert_product(product)
    }

    fn product_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.0.product_by_id(id)
    }

    fn product_by_name(&self, _name: &str) -> RepoResult<Option<Product>> {
        Ok(None)
    }

    fn delete_product(&self, id: ProductId) -> RepoResult<()> {
        self.0.delete_product(id)
    }

    fn insert_product_owner(
        &self,
        product_id: ProductId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()> {
        self.0.insert_product_owner(product_id, account_id, privilege)
    }

    fn set_product_privilege(
        &self,
        product_id: ProductId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()> {
        self.0.set_product_privilege(product_id, account_id, privilege)
    }

    fn delete_product_owner(
        &self,
        product_id: ProductId,
        account_id: AccountId,
    ) -> RepoResult<()> {
        self.0.delete_product_owner(product_id, account_id)
    }

    fn delete_product_owners(&self, product_id: ProductId) -> RepoResult<()> {
        self.0.delete_product_owners(product_id)
    }

    fn delete_account_product_edges(&self, account_id: AccountId) -> RepoResult<()> {
        self.0.delete_account_product_edges(account_id)
    }

    fn product_owners(&self, product_id: ProductId) -> RepoResult<OwnerMap> {
        self.0.product_owners(product_id)
    }

    fn account_products(&self, account_id: AccountId) -> RepoResult<HoldingMap> {
        self.0.account_products(account_id)
    }
}

impl ProjectRepository for StaleLookupTx<'_> {
    fn insert_project(&self, project: &Project) -> RepoResult<()> {
        self.0.insert_project(project)
    }

    fn project_by_id(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        self.0.project_by_id(id)
    }

    fn projects_for_product(&self, product_id: ProductId) -> RepoResult<Vec<Project>> {
        self.0.projects_for_product(product_id)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        self.0.delete_project(id)
    }

    fn insert_project_owner(
        &self,
        project_id: ProjectId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()> {
        self.0.insert_project_owner(project_id, account_id, privilege)
    }

    fn set_project_privilege(
        &self,
        project_id: ProjectId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()> {
        self.0.set_project_privilege(project_id, account_id, privilege)
    }

    fn delete_project_owner(
        &self,
        project_id: ProjectId,
        account_id: AccountId,
    ) -> RepoResult<()> {
        self.0.delete_project_owner(project_id, account_id)
    }

    fn delete_project_owners(&self, project_id: ProjectId) -> RepoResult<()> {
        self.0.delete_project_owners(project_id)
    }

    fn delete_account_project_edges(&self, account_id: AccountId) -> RepoResult<()> {
        self.0.delete_account_project_edges(account_id)
    }

    fn project_owners(&self, project_id: ProjectId) -> RepoResult<OwnerMap> {
        self.0.project_owners(project_id)
    }

    fn account_projects(&self, account_id: AccountId) -> RepoResult<HoldingMap> {
        self.0.account_projects(account_id)
    }
}
