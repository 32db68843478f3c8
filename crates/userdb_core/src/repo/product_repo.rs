//! Product repository port and SQLite implementation.
//!
//! # Responsibility
//! - Persist product rows and `account_products` ownership edges.
//!
//! # Invariants
//! - The port never checks the single-owner rule; services do.
//! - Edge deletes report `NoRowsAffected` so callers can remap it.

use super::store::SqliteTx;
use super::{bool_to_int, expect_changed, parse_bool, parse_uuid, RepoResult};
use crate::model::product::Product;
use crate::model::{AccountId, HoldingMap, OwnerMap, PrivilegeId, ProductId};
use rusqlite::{params, Row};

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    name,
    public,
    details_id,
    assets_id
FROM products";

/// Repository interface for products and their ownership edges.
pub trait ProductRepository {
    fn insert_product(&self, product: &Product) -> RepoResult<()>;
    fn product_by_id(&self, id: ProductId) -> RepoResult<Option<Product>>;
    fn product_by_name(&self, name: &str) -> RepoResult<Option<Product>>;
    fn delete_product(&self, id: ProductId) -> RepoResult<()>;

    fn insert_product_owner(
        &self,
        product_id: ProductId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()>;
    /// Inserts the edge or overwrites its privilege.
    fn set_product_privilege(
        &self,
        product_id: ProductId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()>;
    fn delete_product_owner(&self, product_id: ProductId, account_id: AccountId)
        -> RepoResult<()>;
    /// Deletes every edge of one product.
    fn delete_product_owners(&self, product_id: ProductId) -> RepoResult<()>;
    /// Deletes every product edge held by one account.
    fn delete_account_product_edges(&self, account_id: AccountId) -> RepoResult<()>;
    fn product_owners(&self, product_id: ProductId) -> RepoResult<OwnerMap>;
    fn account_products(&self, account_id: AccountId) -> RepoResult<HoldingMap>;
}

impl ProductRepository for SqliteTx<'_> {
    fn insert_product(&self, product: &Product) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO products (
                id,
                name,
                public,
                details_id,
                assets_id
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                product.id.to_string(),
                product.name.as_str(),
                bool_to_int(product.public),
                product.details_id.to_string(),
                product.assets_id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn product_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.query_product("id", id.to_string())
    }

    fn product_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        self.query_product("name", name.to_string())
    }

    fn delete_product(&self, id: ProductId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM products WHERE id = ?1;", [id.to_string()])?;
        expect_changed(changed, "delete product")
    }

    fn insert_product_owner(
        &self,
        product_id: ProductId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO account_products (account_id, product_id, privilege_id)
             VALUES (?1, ?2, ?3);",
            params![account_id.to_string(), product_id.to_string(), privilege],
        )?;
        Ok(())
    }

    fn set_product_privilege(
        &self,
        product_id: ProductId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO account_products (account_id, product_id, privilege_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (account_id, product_id)
             DO UPDATE SET privilege_id = excluded.privilege_id;",
            params![account_id.to_string(), product_id.to_string(), privilege],
        )?;
        Ok(())
    }

    fn delete_product_owner(
        &self,
        product_id: ProductId,
        account_id: AccountId,
    ) -> RepoResult<()> {
        let changed = self.conn().execute(
            "DELETE FROM account_products WHERE product_id = ?1 AND account_id = ?2;",
            params![product_id.to_string(), account_id.to_string()],
        )?;
        expect_changed(changed, "delete product owner")
    }

    fn delete_product_owners(&self, product_id: ProductId) -> RepoResult<()> {
        let changed = self.conn().execute(
            "DELETE FROM account_products WHERE product_id = ?1;",
            [product_id.to_string()],
        )?;
        expect_changed(changed, "delete product owners")
    }

    fn delete_account_product_edges(&self, account_id: AccountId) -> RepoResult<()> {
        let changed = self.conn().execute(
            "DELETE FROM account_products WHERE account_id = ?1;",
            [account_id.to_string()],
        )?;
        expect_changed(changed, "delete account product edges")
    }

    fn product_owners(&self, product_id: ProductId) -> RepoResult<OwnerMap> {
        let mut stmt = self.conn().prepare(
            "SELECT account_id, privilege_id FROM account_products WHERE product_id = ?1;",
        )?;
        let mut rows = stmt.query([product_id.to_string()])?;
        let mut owners = OwnerMap::new();
        while let Some(row) = rows.next()? {
            owners.insert(
                parse_uuid(row, "account_id", "account_products")?,
                row.get("privilege_id")?,
            );
        }
        Ok(owners)
    }

    fn account_products(&self, account_id: AccountId) -> RepoResult<HoldingMap> {
        let mut stmt = self.conn().prepare(
            "SELECT product_id, privilege_id FROM account_products WHERE account_id = ?1;",
        )?;
        let mut rows = stmt.query([account_id.to_string()])?;
        let mut holdings = HoldingMap::new();
        while let Some(row) = rows.next()? {
            holdings.insert(
                parse_uuid(row, "product_id", "account_products")?,
                row.get("privilege_id")?,
            );
        }
        Ok(holdings)
    }
}

impl SqliteTx<'_> {
    fn query_product(&self, column: &'static str, value: String) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_product_row(row)?)),
            None => Ok(None),
        }
    }
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    Ok(Product {
        id: parse_uuid(row, "id", "products")?,
        name: row.get("name")?,
        public: parse_bool(row, "public", "products")?,
        details_id: parse_uuid(row, "details_id", "products")?,
        assets_id: parse_uuid(row, "assets_id", "products")?,
    })
}
