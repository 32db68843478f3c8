//! Account repository port and SQLite implementation.

use super::store::SqliteTx;
use super::{expect_changed, parse_uuid, RepoResult};
use crate::model::account::Account;
use crate::model::AccountId;
use rusqlite::{params, Row};

const ACCOUNT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    password,
    settings_id,
    assets_id
FROM accounts";

/// Repository interface for account rows.
pub trait AccountRepository {
    fn insert_account(&self, account: &Account) -> RepoResult<()>;
    fn account_by_id(&self, id: AccountId) -> RepoResult<Option<Account>>;
    fn account_by_email(&self, email: &str) -> RepoResult<Option<Account>>;
    fn delete_account(&self, id: AccountId) -> RepoResult<()>;
}

impl AccountRepository for SqliteTx<'_> {
    fn insert_account(&self, account: &Account) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO accounts (
                id,
                name,
                email,
                password,
                settings_id,
                assets_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                account.id.to_string(),
                account.name.as_str(),
                account.email.as_str(),
                account.password.as_slice(),
                account.settings_id.to_string(),
                account.assets_id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn account_by_id(&self, id: AccountId) -> RepoResult<Option<Account>> {
        self.query_account("id", id.to_string())
    }

    fn account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        self.query_account("email", email.to_string())
    }

    fn delete_account(&self, id: AccountId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM accounts WHERE id = ?1;", [id.to_string()])?;
        expect_changed(changed, "delete account")
    }
}

impl SqliteTx<'_> {
    fn query_account(&self, column: &'static str, value: String) -> RepoResult<Option<Account>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_account_row(row)?)),
            None => Ok(None),
        }
    }
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    Ok(Account {
        id: parse_uuid(row, "id", "accounts")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password: row.get("password")?,
        settings_id: parse_uuid(row, "settings_id", "accounts")?,
        assets_id: parse_uuid(row, "assets_id", "accounts")?,
    })
}
