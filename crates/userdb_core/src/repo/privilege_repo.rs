//! Privilege catalog repository port.

use super::store::SqliteTx;
use super::RepoResult;
use crate::model::privilege::Privilege;

/// Read-only access to static privilege reference data.
pub trait PrivilegeRepository {
    fn list_privileges(&self) -> RepoResult<Vec<Privilege>>;
}

impl PrivilegeRepository for SqliteTx<'_> {
    fn list_privileges(&self) -> RepoResult<Vec<Privilege>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, name, description FROM privileges ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut privileges = Vec::new();
        while let Some(row) = rows.next()? {
            privileges.push(Privilege {
                id: row.get("id")?,
                name: row.get("name")?,
                description: row.get("description")?,
            });
        }
        Ok(privileges)
    }
}
