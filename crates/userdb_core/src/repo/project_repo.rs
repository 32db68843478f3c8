//! Project repository port and SQLite implementation.
//!
//! # Responsibility
//! - Persist project rows and `account_projects` ownership edges.
//!
//! # Invariants
//! - Bulk deletes report `NoRowsAffected` when nothing matched; callers
//!   decide whether that is an error.

use super::store::SqliteTx;
use super::{expect_changed, parse_uuid, RepoResult};
use crate::model::project::Project;
use crate::model::{AccountId, HoldingMap, OwnerMap, PrivilegeId, ProductId, ProjectId};
use rusqlite::{params, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    product_id,
    details_id,
    assets_id
FROM projects";

/// Repository interface for projects and their ownership edges.
pub trait ProjectRepository {
    fn insert_project(&self, project: &Project) -> RepoResult<()>;
    fn project_by_id(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Projects of one product, oldest first.
    fn projects_for_product(&self, product_id: ProductId) -> RepoResult<Vec<Project>>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;

    fn insert_project_owner(
        &self,
        project_id: ProjectId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()>;
    fn set_project_privilege(
        &self,
        project_id: ProjectId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()>;
    fn delete_project_owner(&self, project_id: ProjectId, account_id: AccountId)
        -> RepoResult<()>;
    fn delete_project_owners(&self, project_id: ProjectId) -> RepoResult<()>;
    fn delete_account_project_edges(&self, account_id: AccountId) -> RepoResult<()>;
    fn project_owners(&self, project_id: ProjectId) -> RepoResult<OwnerMap>;
    fn account_projects(&self, account_id: AccountId) -> RepoResult<HoldingMap>;
}

impl ProjectRepository for SqliteTx<'_> {
    fn insert_project(&self, project: &Project) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO projects (
                id,
                product_id,
                details_id,
                assets_id
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                project.id.to_string(),
                project.product_id.to_string(),
                project.details_id.to_string(),
                project.assets_id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn project_by_id(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_project_row(row)?)),
            None => Ok(None),
        }
    }

    fn projects_for_product(&self, product_id: ProductId) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn().prepare(&format!(
            "{PROJECT_SELECT_SQL} WHERE product_id = ?1 ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([product_id.to_string()])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        expect_changed(changed, "delete project")
    }

    fn insert_project_owner(
        &self,
        project_id: ProjectId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO account_projects (account_id, project_id, privilege_id)
             VALUES (?1, ?2, ?3);",
            params![account_id.to_string(), project_id.to_string(), privilege],
        )?;
        Ok(())
    }

    fn set_project_privilege(
        &self,
        project_id: ProjectId,
        account_id: AccountId,
        privilege: PrivilegeId,
    ) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO account_projects (account_id, project_id, privilege_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (account_id, project_id)
             DO UPDATE SET privilege_id = excluded.privilege_id;",
            params![account_id.to_string(), project_id.to_string(), privilege],
        )?;
        Ok(())
    }

    fn delete_project_owner(
        &self,
        project_id: ProjectId,
        account_id: AccountId,
    ) -> RepoResult<()> {
        let changed = self.conn().execute(
            "DELETE FROM account_projects WHERE project_id = ?1 AND account_id = ?2;",
            params![project_id.to_string(), account_id.to_string()],
        )?;
        expect_changed(changed, "delete project owner")
    }

    fn delete_project_owners(&self, project_id: ProjectId) -> RepoResult<()> {
        let changed = self.conn().execute(
            "DELETE FROM account_projects WHERE project_id = ?1;",
            [project_id.to_string()],
        )?;
        expect_changed(changed, "delete project owners")
    }

    fn delete_account_project_edges(&self, account_id: AccountId) -> RepoResult<()> {
        let changed = self.conn().execute(
            "DELETE FROM account_projects WHERE account_id = ?1;",
            [account_id.to_string()],
        )?;
        expect_changed(changed, "delete account project edges")
    }

    fn project_owners(&self, project_id: ProjectId) -> RepoResult<OwnerMap> {
        let mut stmt = self.conn().prepare(
            "SELECT account_id, privilege_id FROM account_projects WHERE project_id = ?1;",
        )?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut owners = OwnerMap::new();
        while let Some(row) = rows.next()? {
            owners.insert(
                parse_uuid(row, "account_id", "account_projects")?,
                row.get("privilege_id")?,
            );
        }
        Ok(owners)
    }

    fn account_projects(&self, account_id: AccountId) -> RepoResult<HoldingMap> {
        let mut stmt = self.conn().prepare(
            "SELECT project_id, privilege_id FROM account_projects WHERE account_id = ?1;",
        )?;
        let mut rows = stmt.query([account_id.to_string()])?;
        let mut holdings = HoldingMap::new();
        while let Some(row) = rows.next()? {
            holdings.insert(
                parse_uuid(row, "project_id", "account_projects")?,
                row.get("privilege_id")?,
            );
        }
        Ok(holdings)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: parse_uuid(row, "id", "projects")?,
        product_id: parse_uuid(row, "product_id", "projects")?,
        details_id: parse_uuid(row, "details_id", "projects")?,
        assets_id: parse_uuid(row, "assets_id", "projects")?,
    })
}
