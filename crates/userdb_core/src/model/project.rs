//! Project entity and view.
//!
//! Projects have no name column; name and visibility live in the details
//! asset under `DETAIL_NAME` and `DETAIL_PUBLIC`.

use super::asset::Asset;
use super::{AssetId, PrivilegeId, ProductId, ProjectId};
use serde::Serialize;
use serde_json::Value;

pub const DETAIL_NAME: &str = "name";
pub const DETAIL_PUBLIC: &str = "public";

/// Persisted project row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub product_id: ProductId,
    pub details_id: AssetId,
    pub assets_id: AssetId,
}

/// Project snapshot with both asset records resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub id: ProjectId,
    pub product_id: ProductId,
    pub details: Asset,
    pub assets: Asset,
}

impl ProjectView {
    pub(crate) fn assemble(project: Project, details: Asset, assets: Asset) -> Self {
        Self {
            id: project.id,
            product_id: project.product_id,
            details,
            assets,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.details.data.get(DETAIL_NAME).and_then(Value::as_str)
    }

    pub fn is_public(&self) -> bool {
        self.details
            .data
            .get(DETAIL_PUBLIC)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// A project as seen from one account, with that account's privilege.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountProject {
    pub project: ProjectView,
    pub privilege: PrivilegeId,
}
