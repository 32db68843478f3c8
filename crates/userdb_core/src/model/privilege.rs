//! Privilege reference data.

use super::PrivilegeId;
use serde::Serialize;

pub const OWNER: &str = "Owner";
pub const PARTNER: &str = "Partner";

/// One row of the static privilege catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Privilege {
    pub id: PrivilegeId,
    pub name: String,
    pub description: String,
}
