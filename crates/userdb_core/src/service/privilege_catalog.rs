//! Read-only privilege lookup.
//!
//! # Invariants
//! - A catalog always contains an `Owner` privilege.
//! - Catalogs are loaded per operation; nothing is cached process-wide.

use super::error::{ServiceError, ServiceResult};
use super::unit_of_work::run;
use crate::model::privilege::{Privilege, OWNER, PARTNER};
use crate::model::PrivilegeId;
use crate::repo::privilege_repo::PrivilegeRepository;
use crate::repo::store::UnitOfWork;

/// Snapshot of the privilege reference table.
#[derive(Debug, Clone)]
pub struct PrivilegeCatalog {
    privileges: Vec<Privilege>,
    owner: PrivilegeId,
    partner: Option<PrivilegeId>,
}

impl PrivilegeCatalog {
    pub fn new(privileges: Vec<Privilege>) -> ServiceResult<Self> {
        let id_of = |name: &str| {
            privileges
                .iter()
                .find(|privilege| privilege.name == name)
                .map(|privilege| privilege.id)
        };
        let owner = id_of(OWNER).ok_or(ServiceError::CatalogMissing(OWNER))?;
        let partner = id_of(PARTNER);
        Ok(Self {
            privileges,
            owner,
            partner,
        })
    }

    /// Reads the catalog through an open transaction.
    pub fn load<R: PrivilegeRepository + ?Sized>(repo: &R) -> ServiceResult<Self> {
        Self::new(repo.list_privileges()?)
    }

    pub fn is_valid(&self, id: PrivilegeId) -> bool {
        self.privileges.iter().any(|privilege| privilege.id == id)
    }

    pub fn is_owner(&self, id: PrivilegeId) -> bool {
        id == self.owner
    }

    pub fn is_partner(&self, id: PrivilegeId) -> bool {
        self.partner == Some(id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Privilege> {
        self.privileges.iter().find(|privilege| privilege.name == name)
    }

    pub fn owner(&self) -> PrivilegeId {
        self.owner
    }

    pub fn privileges(&self) -> &[Privilege] {
        &self.privileges
    }
}

/// Loads the catalog in its own short read transaction.
pub fn load_privilege_catalog<U: UnitOfWork>(uow: &U) -> ServiceResult<PrivilegeCatalog> {
    run(uow, "load_privilege_catalog", |tx| PrivilegeCatalog::load(tx))
}

#[cfg(test)]
pub(crate) fn sample_catalog() -> PrivilegeCatalog {
    let row = |id: PrivilegeId, name: &str| Privilege {
        id,
        name: name.to_string(),
        description: String::new(),
    };
    PrivilegeCatalog::new(vec![row(1, OWNER), row(2, PARTNER), row(3, "User")])
        .expect("sample catalog has an owner")
}
