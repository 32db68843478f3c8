//! Ownership-map validation.
//!
//! # Invariants
//! - Rules apply in a fixed order: emptiness, privilege validity, owner count.
//! - Validation is pure; it never touches the store.

use super::privilege_catalog::PrivilegeCatalog;
use crate::model::{AccountId, OwnerMap, PrivilegeId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ownership-map rule violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    EmptyOwners,
    UnknownPrivilege {
        privilege: PrivilegeId,
        account_id: AccountId,
    },
    /// Exactly one `Owner` edge is required.
    InvalidOwnerCount { count: usize },
}

impl Display for OwnershipError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOwners => write!(f, "ownership map must not be empty"),
            Self::UnknownPrivilege {
                privilege,
                account_id,
            } => write!(
                f,
                "unknown privilege {privilege} for account {account_id}"
            ),
            Self::InvalidOwnerCount { count } => {
                write!(f, "exactly one owner required, found {count}")
            }
        }
    }
}

impl Error for OwnershipError {}

/// Checks a proposed owner map against the catalog.
pub fn validate_ownership(
    owners: Option<&OwnerMap>,
    catalog: &PrivilegeCatalog,
) -> Result<(), OwnershipError> {
    let owners = match owners {
        Some(owners) if !owners.is_empty() => owners,
        _ => return Err(OwnershipError::EmptyOwners),
    };

    for (account_id, privilege) in owners {
        if !catalog.is_valid(*privilege) {
            return Err(OwnershipError::UnknownPrivilege {
                privilege: *privilege,
                account_id: *account_id,
            });
        }
    }

    let count = owners
        .values()
        .filter(|privilege| catalog.is_owner(**privilege))
        .count();
    if count != 1 {
        return Err(OwnershipError::InvalidOwnerCount { count });
    }
    Ok(())
}
