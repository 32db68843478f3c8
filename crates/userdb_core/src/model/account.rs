//! Account entity and view.

use super::asset::Asset;
use super::{AccountId, AssetId};
use serde::Serialize;
use std::fmt::{Debug, Formatter};

/// Persisted account row.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    /// Credential as produced by the injected encryption callback.
    pub password: Vec<u8>,
    pub settings_id: AssetId,
    pub assets_id: AssetId,
}

impl Debug for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("settings_id", &self.settings_id)
            .field("assets_id", &self.assets_id)
            .finish()
    }
}

/// Account snapshot returned to callers. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub settings: Asset,
    pub assets: Asset,
}

impl AccountView {
    pub(crate) fn assemble(account: Account, settings: Asset, assets: Asset) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            settings,
            assets,
        }
    }
}

/// Strips every whitespace character from an email address.
pub fn normalize_email(email: &str) -> String {
    email.chars().filter(|ch| !ch.is_whitespace()).collect()
}
