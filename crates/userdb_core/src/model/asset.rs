//! Generic key/value asset records.
//!
//! # Responsibility
//! - Carry settings, details and file-reference metadata for one owner field.
//! - Provide helpers for the well-known path and URL entries.
//!
//! # Invariants
//! - Values are opaque JSON; only `BASE_ASSET_PATH` has a reserved meaning.
//! - An asset lives in exactly one table, selected by `AssetKind`.

use super::{AssetId, IdSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reserved key holding the storage directory generated for the asset.
pub const BASE_ASSET_PATH: &str = "base_asset_path";

/// Free-form asset payload.
pub type DataMap = serde_json::Map<String, Value>;

/// Owner field an asset record is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    AccountSettings,
    AccountAssets,
    ProductDetails,
    ProductAssets,
    ProjectDetails,
    ProjectAssets,
}

impl AssetKind {
    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::AccountSettings => "account_settings",
            Self::AccountAssets => "account_assets",
            Self::ProductDetails => "product_details",
            Self::ProductAssets => "product_assets",
            Self::ProjectDetails => "project_details",
            Self::ProjectAssets => "project_assets",
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Asset construction and mutation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Caller passed no map at all (an empty map is fine).
    RefNotInitialised,
    /// `clear` was asked to drop a key the asset does not carry.
    UnknownKey(String),
}

impl Display for AssetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RefNotInitialised => write!(f, "asset references not initialised"),
            Self::UnknownKey(key) => write!(f, "unknown asset reference type `{key}`"),
        }
    }
}

impl Error for AssetError {}

/// One key/value asset row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub data: DataMap,
}

impl Asset {
    pub fn with_id(id: AssetId, data: DataMap) -> Self {
        Self { id, data }
    }

    /// Storage directory recorded at creation time.
    pub fn base_path(&self) -> Option<&str> {
        self.data.get(BASE_ASSET_PATH).and_then(Value::as_str)
    }

    /// Returns the path stored under `key`, or `default` when absent or not a string.
    pub fn image_path<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.data.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    /// Assigns a fresh `<base>/<uuid>.jpg` path to `key` unless one is already set.
    pub fn set_image_path(&mut self, key: &str, ids: &dyn IdSource) {
        if self.data.contains_key(key) {
            return;
        }
        let path = format!("{}/{}.jpg", self.base_path().unwrap_or_default(), ids.next_id());
        self.data.insert(key.to_string(), Value::String(path));
    }

    pub fn url<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.image_path(key, default)
    }

    pub fn set_url(&mut self, key: &str, url: impl Into<String>) {
        self.data.insert(key.to_string(), Value::String(url.into()));
    }

    /// Removes one entry.
    pub fn clear(&mut self, key: &str) -> Result<(), AssetError> {
        self.data
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| AssetError::UnknownKey(key.to_string()))
    }
}
