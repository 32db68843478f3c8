//! Product entity, view and well-known detail keys.

use super::asset::Asset;
use super::{AssetId, PrivilegeId, ProductId};
use serde::Serialize;

/// Whether clients beyond the first-party UI may open this product.
pub const DETAIL_SUPPORT_CLIENTS: &str = "support_clients";
/// Client UI bundle location.
pub const DETAIL_CLIENT_UI: &str = "client_ui";
/// Project UI bundle location.
pub const DETAIL_PROJECT_UI: &str = "project_ui";
pub const DETAIL_REQUIRES_3D: &str = "requires_3d";
pub const DETAIL_HAS_TRIAL: &str = "has_trial";
pub const DETAIL_IS_FREE: &str = "is_free";

/// Persisted product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub public: bool,
    pub details_id: AssetId,
    pub assets_id: AssetId,
}

/// Product snapshot with both asset records resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub public: bool,
    pub details: Asset,
    pub assets: Asset,
}

impl ProductView {
    pub(crate) fn assemble(product: Product, details: Asset, assets: Asset) -> Self {
        Self {
            id: product.id,
            name: product.name,
            public: product.public,
            details,
            assets,
        }
    }
}

/// A product as seen from one account, with that account's privilege.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountProduct {
    pub product: ProductView,
    pub privilege: PrivilegeId,
}
