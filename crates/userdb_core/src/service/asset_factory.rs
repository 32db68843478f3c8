//! Asset record construction and the lookups controllers share.

use super::error::{on_no_rows, ServiceError, ServiceResult};
use crate::model::asset::{Asset, AssetError, AssetKind, DataMap, BASE_ASSET_PATH};
use crate::model::{AssetId, IdSource};
use crate::repo::asset_repo::AssetRepository;
use crate::repo::RepoError;
use serde_json::Value;

/// Builds a new asset with a fresh id and its base path filled in.
///
/// `None` is rejected; an empty map is accepted. Nothing is persisted.
pub fn create_asset(
    initial: Option<DataMap>,
    ids: &dyn IdSource,
    path_gen: &dyn Fn(AssetId) -> String,
) -> Result<Asset, AssetError> {
    let mut data = initial.ok_or(AssetError::RefNotInitialised)?;
    let id = ids.next_id();
    data.insert(BASE_ASSET_PATH.to_string(), Value::String(path_gen(id)));
    Ok(Asset::with_id(id, data))
}

/// Reads an asset an entity row points at. Absence is corrupt state.
pub(crate) fn fetch_asset<R: AssetRepository + ?Sized>(
    repo: &R,
    kind: AssetKind,
    id: AssetId,
) -> ServiceResult<Asset> {
    repo.get_asset(kind, id)?.ok_or_else(|| {
        RepoError::InvalidData(format!("dangling reference to {kind} row {id}")).into()
    })
}

/// Overwrites an asset; zero rows matched becomes `MissingAsset`.
pub(crate) fn store_asset<R: AssetRepository + ?Sized>(
    repo: &R,
    kind: AssetKind,
    asset: &Asset,
) -> ServiceResult<()> {
    on_no_rows(repo.update_asset(kind, asset), || ServiceError::MissingAsset(kind))
}

pub(crate) fn drop_asset<R: AssetRepository + ?Sized>(
    repo: &R,
    kind: AssetKind,
    id: AssetId,
) -> ServiceResult<()> {
    on_no_rows(repo.delete_asset(kind, id), || ServiceError::MissingAsset(kind))
}

#[cfg(test)]
mod tests {
    use super::create_asset;
    use crate::model::asset::{AssetError, DataMap, BASE_ASSET_PATH};
    use crate::model::RandomIdSource;
    use serde_json::Value;

    #[test]
    fn absent_map_is_rejected() {
        let err = create_asset(None, &RandomIdSource, &|id| format!("/assets/{id}"))
            .expect_err("absent map must fail");
        assert_eq!(err, AssetError::RefNotInitialised);
    }

    #[test]
    fn empty_map_gets_id_and_base_path() {
        let asset = create_asset(Some(DataMap::new()), &RandomIdSource, &|id| {
            format!("/assets/{id}")
        })
        .expect("empty map is valid");
        assert_eq!(asset.base_path(), Some(format!("/assets/{}", asset.id).as_str()));
        assert_eq!(asset.data.len(), 1);
    }

    #[test]
    fn initial_entries_are_kept() {
        let mut initial = DataMap::new();
        initial.insert("theme".to_string(), Value::String("dark".to_string()));
        let asset = create_asset(Some(initial), &RandomIdSource, &|_| "/p".to_string())
            .expect("create");
        assert_eq!(asset.data.get("theme"), Some(&Value::String("dark".to_string())));
        assert_eq!(
            asset.data.get(BASE_ASSET_PATH),
            Some(&Value::String("/p".to_string()))
        );
    }
}
