//! Asset repository port and SQLite implementation.
//!
//! # Responsibility
//! - Persist asset maps as JSON objects in the table selected by `AssetKind`.
//!
//! # Invariants
//! - Stored payloads always decode to a JSON object.

use super::store::SqliteTx;
use super::{expect_changed, parse_uuid, RepoError, RepoResult};
use crate::model::asset::{Asset, AssetKind, DataMap};
use crate::model::AssetId;
use rusqlite::params;

/// Repository interface for asset records.
pub trait AssetRepository {
    fn insert_asset(&self, kind: AssetKind, asset: &Asset) -> RepoResult<()>;
    fn get_asset(&self, kind: AssetKind, id: AssetId) -> RepoResult<Option<Asset>>;
    /// Overwrites the whole map. Zero rows matched is `NoRowsAffected`.
    fn update_asset(&self, kind: AssetKind, asset: &Asset) -> RepoResult<()>;
    fn delete_asset(&self, kind: AssetKind, id: AssetId) -> RepoResult<()>;
}

impl AssetRepository for SqliteTx<'_> {
    fn insert_asset(&self, kind: AssetKind, asset: &Asset) -> RepoResult<()> {
        let payload = serde_json::to_string(&asset.data)?;
        self.conn().execute(
            &format!("INSERT INTO {} (id, data) VALUES (?1, ?2);", kind.table()),
            params![asset.id.to_string(), payload],
        )?;
        Ok(())
    }

    fn get_asset(&self, kind: AssetKind, id: AssetId) -> RepoResult<Option<Asset>> {
        let table = kind.table();
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT id, data FROM {table} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let id = parse_uuid(row, "id", table)?;
        let payload: String = row.get("data")?;
        let data: DataMap = serde_json::from_str(&payload).map_err(|err| {
            RepoError::InvalidData(format!("invalid JSON object in {table}.data: {err}"))
        })?;
        Ok(Some(Asset::with_id(id, data)))
    }

    fn update_asset(&self, kind: AssetKind, asset: &Asset) -> RepoResult<()> {
        let payload = serde_json::to_string(&asset.data)?;
        let changed = self.conn().execute(
            &format!("UPDATE {} SET data = ?1 WHERE id = ?2;", kind.table()),
            params![payload, asset.id.to_string()],
        )?;
        expect_changed(changed, "update asset")
    }

    fn delete_asset(&self, kind: AssetKind, id: AssetId) -> RepoResult<()> {
        let changed = self.conn().execute(
            &format!("DELETE FROM {} WHERE id = ?1;", kind.table()),
            [id.to_string()],
        )?;
        expect_changed(changed, "delete asset")
    }
}
