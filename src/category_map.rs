//! The durable mapping from Mint category labels to Splitwise categories.
//!
//! The file looks like this, and is rewritten in full every time a mapping is added:
//! ```json
//! {
//!   "mintLabelToSplitwiseId": { "Groceries": 12 },
//!   "splitwiseIdToLabel": { "12": "Food and drink > Groceries" }
//! }
//! ```

use crate::model::CategoryId;
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The serialization format of the category map file.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryMapFile {
    #[serde(default)]
    mint_label_to_splitwise_id: BTreeMap<String, CategoryId>,
    #[serde(default)]
    splitwise_id_to_label: BTreeMap<CategoryId, String>,
}

/// Holds the category mappings in memory and writes them back to `path` whenever one is added.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    path: PathBuf,
    data: CategoryMapFile,
}

impl CategoryMap {
    /// Loads the map from `path`. A missing file is an empty map; it will be created on the first
    /// `save`.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.is_file() {
            utils::deserialize(&path)
                .await
                .context("Unable to load the category map")?
        } else {
            debug!(
                "No category map at {}, starting with an empty one",
                path.display()
            );
            CategoryMapFile::default()
        };
        Ok(Self { path, data })
    }

    /// The Splitwise category that the Mint category `mint_label` has been mapped to, if any.
    pub fn lookup(&self, mint_label: &str) -> Option<CategoryId> {
        self.data.mint_label_to_splitwise_id.get(mint_label).copied()
    }

    /// The label recorded for the Splitwise category `id`, if any.
    pub fn label_for(&self, id: CategoryId) -> Option<&str> {
        self.data.splitwise_id_to_label.get(&id).map(String::as_str)
    }

    /// Records that `mint_label` maps to the Splitwise category `id`, labeled `label`, and writes
    /// the whole map to disk before returning.
    pub async fn save(&mut self, mint_label: &str, id: CategoryId, label: &str) -> Result<()> {
        self.data
            .mint_label_to_splitwise_id
            .insert(mint_label.to_string(), id);
        self.data.splitwise_id_to_label.insert(id, label.to_string());
        utils::serialize(&self.path, &self.data)
            .await
            .context("Unable to save the category map")?;
        debug!("Mapped Mint category '{mint_label}' to Splitwise category {id} '{label}'");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let map = CategoryMap::load(dir.path().join("map.json")).await.unwrap();
        assert_eq!(None, map.lookup("Groceries"));
        assert_eq!(None, map.label_for(5));
    }

    #[tokio::test]
    async fn test_save_then_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("map.json");

        let mut map = CategoryMap::load(&path).await.unwrap();
        map.save("Groceries", 5, "Food").await.unwrap();
        assert_eq!(Some(5), map.lookup("Groceries"));
        assert_eq!(Some("Food"), map.label_for(5));

        let reloaded = CategoryMap::load(&path).await.unwrap();
        assert_eq!(Some(5), reloaded.lookup("Groceries"));
        assert_eq!(Some("Food"), reloaded.label_for(5));
    }

    #[tokio::test]
    async fn test_file_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("map.json");
        let mut map = CategoryMap::load(&path).await.unwrap();
        map.save("Groceries", 12, "Food and drink > Groceries")
            .await
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(12, json["mintLabelToSplitwiseId"]["Groceries"]);
        assert_eq!(
            "Food and drink > Groceries",
            json["splitwiseIdToLabel"]["12"]
        );
    }

    #[tokio::test]
    async fn test_remap_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut map = CategoryMap::load(dir.path().join("map.json")).await.unwrap();
        map.save("Coffee Shops", 13, "Dining out").await.unwrap();
        map.save("Coffee Shops", 14, "Coffee").await.unwrap();
        assert_eq!(Some(14), map.lookup("Coffee Shops"));
        assert_eq!(Some("Coffee"), map.label_for(14));
    }

    #[tokio::test]
    async fn test_load_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(
            &path,
            r#"{"mintLabelToSplitwiseId": {"Gas & Fuel": 33}, "splitwiseIdToLabel": {"33": "Transportation > Gas/fuel"}}"#,
        )
        .unwrap();
        let map = CategoryMap::load(&path).await.unwrap();
        assert_eq!(Some(33), map.lookup("Gas & Fuel"));
        assert_eq!(Some("Transportation > Gas/fuel"), map.label_for(33));
    }
}
