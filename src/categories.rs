//! Provides the Splitwise category taxonomy for the session.
//!
//! When online, the categories are fetched from Splitwise the first time they are needed and the
//! cache file is rewritten with them. When offline, the cache file is read instead.

use crate::api::Splitwise;
use crate::model::Taxonomy;
use crate::{utils, Result};
use anyhow::Context;
use std::path::PathBuf;
use tracing::debug;

pub struct CategorySource {
    cache_path: PathBuf,
    offline: bool,
    taxonomy: Option<Taxonomy>,
}

impl CategorySource {
    pub fn new(cache_path: impl Into<PathBuf>, offline: bool) -> Self {
        Self {
            cache_path: cache_path.into(),
            offline,
            taxonomy: None,
        }
    }

    /// Returns the taxonomy, loading it on the first call.
    pub async fn taxonomy(&mut self, splitwise: &dyn Splitwise) -> Result<&Taxonomy> {
        if self.taxonomy.is_none() {
            let taxonomy = if self.offline {
                debug!(
                    "Reading Splitwise categories from {}",
                    self.cache_path.display()
                );
                utils::deserialize(&self.cache_path).await.with_context(|| {
                    format!(
                        "Unable to read the cached Splitwise categories, run once without \
                        --offline to create {}",
                        self.cache_path.display()
                    )
                })?
            } else {
                let taxonomy = splitwise.categories().await?;
                utils::serialize(&self.cache_path, &taxonomy)
                    .await
                    .context("Unable to cache the Splitwise categories")?;
                debug!(
                    "Cached {} Splitwise categories at {}",
                    taxonomy.categories().len(),
                    self.cache_path.display()
                );
                taxonomy
            };
            self.taxonomy = Some(taxonomy);
        }
        Ok(self.taxonomy.get_or_insert_with(Taxonomy::default))
    }
}
