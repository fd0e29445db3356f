use crate::client::PhotosClient;
use crate::fetch;
use crate::types::MediaItem;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// File-resident snapshot of the whole-library fetch: one JSON array of
/// media items. The cache is wholly trusted when present and wholly replaced
/// on refresh; there is no expiry, version field, or partial invalidation.
pub(crate) struct ItemCache {
    path: PathBuf,
}

impl ItemCache {
    pub(crate) fn new(path: &str) -> ItemCache {
        ItemCache {
            path: PathBuf::from(path),
        }
    }

    /// Deserialize the cache, or `Ok(None)` when no cache file exists.
    pub(crate) fn load(&self) -> Result<Option<Vec<MediaItem>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let f = File::open(&self.path)
            .with_context(|| format!("Unable to open cache file {:?}", self.path))?;
        let items: Vec<MediaItem> = serde_json::from_reader(f)
            .with_context(|| format!("Unable to parse cache file {:?}", self.path))?;
        Ok(Some(items))
    }

    /// Write the complete result set, overwriting any previous content.
    pub(crate) fn store(&self, items: &[MediaItem]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && parent != Path::new("")
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create cache dir {parent:?}"))?;
        }
        let f = File::create(&self.path)
            .with_context(|| format!("Unable to create cache file {:?}", self.path))?;
        serde_json::to_writer_pretty(f, items)
            .with_context(|| format!("Unable to write cache file {:?}", self.path))?;
        Ok(())
    }

    /// The whole library: verbatim from the cache when present, otherwise a
    /// full paginated fetch followed by a cache write.
    pub(crate) fn load_or_fetch(&self, client: &PhotosClient) -> Result<Vec<MediaItem>> {
        if let Some(items) = self.load()? {
            info!("Using cached media items: {} items from {:?}", items.len(), self.path);
            return Ok(items);
        }
        let items = fetch::all_media_items(client)?;
        self.store(&items)?;
        info!("Cached {} media items to {:?}", items.len(), self.path);
        Ok(items)
    }
}
