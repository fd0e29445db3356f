use crate::cache::ItemCache;
use crate::config::Config;
use crate::fs::{self, FolderFilter};
use crate::{auth, reconcile};
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Report every remote library item that has no copy under the configured
/// local root. Duplicate local basenames each absorb one remote match, so a
/// burst of N remote copies needs N local files before nothing is reported.
pub(crate) fn main(cfg: &Config) -> Result<()> {
    info!("Walking local tree: {}", cfg.root_pictures_dir);
    let local_counts = fs::file_counts(Path::new(&cfg.root_pictures_dir), &FolderFilter::empty())?;

    let client = auth::acquire_client(cfg)?;
    let library = ItemCache::new(&cfg.cache_file).load_or_fetch(&client)?;

    let r = reconcile::reconcile(&library, &local_counts);
    for item in &r.extra_remote {
        println!(
            "Missing locally ({}) ({}): {}",
            item.media_metadata.creation_time,
            item.filename.to_lowercase(),
            item.product_url
        );
    }
    info!("Num missing locally: {}", r.extra_remote.len());
    Ok(())
}
