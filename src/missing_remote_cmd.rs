use crate::cache::ItemCache;
use crate::config::Config;
use crate::fs::{self, FolderFilter};
use crate::index::FilenameIndex;
use crate::{auth, reconcile};
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Report every local file under `root_dir` that the remote library has no
/// copy of, and note filenames that map to several remote items (bursts).
pub(crate) fn main(cfg: &Config, root_dir: &str) -> Result<()> {
    println!("Root picture dir: '{root_dir}'");

    let filter = FolderFilter::new(&cfg.folder_deny_patterns, &[])?;
    info!("Walking local tree");
    let local_counts = fs::file_counts(Path::new(root_dir), &filter)?;
    info!("Found {} local files", local_counts.total_units());

    let client = auth::acquire_client(cfg)?;
    let library = ItemCache::new(&cfg.cache_file).load_or_fetch(&client)?;
    let index = FilenameIndex::build(&library);

    let mut duplicate_names: Vec<&str> = local_counts
        .remaining()
        .map(|(name, _)| name)
        .filter(|name| index.get(name).is_some_and(|items| items.len() > 1))
        .collect();
    duplicate_names.sort();
    for name in duplicate_names {
        if let Some(items) = index.get(name) {
            println!("Found multiple media ({}) for filename {name}", items.len());
            for (i, item) in items.iter().enumerate() {
                info!("Item {i}: {}", item.product_url);
            }
        }
    }

    let r = reconcile::reconcile(&library, &local_counts);
    for name in &r.missing_local {
        println!("Remote library missing: {name}");
    }
    info!("Num missing remotely: {}", r.missing_local.len());
    Ok(())
}
