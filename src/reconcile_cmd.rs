use crate::cache::ItemCache;
use crate::config::Config;
use crate::fs::{self, FolderFilter};
use crate::index::FilenameIndex;
use crate::{auth, fetch, reconcile};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Reconcile one remote album against a local folder tree: report album
/// items with no local file, and local files with no album item. For the
/// latter, the full library index supplies deep links when the library has
/// a copy that simply was never added to the album.
pub(crate) fn main(cfg: &Config, root_dir: &str, album_title: &str) -> Result<()> {
    println!("Root picture dir: '{root_dir}'");
    println!("Album title: '{album_title}'");

    let filter = FolderFilter::new(&cfg.folder_deny_patterns, &cfg.folder_allow_patterns)?;
    info!("Walking local tree");
    let local_counts = fs::file_counts(Path::new(root_dir), &filter)?;

    let client = auth::acquire_client(cfg)?;
    info!("Getting album");
    let album = fetch::find_album_by_title(&client, album_title)?
        .with_context(|| format!("Album not found with title '{album_title}'"))?;
    info!("Getting album media items");
    let album_items = fetch::album_media_items(&client, &album.id)?;
    info!("Getting all media items");
    let library = ItemCache::new(&cfg.cache_file).load_or_fetch(&client)?;
    let library_index = FilenameIndex::build(&library);

    let r = reconcile::reconcile(&album_items, &local_counts);
    for item in &r.extra_remote {
        println!(
            "Album extra file (date: {}): {} - {}",
            item.media_metadata.creation_time,
            item.filename.to_lowercase(),
            item.product_url
        );
    }
    for name in &r.missing_local {
        match library_index.get_fuzzy(name) {
            Some((key, items)) => {
                for (i, item) in items.iter().enumerate() {
                    println!("Link to missing in album ({key}) ({i}): {}", item.product_url);
                }
            }
            None => println!("Remote library missing file: ({name})"),
        }
    }
    println!("Num matched: {}", r.matched.len());
    println!("Num extra: {}", r.extra_remote.len());
    println!("Num missing: {}", r.missing_local.len());
    Ok(())
}
