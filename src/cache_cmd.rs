use crate::cache::ItemCache;
use crate::config::Config;
use crate::{auth, fetch};
use anyhow::Result;

/// Force a full refetch of the library listing into the on-disk cache,
/// replacing whatever snapshot was there.
pub(crate) fn main(cfg: &Config) -> Result<()> {
    let client = auth::acquire_client(cfg)?;
    let cache = ItemCache::new(&cfg.cache_file);
    match cache.load()? {
        Some(old) => println!("Old cache size: {}", old.len()),
        None => println!("No existing cache"),
    }
    let items = fetch::all_media_items(&client)?;
    cache.store(&items)?;
    println!("New cache size: {}", items.len());
    Ok(())
}
