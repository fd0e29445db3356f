use crate::auth;
use crate::cache::ItemCache;
use crate::config::Config;
use crate::index::FilenameIndex;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Re-sort the files directly under `root_dir` into per-date subfolders,
/// using each file's remote creation time. Files with no unique remote
/// counterpart are left untouched.
pub(crate) fn main(cfg: &Config, root_dir: &str, dry_run: bool) -> Result<()> {
    let client = auth::acquire_client(cfg)?;
    let library = ItemCache::new(&cfg.cache_file).load_or_fetch(&client)?;
    let index = FilenameIndex::build(&library);
    sort_files(Path::new(root_dir), &index, dry_run)
}

fn sort_files(root: &Path, index: &FilenameIndex, dry_run: bool) -> Result<()> {
    let entries = fs::read_dir(root).with_context(|| format!("Error reading dir {root:?}"))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Error reading entry in {root:?}"))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name == ".DS_Store" {
            continue;
        }
        // exact case-insensitive lookup only; a fuzzy match would re-date a
        // jpg copy from its heic original, which is exactly what it wants,
        // but a wrong burst pick is worse than leaving the file alone
        let Some(items) = index.get(&name.to_lowercase()) else {
            info!("Unable to find remote item for '{name}', leaving untouched");
            continue;
        };
        if items.len() > 1 {
            info!("Found multiple media items for '{name}', leaving untouched");
            continue;
        }
        let creation_time = &items[0].media_metadata.creation_time;
        let Some(date) = creation_time.get(..10) else {
            warn!("Unparseable creation time '{creation_time}' for '{name}', leaving untouched");
            continue;
        };
        let target_dir = root.join(date);
        if dry_run {
            info!("Dry run: would move '{name}' into {target_dir:?}");
            continue;
        }
        if !target_dir.exists() {
            fs::create_dir(&target_dir)
                .with_context(|| format!("Unable to create folder {target_dir:?}"))?;
            info!("Created folder: {target_dir:?}");
        }
        fs::rename(&path, target_dir.join(&name))
            .with_context(|| format!("Unable to move '{name}' into {target_dir:?}"))?;
        info!("Moved '{name}' into folder {target_dir:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaItem;
    use std::fs::File;

    fn dated_item(id: &str, filename: &str, creation_time: &str) -> MediaItem {
        let mut item = MediaItem::new_for_test(id, filename);
        item.media_metadata.creation_time = creation_time.to_string();
        item
    }

    #[test]
    fn test_sort_moves_unique_matches_by_date() -> anyhow::Result<()> {
        crate::test_util::setup_log();
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        File::create(root.join("IMG_1.JPG"))?;
        File::create(root.join("img_2.jpg"))?;
        File::create(root.join("unknown.jpg"))?;
        File::create(root.join("burst.jpg"))?;

        let index = FilenameIndex::build(&[
            dated_item("1", "img_1.jpg", "2021-06-01T10:00:00Z"),
            dated_item("2", "img_2.jpg", "2021-06-02T09:00:00Z"),
            dated_item("3a", "burst.jpg", "2021-06-03T08:00:00Z"),
            dated_item("3b", "burst.jpg", "2021-06-03T08:00:01Z"),
        ]);
        sort_files(root, &index, false)?;

        assert!(root.join("2021-06-01").join("IMG_1.JPG").exists());
        assert!(root.join("2021-06-02").join("img_2.jpg").exists());
        // no remote match and ambiguous match stay put
        assert!(root.join("unknown.jpg").exists());
        assert!(root.join("burst.jpg").exists());
        Ok(())
    }

    #[test]
    fn test_sort_dry_run_moves_nothing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        File::create(root.join("img_1.jpg"))?;
        let index =
            FilenameIndex::build(&[dated_item("1", "img_1.jpg", "2021-06-01T10:00:00Z")]);
        sort_files(root, &index, true)?;
        assert!(root.join("img_1.jpg").exists());
        assert!(!root.join("2021-06-01").exists());
        Ok(())
    }
}
