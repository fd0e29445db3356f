use crate::auth;
use crate::cache::ItemCache;
use crate::config::Config;
use crate::fs::{self, FolderFilter};
use crate::types::MediaItem;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// List remote items with no local copy that were created after the
/// configured free-before date. Anything older is assumed already freed.
pub(crate) fn main(cfg: &Config) -> Result<()> {
    let filter = ignore_filter(&cfg.picture_path_substrings_to_ignore)?;
    info!("Walking local tree");
    let local_names = local_file_names(Path::new(&cfg.root_pictures_dir), &filter, &cfg.file_names_to_ignore)?;

    let free_before = parse_free_before(&cfg.free_before_date)?;
    let client = auth::acquire_client(cfg)?;
    let library = ItemCache::new(&cfg.cache_file).load_or_fetch(&client)?;

    let candidates = freeable_candidates(&library, &local_names, free_before)?;
    for item in &candidates {
        println!("{}", item.product_url);
    }
    info!("Num candidates: {}", candidates.len());
    Ok(())
}

/// The ignore list holds plain substrings, not patterns. Escape them so
/// the folder filter treats them literally, matched case-insensitively.
fn ignore_filter(substrings: &[String]) -> Result<FolderFilter> {
    let deny: Vec<String> = substrings
        .iter()
        .map(|s| format!("(?i){}", regex::escape(s)))
        .collect();
    FolderFilter::new(&deny, &[])
}

/// Case-sensitive set of local basenames; the configured ignore names are
/// left out so scratch files never count as a local copy.
fn local_file_names(
    root: &Path,
    filter: &FolderFilter,
    names_to_ignore: &[String],
) -> Result<HashSet<String>> {
    let ignored: HashSet<&str> = names_to_ignore.iter().map(String::as_str).collect();
    let mut names = HashSet::new();
    fs::walk_files(root, filter, &mut |_, name| {
        if !ignored.contains(name) {
            names.insert(name.to_string());
        }
    })?;
    Ok(names)
}

fn parse_free_before(date: &str) -> Result<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Bad free-before-date {date:?}"))?;
    Ok(day.and_time(NaiveTime::MIN).and_utc())
}

fn freeable_candidates<'a>(
    items: &'a [MediaItem],
    local_names: &HashSet<String>,
    free_before: DateTime<Utc>,
) -> Result<Vec<&'a MediaItem>> {
    let mut candidates = Vec::new();
    for item in items {
        if local_names.contains(&item.filename) {
            continue;
        }
        let creation = &item.media_metadata.creation_time;
        let taken = DateTime::parse_from_rfc3339(creation)
            .with_context(|| format!("Bad creation time {creation:?} on item {}", item.id))?;
        if taken.with_timezone(&Utc) > free_before {
            candidates.push(item);
        }
    }
    Ok(candidates)
}
