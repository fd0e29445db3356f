use crate::client::PhotosClient;
use crate::fs::{self, FolderFilter};
use crate::types::MediaItem;
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const BACKOFF_BASE: Duration = Duration::from_secs(1);
const BACKOFF_CAP: Duration = Duration::from_secs(10);

/// One top-level local folder and the album item anchoring its label: the
/// item with the highest album-order index whose filename appears in the
/// folder. Matching here is exact case-insensitive only, no extension swap.
#[derive(Debug)]
pub(crate) struct FolderInfo {
    pub(crate) name: String,
    pub(crate) anchor: Option<MediaItem>,
    pub(crate) num_media_items: usize,
}

/// A computed insertion: the label text and the item it goes after, or the
/// front of the album when there is no following anchor.
#[derive(Debug)]
pub(crate) struct LabelPlacement {
    pub(crate) text: String,
    pub(crate) anchor: Option<MediaItem>,
    pub(crate) anchor_folder: Option<String>,
}

/// Build folder info for every admitted top-level folder of `root`, in
/// directory order. `album_items` must be in album order; a filename seen
/// more than once keeps its latest index.
pub(crate) fn folder_infos(
    root: &Path,
    filter: &FolderFilter,
    album_items: &[MediaItem],
) -> Result<Vec<FolderInfo>> {
    let mut index_in_album: HashMap<String, usize> = HashMap::new();
    for (i, item) in album_items.iter().enumerate() {
        index_in_album.insert(item.filename.to_lowercase(), i);
    }

    let mut infos = Vec::new();
    for dir in fs::top_level_dirs(root)? {
        if filter.excluded(&dir.to_string_lossy()) {
            info!("Ignoring folder: {dir:?}");
            continue;
        }
        let names = fs::lowercase_filenames(&dir, filter)?;
        let mut highest: Option<usize> = None;
        let mut num_media_items = 0;
        for name in &names {
            if let Some(&i) = index_in_album.get(name) {
                num_media_items += 1;
                if highest.is_none_or(|h| i > h) {
                    highest = Some(i);
                }
            }
        }
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        infos.push(FolderInfo {
            name,
            anchor: highest.map(|i| album_items[i].clone()),
            num_media_items,
        });
    }
    Ok(infos)
}

/// Compute every placement before any insertion happens. Each folder's label
/// goes after the anchor of the nearest following folder that has one; a
/// folder with no matched items is skipped both as a label target and when
/// scanning for the next anchor. No following anchor means front of album.
pub(crate) fn plan_labels(folders: &[FolderInfo]) -> Vec<LabelPlacement> {
    let mut placements = Vec::new();
    for (i, folder) in folders.iter().enumerate() {
        if folder.anchor.is_none() {
            info!("Folder has no items in the album, not labeling: {}", folder.name);
            continue;
        }
        let next = folders[i + 1..].iter().find(|f| f.anchor.is_some());
        placements.push(LabelPlacement {
            text: folder.name.clone(),
            anchor: next.and_then(|f| f.anchor.clone()),
            anchor_folder: next.map(|f| f.name.clone()),
        });
    }
    placements
}

/// Capped exponential backoff delays: base, doubling, clamped to cap.
fn backoff_delays(base: Duration, cap: Duration) -> impl Iterator<Item = Duration> {
    let mut delay = base;
    std::iter::from_fn(move || {
        let current = delay.min(cap);
        delay = (delay * 2).min(cap);
        Some(current)
    })
}

/// Issue one insertion call, retrying for as long as the service reports
/// quota exhaustion. Any other embedded error is fatal.
pub(crate) fn insert_label(
    client: &PhotosClient,
    album_id: &str,
    placement: &LabelPlacement,
) -> Result<()> {
    insert_label_with_backoff(client, album_id, placement, BACKOFF_BASE, BACKOFF_CAP)
}

fn insert_label_with_backoff(
    client: &PhotosClient,
    album_id: &str,
    placement: &LabelPlacement,
    base: Duration,
    cap: Duration,
) -> Result<()> {
    let after_id = placement.anchor.as_ref().map(|a| a.id.as_str());
    for delay in backoff_delays(base, cap) {
        let response = client.add_text_enrichment(album_id, after_id, &placement.text)?;
        let Some(error) = response.error else {
            if let Some(item) = response.enrichment_item {
                debug!("Added enrichment {} for '{}'", item.id, placement.text);
            }
            return Ok(());
        };
        if !error.is_quota_exhausted() {
            bail!(
                "Error adding label '{}': {} {} {:?}",
                placement.text,
                error.message,
                error.status,
                error.details
            );
        }
        info!("Hit API quota limit, retrying after {delay:?}");
        thread::sleep(delay);
    }
    unreachable!("backoff delays are unbounded")
}
