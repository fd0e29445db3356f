use crate::config::Config;
use crate::fs::FolderFilter;
use crate::{auth, fetch, label};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Insert one text label per top-level local folder into an album, marking
/// folder boundaries in album order. Without `--create` the computed plan is
/// only printed.
pub(crate) fn main(cfg: &Config, root_dir: &str, album_title: &str, create: bool) -> Result<()> {
    println!("Root picture dir: '{root_dir}'");
    println!("Album title: '{album_title}'");

    let filter = FolderFilter::new(&cfg.folder_deny_patterns, &cfg.folder_allow_patterns)?;
    let client = auth::acquire_client(cfg)?;
    let album = fetch::find_album_by_title(&client, album_title)?
        .with_context(|| format!("Album not found with title '{album_title}'"))?;
    info!("Getting album media items");
    let album_items = fetch::album_media_items(&client, &album.id)?;

    let folders = label::folder_infos(Path::new(root_dir), &filter, &album_items)?;
    for folder in &folders {
        info!(
            "Folder '{}': {} files found in the album",
            folder.name, folder.num_media_items
        );
    }
    // the full plan is computed before any insertion: each label's position
    // depends on the anchor of the next labeled folder
    let plan = label::plan_labels(&folders);
    for placement in &plan {
        match (&placement.anchor, &placement.anchor_folder) {
            (Some(anchor), Some(next_folder)) => println!(
                "Adding '{}' after '{}' (last pic of folder '{next_folder}')",
                placement.text, anchor.filename
            ),
            _ => println!("Adding '{}' at the beginning of the album", placement.text),
        }
        if create {
            label::insert_label(&client, &album.id, placement)?;
        }
    }
    if !create {
        info!("Dry run, no labels were inserted (pass --create)");
    }
    Ok(())
}
