use crate::client::PhotosClient;
use crate::types::{Album, MediaItem};
use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, info};

/// Fetch the whole library, page by page, concatenated in server order.
/// Item ids repeated across pages are skipped; an eventually consistent
/// listing can return the same item twice while the library mutates under
/// the pagination. Any page failure aborts the fetch with nothing returned.
pub(crate) fn all_media_items(client: &PhotosClient) -> Result<Vec<MediaItem>> {
    let mut all = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = client.list_media_items(page_token.as_deref())?;
        info!("Got {} media items", page.media_items.len());
        for item in page.media_items {
            if seen.insert(item.id.clone()) {
                all.push(item);
            } else {
                debug!("Skipping duplicate item across pages: {}", item.id);
            }
        }
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }
    Ok(all)
}

/// Fetch every item of one album, in album order. This order is treated as
/// the authoritative album order downstream (label anchor computation).
pub(crate) fn album_media_items(client: &PhotosClient, album_id: &str) -> Result<Vec<MediaItem>> {
    let mut all = Vec::new();
    let mut page_token = String::new();
    loop {
        let page = client.search_album_media_items(album_id, &page_token)?;
        all.extend(page.media_items);
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = token,
            _ => break,
        }
    }
    Ok(all)
}

pub(crate) fn all_albums(client: &PhotosClient) -> Result<Vec<Album>> {
    let mut all = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = client.list_albums(page_token.as_deref())?;
        all.extend(page.albums);
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }
    Ok(all)
}

/// First album whose title contains `title`, or `Ok(None)`.
pub(crate) fn find_album_by_title(client: &PhotosClient, title: &str) -> Result<Option<Album>> {
    let albums = all_albums(client)?;
    Ok(albums.into_iter().find(|a| a.title.contains(title)))
}
