use crate::types::{AddEnrichmentResponse, Album, AlbumsPage, MediaItemsPage};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

pub(crate) const DEFAULT_BASE_URL: &str = "https://photoslibrary.googleapis.com";

/// Fixed page sizes of the listing calls.
const MEDIA_PAGE_SIZE: u32 = 100;
const ALBUM_PAGE_SIZE: u32 = 50;

/// Authenticated, blocking client for the photo library REST surface. The
/// base URL is parameterized so tests can point it at a mock server.
pub(crate) struct PhotosClient {
    http: reqwest::blocking::Client,
    base_url: String,
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    page_size: u32,
    page_token: &'a str,
    album_id: &'a str,
}

#[derive(Serialize)]
struct CreateAlbumRequest<'a> {
    album: AlbumTitle<'a>,
}

#[derive(Serialize)]
struct AlbumTitle<'a> {
    title: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddEnrichmentRequest<'a> {
    album_position: AlbumPosition<'a>,
    new_enrichment_item: NewEnrichmentItem<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlbumPosition<'a> {
    position: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    relative_media_item_id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewEnrichmentItem<'a> {
    text_enrichment: TextEnrichment<'a>,
}

#[derive(Serialize)]
struct TextEnrichment<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchAddRequest<'a> {
    media_item_ids: &'a [String],
}

impl PhotosClient {
    pub(crate) fn new(base_url: &str, access_token: &str) -> PhotosClient {
        PhotosClient {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .with_context(|| format!("Request failed: GET {path}"))?;
        response
            .json::<T>()
            .with_context(|| format!("Unable to decode response body: GET {path}"))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .with_context(|| format!("Request failed: POST {path}"))?;
        response
            .json::<T>()
            .with_context(|| format!("Unable to decode response body: POST {path}"))
    }

    /// One page of the whole-library listing.
    pub(crate) fn list_media_items(&self, page_token: Option<&str>) -> Result<MediaItemsPage> {
        let mut query = vec![("pageSize", MEDIA_PAGE_SIZE.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        let page: MediaItemsPage = self.get_json("/v1/mediaItems", &query)?;
        if let Some(e) = &page.error {
            bail!("Error fetching media items ({}): {} {}", e.code, e.message, e.status);
        }
        Ok(page)
    }

    /// One page of an album-scoped search. Returns items in album order.
    pub(crate) fn search_album_media_items(
        &self,
        album_id: &str,
        page_token: &str,
    ) -> Result<MediaItemsPage> {
        let request = SearchRequest {
            page_size: MEDIA_PAGE_SIZE,
            page_token,
            album_id,
        };
        let page: MediaItemsPage = self.post_json("/v1/mediaItems:search", &request)?;
        if let Some(e) = &page.error {
            bail!("Error searching media items: {} {}", e.message, e.status);
        }
        Ok(page)
    }

    pub(crate) fn list_albums(&self, page_token: Option<&str>) -> Result<AlbumsPage> {
        let mut query = vec![("pageSize", ALBUM_PAGE_SIZE.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        let page: AlbumsPage = self.get_json("/v1/albums", &query)?;
        if let Some(e) = &page.error {
            bail!("Error fetching albums: {} {}", e.message, e.status);
        }
        Ok(page)
    }

    pub(crate) fn create_album(&self, title: &str) -> Result<Album> {
        let request = CreateAlbumRequest {
            album: AlbumTitle { title },
        };
        self.post_json("/v1/albums", &request)
    }

    /// Insert a text label into an album, either at the front or directly
    /// after an existing item. Embedded errors are returned to the caller,
    /// which decides whether the status is retryable.
    pub(crate) fn add_text_enrichment(
        &self,
        album_id: &str,
        after_media_item_id: Option<&str>,
        text: &str,
    ) -> Result<AddEnrichmentResponse> {
        let position = match after_media_item_id {
            Some(_) => "AFTER_MEDIA_ITEM",
            None => "FIRST_IN_ALBUM",
        };
        let request = AddEnrichmentRequest {
            album_position: AlbumPosition {
                position,
                relative_media_item_id: after_media_item_id,
            },
            new_enrichment_item: NewEnrichmentItem {
                text_enrichment: TextEnrichment { text },
            },
        };
        self.post_json(&format!("/v1/albums/{album_id}:addEnrichment"), &request)
    }

    pub(crate) fn batch_add_media_items(&self, album_id: &str, ids: &[String]) -> Result<()> {
        let request = BatchAddRequest { media_item_ids: ids };
        let response: serde_json::Value =
            self.post_json(&format!("/v1/albums/{album_id}:batchAddMediaItems"), &request)?;
        if let Some(e) = response.get("error") {
            bail!("Error adding media items to album: {e}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    #[test]
    fn test_list_media_items_sends_bearer_and_page_size() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/mediaItems")
                .query_param("pageSize", "100")
                .header("Authorization", "Bearer tok123");
            then.status(200).json_body(json!({
                "mediaItems": [{"id": "a", "productUrl": "u", "filename": "a.jpg"}],
                "nextPageToken": "p2"
            }));
        });

        let client = PhotosClient::new(&server.url(""), "tok123");
        let page = client.list_media_items(None).unwrap();
        mock.assert();
        assert_eq!(page.media_items.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("p2"));
    }

    #[test]
    fn test_embedded_error_is_fatal_for_listing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/mediaItems");
            then.status(200).json_body(json!({
                "error": {"code": 403, "message": "denied", "status": "PERMISSION_DENIED"}
            }));
        });

        let client = PhotosClient::new(&server.url(""), "tok");
        let e = client.list_media_items(None).unwrap_err();
        assert!(e.to_string().contains("PERMISSION_DENIED"));
    }

    #[test]
    fn test_create_album_body_shape() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/albums")
                .json_body(json!({"album": {"title": "Trip 2021"}}));
            then.status(200)
                .json_body(json!({"id": "alb1", "title": "Trip 2021"}));
        });

        let client = PhotosClient::new(&server.url(""), "tok");
        let album = client.create_album("Trip 2021").unwrap();
        mock.assert();
        assert_eq!(album.id, "alb1");
    }

    #[test]
    fn test_add_enrichment_after_item() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/albums/alb1:addEnrichment")
                .json_body(json!({
                    "albumPosition": {
                        "position": "AFTER_MEDIA_ITEM",
                        "relativeMediaItemId": "m42"
                    },
                    "newEnrichmentItem": {"textEnrichment": {"text": "Summer"}}
                }));
            then.status(200)
                .json_body(json!({"enrichmentItem": {"id": "e1"}}));
        });

        let client = PhotosClient::new(&server.url(""), "tok");
        let r = client.add_text_enrichment("alb1", Some("m42"), "Summer").unwrap();
        mock.assert();
        assert_eq!(r.enrichment_item.unwrap().id, "e1");
        assert!(r.error.is_none());
    }

    #[test]
    fn test_add_enrichment_front_of_album() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/albums/alb1:addEnrichment")
                .json_body(json!({
                    "albumPosition": {"position": "FIRST_IN_ALBUM"},
                    "newEnrichmentItem": {"textEnrichment": {"text": "2021"}}
                }));
            then.status(200)
                .json_body(json!({"enrichmentItem": {"id": "e2"}}));
        });

        let client = PhotosClient::new(&server.url(""), "tok");
        let r = client.add_text_enrichment("alb1", None, "2021").unwrap();
        mock.assert();
        assert!(r.error.is_none());
    }

    #[test]
    fn test_batch_add_media_items() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/albums/alb1:batchAddMediaItems")
                .json_body(json!({"mediaItemIds": ["a", "b"]}));
            then.status(200).json_body(json!({}));
        });

        let client = PhotosClient::new(&server.url(""), "tok");
        client
            .batch_add_media_items("alb1", &["a".to_string(), "b".to_string()])
            .unwrap();
        mock.assert();
    }
}
