use serde::{Deserialize, Serialize};

/// One media item as the remote library reports it. Fields the listing can
/// omit default so a minimal page still decodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct MediaItem {
    pub(crate) id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    pub(crate) product_url: String,
    pub(crate) base_url: String,
    pub(crate) mime_type: String,
    pub(crate) media_metadata: MediaMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) contributor_info: Option<ContributorInfo>,
    pub(crate) filename: String,
}

impl MediaItem {
    #[cfg(test)]
    pub(crate) fn new_for_test(id: &str, filename: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            filename: filename.to_string(),
            ..MediaItem::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct MediaMetadata {
    pub(crate) creation_time: String,
    pub(crate) width: String,
    pub(crate) height: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) photo: Option<PhotoMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) video: Option<VideoMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PhotoMetadata {
    pub(crate) camera_make: String,
    pub(crate) camera_model: String,
    pub(crate) focal_length: f64,
    pub(crate) aperture_f_number: f64,
    pub(crate) iso_equivalent: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct VideoMetadata {
    pub(crate) fps: f64,
    pub(crate) status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ContributorInfo {
    pub(crate) profile_picture_base_url: String,
    pub(crate) display_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Album {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) product_url: String,
    #[serde(rename = "isWriteable")]
    pub(crate) is_writeable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) share_info: Option<ShareInfo>,
    pub(crate) media_items_count: String,
    pub(crate) cover_photo_base_url: String,
    pub(crate) cover_photo_media_item_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ShareInfo {
    pub(crate) shareable_url: String,
    pub(crate) share_token: String,
    pub(crate) is_joined: bool,
    pub(crate) is_owned: bool,
    pub(crate) is_joinable: bool,
}

/// One page of a media item listing or album search. The API reports errors
/// inside a 200 body, so the page carries them alongside the items.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct MediaItemsPage {
    pub(crate) media_items: Vec<MediaItem>,
    pub(crate) next_page_token: Option<String>,
    pub(crate) error: Option<ErrorStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AlbumsPage {
    pub(crate) albums: Vec<Album>,
    pub(crate) next_page_token: Option<String>,
    pub(crate) error: Option<ErrorStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorStatus {
    pub(crate) code: i64,
    pub(crate) message: String,
    pub(crate) status: String,
    /// Structured error details, passed through for diagnostics only.
    pub(crate) details: Vec<serde_json::Value>,
}

impl ErrorStatus {
    /// Quota errors are the only retryable status.
    pub(crate) fn is_quota_exhausted(&self) -> bool {
        self.status == "RESOURCE_EXHAUSTED"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct EnrichmentItem {
    pub(crate) id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AddEnrichmentResponse {
    pub(crate) enrichment_item: Option<EnrichmentItem>,
    pub(crate) error: Option<ErrorStatus>,
}
