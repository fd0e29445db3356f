use crate::types::MediaItem;
use std::collections::HashMap;

/// Case-insensitive filename index over a fetched item collection. A single
/// filename can map to several items (burst duplicates); bucket order is the
/// original fetch order. Rebuilt from scratch every run, never mutated.
#[derive(Debug, Default)]
pub(crate) struct FilenameIndex {
    buckets: HashMap<String, Vec<MediaItem>>,
}

impl FilenameIndex {
    pub(crate) fn build(items: &[MediaItem]) -> FilenameIndex {
        let mut buckets: HashMap<String, Vec<MediaItem>> = HashMap::new();
        for item in items {
            buckets
                .entry(item.filename.to_lowercase())
                .or_default()
                .push(item.clone());
        }
        FilenameIndex { buckets }
    }

    /// Exact lower-cased lookup.
    pub(crate) fn get(&self, lowercase_filename: &str) -> Option<&[MediaItem]> {
        self.buckets.get(lowercase_filename).map(|v| v.as_slice())
    }

    /// Lookup under the fuzzy equality rule: exact first, then the two fixed
    /// extension substitutions. Returns the matched key with the bucket.
    pub(crate) fn get_fuzzy(&self, lowercase_filename: &str) -> Option<(String, &[MediaItem])> {
        for key in crate::reconcile::filename_variants(lowercase_filename) {
            if let Some(items) = self.buckets.get(&key) {
                return Some((key, items.as_slice()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_keep_fetch_order() {
        let items = vec![
            MediaItem::new_for_test("1", "IMG_0001.JPG"),
            MediaItem::new_for_test("2", "other.png"),
            MediaItem::new_for_test("3", "img_0001.jpg"),
        ];
        let index = FilenameIndex::build(&items);
        let bucket = index.get("img_0001.jpg").unwrap();
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[0].id, "1");
        assert_eq!(bucket[1].id, "3");
        assert!(index.get("IMG_0001.JPG").is_none(), "keys are lower-cased");
    }

    #[test]
    fn test_fuzzy_lookup_prefers_exact() {
        let items = vec![
            MediaItem::new_for_test("1", "a.jpg"),
            MediaItem::new_for_test("2", "a.heic"),
        ];
        let index = FilenameIndex::build(&items);
        let (key, bucket) = index.get_fuzzy("a.jpg").unwrap();
        assert_eq!(key, "a.jpg");
        assert_eq!(bucket[0].id, "1");
    }

    #[test]
    fn test_fuzzy_lookup_swaps_extension() {
        let items = vec![MediaItem::new_for_test("1", "IMG_0002.jpg")];
        let index = FilenameIndex::build(&items);
        let (key, bucket) = index.get_fuzzy("img_0002.heic").unwrap();
        assert_eq!(key, "img_0002.jpg");
        assert_eq!(bucket[0].id, "1");
        assert!(index.get_fuzzy("img_0003.heic").is_none());
    }
}
