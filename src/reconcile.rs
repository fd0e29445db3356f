use crate::fs::FileCounts;
use crate::types::MediaItem;

/// The two fixed substitutions of the fuzzy filename rule, in check order.
/// Nothing else is normalized; `a (1).jpg` and `a.jpg` stay distinct.
const EXTENSION_SWAPS: [(&str, &str); 2] = [(".heic", ".jpg"), (".jpg", ".heic")];

/// All lookup keys for a lower-cased filename, in rule order: the name
/// itself, then each extension substitution that changes it.
pub(crate) fn filename_variants(lowercase: &str) -> Vec<String> {
    let mut variants = vec![lowercase.to_string()];
    for (from, to) in EXTENSION_SWAPS {
        let swapped = lowercase.replace(from, to);
        if swapped != lowercase {
            variants.push(swapped);
        }
    }
    variants
}

/// Classification of a remote collection against a local filename multiset.
/// Naming is directional; commands rephrase these sets for their own side.
#[derive(Debug, Default)]
pub(crate) struct Reconciliation {
    /// Remote items whose filename has a local counterpart.
    pub(crate) matched: Vec<MediaItem>,
    /// Remote items with no local counterpart, one entry per item.
    pub(crate) extra_remote: Vec<MediaItem>,
    /// Local files with no remote counterpart, one entry per on-disk file,
    /// sorted for deterministic output.
    pub(crate) missing_local: Vec<String>,
}

/// Classify every entry on both sides.
///
/// Each on-disk file is one consumable unit: a remote item is matched only
/// while a unit for one of its fuzzy variants remains, so a remote burst
/// larger than the local count flags the overflow copies as extra, and two
/// local copies with a single remote match leave exactly one flagged
/// missing. Leftover units on either side are reported per item, not per
/// filename.
pub(crate) fn reconcile(remote: &[MediaItem], local: &FileCounts) -> Reconciliation {
    let mut result = Reconciliation::default();
    let mut remaining = local.clone();
    for item in remote {
        let lowercase = item.filename.to_lowercase();
        let variants = filename_variants(&lowercase);
        if variants.iter().any(|v| remaining.try_consume(v)) {
            result.matched.push(item.clone());
        } else {
            result.extra_remote.push(item.clone());
        }
    }
    for (name, count) in remaining.remaining() {
        for _ in 0..count {
            result.missing_local.push(name.to_string());
        }
    }
    result.missing_local.sort();
    result
}
