use anyhow::{Context, Result, bail};
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// OS metadata sentinel, always skipped silently.
const METADATA_SENTINEL: &str = ".DS_Store";

/// Folder admission: a directory is excluded when its full path matches any
/// deny pattern and no allow pattern. Allow patterns are an override only; a
/// path matching no deny pattern is always admitted.
#[derive(Debug, Clone)]
pub(crate) struct FolderFilter {
    deny: Vec<Regex>,
    allow: Vec<Regex>,
}

impl FolderFilter {
    pub(crate) fn new(deny: &[String], allow: &[String]) -> Result<FolderFilter> {
        let compile = |patterns: &[String]| -> Result<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| Regex::new(p).with_context(|| format!("Bad folder pattern {p:?}")))
                .collect()
        };
        Ok(FolderFilter {
            deny: compile(deny)?,
            allow: compile(allow)?,
        })
    }

    pub(crate) fn empty() -> FolderFilter {
        FolderFilter {
            deny: vec![],
            allow: vec![],
        }
    }

    pub(crate) fn excluded(&self, path: &str) -> bool {
        for deny in &self.deny {
            if deny.is_match(path) && !self.allow.iter().any(|a| a.is_match(path)) {
                return true;
            }
        }
        false
    }
}

/// Breadth-first walk from `root`, feeding every admitted file to `sink` as
/// `(containing_dir, file_name)`. Sibling order is filesystem enumeration
/// order; callers must not depend on it. A directory that cannot be read is
/// a terminating error, no partial results.
pub(crate) fn walk_files(
    root: &Path,
    filter: &FolderFilter,
    sink: &mut dyn FnMut(&Path, &str),
) -> Result<()> {
    let mut queue = VecDeque::new();
    queue.push_back(root.to_path_buf());
    while let Some(dir) = queue.pop_front() {
        let entries = fs::read_dir(&dir).with_context(|| format!("Error reading dir {dir:?}"))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("Error reading entry in {dir:?}"))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if path.is_dir() {
                if filter.excluded(&path.to_string_lossy()) {
                    debug!("Skipping dir: {path:?}");
                } else {
                    queue.push_back(path);
                }
            } else if name == METADATA_SENTINEL {
                continue;
            } else {
                sink(&dir, &name);
            }
        }
    }
    Ok(())
}

pub(crate) fn lowercase_filenames(root: &Path, filter: &FolderFilter) -> Result<Vec<String>> {
    let mut names = Vec::new();
    walk_files(root, filter, &mut |_, name| names.push(name.to_lowercase()))?;
    Ok(names)
}

pub(crate) fn file_counts(root: &Path, filter: &FolderFilter) -> Result<FileCounts> {
    let mut counts = FileCounts::new();
    walk_files(root, filter, &mut |_, name| counts.add(&name.to_lowercase()))?;
    Ok(counts)
}

/// Immediate subdirectories of `root`, sorted by name so folder order is
/// stable across platforms. A non-directory entry at the top level (other
/// than the metadata sentinel) is an error.
pub(crate) fn top_level_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root).with_context(|| format!("Error reading dir {root:?}"))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Error reading entry in {root:?}"))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name == METADATA_SENTINEL {
            continue;
        }
        let path = entry.path();
        if !path.is_dir() {
            bail!("Found non-dir in top level of given root dir, must be a dir: {name}");
        }
        dirs.push(path);
    }
    dirs.sort();
    Ok(dirs)
}

/// Multiset of lower-cased filenames, counting duplicate basenames across
/// the tree. Each on-disk file is one consumable unit.
#[derive(Debug, Clone, Default)]
pub(crate) struct FileCounts {
    counts: HashMap<String, usize>,
}

impl FileCounts {
    pub(crate) fn new() -> FileCounts {
        FileCounts::default()
    }

    pub(crate) fn add(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    /// Remove one unit for `key`. Returns whether a unit was present.
    pub(crate) fn try_consume(&mut self, key: &str) -> bool {
        let Some(n) = self.counts.get_mut(key) else {
            return false;
        };
        if *n <= 1 {
            self.counts.remove(key);
        } else {
            *n -= 1;
        }
        true
    }

    pub(crate) fn remaining(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub(crate) fn total_units(&self) -> usize {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_walk_with_deny_and_allow() -> anyhow::Result<()> {
        crate::test_util::setup_log();
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        fs::create_dir(root.join("Photos from Michael"))?;
        fs::create_dir(root.join("Photos from Dave"))?;
        fs::create_dir(root.join("2021 Summer"))?;
        touch(&root.join("Photos from Michael").join("m1.jpg"));
        touch(&root.join("Photos from Dave").join("d1.jpg"));
        touch(&root.join("2021 Summer").join("s1.JPG"));
        touch(&root.join("2021 Summer").join(".DS_Store"));

        let filter = FolderFilter::new(
            &["Photos from .*".to_string()],
            &["Photos from Michael".to_string()],
        )?;
        let mut names = lowercase_filenames(root, &filter)?;
        names.sort();
        assert_eq!(names, vec!["m1.jpg", "s1.jpg"]);
        Ok(())
    }

    #[test]
    fn test_no_deny_match_always_included() -> anyhow::Result<()> {
        let filter = FolderFilter::new(&["^Wendy$".to_string()], &["Other".to_string()])?;
        // allow patterns are an override, not an independent inclusion rule
        assert!(!filter.excluded("2021 Summer"));
        assert!(filter.excluded("Wendy"));
        Ok(())
    }

    #[test]
    fn test_counts_aggregate_duplicates() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        fs::create_dir(root.join("a"))?;
        fs::create_dir(root.join("b"))?;
        touch(&root.join("a").join("IMG_0001.JPG"));
        touch(&root.join("b").join("img_0001.jpg"));
        touch(&root.join("b").join("img_0002.jpg"));

        let mut counts = file_counts(root, &FolderFilter::empty())?;
        assert_eq!(counts.total_units(), 3);
        assert!(counts.contains("img_0001.jpg"));

        assert!(counts.try_consume("img_0001.jpg"));
        assert!(counts.try_consume("img_0001.jpg"));
        assert!(!counts.try_consume("img_0001.jpg"));
        assert_eq!(counts.total_units(), 1);
        Ok(())
    }

    #[test]
    fn test_walk_missing_root_is_fatal() {
        let filter = FolderFilter::empty();
        let r = lowercase_filenames(Path::new("/no/such/dir/photosync"), &filter);
        assert!(r.is_err());
    }

    #[test]
    fn test_top_level_dirs_sorted_and_strict() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        fs::create_dir(root.join("b"))?;
        fs::create_dir(root.join("a"))?;
        touch(&root.join(".DS_Store"));
        let dirs = top_level_dirs(root)?;
        let names: Vec<_> = dirs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);

        touch(&root.join("stray.jpg"));
        assert!(top_level_dirs(root).is_err());
        Ok(())
    }
}
