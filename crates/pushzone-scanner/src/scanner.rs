//! Cached directory walk and chunk slicing.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pushzone_config::SettingsStore;
use pushzone_store::CacheStore;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::manifest::{FileManifest, FileRecord};
use crate::policy::PolicyMatcher;

/// Cache key holding the manifest length.
pub const FILES_COUNT_KEY: &str = "files_count";

/// Cache key holding the serialized manifest.
pub const FILES_LIST_KEY: &str = "files_list";

/// How long a cached manifest stays valid.
pub const MANIFEST_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Walks the site tree and produces the authoritative ordered file list.
///
/// The manifest and its count are cached as a unit so the chunk invocations
/// of one run share a single full-tree walk. The cache must be invalidated
/// whenever the directory policy changes.
#[derive(Clone)]
pub struct Scanner {
    site_root: PathBuf,
    settings: SettingsStore,
    cache: Arc<dyn CacheStore>,
}

impl Scanner {
    /// Construct a scanner rooted at `site_root`.
    #[must_use]
    pub fn new(
        site_root: impl Into<PathBuf>,
        settings: SettingsStore,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            site_root: site_root.into(),
            settings,
            cache,
        }
    }

    /// Number of files the current policy makes eligible for pushing.
    #[must_use]
    pub fn count_files(&self) -> usize {
        if let Some(count) = self
            .cache
            .get(FILES_COUNT_KEY)
            .and_then(|raw| raw.parse().ok())
        {
            return count;
        }
        self.manifest().len()
    }

    /// Slice `[offset, offset + limit)` of the cached manifest, in scan
    /// order. Returns an empty slice once `offset` passes the end.
    #[must_use]
    pub fn list_chunk(&self, offset: usize, limit: usize) -> FileManifest {
        let manifest = self.manifest();
        if offset >= manifest.len() {
            return Vec::new();
        }
        let end = offset.saturating_add(limit).min(manifest.len());
        manifest[offset..end].to_vec()
    }

    /// Drop the cached manifest and count.
    ///
    /// Must be called whenever the directory policy changes, and before a
    /// new full run when fresh results are required.
    pub fn clear_cache(&self) {
        self.cache.delete(FILES_COUNT_KEY);
        self.cache.delete(FILES_LIST_KEY);
    }

    fn manifest(&self) -> FileManifest {
        if let Some(raw) = self.cache.get(FILES_LIST_KEY) {
            match serde_json::from_str(&raw) {
                Ok(manifest) => return manifest,
                Err(err) => {
                    warn!(error = %err, "discarding unparseable cached manifest");
                }
            }
        }

        let policy = self.settings.load().directory_policy();
        let manifest = self.walk(PolicyMatcher::new(policy, self.site_root.clone()));
        debug!(files = manifest.len(), "scanned site tree");

        match serde_json::to_string(&manifest) {
            Ok(raw) => self.cache.set(FILES_LIST_KEY, &raw, MANIFEST_CACHE_TTL),
            Err(err) => warn!(error = %err, "failed to serialize manifest for caching"),
        }
        self.cache
            .set(FILES_COUNT_KEY, &manifest.len().to_string(), MANIFEST_CACHE_TTL);

        manifest
    }

    /// Depth-first walk: excluded directories prune their whole subtree,
    /// ineligible directories are still descended when they sit above an
    /// eligible root, and files are accepted iff their own directory is
    /// eligible and their lowercase extension is included.
    fn walk(&self, matcher: PolicyMatcher) -> FileManifest {
        let mut manifest = Vec::new();
        let walker = WalkDir::new(&self.site_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if entry.file_type().is_dir() {
                    !matcher.is_excluded(entry.path()) && matcher.should_descend(entry.path())
                } else {
                    true
                }
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry during scan");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let eligible = path
                .parent()
                .is_some_and(|parent| matcher.is_eligible(parent));
            if !eligible {
                continue;
            }
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !matcher.extension_included(&extension) {
                continue;
            }
            let relative_path = path
                .strip_prefix(&self.site_root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            manifest.push(FileRecord {
                absolute_path: path.to_path_buf(),
                relative_path,
            });
        }

        manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pushzone_config::{CustomDirectory, Settings};
    use pushzone_store::{MemoryCache, MemoryKv, SystemClock};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_tree(root: &Path, files: &[&str]) -> Result<()> {
        for file in files {
            let path = root.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, "content")?;
        }
        Ok(())
    }

    fn scanner_for(root: &TempDir, mutate: impl FnOnce(&mut Settings)) -> Scanner {
        let settings = SettingsStore::new(Arc::new(MemoryKv::new()));
        settings.update(mutate);
        let cache = Arc::new(MemoryCache::new(Arc::new(SystemClock)));
        Scanner::new(root.path(), settings, cache)
    }

    #[test]
    fn scan_is_idempotent_across_cache_clears() -> Result<()> {
        let root = TempDir::new()?;
        write_tree(
            root.path(),
            &[
                "wp-content/uploads/a.css",
                "wp-content/uploads/2024/b.png",
                "wp-content/themes/site/style.css",
            ],
        )?;
        let scanner = scanner_for(&root, |_| {});

        let first = scanner.list_chunk(0, 100);
        scanner.clear_cache();
        let second = scanner.list_chunk(0, 100);

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        Ok(())
    }

    #[test]
    fn chunks_concatenate_to_the_full_manifest() -> Result<()> {
        let root = TempDir::new()?;
        let files: Vec<String> = (0..7)
            .map(|index| format!("wp-content/uploads/file-{index}.css"))
            .collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        write_tree(root.path(), &refs)?;
        let scanner = scanner_for(&root, |_| {});

        let full = scanner.list_chunk(0, 100);
        assert_eq!(full.len(), 7);

        let chunk_size = 3;
        let mut concatenated = Vec::new();
        let mut offset = 0;
        let mut slices = 0;
        loop {
            let chunk = scanner.list_chunk(offset, chunk_size);
            if chunk.is_empty() {
                break;
            }
            slices += 1;
            concatenated.extend(chunk);
            offset += chunk_size;
        }

        assert_eq!(concatenated, full);
        assert_eq!(slices, full.len().div_ceil(chunk_size));
        Ok(())
    }

    #[test]
    fn count_matches_manifest_and_is_cached() -> Result<()> {
        let root = TempDir::new()?;
        write_tree(root.path(), &["a.css", "b.js", "notes.txt"])?;
        let scanner = scanner_for(&root, |_| {});

        assert_eq!(scanner.count_files(), 2);

        // A new file is invisible until the cache is cleared.
        write_tree(root.path(), &["c.css"])?;
        assert_eq!(scanner.count_files(), 2);

        scanner.clear_cache();
        assert_eq!(scanner.count_files(), 3);
        Ok(())
    }

    #[test]
    fn excluded_fragment_prunes_subtrees_and_similar_names() -> Result<()> {
        let root = TempDir::new()?;
        write_tree(
            root.path(),
            &[
                "wp-admin/admin.css",
                "wp-includes/core.js",
                "wp-content/uploads/a.css",
            ],
        )?;
        let scanner = scanner_for(&root, |_| {});

        let manifest = scanner.list_chunk(0, 100);
        let relative: Vec<&str> = manifest
            .iter()
            .map(|record| record.relative_path.as_str())
            .collect();
        assert_eq!(relative, vec!["wp-content/uploads/a.css"]);
        Ok(())
    }

    #[test]
    fn custom_directory_scope_limits_the_manifest() -> Result<()> {
        let root = TempDir::new()?;
        write_tree(
            root.path(),
            &[
                "wp-content/foo/widget.js",
                "wp-content/foo/nested/deep.css",
                "wp-content/uploads/a.css",
                "top.css",
            ],
        )?;
        let scanner = scanner_for(&root, |settings| {
            settings.include_default_upload_dir = false;
            settings.custom_directories = vec![CustomDirectory::new("wp-content/foo", true)];
        });

        let mut relative: Vec<String> = scanner
            .list_chunk(0, 100)
            .into_iter()
            .map(|record| record.relative_path)
            .collect();
        relative.sort();
        assert_eq!(
            relative,
            vec!["wp-content/foo/nested/deep.css", "wp-content/foo/widget.js"]
        );
        Ok(())
    }

    #[test]
    fn extension_filter_is_case_insensitive() -> Result<()> {
        let root = TempDir::new()?;
        write_tree(root.path(), &["logo.PNG", "script.php"])?;
        let scanner = scanner_for(&root, |_| {});

        let manifest = scanner.list_chunk(0, 100);
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest[0].relative_path, "logo.PNG");
        Ok(())
    }

    #[test]
    fn offset_past_the_end_returns_empty() -> Result<()> {
        let root = TempDir::new()?;
        write_tree(root.path(), &["a.css"])?;
        let scanner = scanner_for(&root, |_| {});

        assert!(scanner.list_chunk(5, 20).is_empty());
        Ok(())
    }
}
