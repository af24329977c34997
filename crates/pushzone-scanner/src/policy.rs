//! Directory eligibility and exclusion matching.
//!
//! Exclusion is a substring match against the absolute directory path, not a
//! path-segment match: an excluded fragment `wp-content` also prunes a root
//! named `wp-content-old`. Callers depend on this looser behaviour, so it is
//! reproduced literally.

use std::path::{Path, PathBuf};

use pushzone_config::DirectoryPolicy;

/// Evaluates [`DirectoryPolicy`] rules against concrete paths during a walk.
#[derive(Debug, Clone)]
pub struct PolicyMatcher {
    policy: DirectoryPolicy,
    site_root: PathBuf,
}

impl PolicyMatcher {
    /// Construct a matcher for one scan rooted at `site_root`.
    #[must_use]
    pub fn new(policy: DirectoryPolicy, site_root: impl Into<PathBuf>) -> Self {
        Self {
            policy,
            site_root: site_root.into(),
        }
    }

    /// Whether `dir` falls under any excluded fragment.
    #[must_use]
    pub fn is_excluded(&self, dir: &Path) -> bool {
        let haystack = dir.to_string_lossy();
        self.policy
            .excluded_dirs
            .iter()
            .filter(|fragment| !fragment.trim().is_empty())
            .any(|fragment| haystack.contains(fragment.as_str()))
    }

    /// Whether files directly inside `dir` are eligible for pushing.
    ///
    /// A directory is eligible iff it is under the default upload directory
    /// (when enabled) or under an enabled custom directory. With no custom
    /// directories configured and the default flag on, every directory is
    /// eligible (back-compatible default).
    #[must_use]
    pub fn is_eligible(&self, dir: &Path) -> bool {
        if self.policy.custom_directories.is_empty() && self.policy.include_default_upload_dir {
            return true;
        }

        let relative = self.relative_dir(dir);
        if self.policy.include_default_upload_dir
            && relative.starts_with(&trailing_slashed(&self.policy.default_upload_dir))
        {
            return true;
        }

        self.policy
            .custom_directories
            .iter()
            .filter(|custom| custom.enabled)
            .any(|custom| relative.starts_with(&trailing_slashed(&custom.path)))
    }

    /// Whether the walk should descend into `dir` at all.
    ///
    /// A directory that is not itself eligible may still be an ancestor of
    /// an eligible root (e.g. `wp-content/` above `wp-content/foo/`), so the
    /// walk keeps descending through ancestors instead of pruning them.
    #[must_use]
    pub fn should_descend(&self, dir: &Path) -> bool {
        if self.is_eligible(dir) {
            return true;
        }
        let relative = self.relative_dir(dir);
        self.scan_roots()
            .any(|root| root.starts_with(relative.as_str()))
    }

    /// Whether a file extension is eligible under this policy.
    #[must_use]
    pub fn extension_included(&self, extension: &str) -> bool {
        self.policy.extension_included(extension)
    }

    fn scan_roots(&self) -> impl Iterator<Item = String> + '_ {
        let upload = self
            .policy
            .include_default_upload_dir
            .then(|| trailing_slashed(&self.policy.default_upload_dir));
        let custom = self
            .policy
            .custom_directories
            .iter()
            .filter(|dir| dir.enabled)
            .map(|dir| trailing_slashed(&dir.path));
        upload.into_iter().chain(custom)
    }

    /// Site-relative directory path with a trailing slash; the root is `""`.
    fn relative_dir(&self, dir: &Path) -> String {
        let relative = dir.strip_prefix(&self.site_root).unwrap_or(dir);
        let text = relative.to_string_lossy();
        if text.is_empty() {
            String::new()
        } else {
            trailing_slashed(&text)
        }
    }
}

fn trailing_slashed(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("{trimmed}/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushzone_config::{CustomDirectory, Settings};

    fn matcher(mutate: impl FnOnce(&mut Settings)) -> PolicyMatcher {
        let mut settings = Settings::default();
        mutate(&mut settings);
        PolicyMatcher::new(settings.directory_policy(), "/site")
    }

    #[test]
    fn default_policy_makes_everything_eligible() {
        let matcher = matcher(|_| {});
        assert!(matcher.is_eligible(Path::new("/site")));
        assert!(matcher.is_eligible(Path::new("/site/wp-content/themes")));
    }

    #[test]
    fn upload_dir_only_when_custom_dirs_configured() {
        let matcher = matcher(|settings| {
            settings.custom_directories = vec![CustomDirectory::new("wp-content/foo", false)];
        });
        assert!(matcher.is_eligible(Path::new("/site/wp-content/uploads")));
        assert!(matcher.is_eligible(Path::new("/site/wp-content/uploads/2024")));
        assert!(!matcher.is_eligible(Path::new("/site/wp-content/themes")));
        assert!(!matcher.is_eligible(Path::new("/site")));
    }

    #[test]
    fn enabled_custom_dir_is_eligible_and_default_can_be_off() {
        let matcher = matcher(|settings| {
            settings.include_default_upload_dir = false;
            settings.custom_directories = vec![CustomDirectory::new("wp-content/foo", true)];
        });
        assert!(matcher.is_eligible(Path::new("/site/wp-content/foo")));
        assert!(matcher.is_eligible(Path::new("/site/wp-content/foo/css")));
        assert!(!matcher.is_eligible(Path::new("/site/wp-content/uploads")));
        assert!(!matcher.is_eligible(Path::new("/site/wp-content/foobar")));
    }

    #[test]
    fn disabled_custom_dir_is_not_eligible() {
        let matcher = matcher(|settings| {
            settings.include_default_upload_dir = false;
            settings.custom_directories = vec![CustomDirectory::new("wp-content/foo", false)];
        });
        assert!(!matcher.is_eligible(Path::new("/site/wp-content/foo")));
    }

    #[test]
    fn walk_descends_through_ancestors_of_eligible_roots() {
        let matcher = matcher(|settings| {
            settings.include_default_upload_dir = false;
            settings.custom_directories = vec![CustomDirectory::new("wp-content/foo", true)];
        });
        assert!(matcher.should_descend(Path::new("/site")));
        assert!(matcher.should_descend(Path::new("/site/wp-content")));
        assert!(matcher.should_descend(Path::new("/site/wp-content/foo")));
        assert!(!matcher.should_descend(Path::new("/site/wp-includes")));
    }

    #[test]
    fn exclusion_is_a_substring_match() {
        let matcher = matcher(|settings| {
            settings.excluded_dirs = vec!["wp-content".to_string()];
        });
        assert!(matcher.is_excluded(Path::new("/site/wp-content")));
        assert!(matcher.is_excluded(Path::new("/site/wp-content-old")));
        assert!(!matcher.is_excluded(Path::new("/site/themes")));
    }

    #[test]
    fn empty_exclusion_fragments_are_ignored() {
        let matcher = matcher(|settings| {
            settings.excluded_dirs = vec![String::new(), "  ".to_string()];
        });
        assert!(!matcher.is_excluded(Path::new("/site/anything")));
    }
}
