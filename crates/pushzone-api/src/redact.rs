//! Diagnostic scrubbing.
//!
//! Every message that might carry a credential or an absolute filesystem
//! path must pass through here before reaching a log sink. Credential-shaped
//! substrings are masked by pattern match and absolute paths under the site
//! root are rewritten to a placeholder token.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder substituted for the site root in logged paths.
pub const ROOT_PLACEHOLDER: &str = "[SITE_ROOT]/";

static API_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)api[_\-]?key\s*[:=]\s*["']?[^"'\s]+["']?"#)
        .expect("static api key pattern")
});

static PASSWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)password\s*[:=]\s*["']?[^"'\s]+["']?"#).expect("static password pattern")
});

/// Mask credential-shaped substrings in `message`.
#[must_use]
pub fn redact_secrets(message: &str) -> String {
    let masked = API_KEY_PATTERN.replace_all(message, "api_key: [REDACTED]");
    PASSWORD_PATTERN
        .replace_all(&masked, "password: [REDACTED]")
        .into_owned()
}

/// Rewrite absolute paths under `site_root` to [`ROOT_PLACEHOLDER`].
#[must_use]
pub fn sanitize_path(message: &str, site_root: &Path) -> String {
    let mut root = site_root.to_string_lossy().into_owned();
    if !root.ends_with('/') {
        root.push('/');
    }
    message.replace(&root, ROOT_PLACEHOLDER)
}

/// Apply both credential masking and path rewriting.
#[must_use]
pub fn redact(message: &str, site_root: &Path) -> String {
    sanitize_path(&redact_secrets(message), site_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn api_keys_are_masked() {
        let message = r#"request failed: api_key="sk_live_abc123" zone=7"#;
        let redacted = redact_secrets(message);
        assert!(!redacted.contains("sk_live_abc123"));
        assert!(redacted.contains("api_key: [REDACTED]"));
        assert!(redacted.contains("zone=7"));
    }

    #[test]
    fn hyphenated_and_case_variants_are_masked() {
        let redacted = redact_secrets("API-KEY: topsecret");
        assert!(!redacted.contains("topsecret"));
    }

    #[test]
    fn passwords_are_masked() {
        let redacted = redact_secrets("password=hunter2 user=admin");
        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("user=admin"));
    }

    #[test]
    fn site_root_is_rewritten() {
        let root = PathBuf::from("/var/www/site");
        let message = "file missing: /var/www/site/wp-content/uploads/a.css";
        assert_eq!(
            sanitize_path(message, &root),
            "file missing: [SITE_ROOT]/wp-content/uploads/a.css"
        );
    }

    #[test]
    fn unrelated_paths_are_untouched() {
        let root = PathBuf::from("/var/www/site");
        let message = "file missing: /etc/passwd";
        assert_eq!(sanitize_path(message, &root), message);
    }
}
