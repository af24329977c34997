//! Credential resolution precedence.
//!
//! Each credential resolves independently: explicit deploy-time override
//! first, then the process environment, then the stored setting. Empty
//! strings at any level are treated as absent.

use crate::model::Settings;

/// Environment variable consulted for the API key.
pub const ENV_API_KEY: &str = "KEYCDN_API_KEY";

/// Environment variable consulted for the push zone identifier.
pub const ENV_PUSH_ZONE_ID: &str = "KEYCDN_PUSH_ZONE_ID";

/// Deploy-time credential overrides, highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    /// Overrides the API key when set and non-empty.
    pub api_key: Option<String>,
    /// Overrides the push zone identifier when set and non-empty.
    pub push_zone_id: Option<String>,
}

/// Fully resolved, non-empty credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Resolved API key.
    pub api_key: String,
    /// Resolved push zone identifier.
    pub push_zone_id: String,
}

impl Credentials {
    /// Resolve both credentials against the process environment.
    ///
    /// Returns `None` unless both resolve to non-empty values.
    #[must_use]
    pub fn resolve(overrides: &CredentialOverrides, settings: &Settings) -> Option<Self> {
        Self::resolve_with(overrides, settings, |name| std::env::var(name).ok())
    }

    /// Resolve both credentials with an injected environment lookup.
    #[must_use]
    pub fn resolve_with(
        overrides: &CredentialOverrides,
        settings: &Settings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<Self> {
        let api_key = first_non_empty([
            overrides.api_key.clone(),
            env(ENV_API_KEY),
            Some(settings.api_key.clone()),
        ])?;
        let push_zone_id = first_non_empty([
            overrides.push_zone_id.clone(),
            env(ENV_PUSH_ZONE_ID),
            Some(settings.push_zone_id.clone()),
        ])?;
        Some(Self {
            api_key,
            push_zone_id,
        })
    }
}

fn first_non_empty(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(api_key: &str, zone: &str) -> Settings {
        Settings {
            api_key: api_key.to_string(),
            push_zone_id: zone.to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn stored_settings_are_the_fallback() {
        let resolved = Credentials::resolve_with(
            &CredentialOverrides::default(),
            &stored("stored-key", "stored-zone"),
            |_| None,
        );
        assert_eq!(
            resolved,
            Some(Credentials {
                api_key: "stored-key".to_string(),
                push_zone_id: "stored-zone".to_string(),
            })
        );
    }

    #[test]
    fn environment_beats_stored_setting() {
        let resolved = Credentials::resolve_with(
            &CredentialOverrides::default(),
            &stored("stored-key", "stored-zone"),
            |name| (name == ENV_API_KEY).then(|| "env-key".to_string()),
        );
        let resolved = resolved.expect("credentials should resolve");
        assert_eq!(resolved.api_key, "env-key");
        assert_eq!(resolved.push_zone_id, "stored-zone");
    }

    #[test]
    fn explicit_override_beats_everything() {
        let overrides = CredentialOverrides {
            api_key: Some("override-key".to_string()),
            push_zone_id: None,
        };
        let resolved =
            Credentials::resolve_with(&overrides, &stored("stored-key", "stored-zone"), |_| {
                Some("env-value".to_string())
            });
        let resolved = resolved.expect("credentials should resolve");
        assert_eq!(resolved.api_key, "override-key");
        assert_eq!(resolved.push_zone_id, "env-value");
    }

    #[test]
    fn empty_values_do_not_resolve() {
        let resolved = Credentials::resolve_with(
            &CredentialOverrides::default(),
            &stored("stored-key", "  "),
            |_| None,
        );
        assert_eq!(resolved, None);
    }
}
