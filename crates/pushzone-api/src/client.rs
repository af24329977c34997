//! Push zone REST client.
//!
//! Thin typed wrapper over the provider's three endpoints. Calls are
//! synchronous from the caller's point of view (awaited to completion),
//! carry a bounded timeout, and are never retried here; an unpushed file is
//! simply not marked successful and the next full run re-attempts it.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use pushzone_config::{CredentialOverrides, Credentials, SettingsStore, mime_type_for};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::rate_limit::RateLimiter;
use crate::redact;

/// Default API endpoint of the push zone provider.
pub const DEFAULT_BASE_URL: &str = "https://api.keycdn.com";

/// Request timeout applied to every call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Typed client for push and purge operations against one push zone.
#[derive(Clone)]
pub struct PushZoneClient {
    http: Client,
    base_url: Url,
    overrides: CredentialOverrides,
    settings: SettingsStore,
    limiter: RateLimiter,
    site_root: PathBuf,
}

impl PushZoneClient {
    /// Construct a client against the default provider endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        settings: SettingsStore,
        limiter: RateLimiter,
        site_root: impl Into<PathBuf>,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ApiError::transport("client_build", source))?;
        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|source| ApiError::Endpoint {
            operation: "client_build",
            source,
        })?;
        Ok(Self {
            http,
            base_url,
            overrides: CredentialOverrides::default(),
            settings,
            limiter,
            site_root: site_root.into(),
        })
    }

    /// Point the client at a different base endpoint (tests, staging).
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Attach deploy-time credential overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: CredentialOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Whether credentials currently resolve to non-empty values.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        Credentials::resolve(&self.overrides, &self.settings.load()).is_some()
    }

    fn credentials(&self) -> ApiResult<Credentials> {
        Credentials::resolve(&self.overrides, &self.settings.load())
            .ok_or(ApiError::MissingCredentials)
    }

    fn gate(&self) -> ApiResult<Credentials> {
        let credentials = self.credentials()?;
        if !self.limiter.allow() {
            return Err(ApiError::RateLimited);
        }
        Ok(credentials)
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path)
            .map_err(|source| ApiError::Endpoint { operation, source })
    }

    /// Upload one local file into the push zone.
    ///
    /// The multipart body carries the file contents plus a `destination`
    /// field naming the target directory (the parent of `relative_path`).
    ///
    /// # Errors
    /// Fails fast if the file is missing, credentials do not resolve, or the
    /// rate limiter denies the call; otherwise surfaces transport errors and
    /// non-200 responses.
    pub async fn push_file(&self, file_path: &Path, relative_path: &str) -> ApiResult<()> {
        match tokio::fs::metadata(file_path).await {
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ApiError::FileMissing {
                    path: file_path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(ApiError::Io {
                    path: file_path.to_path_buf(),
                    source,
                });
            }
        }

        let credentials = self.gate()?;

        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|source| ApiError::Io {
                path: file_path.to_path_buf(),
                source,
            })?;

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = file_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type =
            mime_type_for(&extension).ok_or_else(|| ApiError::UnknownContentType {
                path: file_path.to_path_buf(),
            })?;

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)
            .map_err(|source| ApiError::transport("push_file", source))?;
        let form = Form::new()
            .part("file", part)
            .text("destination", destination_dir(relative_path));

        let url = self.endpoint(
            "push_file",
            &format!("/zones/pushfiles/{}.json", credentials.push_zone_id),
        )?;
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, authorization_header(&credentials))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::transport("push_file", source))?;

        self.expect_ok("push_file", response).await?;
        debug!(
            file = %redact::redact(relative_path, &self.site_root),
            "pushed file to zone"
        );
        Ok(())
    }

    /// Purge a list of URLs from the zone cache.
    ///
    /// # Errors
    /// Surfaces missing credentials, rate limiting, transport errors, and
    /// non-200 responses.
    pub async fn purge_urls(&self, urls: &[String]) -> ApiResult<()> {
        if urls.is_empty() {
            return Ok(());
        }
        let credentials = self.gate()?;

        let url = self.endpoint(
            "purge_urls",
            &format!("/zones/purgeurl/{}.json", credentials.push_zone_id),
        )?;
        let response = self
            .http
            .delete(url)
            .header(AUTHORIZATION, authorization_header(&credentials))
            .json(&serde_json::json!({ "urls": urls }))
            .send()
            .await
            .map_err(|source| ApiError::transport("purge_urls", source))?;

        self.expect_ok("purge_urls", response).await
    }

    /// Purge a single URL from the zone cache.
    ///
    /// # Errors
    /// Same failure modes as [`Self::purge_urls`].
    pub async fn purge_url(&self, url: &str) -> ApiResult<()> {
        self.purge_urls(&[url.to_string()]).await
    }

    /// Purge the entire zone cache.
    ///
    /// # Errors
    /// Surfaces missing credentials, rate limiting, transport errors, and
    /// non-200 responses.
    pub async fn purge_zone_cache(&self) -> ApiResult<()> {
        let credentials = self.gate()?;

        let url = self.endpoint(
            "purge_zone",
            &format!("/zones/purge/{}.json", credentials.push_zone_id),
        )?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, authorization_header(&credentials))
            .send()
            .await
            .map_err(|source| ApiError::transport("purge_zone", source))?;

        self.expect_ok("purge_zone", response).await
    }

    async fn expect_ok(&self, operation: &'static str, response: Response) -> ApiResult<()> {
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        let body = redact::redact(&body, &self.site_root);
        warn!(
            operation,
            status = status.as_u16(),
            body = %body,
            "push zone api call failed"
        );
        Err(ApiError::Status {
            operation,
            status: status.as_u16(),
            body,
        })
    }
}

fn authorization_header(credentials: &Credentials) -> String {
    format!(
        "Basic {}",
        BASE64.encode(format!("{}:", credentials.api_key))
    )
}

/// Target directory sent to the provider for an uploaded file.
fn destination_dir(relative_path: &str) -> String {
    Path::new(relative_path)
        .parent()
        .map(|parent| parent.to_string_lossy().into_owned())
        .filter(|parent| !parent.is_empty())
        .unwrap_or_else(|| ".".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use pushzone_store::{MemoryKv, SystemClock};
    use std::sync::Arc;

    fn client_against(server: &MockServer, root: &Path) -> Result<PushZoneClient> {
        let kv: Arc<dyn pushzone_store::KvStore> = Arc::new(MemoryKv::new());
        let settings = SettingsStore::new(kv.clone());
        settings.update(|current| {
            current.api_key = "test-key".to_string();
            current.push_zone_id = "zone1".to_string();
        });
        let limiter = RateLimiter::new(kv, Arc::new(SystemClock));
        let client = PushZoneClient::new(settings, limiter, root)?
            .with_base_url(server.base_url().parse()?);
        Ok(client)
    }

    #[test]
    fn destination_is_the_parent_directory() {
        assert_eq!(
            destination_dir("wp-content/uploads/2024/logo.png"),
            "wp-content/uploads/2024"
        );
        assert_eq!(destination_dir("style.css"), ".");
    }

    #[test]
    fn authorization_header_is_basic_with_empty_password() {
        let header = authorization_header(&Credentials {
            api_key: "abc".to_string(),
            push_zone_id: "z".to_string(),
        });
        assert_eq!(header, format!("Basic {}", BASE64.encode("abc:")));
    }

    #[tokio::test]
    async fn push_file_posts_multipart_to_zone_endpoint() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/zones/pushfiles/zone1.json")
                .header_exists("authorization");
            then.status(200).body("{\"status\":\"success\"}");
        });

        let root = tempfile::tempdir()?;
        let file = root.path().join("style.css");
        std::fs::write(&file, "body { color: black; }")?;

        let client = client_against(&server, root.path())?;
        client.push_file(&file, "wp-content/uploads/style.css").await?;

        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn non_200_response_is_a_status_error() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/zones/pushfiles/zone1.json");
            then.status(503).body("upstream unavailable");
        });

        let root = tempfile::tempdir()?;
        let file = root.path().join("style.css");
        std::fs::write(&file, "body {}")?;

        let client = client_against(&server, root.path())?;
        let result = client.push_file(&file, "style.css").await;
        assert!(
            matches!(result, Err(ApiError::Status { status: 503, .. })),
            "expected status error, got {result:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_fails_before_any_request() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/zones/pushfiles/zone1.json");
            then.status(200);
        });

        let root = tempfile::tempdir()?;
        let client = client_against(&server, root.path())?;
        let missing = root.path().join("missing.css");
        let result = client.push_file(&missing, "missing.css").await;

        assert!(matches!(result, Err(ApiError::FileMissing { .. })));
        assert_eq!(mock.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() -> Result<()> {
        let server = MockServer::start_async().await;
        let kv: Arc<dyn pushzone_store::KvStore> = Arc::new(MemoryKv::new());
        let settings = SettingsStore::new(kv.clone());
        let limiter = RateLimiter::new(kv, Arc::new(SystemClock));
        let root = tempfile::tempdir()?;
        let client = PushZoneClient::new(settings, limiter, root.path())?
            .with_base_url(server.base_url().parse()?);

        assert!(!client.is_configured());
        let result = client.purge_zone_cache().await;
        assert!(matches!(result, Err(ApiError::MissingCredentials)));
        Ok(())
    }

    #[tokio::test]
    async fn exhausted_quota_denies_the_call() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/zones/purge/zone1.json");
            then.status(200);
        });

        let root = tempfile::tempdir()?;
        let kv: Arc<dyn pushzone_store::KvStore> = Arc::new(MemoryKv::new());
        let settings = SettingsStore::new(kv.clone());
        settings.update(|current| {
            current.api_key = "test-key".to_string();
            current.push_zone_id = "zone1".to_string();
        });
        let limiter = RateLimiter::new(kv, Arc::new(SystemClock)).with_quota(1);
        let client = PushZoneClient::new(settings, limiter, root.path())?
            .with_base_url(server.base_url().parse()?);

        client.purge_zone_cache().await?;
        let result = client.purge_zone_cache().await;
        assert!(matches!(result, Err(ApiError::RateLimited)));
        Ok(())
    }

    #[tokio::test]
    async fn purge_urls_with_empty_list_is_a_no_op() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/zones/purgeurl/zone1.json");
            then.status(200);
        });

        let root = tempfile::tempdir()?;
        let client = client_against(&server, root.path())?;
        client.purge_urls(&[]).await?;

        assert_eq!(mock.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn empty_purge_does_not_consume_rate_limit_quota() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/zones/purge/zone1.json");
            then.status(200);
        });

        let root = tempfile::tempdir()?;
        let kv: Arc<dyn pushzone_store::KvStore> = Arc::new(MemoryKv::new());
        let settings = SettingsStore::new(kv.clone());
        settings.update(|current| {
            current.api_key = "test-key".to_string();
            current.push_zone_id = "zone1".to_string();
        });
        let limiter = RateLimiter::new(kv, Arc::new(SystemClock)).with_quota(1);
        let client = PushZoneClient::new(settings, limiter, root.path())?
            .with_base_url(server.base_url().parse()?);

        client.purge_urls(&[]).await?;
        // The single quota slot must still be available after the no-op.
        client.purge_zone_cache().await?;
        Ok(())
    }

    #[tokio::test]
    async fn purge_url_sends_delete_with_body() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/zones/purgeurl/zone1.json")
                .header_exists("authorization")
                .body_includes("cdn.example.com");
            then.status(200);
        });

        let root = tempfile::tempdir()?;
        let client = client_against(&server, root.path())?;
        client
            .purge_url("https://cdn.example.com/wp-content/uploads/a.css")
            .await?;

        mock.assert();
        Ok(())
    }
}
