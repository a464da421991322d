//! The shared HTTP client.

use std::sync::Arc;
use std::time::Duration;

use latchkey_request::{JarCookies, RequestMetadata, RequestPipeline};
use reqwest::cookie::Jar;
use reqwest::{Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::GatewayError;

// ---------------------------------------------------------------------------
// GatewayConfig
// ---------------------------------------------------------------------------

/// Configuration for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API root, e.g. `https://crm.example.com/api/`. Endpoint paths such
    /// as `/auth/login` are resolved beneath it.
    pub base_url: String,

    /// Per-request timeout. `None` leaves requests unbounded.
    ///
    /// Default: 30 seconds.
    pub timeout: Option<Duration>,

    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            timeout: Some(Duration::from_secs(30)),
            user_agent: concat!("latchkey/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GatewayConfig {
    /// Default settings against `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP client shared by the session layer and every other module.
///
/// - Holds a cookie jar, so the server's HttpOnly session cookie and the
///   readable anti-forgery cookie persist across requests (in memory).
/// - Runs every request's metadata through its [`RequestPipeline`], so the
///   bearer header and the CSRF header are applied uniformly.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    pipeline: Arc<RequestPipeline>,
    jar: Arc<Jar>,
}

impl ApiClient {
    /// Builds a client with a fresh pipeline and cookie jar.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        Self::with_pipeline(config, RequestPipeline::new())
    }

    /// Builds a client around an existing pipeline.
    pub fn with_pipeline(
        config: GatewayConfig,
        pipeline: Arc<RequestPipeline>,
    ) -> Result<Self, GatewayError> {
        let base_url = normalize_base(&config.base_url)?;
        let jar = Arc::new(Jar::default());

        let mut builder = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        tracing::debug!(base_url = %base_url, "api client created");

        Ok(Self {
            http,
            base_url,
            pipeline,
            jar,
        })
    }

    /// The pipeline every request passes through.
    pub fn pipeline(&self) -> &Arc<RequestPipeline> {
        &self.pipeline
    }

    /// A cookie source reading this client's jar for the API origin.
    pub fn cookies(&self) -> JarCookies {
        JarCookies::new(Arc::clone(&self.jar), self.base_url.clone())
    }

    /// The normalized base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an endpoint path beneath the base URL.
    ///
    /// Leading slashes are ignored, so `/auth/me` under
    /// `https://host/api/` becomes `https://host/api/auth/me`.
    pub fn url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Sends a request, returning the response if its status is a success.
    ///
    /// # Errors
    /// - [`GatewayError::Network`] if no response arrived.
    /// - A status-derived variant (see [`GatewayError::from_status`]) for
    ///   non-2xx responses.
    pub async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, GatewayError>
    where
        B: Serialize + ?Sized,
    {
        let meta = self
            .pipeline
            .prepare(RequestMetadata::new(method, self.url(path)?));
        let method = meta.method.clone();

        let mut request = self.http.request(meta.method, meta.url).headers(meta.headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.inspect_err(|e| {
            tracing::debug!(%method, path, error = %e, "request failed before response");
        })?;
        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "api response");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::from_status(status, &body))
        }
    }

    /// `GET` and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        decode(response).await
    }

    /// `POST` a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body)).await?;
        decode(response).await
    }

    /// `PATCH` a JSON body and decode the JSON response.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PATCH, path, Some(body)).await?;
        decode(response).await
    }

    /// `DELETE`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), GatewayError> {
        self.send::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

/// Reads the whole body and decodes it as JSON.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

/// Parses the base URL and makes sure it ends with `/`, so that `join`
/// appends rather than replaces the last segment.
fn normalize_base(raw: &str) -> Result<Url, GatewayError> {
    let mut url = Url::parse(raw).map_err(|e| GatewayError::InvalidUrl(format!("{raw}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_resolves_beneath_base_path() {
        let client = ApiClient::new(GatewayConfig::with_base_url("https://crm.test/api")).unwrap();

        assert_eq!(client.base_url().as_str(), "https://crm.test/api/");
        assert_eq!(
            client.url("/auth/login").unwrap().as_str(),
            "https://crm.test/api/auth/login"
        );
        assert_eq!(
            client.url("customers").unwrap().as_str(),
            "https://crm.test/api/customers"
        );
    }

    #[test]
    fn test_root_base_url_is_kept() {
        let client = ApiClient::new(GatewayConfig::with_base_url("http://127.0.0.1:9000")).unwrap();
        assert_eq!(client.url("/auth/me").unwrap().as_str(), "http://127.0.0.1:9000/auth/me");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = ApiClient::new(GatewayConfig::with_base_url("not a url"));
        assert!(matches!(result, Err(GatewayError::InvalidUrl(_))));
    }

    #[test]
    fn test_default_config_has_timeout() {
        let config = GatewayConfig::default();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(config.user_agent.starts_with("latchkey/"));
    }

    #[test]
    fn test_cookies_source_starts_empty() {
        use latchkey_request::CookieSource;
        let client = ApiClient::new(GatewayConfig::default()).unwrap();
        assert_eq!(client.cookies().cookie_header(), None);
    }
}
