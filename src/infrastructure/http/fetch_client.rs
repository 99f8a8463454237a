//! Single-shot HTTP fetch with classified failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header};
use tracing::{debug, trace, warn};

use super::reachability::{DEFAULT_REACHABILITY_TIMEOUT, ReachabilityCheck};
use crate::domain::entities::ImageBytes;
use crate::domain::errors::FetchError;
use crate::domain::ports::ImageFetchPort;

const USER_AGENT: &str = concat!("photogrid/", env!("CARGO_PKG_VERSION"));

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchClientConfig {
    /// Bound on the host reachability pre-check.
    pub reachability_timeout: Duration,
    /// Upper bound on a whole request, body included.
    pub request_timeout: Duration,
    /// Honour `HTTP_PROXY` and friends.
    pub use_system_proxy: bool,
}

impl Default for FetchClientConfig {
    fn default() -> Self {
        Self {
            reachability_timeout: DEFAULT_REACHABILITY_TIMEOUT,
            request_timeout: Duration::from_secs(30),
            use_system_proxy: true,
        }
    }
}

/// Performs one GET per call: pre-check, request, classify. No retry, no
/// caching; callers own both policies.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    reachability: ReachabilityCheck,
}

impl FetchClient {
    /// Creates new client.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: &FetchClientConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::unreachable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            reachability: ReachabilityCheck::new(config.reachability_timeout),
        })
    }

    /// Issues a GET and returns the response if the status is 200.
    ///
    /// Errors and logs never carry the query string, which holds the API key.
    ///
    /// # Errors
    /// `HostUnreachable` if the pre-check fails, `Unreachable` on DNS or
    /// connection failure, `Forbidden` on 403, `HttpError` on any other
    /// non-200 status.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let parsed =
            Url::parse(url).map_err(|e| FetchError::unreachable(format!("invalid URL: {e}")))?;
        let target = redacted(&parsed);

        self.reachability.check(&parsed).await?;

        trace!(url = %target, "Sending request");
        let response = self.client.get(parsed).send().await.map_err(|e| {
            let e = e.without_url();
            warn!(url = %target, error = %e, "Request failed");
            if e.is_timeout() {
                FetchError::unreachable("request timed out")
            } else if e.is_connect() {
                FetchError::unreachable(format!("failed to connect: {e}"))
            } else {
                FetchError::unreachable(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::FORBIDDEN => {
                debug!(url = %target, "Request forbidden");
                Err(FetchError::Forbidden)
            }
            status => {
                debug!(url = %target, status = status.as_u16(), "Unexpected status");
                Err(FetchError::HttpError {
                    code: status.as_u16(),
                })
            }
        }
    }
}

/// `host[:port]/path` of `url`, without query or fragment.
fn redacted(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}{}", url.path()),
        (Some(host), None) => format!("{host}{}", url.path()),
        (None, _) => url.path().to_string(),
    }
}

#[async_trait]
impl ImageFetchPort for FetchClient {
    async fn fetch(&self, url: &str) -> Result<ImageBytes, FetchError> {
        let response = self.get(url).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.contains("image") {
            return Err(FetchError::not_an_image(content_type));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::unreachable(format!("failed to read body: {}", e.without_url())))?;

        debug!(url, content_type = %content_type, size = bytes.len(), "Fetched image");
        Ok(ImageBytes::new(bytes, content_type))
    }
}
