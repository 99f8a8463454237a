//! Unsplash photo list client.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::dto::parse_photo_list;
use crate::domain::entities::ImageId;
use crate::domain::errors::PageError;
use crate::domain::ports::PhotoListPort;
use crate::infrastructure::http::FetchClient;

/// Production API base URL.
pub const UNSPLASH_API_BASE: &str = "https://api.unsplash.com";

/// Client for `GET /photos/`.
pub struct UnsplashClient {
    http: Arc<FetchClient>,
    base_url: String,
    client_id: String,
}

impl std::fmt::Debug for UnsplashClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsplashClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UnsplashClient {
    /// Creates client against the production API.
    #[must_use]
    pub fn new(http: Arc<FetchClient>, client_id: impl Into<String>) -> Self {
        Self::with_base_url(http, UNSPLASH_API_BASE, client_id)
    }

    /// Creates client with custom base URL.
    #[must_use]
    pub fn with_base_url(
        http: Arc<FetchClient>,
        base_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
        }
    }

    /// URL of page `page`.
    #[must_use]
    pub fn page_url(&self, page: u32) -> String {
        format!(
            "{}/photos/?client_id={}&page={page}",
            self.base_url, self.client_id
        )
    }
}

#[async_trait]
impl PhotoListPort for UnsplashClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<ImageId>, PageError> {
        debug!(page, "Fetching photo list page");

        let response = self.http.get(&self.page_url(page)).await.map_err(|e| {
            warn!(page, error = %e, "Photo list request failed");
            PageError::from(e)
        })?;

        let body = response
            .text()
            .await
            .map_err(|e| {
                PageError::unreachable(format!("failed to read body: {}", e.without_url()))
            })?;

        let ids = parse_photo_list(&body).map_err(|e| {
            warn!(page, error = %e, "Failed to parse photo list");
            e
        })?;

        debug!(page, count = ids.len(), "Photo list page loaded");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::FetchClientConfig;

    fn http() -> Arc<FetchClient> {
        Arc::new(FetchClient::new(&FetchClientConfig::default()).unwrap())
    }

    #[test]
    fn test_page_url() {
        let client = UnsplashClient::new(http(), "KEY");
        assert_eq!(
            client.page_url(3),
            "https://api.unsplash.com/photos/?client_id=KEY&page=3"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = UnsplashClient::with_base_url(http(), "http://127.0.0.1:8080/", "KEY");
        assert_eq!(
            client.page_url(1),
            "http://127.0.0.1:8080/photos/?client_id=KEY&page=1"
        );
    }

    #[test]
    fn test_debug_hides_client_id() {
        let client = UnsplashClient::new(http(), "SECRET");
        assert!(!format!("{client:?}").contains("SECRET"));
    }

    #[tokio::test]
    async fn test_page_error_hides_client_id() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });
        let config = FetchClientConfig {
            use_system_proxy: false,
            ..FetchClientConfig::default()
        };
        let http = Arc::new(FetchClient::new(&config).unwrap());
        let client = UnsplashClient::with_base_url(http, format!("http://{addr}"), "SUPERSECRETKEY");

        let error = client.fetch_page(1).await.unwrap_err();

        assert!(matches!(error, PageError::Unreachable { .. }));
        assert!(!error.to_string().contains("SUPERSECRETKEY"));
        assert!(!error.user_message().contains("SUPERSECRETKEY"));
    }
}
