//! Host reachability pre-check.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::domain::errors::FetchError;

/// Default bound on resolving and probing a host.
pub const DEFAULT_REACHABILITY_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolves a URL's host and opens a throwaway TCP connection to it.
#[derive(Debug, Clone, Copy)]
pub struct ReachabilityCheck {
    timeout: Duration,
}

impl ReachabilityCheck {
    /// Creates a check bounded by `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Configured bound.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks that the host of `url` resolves and accepts a connection.
    ///
    /// Resolution and the connection attempt share one `timeout` bound.
    ///
    /// # Errors
    /// `Unreachable` if the host does not resolve, `HostUnreachable` if no
    /// resolved address accepts a connection within the timeout.
    pub async fn check(&self, url: &Url) -> Result<(), FetchError> {
        let host = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .ok_or_else(|| FetchError::unreachable(format!("URL has no host ({})", url.scheme())))?;
        let port = url.port_or_known_default().unwrap_or(80);

        if let Ok(result) = timeout(self.timeout, connect_host(host, port)).await {
            result
        } else {
            debug!(host, port, timeout_ms = self.timeout.as_millis(), "Reachability check timed out");
            Err(FetchError::host_unreachable(host))
        }
    }
}

async fn connect_host(host: &str, port: u16) -> Result<(), FetchError> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|e| FetchError::unreachable(format!("failed to resolve {host}: {e}")))?
        .collect();

    if addrs.is_empty() {
        return Err(FetchError::unreachable(format!("{host} resolved to no addresses")));
    }
    trace!(host, addresses = addrs.len(), "Resolved host");

    for addr in &addrs {
        match TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(e) => trace!(%addr, error = %e, "Check connection failed"),
        }
    }

    debug!(host, port, "Host not reachable");
    Err(FetchError::host_unreachable(host))
}

impl Default for ReachabilityCheck {
    fn default() -> Self {
        Self::new(DEFAULT_REACHABILITY_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listening_host_is_reachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/photos/")).unwrap();

        assert!(ReachabilityCheck::default().check(&url).await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_port_is_host_unreachable() {
        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();

        let result = ReachabilityCheck::new(Duration::from_millis(500)).check(&url).await;

        assert_eq!(result, Err(FetchError::host_unreachable("127.0.0.1")));
    }

    #[tokio::test]
    async fn test_whole_check_is_bounded_by_timeout() {
        // Non-routable address: the connect either hangs or fails fast.
        let url = Url::parse("http://10.255.255.1:81/").unwrap();
        let check = ReachabilityCheck::new(Duration::from_millis(300));

        let started = std::time::Instant::now();
        let result = check.check(&url).await;

        assert_eq!(result, Err(FetchError::host_unreachable("10.255.255.1")));
        assert!(started.elapsed() < Duration::from_millis(900));
    }
}
