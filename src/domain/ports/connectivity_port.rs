//! Connectivity capability query.

use async_trait::async_trait;

/// Answers "is there an active network with internet capability".
#[async_trait]
pub trait ConnectivityPort: Send + Sync {
    /// Returns true if a network route is available.
    async fn is_connected(&self) -> bool;
}
