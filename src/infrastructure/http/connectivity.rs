//! Route-based connectivity check.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::trace;

use crate::domain::ports::ConnectivityPort;

/// Default address whose route is queried.
pub const DEFAULT_ROUTE_TARGET: &str = "1.1.1.1:53";

/// Reports connectivity when the OS has a route to a target address.
///
/// Connecting a UDP socket only selects a route; no packet is sent, so the
/// check costs no network round trip.
#[derive(Debug, Clone, Copy)]
pub struct RouteConnectivity {
    target: SocketAddr,
}

impl RouteConnectivity {
    /// Creates a check against `target`.
    #[must_use]
    pub const fn new(target: SocketAddr) -> Self {
        Self { target }
    }
}

impl Default for RouteConnectivity {
    fn default() -> Self {
        Self::new(SocketAddr::from(([1, 1, 1, 1], 53)))
    }
}

#[async_trait]
impl ConnectivityPort for RouteConnectivity {
    async fn is_connected(&self) -> bool {
        let bind: SocketAddr = if self.target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let connected = match UdpSocket::bind(bind).await {
            Ok(socket) => socket.connect(self.target).await.is_ok(),
            Err(_) => false,
        };
        trace!(addr = %self.target, connected, "Connectivity check");
        connected
    }
}
