//! HTTP plumbing: reachability pre-check, fetch client, connectivity.

pub mod connectivity;
pub mod fetch_client;
pub mod reachability;

pub use connectivity::{DEFAULT_ROUTE_TARGET, RouteConnectivity};
pub use fetch_client::{FetchClient, FetchClientConfig};
pub use reachability::{DEFAULT_REACHABILITY_TIMEOUT, ReachabilityCheck};
