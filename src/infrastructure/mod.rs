//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// HTTP fetching, reachability and connectivity.
pub mod http;
/// Image caching, decoding and resolution.
pub mod image;
/// Host system queries.
pub mod system;
/// Unsplash photo list client.
pub mod unsplash;

pub use config::{AppConfig, CliArgs, ConfigStore, LogLevel};
pub use http::{FetchClient, FetchClientConfig, ReachabilityCheck, RouteConnectivity};
pub use self::image::{CacheStats, DiskImageCache, ImageCache, ImageStore, MemoryImageCache};
pub use unsplash::UnsplashClient;
