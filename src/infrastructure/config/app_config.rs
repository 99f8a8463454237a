//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::application::FeedConfig;
use crate::infrastructure::http::{DEFAULT_ROUTE_TARGET, FetchClientConfig};
use crate::infrastructure::system::{DEFAULT_MEMORY_FRACTION, detect_available_memory, memory_budget};
use crate::infrastructure::unsplash::UNSPLASH_API_BASE;

pub(crate) const APP_NAME: &str = "photogrid";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "linuxmobile";

/// Environment variable consulted for the API key.
pub const CLIENT_ID_ENV: &str = "UNSPLASH_CLIENT_ID";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Photo list API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Network settings.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Feed settings.
    #[serde(default)]
    pub feed: FeedSettings,
}

/// Photo list API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Unsplash access key.
    #[serde(default)]
    pub client_id: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: None,
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root; `imageCache/` is created inside it.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Fixed memory tier budget in bytes. Overrides the derived budget.
    #[serde(default)]
    pub memory_budget_bytes: Option<usize>,

    /// Memory tier gets `available / memory_fraction`.
    #[serde(default = "default_memory_fraction")]
    pub memory_fraction: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            memory_budget_bytes: None,
            memory_fraction: default_memory_fraction(),
        }
    }
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Host reachability pre-check bound in seconds.
    #[serde(default = "default_reachability_timeout")]
    pub reachability_timeout_secs: u64,

    /// Whole-request bound in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Address whose route decides connectivity.
    #[serde(default = "default_route_target")]
    pub connectivity_target: String,

    /// Honour proxy environment variables.
    #[serde(default = "default_true")]
    pub use_system_proxy: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            reachability_timeout_secs: default_reachability_timeout(),
            request_timeout_secs: default_request_timeout(),
            connectivity_target: default_route_target(),
            use_system_proxy: true,
        }
    }
}

/// Feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Images resolved concurrently within a page.
    #[serde(default = "default_concurrency")]
    pub max_concurrent_resolves: usize,

    /// Pages loaded per trigger; unlimited when unset.
    #[serde(default)]
    pub pages: Option<u32>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            max_concurrent_resolves: default_concurrency(),
            pages: None,
        }
    }
}

fn default_base_url() -> String {
    UNSPLASH_API_BASE.to_string()
}

const fn default_memory_fraction() -> usize {
    DEFAULT_MEMORY_FRACTION
}

const fn default_reachability_timeout() -> u64 {
    3
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_route_target() -> String {
    DEFAULT_ROUTE_TARGET.to_string()
}

const fn default_concurrency() -> usize {
    4
}

const fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(base_url) = args.api_base_url {
            self.api.base_url = base_url;
        }
        if let Some(client_id) = args.client_id {
            self.api.client_id = Some(client_id);
        }
        if let Some(cache_dir) = args.cache_dir {
            self.cache.dir = Some(cache_dir);
        }
        if let Some(budget) = args.memory_budget_bytes {
            self.cache.memory_budget_bytes = Some(budget);
        }
        if let Some(pages) = args.pages {
            self.feed.pages = Some(pages);
        }
        if let Some(concurrency) = args.max_concurrent_resolves {
            self.feed.max_concurrent_resolves = concurrency;
        }
    }

    /// Returns default cache root.
    #[must_use]
    pub fn default_cache_root() -> PathBuf {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).map_or_else(
            || std::env::temp_dir().join(APP_NAME).join("cache"),
            |dirs| dirs.cache_dir().to_path_buf(),
        )
    }

    /// Returns effective cache root.
    #[must_use]
    pub fn effective_cache_root(&self) -> PathBuf {
        self.cache.dir.clone().unwrap_or_else(Self::default_cache_root)
    }

    /// Returns the API key from config, falling back to the environment.
    #[must_use]
    pub fn effective_client_id(&self) -> Option<String> {
        self.api
            .client_id
            .clone()
            .or_else(|| std::env::var(CLIENT_ID_ENV).ok())
            .filter(|id| !id.trim().is_empty())
    }

    /// Memory tier budget: the configured value, or a fraction of the
    /// memory available right now.
    #[must_use]
    pub fn memory_budget_bytes(&self) -> usize {
        self.cache.memory_budget_bytes.unwrap_or_else(|| {
            memory_budget(detect_available_memory(), self.cache.memory_fraction)
        })
    }

    /// Settings for the fetch client.
    #[must_use]
    pub const fn fetch_client_config(&self) -> FetchClientConfig {
        FetchClientConfig {
            reachability_timeout: Duration::from_secs(self.network.reachability_timeout_secs),
            request_timeout: Duration::from_secs(self.network.request_timeout_secs),
            use_system_proxy: self.network.use_system_proxy,
        }
    }

    /// Settings for the feed loader.
    #[must_use]
    pub const fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            max_concurrent_resolves: self.feed.max_concurrent_resolves,
            page_limit: self.feed.pages,
        }
    }
}
