//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{
    ApiConfig, AppConfig, CLIENT_ID_ENV, CacheConfig, FeedSettings, LogLevel, NetworkConfig,
};
pub use args::CliArgs;
pub use storage::{ConfigError, ConfigStore};
