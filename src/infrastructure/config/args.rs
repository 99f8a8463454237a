use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(
    name = "photogrid",
    version,
    about = "Pages through Unsplash photos into a two-tier image cache",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Photo list API base URL.
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Unsplash access key.
    #[arg(long, env = "UNSPLASH_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Cache root directory.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Memory tier budget in bytes.
    #[arg(long)]
    pub memory_budget_bytes: Option<usize>,

    /// Number of pages to load.
    #[arg(short, long)]
    pub pages: Option<u32>,

    /// Images resolved concurrently within a page.
    #[arg(long)]
    pub max_concurrent_resolves: Option<usize>,

    /// Remove every cached image before starting.
    #[arg(long)]
    pub clear_cache: bool,
}
