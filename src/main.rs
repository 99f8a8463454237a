use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use photogrid::application::{FeedEvent, GalleryFeed, PageCursor};
use photogrid::domain::entities::FeedState;
use photogrid::infrastructure::{
    AppConfig, CliArgs, ConfigStore, DiskImageCache, FetchClient, ImageCache, ImageStore,
    MemoryImageCache, RouteConnectivity, UnsplashClient,
};

const MAX_PAGE_RETRIES: u32 = 2;
const PAGE_RETRY_DELAY: Duration = Duration::from_secs(2);

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: CliArgs) -> Result<AppConfig> {
    let store = ConfigStore::new()?;
    let mut config = store.load(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

struct Pipeline {
    cache: Arc<ImageCache>,
    feed: GalleryFeed,
}

async fn build_pipeline(
    config: &AppConfig,
    event_tx: &mpsc::UnboundedSender<FeedEvent>,
) -> Result<Pipeline> {
    let client_id = config.effective_client_id().ok_or_else(|| {
        eyre!("no Unsplash access key; pass --client-id or set UNSPLASH_CLIENT_ID")
    })?;

    let target: SocketAddr = config
        .network
        .connectivity_target
        .parse()
        .wrap_err("invalid network.connectivity_target")?;

    let http = Arc::new(FetchClient::new(&config.fetch_client_config())?);
    let list = Arc::new(UnsplashClient::with_base_url(
        Arc::clone(&http),
        &config.api.base_url,
        client_id,
    ));

    let cache_root = config.effective_cache_root();
    let budget = config.memory_budget_bytes();
    info!(root = %cache_root.display(), budget_bytes = budget, "Opening image cache");

    let disk = DiskImageCache::new(&cache_root).await?;
    let cache = Arc::new(ImageCache::new(MemoryImageCache::new(budget), disk));
    let store = Arc::new(ImageStore::new(cache.clone(), http));

    let cursor = PageCursor::new(list, Arc::new(RouteConnectivity::new(target)));
    let feed = GalleryFeed::new(cursor, store, config.feed_config(), event_tx);

    Ok(Pipeline { cache, feed })
}

fn print_summary(state: &FeedState, cache_line: &str, disk_entries: usize) {
    println!(
        "{} images loaded ({} placeholders), next page {}",
        state.len(),
        state.placeholder_count(),
        state.next_page
    );
    println!("{cache_line}");
    println!("Disk: {disk_entries} entries");
    if let Some(error) = &state.last_error {
        println!("Last error: {}", error.user_message());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let clear_cache = args.clear_cache;
    let config = load_config(args)?;

    init_logging(&config)?;

    info!(version = photogrid::VERSION, "Starting {}", photogrid::NAME);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let pipeline = build_pipeline(&config, &event_tx).await?;
    drop(event_tx);

    if clear_cache {
        pipeline.cache.clear().await?;
        info!("Image cache cleared");
    }

    pipeline.feed.start();
    let mut retries_left = MAX_PAGE_RETRIES;

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    FeedEvent::PageLoaded { page, added } => {
                        retries_left = MAX_PAGE_RETRIES;
                        info!(page, added, "Page loaded");
                    }
                    FeedEvent::PageFailed { page, error } => {
                        warn!(page, error = %error, retries_left, "Page failed");
                        if retries_left > 0 && !error.should_back_off() {
                            retries_left -= 1;
                            tokio::time::sleep(PAGE_RETRY_DELAY).await;
                            if pipeline.feed.retry_if_transient() {
                                continue;
                            }
                        }
                        eprintln!("{}", error.user_message());
                        break;
                    }
                    FeedEvent::LimitReached { next_page } => {
                        info!(next_page, "Page limit reached");
                        break;
                    }
                    FeedEvent::Exhausted => {
                        info!("No more photos");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    pipeline.feed.cancel();

    let state = pipeline.feed.current_state();
    let stats = pipeline.cache.stats().await;
    print_summary(&state, &stats.to_string(), pipeline.cache.disk().len());

    Ok(())
}
