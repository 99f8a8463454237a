//! End-to-end pipeline tests against a local fixture server.

use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

use photogrid::application::{FeedConfig, FeedEvent, GalleryFeed, PageCursor};
use photogrid::domain::entities::{FeedStatus, ImageId, ImageSource};
use photogrid::domain::errors::{FetchError, PageError};
use photogrid::domain::ports::ImageFetchPort;
use photogrid::infrastructure::{
    DiskImageCache, FetchClient, FetchClientConfig, ImageCache, ImageStore, MemoryImageCache,
    RouteConnectivity, UnsplashClient,
};

#[derive(Clone)]
struct FixtureState {
    base: String,
    png: Arc<Vec<u8>>,
    image_hits: Arc<AtomicUsize>,
    forbidden: Arc<AtomicBool>,
}

struct Fixture {
    base: String,
    image_hits: Arc<AtomicUsize>,
    forbidden: Arc<AtomicBool>,
}

fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

async fn photos(
    State(state): State<FixtureState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if state.forbidden.load(Ordering::SeqCst) {
        return StatusCode::FORBIDDEN.into_response();
    }
    if params.get("client_id").map(String::as_str) != Some("test-key") {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let record = |path: &str| json!({ "id": path, "urls": { "small": format!("{}{path}", state.base) } });
    let body = match params.get("page").map(String::as_str) {
        Some("1") => json!([record("/img/a.png"), record("/img/b.png"), record("/img/c.png")]),
        Some("2") => json!([record("/img/b.png"), record("/html"), record("/img/d.png")]),
        _ => json!([]),
    };
    axum::Json(body).into_response()
}

async fn image(State(state): State<FixtureState>, Path(_name): Path<String>) -> Response {
    state.image_hits.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "image/png")], state.png.as_ref().clone()).into_response()
}

async fn html() -> Response {
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        "<html><body>not an image</body></html>",
    )
        .into_response()
}

async fn spawn_fixture() -> Fixture {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let image_hits = Arc::new(AtomicUsize::new(0));
    let forbidden = Arc::new(AtomicBool::new(false));

    let state = FixtureState {
        base: base.clone(),
        png: Arc::new(encode_png(32, 24)),
        image_hits: image_hits.clone(),
        forbidden: forbidden.clone(),
    };
    let app = Router::new()
        .route("/photos/", get(photos))
        .route("/img/:name", get(image))
        .route("/html", get(html))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Fixture {
        base,
        image_hits,
        forbidden,
    }
}

fn http_client() -> Arc<FetchClient> {
    let config = FetchClientConfig {
        reachability_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_secs(5),
        use_system_proxy: false,
    };
    Arc::new(FetchClient::new(&config).unwrap())
}

async fn open_cache(dir: &TempDir) -> Arc<ImageCache> {
    let disk = DiskImageCache::new(dir.path()).await.unwrap();
    Arc::new(ImageCache::new(MemoryImageCache::new(8 * 1024 * 1024), disk))
}

async fn build_feed(
    fixture: &Fixture,
    cache: Arc<ImageCache>,
    config: FeedConfig,
) -> (GalleryFeed, mpsc::UnboundedReceiver<FeedEvent>) {
    let http = http_client();
    let list = Arc::new(UnsplashClient::with_base_url(
        http.clone(),
        &fixture.base,
        "test-key",
    ));
    let connectivity = Arc::new(RouteConnectivity::new(SocketAddr::from(([127, 0, 0, 1], 9))));
    let store = Arc::new(ImageStore::new(cache, http));
    let (event_tx, events) = mpsc::unbounded_channel();

    let feed = GalleryFeed::new(PageCursor::new(list, connectivity), store, config, &event_tx);
    (feed, events)
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<FeedEvent>) -> FeedEvent {
    timeout(Duration::from_secs(10), events.recv())
        .await
        .expect("timed out waiting for feed event")
        .expect("event channel closed")
}

#[tokio::test]
async fn test_feed_loads_pages_in_order() {
    let fixture = spawn_fixture().await;
    let dir = TempDir::new().unwrap();
    let config = FeedConfig {
        page_limit: Some(1),
        ..FeedConfig::default()
    };
    let (feed, mut events) = build_feed(&fixture, open_cache(&dir).await, config).await;

    assert!(feed.start());
    assert_eq!(
        next_event(&mut events).await,
        FeedEvent::PageLoaded { page: 1, added: 3 }
    );
    assert_eq!(
        next_event(&mut events).await,
        FeedEvent::LimitReached { next_page: 2 }
    );

    let state = feed.current_state();
    let expected: Vec<String> = ["/img/a.png", "/img/b.png", "/img/c.png"]
        .iter()
        .map(|p| format!("{}{p}", fixture.base))
        .collect();
    let ids: Vec<String> = state.ids().map(ToString::to_string).collect();
    assert_eq!(ids, expected);
    assert_eq!(state.placeholder_count(), 0);
    assert!(state.entries.iter().all(|e| e.image.width() == 16));

    assert!(feed.start());
    assert_eq!(
        next_event(&mut events).await,
        FeedEvent::PageLoaded { page: 2, added: 2 }
    );

    let state = feed.current_state();
    assert_eq!(state.len(), 5);
    assert!(state.entries[3].is_placeholder());
    assert_eq!(state.entries[3].id.as_str(), format!("{}/html", fixture.base));
    assert!(!state.entries[4].is_placeholder());
    assert_eq!(fixture.image_hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_feed_reports_exhaustion() {
    let fixture = spawn_fixture().await;
    let dir = TempDir::new().unwrap();
    let (feed, mut events) =
        build_feed(&fixture, open_cache(&dir).await, FeedConfig::default()).await;

    feed.start();

    assert!(matches!(next_event(&mut events).await, FeedEvent::PageLoaded { page: 1, .. }));
    assert!(matches!(next_event(&mut events).await, FeedEvent::PageLoaded { page: 2, .. }));
    assert_eq!(next_event(&mut events).await, FeedEvent::Exhausted);
    assert_eq!(feed.current_state().status, FeedStatus::Exhausted);
    assert!(!feed.start());
}

#[tokio::test]
async fn test_forbidden_page_keeps_cursor() {
    let fixture = spawn_fixture().await;
    fixture.forbidden.store(true, Ordering::SeqCst);
    let dir = TempDir::new().unwrap();
    let (feed, mut events) =
        build_feed(&fixture, open_cache(&dir).await, FeedConfig::default()).await;

    feed.start();

    assert_eq!(
        next_event(&mut events).await,
        FeedEvent::PageFailed {
            page: 1,
            error: PageError::Forbidden
        }
    );
    let state = feed.current_state();
    assert!(state.is_empty());
    assert_eq!(state.next_page, 1);
    assert_eq!(state.status, FeedStatus::Paused);

    fixture.forbidden.store(false, Ordering::SeqCst);
    assert!(feed.retry());
    assert_eq!(
        next_event(&mut events).await,
        FeedEvent::PageLoaded { page: 1, added: 3 }
    );
}

#[tokio::test]
async fn test_disk_entry_survives_restart() {
    let fixture = spawn_fixture().await;
    let dir = TempDir::new().unwrap();
    let id = ImageId::new(format!("{}/img/a.png", fixture.base));

    let warm = ImageStore::new(open_cache(&dir).await, http_client());
    assert_eq!(warm.resolve(&id).await.source, ImageSource::Network);
    assert_eq!(fixture.image_hits.load(Ordering::SeqCst), 1);

    let cold = ImageStore::new(open_cache(&dir).await, http_client());
    let resolved = cold.resolve(&id).await;

    assert_eq!(resolved.source, ImageSource::DiskCache);
    assert_eq!(resolved.image.width(), 16);
    assert_eq!(fixture.image_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_client_classifies_failures() {
    let fixture = spawn_fixture().await;
    let client = http_client();

    let missing = client.fetch(&format!("{}/missing", fixture.base)).await;
    assert_eq!(missing.unwrap_err(), FetchError::HttpError { code: 404 });

    let html = client.fetch(&format!("{}/html", fixture.base)).await;
    assert!(matches!(html.unwrap_err(), FetchError::NotAnImage { .. }));

    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let unreachable = client.fetch(&format!("http://{closed}/img/a.png")).await;
    assert!(matches!(
        unreachable.unwrap_err(),
        FetchError::HostUnreachable { .. }
    ));

    let image = client
        .fetch(&format!("{}/img/a.png", fixture.base))
        .await
        .unwrap();
    assert_eq!(image.content_type(), "image/png");
    assert!(!image.is_empty());
}
