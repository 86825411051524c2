use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::time::MissedTickBehavior;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::fetch::FeedClient;
use crate::state::SharedSnapshot;

/// Floor for the refresh interval; anything shorter hammers the feeds.
pub const MIN_REFRESH: Duration = Duration::from_secs(5);

pub struct SignageSettings {
    pub urls: Vec<String>,
    pub bind: String,
    pub port: u16,
    pub limit: usize,
    pub timeout: Duration,
    pub keyword: Option<String>,
    pub refresh: Duration,
    pub insecure: bool,
}

pub struct AppState {
    pub snapshot: SharedSnapshot,
    pub refresh_seconds: u64,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub refresh_seconds: u64,
    pub updated_at: String,
    pub source_count: usize,
    pub error_count: usize,
    pub items: Vec<ItemView>,
}

pub struct ItemView {
    pub source: String,
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: String,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Route handlers. Both surfaces read the current snapshot; neither ever
// triggers or waits on a refresh.

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.current().await;
    let now = Utc::now();

    let source_count = snapshot
        .items
        .iter()
        .map(|item| item.source.as_str())
        .collect::<HashSet<_>>()
        .len();
    let items = snapshot
        .items
        .iter()
        .map(|item| ItemView {
            source: item.source.clone(),
            title: item.title.clone(),
            link: item.link.clone(),
            summary: item.summary.clone().unwrap_or_default(),
            published: format_age(item.published, now),
        })
        .collect();

    HtmlTemplate(IndexTemplate {
        refresh_seconds: state.refresh_seconds,
        updated_at: snapshot
            .updated_at
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string()),
        source_count,
        error_count: snapshot.errors.len(),
        items,
    })
}

pub async fn api_news(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.current().await;
    Json(snapshot.as_ref().clone())
}

pub async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.current().await;
    Json(json!({ "ok": true, "updated_at": snapshot.updated_at }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/news", get(api_news))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Relative age for the signage page; falls back to an absolute stamp for
/// day-old items and to "unknown time" for undated ones.
fn format_age(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(published) = published else {
        return "unknown time".to_string();
    };
    let age = now.signed_duration_since(published);
    if age.num_seconds() < 60 {
        "just now".to_string()
    } else if age.num_minutes() < 60 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_hours() < 24 {
        format!("{}h ago", age.num_hours())
    } else {
        published.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

/// One fetch-and-aggregate pass, published to the shared snapshot.
pub async fn refresh_once(
    client: &FeedClient,
    urls: &[String],
    keyword: Option<&str>,
    limit: usize,
    shared: &SharedSnapshot,
) {
    let outcomes = client.fetch_all(urls).await;
    for (url, result) in &outcomes {
        if let Err(e) = result {
            warn!(%url, error = %e, "feed refresh failed");
        }
    }
    let total_failure = !outcomes.is_empty() && outcomes.iter().all(|(_, r)| r.is_err());

    let snapshot = aggregate(outcomes, keyword, limit);
    info!(
        items = snapshot.items.len(),
        errors = snapshot.errors.len(),
        "refresh complete"
    );
    shared.publish(snapshot, total_failure).await;
}

pub async fn run_refresh_loop(
    client: FeedClient,
    urls: Vec<String>,
    keyword: Option<String>,
    limit: usize,
    shared: SharedSnapshot,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial refresh already ran.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        info!("starting scheduled feed refresh");
        refresh_once(&client, &urls, keyword.as_deref(), limit, &shared).await;
    }
}

pub async fn run(settings: SignageSettings) -> anyhow::Result<()> {
    let SignageSettings {
        urls,
        bind,
        port,
        limit,
        timeout,
        keyword,
        refresh,
        insecure,
    } = settings;
    let refresh = refresh.max(MIN_REFRESH);

    let client = FeedClient::new(timeout, insecure)?;
    let shared = SharedSnapshot::new();

    info!(feeds = urls.len(), "performing initial refresh");
    refresh_once(&client, &urls, keyword.as_deref(), limit, &shared).await;

    let refresh_task = tokio::spawn(run_refresh_loop(
        client,
        urls,
        keyword,
        limit,
        shared.clone(),
        refresh,
    ));

    let state = Arc::new(AppState {
        snapshot: shared,
        refresh_seconds: refresh.as_secs(),
    });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((bind.as_str(), port)).await?;
    info!("signage running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresh_task.abort();
    info!("refresh scheduler stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    info!("shutdown signal received");
}
