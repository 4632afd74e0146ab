use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::metrics::{metrics_handler, record_db_query, set_gallery_counts};
use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};
use crate::gallery_store::{
    Artist, DeletedPainting, Museum, NewArtist, NewMuseum, NewPainting, Page, PaintingListQuery,
    PaintingUpdate, ResolvedPainting, SortOrder, DEFAULT_PAGE_SIZE,
};

const WELCOME_MESSAGE: &str = "Welcome to the Art Gallery API!";

#[derive(Serialize)]
struct ServerStats {
    pub message: &'static str,
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct ListPaintingsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_order: Option<SortOrder>,
    pub artist_name: Option<String>,
}

/// Runs a store call, recording how long it took.
fn timed<T>(operation: &str, call: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = call();
    record_db_query(operation, start.elapsed());
    result
}

fn refresh_gallery_metrics(store: &GuardedGalleryStore) {
    match store.counts() {
        Ok(counts) => set_gallery_counts(counts),
        Err(err) => warn!("Could not refresh gallery metrics: {}", err),
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        message: WELCOME_MESSAGE,
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

// =============================================================================
// Paintings
// =============================================================================

async fn list_paintings(
    State(store): State<GuardedGalleryStore>,
    params: Result<Query<ListPaintingsParams>, QueryRejection>,
) -> Result<Json<Page<ResolvedPainting>>, ApiError> {
    let Query(params) = params?;
    let query = PaintingListQuery::new(
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        params.sort_order.unwrap_or_default(),
        params.artist_name,
    )?;

    timed("list_paintings", || store.list_paintings(&query))
        .map(Json)
        .map_err(|err| ApiError::from_gallery(err, "list_paintings", "Failed to fetch paintings"))
}

async fn get_painting(
    State(store): State<GuardedGalleryStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ResolvedPainting>, ApiError> {
    let Path(id) = id?;
    timed("get_painting", || store.get_painting(id))
        .map(Json)
        .map_err(|err| ApiError::from_gallery(err, "get_painting", "Failed to fetch painting"))
}

async fn create_painting(
    State(store): State<GuardedGalleryStore>,
    body: Result<Json<NewPainting>, JsonRejection>,
) -> Result<(StatusCode, Json<ResolvedPainting>), ApiError> {
    let Json(painting) = body?;
    let created = timed("create_painting", || store.create_painting(painting)).map_err(|err| {
        ApiError::from_gallery(err, "create_painting", "Failed to create painting")
    })?;
    refresh_gallery_metrics(&store);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_painting(
    State(store): State<GuardedGalleryStore>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<PaintingUpdate>, JsonRejection>,
) -> Result<Json<ResolvedPainting>, ApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    timed("update_painting", || store.update_painting(id, update))
        .map(Json)
        .map_err(|err| ApiError::from_gallery(err, "update_painting", "Failed to update painting"))
}

async fn delete_painting(
    State(store): State<GuardedGalleryStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedPainting>, ApiError> {
    let Path(id) = id?;
    let deleted = timed("delete_painting", || store.delete_painting(id)).map_err(|err| {
        ApiError::from_gallery(err, "delete_painting", "Failed to delete painting")
    })?;
    refresh_gallery_metrics(&store);
    Ok(Json(deleted))
}

// =============================================================================
// Artists and museums
// =============================================================================

async fn get_artist(
    State(store): State<GuardedGalleryStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Artist>, ApiError> {
    let Path(id) = id?;
    timed("get_artist", || store.get_artist(id))
        .map(Json)
        .map_err(|err| ApiError::from_gallery(err, "get_artist", "Failed to fetch artist"))
}

async fn create_artist(
    State(store): State<GuardedGalleryStore>,
    body: Result<Json<NewArtist>, JsonRejection>,
) -> Result<(StatusCode, Json<Artist>), ApiError> {
    let Json(artist) = body?;
    let created = timed("create_artist", || store.create_artist(artist))
        .map_err(|err| ApiError::from_gallery(err, "create_artist", "Failed to create artist"))?;
    refresh_gallery_metrics(&store);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_museum(
    State(store): State<GuardedGalleryStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Museum>, ApiError> {
    let Path(id) = id?;
    timed("get_museum", || store.get_museum(id))
        .map(Json)
        .map_err(|err| ApiError::from_gallery(err, "get_museum", "Failed to fetch museum"))
}

async fn create_museum(
    State(store): State<GuardedGalleryStore>,
    body: Result<Json<NewMuseum>, JsonRejection>,
) -> Result<(StatusCode, Json<Museum>), ApiError> {
    let Json(museum) = body?;
    let created = timed("create_museum", || store.create_museum(museum))
        .map_err(|err| ApiError::from_gallery(err, "create_museum", "Failed to create museum"))?;
    refresh_gallery_metrics(&store);
    Ok((StatusCode::CREATED, Json(created)))
}

pub fn make_app(config: ServerConfig, gallery_store: GuardedGalleryStore) -> Router {
    let state = ServerState {
        config,
        start_time: Instant::now(),
        gallery_store,
        hash: env!("GIT_HASH").to_owned(),
    };

    Router::new()
        .route("/", get(home))
        .route("/paintings", get(list_paintings).post(create_painting))
        .route(
            "/paintings/{id}",
            get(get_painting).put(update_painting).delete(delete_painting),
        )
        .route("/artists", post(create_artist))
        .route("/artists/{id}", get(get_artist))
        .route("/museums", post(create_museum))
        .route("/museums/{id}", get(get_museum))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

pub async fn run_server(
    gallery_store: GuardedGalleryStore,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    metrics_port: u16,
) -> Result<()> {
    refresh_gallery_metrics(&gallery_store);

    let config = ServerConfig {
        requests_logging_level,
        port,
        metrics_port,
    };
    let app = make_app(config, gallery_store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    let metrics_server =
        tokio::spawn(async move { axum::serve(metrics_listener, make_metrics_app()).await });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    metrics_server.abort();
    Ok(())
}
