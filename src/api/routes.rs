use axum::{
    routing::get,
    Router,
    extract::State,
    Json,
};
use axum_extra::extract::Query;
use serde_json::{json, Value};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::api::models::{ListVideosQuery, TranscriptQuery, TranscriptResponse, VideoListing};
use crate::transcript::resolve;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/videos", get(list_videos_handler))
        .route("/transcript", get(transcript_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "listing_backend": state.config.listing_backend.as_str(),
    }))
}

async fn list_videos_handler(
    State(state): State<AppState>,
    Query(query): Query<ListVideosQuery>,
) -> Result<Json<VideoListing>> {
    let start_time = std::time::Instant::now();

    let items = state.lister.list_videos(query.max_items).await?;
    info!(
        backend = %state.lister.backend(),
        count = items.len(),
        elapsed = ?start_time.elapsed(),
        "listed videos"
    );

    Ok(Json(state.lister.listing(items)))
}

// Always 200: a missing transcript becomes the title fallback sentence.
async fn transcript_handler(
    State(state): State<AppState>,
    Query(query): Query<TranscriptQuery>,
) -> Json<TranscriptResponse> {
    let start_time = std::time::Instant::now();

    let result = resolve(state.transcripts.as_ref(), &query.video_id, &query.languages).await;
    info!(
        video_id = %query.video_id,
        has_transcript = result.has_transcript,
        elapsed = ?start_time.elapsed(),
        "resolved transcript"
    );

    Json(TranscriptResponse::compose(query, result))
}
