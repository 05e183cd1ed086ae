use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use shared::{
    domain::{ArtworkId, ArtworkRecord, ProfileSummary, UserId},
    error::{ApiError, ErrorCode},
    protocol::{
        ArtworkList, ArtworkPatch, CreateArtworkRequest, CreateProfileRequest, ListArtworksQuery,
        UpdateStatusRequest,
    },
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::ApiContext;
use app_state::AppState;
use config::{load_settings, prepare_database_url};

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let state = AppState {
        api: ApiContext {
            storage,
            max_list_limit: settings.max_list_limit,
        },
    };
    let app = build_router(Arc::new(state), settings.request_body_limit_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "artwork backend listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/profiles", post(http_create_profile))
        .route("/profiles/:user_id", get(http_load_profile))
        .route("/artworks", get(http_list_artworks).post(http_create_artwork))
        .route(
            "/artworks/:artwork_id",
            patch(http_update_artwork).delete(http_delete_artwork),
        )
        .route("/artworks/:artwork_id/status", put(http_update_status))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .with_state(state)
}

fn http_error(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(message = %err.message, "request failed");
    } else {
        warn!(code = ?err.code, message = %err.message, "request rejected");
    }
    (status, Json(err))
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| http_error(ApiError::internal(e.to_string())))?;
    Ok("ok")
}

async fn http_create_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<Json<ProfileSummary>, HttpError> {
    let profile = api::create_profile(&state.api, &req.display_name)
        .await
        .map_err(http_error)?;
    info!(user_id = profile.user_id.0, "profile ready");
    Ok(Json(profile))
}

async fn http_load_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<ProfileSummary>, HttpError> {
    api::load_profile(&state.api, UserId(user_id))
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_list_artworks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListArtworksQuery>,
) -> Result<Json<ArtworkList>, HttpError> {
    api::list_artworks(&state.api, &query)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_create_artwork(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateArtworkRequest>,
) -> Result<(StatusCode, Json<ArtworkRecord>), HttpError> {
    let artwork = api::create_artwork(&state.api, req)
        .await
        .map_err(http_error)?;
    info!(artwork_id = artwork.id.0, status = %artwork.status, "artwork created");
    Ok((StatusCode::CREATED, Json(artwork)))
}

async fn http_update_artwork(
    State(state): State<Arc<AppState>>,
    Path(artwork_id): Path<i64>,
    Json(patch): Json<ArtworkPatch>,
) -> Result<Json<ArtworkRecord>, HttpError> {
    api::update_artwork(&state.api, ArtworkId(artwork_id), patch)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_update_status(
    State(state): State<Arc<AppState>>,
    Path(artwork_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<StatusCode, HttpError> {
    api::update_artwork_status(&state.api, ArtworkId(artwork_id), req.status)
        .await
        .map_err(http_error)?;
    info!(artwork_id, status = %req.status, "artwork status updated");
    Ok(StatusCode::NO_CONTENT)
}

async fn http_delete_artwork(
    State(state): State<Arc<AppState>>,
    Path(artwork_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    api::delete_artwork(&state.api, ArtworkId(artwork_id))
        .await
        .map_err(http_error)?;
    info!(artwork_id, "artwork deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
