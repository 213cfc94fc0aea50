use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use server_api::{
    close_session, edit_session_field, list_users, open_session, reset_session, session_view,
    submit_session, ApiContext,
};
use shared::{
    domain::{SessionId, UserRecord},
    error::{ApiError, ErrorCode},
    protocol::{EditFieldRequest, SessionCreated, SessionView},
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let state = AppState {
        api: ApiContext::new(settings.max_sessions, settings.session_idle_ttl),
    };
    info!(
        max_sessions = state.api.sessions.max_sessions(),
        idle_ttl_secs = state.api.sessions.idle_ttl().as_secs(),
        "form sessions configured"
    );
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/users", get(http_list_users))
        .route("/api/users", get(http_list_users))
        .route("/sessions", post(http_open_session))
        .route(
            "/sessions/:session_id",
            get(http_session_view).delete(http_close_session),
        )
        .route("/sessions/:session_id/fields/:field", put(http_edit_field))
        .route("/sessions/:session_id/submit", post(http_submit))
        .route("/sessions/:session_id/reset", post(http_reset))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn http_error(err: ApiError) -> HttpError {
    (status_for(err.code), Json(err))
}

fn parse_session_id(raw: &str) -> Result<SessionId, HttpError> {
    raw.parse()
        .map_err(|_| http_error(ApiError::validation(format!("invalid session id '{raw}'"))))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_users(State(state): State<Arc<AppState>>) -> Json<Vec<UserRecord>> {
    Json(list_users(&state.api))
}

async fn http_open_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionCreated>), HttpError> {
    let created = open_session(&state.api).await.map_err(http_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn http_session_view(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, HttpError> {
    let session_id = parse_session_id(&session_id)?;
    let view = session_view(&state.api, session_id)
        .await
        .map_err(http_error)?;
    Ok(Json(view))
}

async fn http_edit_field(
    State(state): State<Arc<AppState>>,
    Path((session_id, field)): Path<(String, String)>,
    Json(req): Json<EditFieldRequest>,
) -> Result<Json<SessionView>, HttpError> {
    let session_id = parse_session_id(&session_id)?;
    let view = edit_session_field(&state.api, session_id, &field, req.value)
        .await
        .map_err(http_error)?;
    Ok(Json(view))
}

async fn http_submit(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, HttpError> {
    let session_id = parse_session_id(&session_id)?;
    let view = submit_session(&state.api, session_id)
        .await
        .map_err(http_error)?;
    Ok(Json(view))
}

async fn http_reset(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, HttpError> {
    let session_id = parse_session_id(&session_id)?;
    let view = reset_session(&state.api, session_id)
        .await
        .map_err(http_error)?;
    Ok(Json(view))
}

async fn http_close_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, HttpError> {
    let session_id = parse_session_id(&session_id)?;
    close_session(&state.api, session_id)
        .await
        .map_err(http_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
