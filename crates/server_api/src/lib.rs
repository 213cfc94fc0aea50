use std::time::Duration;

use shared::{
    domain::{FormField, SessionId, UserRecord},
    error::ApiError,
    protocol::{SessionCreated, SessionView},
};
use tracing::{info, warn};

pub mod directory;
pub mod form_session;
pub mod sessions;

pub use directory::UserDirectory;
pub use form_session::{FormSession, FormSessionError, Phase};
pub use sessions::{SessionError, SessionRegistry};

#[derive(Clone, Default)]
pub struct ApiContext {
    pub sessions: SessionRegistry,
    pub directory: UserDirectory,
}

impl ApiContext {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: SessionRegistry::new(max_sessions, idle_ttl),
            directory: UserDirectory,
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::new(err.code(), err.to_string())
    }
}

pub fn list_users(ctx: &ApiContext) -> Vec<UserRecord> {
    ctx.directory.list()
}

pub async fn open_session(ctx: &ApiContext) -> Result<SessionCreated, ApiError> {
    let (session_id, view) = ctx.sessions.open().await.map_err(|e| {
        warn!(error = %e, "refused to open form session");
        ApiError::from(e)
    })?;
    let open_sessions = ctx.sessions.len().await;
    info!(%session_id, open_sessions, "form session opened");
    Ok(SessionCreated { session_id, view })
}

pub async fn session_view(ctx: &ApiContext, session_id: SessionId) -> Result<SessionView, ApiError> {
    let view = ctx.sessions.view(session_id).await?;
    Ok(SessionView { session_id, view })
}

pub async fn edit_session_field(
    ctx: &ApiContext,
    session_id: SessionId,
    field: &str,
    value: String,
) -> Result<SessionView, ApiError> {
    let field = field.parse::<FormField>()?;
    let view = ctx
        .sessions
        .edit_field(session_id, field, value)
        .await
        .map_err(|e| rejected(session_id, "edit", e))?;
    Ok(SessionView { session_id, view })
}

pub async fn submit_session(ctx: &ApiContext, session_id: SessionId) -> Result<SessionView, ApiError> {
    let view = ctx
        .sessions
        .submit(session_id)
        .await
        .map_err(|e| rejected(session_id, "submit", e))?;
    info!(%session_id, "form submitted");
    Ok(SessionView { session_id, view })
}

pub async fn reset_session(ctx: &ApiContext, session_id: SessionId) -> Result<SessionView, ApiError> {
    let view = ctx
        .sessions
        .reset(session_id)
        .await
        .map_err(|e| rejected(session_id, "reset", e))?;
    info!(%session_id, "form reset");
    Ok(SessionView { session_id, view })
}

pub async fn close_session(ctx: &ApiContext, session_id: SessionId) -> Result<(), ApiError> {
    ctx.sessions
        .close(session_id)
        .await
        .map_err(|e| rejected(session_id, "close", e))?;
    info!(%session_id, "form session closed");
    Ok(())
}

fn rejected(session_id: SessionId, action: &str, err: SessionError) -> ApiError {
    warn!(%session_id, action, error = %err, "form transition rejected");
    err.into()
}
