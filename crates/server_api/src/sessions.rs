use std::{collections::HashMap, sync::Arc, time::Duration};

use shared::{
    domain::{FormField, SessionId},
    error::ErrorCode,
    protocol::ViewState,
};
use thiserror::Error;
use tokio::{sync::Mutex, time::Instant};

use crate::form_session::{FormSession, FormSessionError};

pub const DEFAULT_MAX_SESSIONS: usize = 10_000;
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error("session limit of {0} reached")]
    LimitReached(usize),
    #[error(transparent)]
    Form(#[from] FormSessionError),
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::NotFound,
            SessionError::LimitReached(_) | SessionError::Form(_) => ErrorCode::Conflict,
        }
    }
}

struct Entry {
    form: FormSession,
    touched: Instant,
}

impl Entry {
    fn is_idle(&self, now: Instant, idle_ttl: Duration) -> bool {
        now.saturating_duration_since(self.touched) >= idle_ttl
    }
}

/// Owns every live `FormSession`, one per session id.
///
/// The lock is held for a single transition at a time, so two sessions never
/// observe each other and one session never sees a half-applied edit. A
/// session untouched for `idle_ttl` has ended and is treated as closed.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<SessionId, Entry>>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            max_sessions,
            idle_ttl,
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Live sessions, including idle ones not yet swept.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn open(&self) -> Result<(SessionId, ViewState), SessionError> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        if sessions.len() >= self.max_sessions {
            sessions.retain(|_, entry| !entry.is_idle(now, self.idle_ttl));
        }
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::LimitReached(self.max_sessions));
        }
        let mut id = SessionId::new_v4();
        while sessions.contains_key(&id) {
            id = SessionId::new_v4();
        }
        let form = FormSession::new();
        let view = form.current_view();
        sessions.insert(id, Entry { form, touched: now });
        Ok((id, view))
    }

    pub async fn view(&self, id: SessionId) -> Result<ViewState, SessionError> {
        self.with_session(id, |form| Ok(form.current_view())).await
    }

    pub async fn edit_field(
        &self,
        id: SessionId,
        field: FormField,
        value: String,
    ) -> Result<ViewState, SessionError> {
        self.with_session(id, |form| {
            form.edit_field(field, value)?;
            Ok(form.current_view())
        })
        .await
    }

    pub async fn submit(&self, id: SessionId) -> Result<ViewState, SessionError> {
        self.with_session(id, |form| {
            form.submit();
            Ok(form.current_view())
        })
        .await
    }

    pub async fn reset(&self, id: SessionId) -> Result<ViewState, SessionError> {
        self.with_session(id, |form| {
            form.reset();
            Ok(form.current_view())
        })
        .await
    }

    pub async fn close(&self, id: SessionId) -> Result<(), SessionError> {
        let now = Instant::now();
        match self.sessions.lock().await.remove(&id) {
            Some(entry) if !entry.is_idle(now, self.idle_ttl) => Ok(()),
            _ => Err(SessionError::NotFound(id)),
        }
    }

    async fn with_session<T>(
        &self,
        id: SessionId,
        apply: impl FnOnce(&mut FormSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        let idle = sessions
            .get(&id)
            .map(|entry| entry.is_idle(now, self.idle_ttl))
            .ok_or(SessionError::NotFound(id))?;
        if idle {
            sessions.remove(&id);
            return Err(SessionError::NotFound(id));
        }
        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        entry.touched = now;
        apply(&mut entry.form)
    }
}
