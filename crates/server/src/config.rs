use std::{fs, time::Duration};

use server_api::sessions::{DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub max_sessions: usize,
    pub session_idle_ttl: Duration,
    pub max_body_bytes: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle_ttl: DEFAULT_IDLE_TTL,
            max_body_bytes: 64 * 1024,
            log_filter: "info".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string("server.toml").ok();
    resolve_settings(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml`, then environment. Later layers win.
pub(crate) fn resolve_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<toml::Table>(raw) {
            if let Some(v) = file_cfg.get("bind_addr").and_then(|v| v.as_str()) {
                settings.server_bind = v.to_string();
            }
            if let Some(v) = file_cfg.get("max_sessions").and_then(as_usize) {
                settings.max_sessions = v;
            }
            if let Some(v) = file_cfg.get("session_idle_secs").and_then(as_usize) {
                settings.session_idle_ttl = Duration::from_secs(v as u64);
            }
            if let Some(v) = file_cfg.get("max_body_bytes").and_then(as_usize) {
                settings.max_body_bytes = v;
            }
            if let Some(v) = file_cfg.get("log_filter").and_then(|v| v.as_str()) {
                settings.log_filter = v.to_string();
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__MAX_SESSIONS").as_deref().and_then(parse_positive) {
        settings.max_sessions = v;
    }
    if let Some(v) = env("APP__SESSION_IDLE_SECS").as_deref().and_then(parse_positive) {
        settings.session_idle_ttl = Duration::from_secs(v as u64);
    }
    if let Some(v) = env("APP__MAX_BODY_BYTES").as_deref().and_then(parse_positive) {
        settings.max_body_bytes = v;
    }

    if let Some(v) = env("RUST_LOG") {
        if !v.trim().is_empty() {
            settings.log_filter = v;
        }
    }

    settings
}

// Zero would refuse every session or body, so it counts as unset.
fn as_usize(value: &toml::Value) -> Option<usize> {
    value
        .as_integer()
        .and_then(|v| usize::try_from(v).ok())
        .filter(|v| *v > 0)
}

fn parse_positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
