//! Per-browser sessions: cookie handling, stores, and the request middleware.
//!
//! # Design
//! A session is identified by a random UUID in a cookie and stored as plain
//! `SessionData`. The middleware loads it before every request, rebuilds a
//! live `TodoLists` for the handler, and writes the records back afterwards.
//! Nothing typed survives between requests; only the records do.
//!
//! Two requests racing on the same session each work on their own copy, and
//! whichever finishes last is the one that is kept.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use todos_core::{TodoListRecord, TodoLists};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::AppError;
use crate::flash::Flash;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// What a session persists between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub todo_lists: Vec<TodoListRecord>,
    #[serde(default)]
    pub next_id: Option<u64>,
    #[serde(default)]
    pub flash: Vec<Flash>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage for session data keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session. Expired sessions are reported as absent.
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError>;

    async fn save(&self, id: &SessionId, data: SessionData) -> Result<(), SessionError>;
}

type SessionMap = HashMap<SessionId, SessionData>;

/// Sessions held in process memory; lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<SessionMap>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id)
            .filter(|data| !data.is_expired(Utc::now()))
            .cloned())
    }

    async fn save(&self, id: &SessionId, data: SessionData) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, data| !data.is_expired(now));
        sessions.insert(*id, data);
        Ok(())
    }
}

/// Sessions kept in memory and snapshotted to one JSON file after each write.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    sessions: RwLock<SessionMap>,
}

impl FileSessionStore {
    /// Open the store at `path`, loading any existing snapshot.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let sessions = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => SessionMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), sessions = sessions.len(), "session file loaded");
        Ok(Self {
            path,
            sessions: RwLock::new(sessions),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_snapshot(&self, sessions: &SessionMap) -> Result<(), SessionError> {
        let bytes = serde_json::to_vec_pretty(sessions)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id)
            .filter(|data| !data.is_expired(Utc::now()))
            .cloned())
    }

    async fn save(&self, id: &SessionId, data: SessionData) -> Result<(), SessionError> {
        // held across the write so snapshots land in order
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, data| !data.is_expired(now));
        sessions.insert(*id, data);
        self.write_snapshot(&sessions).await
    }
}

/// The live session of the current request.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    lists: TodoLists,
    incoming_flash: Vec<Flash>,
    pending_flash: Vec<Flash>,
}

impl Session {
    fn restore(id: SessionId, data: Option<SessionData>) -> Self {
        let Some(data) = data else {
            return Self::fresh(id);
        };
        let lists = match TodoLists::from_records(data.todo_lists, data.next_id) {
            Ok(lists) => lists,
            Err(e) => {
                tracing::warn!(session = %id, error = %e, "discarding unreadable todo lists");
                TodoLists::new()
            }
        };
        Self {
            id,
            lists,
            incoming_flash: data.flash,
            pending_flash: Vec::new(),
        }
    }

    fn fresh(id: SessionId) -> Self {
        Self {
            id,
            lists: TodoLists::new(),
            incoming_flash: Vec::new(),
            pending_flash: Vec::new(),
        }
    }

    pub fn lists(&self) -> &TodoLists {
        &self.lists
    }

    pub fn lists_mut(&mut self) -> &mut TodoLists {
        &mut self.lists
    }

    /// Queue a message for the next rendered page.
    pub fn flash(&mut self, flash: Flash) {
        self.pending_flash.push(flash);
    }

    /// Messages to show on the page being rendered now. Draining them here
    /// keeps them from showing up again on the following request.
    pub fn take_flash(&mut self) -> Vec<Flash> {
        let mut messages = std::mem::take(&mut self.incoming_flash);
        messages.append(&mut self.pending_flash);
        messages
    }

    /// Messages not yet shown on a page stay queued for the next one.
    fn into_data(self, ttl: chrono::Duration) -> SessionData {
        let mut flash = self.incoming_flash;
        flash.extend(self.pending_flash);
        SessionData {
            todo_lists: self.lists.to_records(),
            next_id: Some(self.lists.next_id()),
            flash,
            expires_at: Utc::now() + ttl,
        }
    }
}

/// Shared handle to the request's session, placed in request extensions.
#[derive(Debug, Clone)]
pub struct SessionHandle(Arc<Mutex<Session>>);

impl SessionHandle {
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().await
    }
}

/// Find the session id in the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Build the `Set-Cookie` value carrying the session id.
pub fn session_cookie(id: SessionId, config: &SessionConfig) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        config.cookie_name,
        id,
        config.ttl.num_seconds()
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Load the session before the handler runs and persist it afterwards.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let config = &state.session_config;
    let known = session_id_from_headers(request.headers(), &config.cookie_name);
    let data = match known {
        Some(id) => state.sessions.load(&id).await?,
        None => None,
    };
    let id = match (&data, known) {
        (Some(_), Some(id)) => id,
        _ => SessionId::generate(),
    };
    tracing::debug!(session = %id, resumed = data.is_some(), "session loaded");

    let handle = SessionHandle(Arc::new(Mutex::new(Session::restore(id, data))));
    request.extensions_mut().insert(handle.clone());

    let mut response = next.run(request).await;

    let session = match Arc::try_unwrap(handle.0) {
        Ok(mutex) => mutex.into_inner(),
        // a handler kept a clone alive; persist a snapshot of it
        Err(shared) => {
            let guard = shared.lock().await;
            Session {
                id: guard.id,
                lists: guard.lists.clone(),
                incoming_flash: guard.incoming_flash.clone(),
                pending_flash: guard.pending_flash.clone(),
            }
        }
    };
    state.sessions.save(&id, session.into_data(config.ttl)).await?;
    tracing::debug!(session = %id, "session saved");

    let cookie = HeaderValue::from_str(&session_cookie(id, config))
        .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))?;
    response.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use todos_core::{ListId, TodoId, TodoRecord};

    fn data_with_list(title: &str) -> SessionData {
        SessionData {
            todo_lists: vec![TodoListRecord {
                id: ListId::new(1),
                title: title.to_string(),
                todos: vec![TodoRecord {
                    id: TodoId::new(2),
                    title: "Milk".to_string(),
                    done: false,
                }],
            }],
            next_id: Some(3),
            flash: Vec::new(),
            expires_at: Utc::now() + chrono::Duration::days(1),
        }
    }

    #[test]
    fn session_id_round_trips_through_display() {
        let id = SessionId::generate();
        assert_eq!(id.to_string().parse::<SessionId>().unwrap(), id);
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[test]
    fn cookie_is_found_among_others() {
        let id = SessionId::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; todos-session-id={id}; lang=en")).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers, "todos-session-id"), Some(id));
        assert_eq!(session_id_from_headers(&headers, "other"), None);
    }

    #[test]
    fn malformed_cookie_value_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("todos-session-id=garbage"));
        assert_eq!(session_id_from_headers(&headers, "todos-session-id"), None);
    }

    #[test]
    fn cookie_attributes_follow_config() {
        let id = SessionId::generate();
        let mut config = SessionConfig::default();
        let cookie = session_cookie(id, &config);
        assert!(cookie.starts_with(&format!("todos-session-id={id}; Path=/;")));
        assert!(cookie.contains("Max-Age=2678400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
        config.secure = true;
        assert!(session_cookie(id, &config).ends_with("; Secure"));
    }

    #[test]
    fn flash_is_shown_once() {
        let mut data = data_with_list("Groceries");
        data.flash = vec![Flash::success("earlier")];
        let mut session = Session::restore(SessionId::generate(), Some(data));
        session.flash(Flash::error("now"));
        let shown = session.take_flash();
        assert_eq!(shown, vec![Flash::success("earlier"), Flash::error("now")]);
        assert!(session.take_flash().is_empty());
        assert!(session.into_data(chrono::Duration::days(1)).flash.is_empty());
    }

    #[test]
    fn unrendered_flash_is_carried_to_the_next_request() {
        let mut session = Session::restore(SessionId::generate(), None);
        session.flash(Flash::success("created"));
        let data = session.into_data(chrono::Duration::days(1));
        assert_eq!(data.flash, vec![Flash::success("created")]);

        let mut session = Session::restore(SessionId::generate(), Some(data));
        session.flash(Flash::success("toggled"));
        let data = session.into_data(chrono::Duration::days(1));
        assert_eq!(
            data.flash,
            vec![Flash::success("created"), Flash::success("toggled")]
        );
    }

    #[test]
    fn unreadable_records_start_an_empty_session() {
        let data = data_with_list("   ");
        let session = Session::restore(SessionId::generate(), Some(data));
        assert!(session.lists().is_empty());
    }

    #[tokio::test]
    async fn memory_store_hides_expired_sessions() {
        let store = MemorySessionStore::new();
        let live = SessionId::generate();
        let stale = SessionId::generate();
        store.save(&live, data_with_list("Live")).await.unwrap();
        let mut expired = data_with_list("Stale");
        expired.expires_at = Utc::now() - chrono::Duration::seconds(1);
        store.save(&stale, expired).await.unwrap();

        assert!(store.load(&live).await.unwrap().is_some());
        assert!(store.load(&stale).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        let id = SessionId::generate();
        {
            let store = FileSessionStore::open(&path).await.unwrap();
            store.save(&id, data_with_list("Groceries")).await.unwrap();
        }
        let reopened = FileSessionStore::open(&path).await.unwrap();
        let data = reopened.load(&id).await.unwrap().unwrap();
        assert_eq!(data.todo_lists[0].title, "Groceries");
        assert_eq!(data.next_id, Some(3));
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(
            FileSessionStore::open(&path).await,
            Err(SessionError::Json(_))
        ));
    }
}
