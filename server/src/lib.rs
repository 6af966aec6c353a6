//! Web front end for session-backed todo lists.
//!
//! # Overview
//! An Axum router serving HTML pages and form posts. Each browser gets a
//! session cookie; the session middleware loads that session's todo lists
//! from a `SessionStore` before the handler runs and saves them afterwards.
//!
//! # Design
//! - Domain rules live in `todos-core`; handlers only validate input, call
//!   `TodoLists` operations, and pick a page or a redirect.
//! - `AppState` carries the store, the session settings and the compiled
//!   templates. There is no other shared state.
//! - The store is chosen by configuration: in memory by default, or a JSON
//!   file when `SESSION_STORE_PATH` is set.

pub mod config;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod session;
pub mod views;

use std::path::Path;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use config::{Config, SessionConfig};
pub use error::AppError;
pub use session::{FileSessionStore, MemorySessionStore, SessionError, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub session_config: Arc<SessionConfig>,
    pub views: Arc<views::Views>,
}

impl AppState {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        session_config: SessionConfig,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self {
            sessions,
            session_config: Arc::new(session_config),
            views: Arc::new(views::Views::new()?),
        })
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(session_config: SessionConfig) -> Result<Self, minijinja::Error> {
        Self::new(Arc::new(MemorySessionStore::new()), session_config)
    }
}

/// Open the session store named by `config`.
pub async fn open_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>, SessionError> {
    match &config.store_path {
        Some(path) => {
            let store = FileSessionStore::open(path).await?;
            tracing::info!(path = %store.path().display(), "using file session store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("using in-memory session store");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}

pub fn app(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/lists", get(handlers::show_lists).post(handlers::create_list))
        .route("/lists/new", get(handlers::new_list))
        .route("/lists/{list_id}", get(handlers::show_list))
        .route("/lists/{list_id}/todos", post(handlers::create_todo))
        .route(
            "/lists/{list_id}/todos/{todo_id}/toggle",
            post(handlers::toggle_todo),
        )
        .route(
            "/lists/{list_id}/todos/{todo_id}/destroy",
            post(handlers::destroy_todo),
        )
        .route("/lists/{list_id}/complete_all", post(handlers::complete_all))
        .route(
            "/lists/{list_id}/edit",
            get(handlers::edit_list).post(handlers::update_list),
        )
        .route("/lists/{list_id}/destroy", post(handlers::destroy_list))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_middleware,
        ))
        .nest_service("/public", ServeDir::new(public_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // without a signal handler, run until the process is killed
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
