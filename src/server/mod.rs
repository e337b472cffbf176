//! Web server: JSON API plus the single-page tutor UI

pub mod http;

use anyhow::{Context, Result};
use axum::{
    response::Html,
    routing::{get, post, put},
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::tutor::session::SessionController;
use crate::tutor::Tutor;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    pub tutor: Arc<Tutor>,
    pub sessions: Arc<SessionRegistry>,
}

impl ServerState {
    pub fn new(tutor: Arc<Tutor>, session_idle: Duration) -> Self {
        Self {
            tutor,
            sessions: Arc::new(SessionRegistry::new(session_idle)),
        }
    }
}

struct SessionEntry {
    controller: Arc<Mutex<SessionController>>,
    last_active: Instant,
}

/// Live learner sessions.
///
/// Each session sits behind its own mutex, so requests within one session
/// run one at a time while separate sessions proceed independently.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Open a new session, evicting idle ones first
    pub async fn create(&self, tutor: Arc<Tutor>) -> Uuid {
        self.evict_idle().await;

        let controller = SessionController::with_os_rng(tutor);
        let id = controller.id();
        self.sessions.write().await.insert(id, SessionEntry {
            controller: Arc::new(Mutex::new(controller)),
            last_active: Instant::now(),
        });
        info!(session = %id, "Session started");
        id
    }

    /// Look up a session and mark it active
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<SessionController>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_active = Instant::now();
        Some(entry.controller.clone())
    }

    /// End a session; returns false if it did not exist
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session = %id, "Session ended");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle longer than the timeout
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let timeout = self.idle_timeout;
        sessions.retain(|_, entry| entry.last_active.elapsed() < timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }
}

/// Build the application router
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_page))
        .route("/api/status", get(http::status_handler))
        .route("/api/sessions", post(http::create_session_handler))
        .route("/api/sessions/{id}", axum::routing::delete(http::end_session_handler))
        .route("/api/sessions/{id}/mode", put(http::select_mode_handler))
        .route("/api/sessions/{id}/answer", post(http::answer_handler))
        .route("/api/sessions/{id}/solution", post(http::solution_handler))
        .route("/api/sessions/{id}/reflection", post(http::reflection_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn start(config: &Config, host: &str, port: u16) -> Result<()> {
    // Data files must load before the server accepts anything
    let tutor = Arc::new(Tutor::from_config(config)?);
    let idle = config.server.session_idle();
    let state = ServerState::new(tutor.clone(), idle);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let app = router(state);

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("     Sustain Tutor Server Starting");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("✓ Knowledge chunks: {}", tutor.knowledge().len());
    println!("✓ Scenarios: {}", tutor.scenarios().len());
    println!(
        "✓ Generation: {} at {}",
        tutor.generator().backend_name(),
        config.generation.endpoint
    );
    match tutor.generator().health().await {
        Ok(()) => println!("✓ Generation server reachable"),
        Err(e) => {
            println!("⚠ Generation server not reachable yet: {}", e);
            println!("  Feedback requests will fail until it is up");
        }
    }
    println!();
    println!("🚀 Listening on http://{}", addr);
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Handler for the index page
async fn index_page() -> Html<&'static str> {
    Html(include_str!("index.html"))
}
