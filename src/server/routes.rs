//! HTTP front door
//!
//! Every path accepts a WebSocket upgrade. Plain requests for `/`,
//! `/index.html` and `/script.js` get the bundled client; anything else
//! gets `404 Error.`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;

use crate::broadcast::Broadcaster;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const SCRIPT_JS: &str = include_str!("../../assets/script.js");

const NOT_FOUND_BODY: &str = "Error.";

type Upgrade = Result<WebSocketUpgrade, WebSocketUpgradeRejection>;

#[derive(Default)]
pub(crate) struct Counters {
    pub total_connections: AtomicU64,
    pub active_connections: AtomicU64,
    pub rejected_connections: AtomicU64,
    pub pages_served: AtomicU64,
}

/// State shared by every request handler
#[derive(Clone)]
pub(crate) struct AppState {
    pub config: Arc<ServerConfig>,
    pub broadcaster: Arc<Broadcaster>,
    pub next_session_id: Arc<AtomicU64>,
    pub connection_semaphore: Option<Arc<Semaphore>>,
    pub counters: Arc<Counters>,
}

/// Build the router serving sessions and the client page
pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/index.html", get(index_page))
        .route("/script.js", get(script))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root(
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    upgrade: Upgrade,
) -> Response {
    match upgrade {
        Ok(ws) => open_session(&state, peer_addr, ws),
        Err(_) => page(&state, Html(INDEX_HTML)),
    }
}

async fn index_page(State(state): State<AppState>) -> Response {
    page(&state, Html(INDEX_HTML))
}

async fn script(State(state): State<AppState>) -> Response {
    page(
        &state,
        ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], SCRIPT_JS),
    )
}

/// Any other path: sessions only
async fn fallback(
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    upgrade: Upgrade,
) -> Response {
    match upgrade {
        Ok(ws) => open_session(&state, peer_addr, ws),
        Err(_) => not_found(),
    }
}

fn page(state: &AppState, body: impl IntoResponse) -> Response {
    if !state.config.serve_client {
        return not_found();
    }
    state.counters.pages_served.fetch_add(1, Ordering::Relaxed);
    body.into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

fn open_session(state: &AppState, peer_addr: SocketAddr, ws: WebSocketUpgrade) -> Response {
    state.counters.total_connections.fetch_add(1, Ordering::Relaxed);

    // The permit lives as long as the session task
    let permit = match state.connection_semaphore {
        Some(ref sem) => match Arc::clone(sem).try_acquire_owned() {
            Ok(permit) => Some(permit),
            Err(_) => {
                state.counters.rejected_connections.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                return (StatusCode::SERVICE_UNAVAILABLE, NOT_FOUND_BODY).into_response();
            }
        },
        None => None,
    };

    let session_id = state.next_session_id.fetch_add(1, Ordering::Relaxed);

    tracing::debug!(
        session_id = session_id,
        peer = %peer_addr,
        "New connection"
    );

    let config = ServerConfig::clone(&state.config);
    let broadcaster = Arc::clone(&state.broadcaster);
    let counters = Arc::clone(&state.counters);

    ws.on_failed_upgrade(move |e| {
        tracing::debug!(session_id = session_id, error = %e, "Upgrade failed");
    })
    .on_upgrade(move |socket| async move {
        let _permit = permit;
        counters.active_connections.fetch_add(1, Ordering::Relaxed);

        let mut connection = Connection::new(session_id, peer_addr, config, broadcaster);
        if let Err(e) = connection.run(socket).await {
            tracing::debug!(
                session_id = session_id,
                error = %e,
                "Connection error"
            );
        }

        counters.active_connections.fetch_sub(1, Ordering::Relaxed);
        tracing::debug!(session_id = session_id, "Connection closed");
    })
}
