use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Router, middleware, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::{api, config::Config, error, info, management::KvStore};

/// Shared state handed to every handler: the immutable configuration and
/// the key-value store, the only mutable shared resource.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn KvStore>,
}

/// Assembles the full route table.
///
/// The allow-listed paths (health, credential setup, OAuth initiation and
/// callback) bypass the gate; everything else, including the fallback, sits
/// behind it. All responses carry permissive CORS headers and preflight
/// OPTIONS is answered before any handler runs.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(api::dashboard))
        .route("/now-playing", get(api::now_playing))
        .route("/recent", get(api::recent))
        .fallback(api::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), api::guard));

    let public = Router::new()
        .route("/health", get(api::health))
        .route("/credentials", get(api::credentials_page))
        .route("/setup", get(api::setup_page).post(api::setup))
        .route("/callback", get(api::callback));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, addr_override: Option<String>) {
    let addr_str = addr_override.unwrap_or_else(|| state.config.server_address.clone());
    let app = build_router(state);

    let addr = match SocketAddr::from_str(&addr_str) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };

    info!("Listening on {}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
