//! Stateless relay between the ticket form/portal and ClickUp.
//!
//!
//!
//! # Surface
//! - One route, three verbs: `GET /tickets` lists, `POST /tickets` creates,
//!   `OPTIONS` answers CORS preflight
//! - Anything else gets a 405 envelope
//! - CORS is pinned to the single origin the frontend is served from
//!
//!
//!
//! # Behavior
//!
//! - Every response is a JSON envelope with a boolean `success`
//! - Upstream ClickUp failures are wrapped and forwarded as 500 with the
//!   original status and body preserved in `details`
//! - Missing `CLICKUP_API_TOKEN`/`CLICKUP_LIST_ID` is answered per request
//!   with a 500 envelope instead of aborting the process, so a bad deploy
//!   shows up in responses
//! - No state survives a request; the only shared pieces are the config and
//!   one reqwest client

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, CONTENT_TYPE, USER_AGENT},
    },
    routing::get,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use routes::{create_ticket, list_tickets, method_not_allowed};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let origin = state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .expect("Environment misconfigured!");

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT, USER_AGENT])
        .max_age(Duration::from_secs(86400));

    Router::new()
        .route(
            "/tickets",
            get(list_tickets)
                .post(create_ticket)
                .fallback(method_not_allowed),
        )
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new();

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
