//! Math Solver Agent Server
//!
//! Axum server exposing the math problem solver over REST and WebSocket,
//! with a static file fallback for the web frontend.

mod handlers;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (GROQ_API_KEY, BIND_ADDR, RUST_LOG)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional server-side default key. Viewers may still supply their own
    // per request; without either, solves are rejected up front.
    let default_api_key = std::env::var("GROQ_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    if default_api_key.is_some() {
        tracing::info!("Default Groq API key configured");
    } else {
        tracing::warn!("No GROQ_API_KEY set; viewers must supply their own key");
    }

    let state = AppState::new(default_api_key);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/config", get(handlers::get_config))
        .route("/api/models", get(handlers::list_models))
        .route("/api/examples", get(handlers::list_examples))
        .route("/api/session", post(handlers::create_session))
        .route("/api/session/{id}", get(handlers::get_session))
        .route("/api/solve", post(handlers::solve_handler))
        .route("/api/solve/stream", get(handlers::solve_stream_handler))
        .fallback_service(ServeDir::new("static"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    tracing::info!("Math solver server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
