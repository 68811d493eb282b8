mod auth;
mod chat;
mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod payment;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::ChatClient;
use crate::config::Config;
use crate::db::{bootstrap, create_pool};
use crate::payment::LogNotifier;
use crate::routes::build_router;
use crate::screening::score::LexicalScorer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting resume screening API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize PostgreSQL and apply the schema + seed jobs
    let db = create_pool(&config.database_url).await?;
    bootstrap(&db).await?;

    // Chat backend client (Ollama-compatible generate endpoint)
    let chat = ChatClient::new(config.chat_backend_url.clone(), config.chat_model.clone());
    info!(
        "Chat backend: {} (model: {})",
        config.chat_backend_url, config.chat_model
    );

    // Default scorer — deterministic lexical blend; swapped in AppState if a
    // semantic backend lands.
    let scorer = Arc::new(LexicalScorer);

    // Admin notifications. The default renders and logs; deployments wire a
    // real transport behind the trait.
    let notifier = Arc::new(LogNotifier);

    let state = AppState {
        db,
        config: config.clone(),
        scorer,
        chat,
        notifier,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
