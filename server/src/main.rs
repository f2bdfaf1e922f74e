mod config;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use scene::Document;

#[tokio::main]
async fn main() {
    // A missing .env is fine; real deployments set the environment directly.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("no .env loaded: {e}");
    }
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env().expect("invalid configuration");
    tracing::info!(users = config.credentials.len(), "credentials loaded");

    let (registry, _registry_task) = services::registry::spawn_registry(Document::initial(), config.registry_buffer);
    let state = state::AppState::new(registry, Arc::new(config.credentials), config.client_buffer);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("failed to bind");

    tracing::info!(bind = %config.bind, "playhouse listening");
    axum::serve(listener, app).await.expect("server failed");
}
