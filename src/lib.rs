pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod spotify;
pub mod state;
pub mod submissions;
pub mod telemetry;

use axum::{Router, http::HeaderValue};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::PgRepository;
use crate::spotify::{SpotifyClient, SpotifySettings};
use crate::state::AppState;

/// Router with CORS restricted to the configured frontend origin.
pub fn app(state: AppState) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(&state.config.frontend_origin)?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Ok(routes::routes(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

pub async fn run(config: config::Config) -> anyhow::Result<()> {
    telemetry::init_tracing(&config.rust_log, &config.rust_log_format);

    let playlist = config.playlist_metadata(|key| std::env::var(key).ok())?;
    let spotify = SpotifyClient::new(SpotifySettings::from_config(&config))?;

    let pool = db::init_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    let repository = Arc::new(PgRepository::new(pool));

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, playlist, spotify, repository.clone(), repository)?;
    let app = app(state)?;

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
