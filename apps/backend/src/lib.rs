pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::ProgressStore;
use manabu_core::{Clock, SystemClock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProgressStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn ProgressStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = db::connect(&config.store).await?;
    let state = AppState::new(store, Arc::new(SystemClock));

    let app = build_router(state, cors_layer(config.cors_origin.as_deref())?);

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// All routes with auth, tracing and CORS applied.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let protected_routes = Router::new()
        // Learner routes
        .route("/api/learners/me", get(routes::learners::me))
        // Progress routes
        .route("/api/progress", get(routes::progress::overview))
        .route("/api/progress/update", post(routes::progress::update))
        .route("/api/progress/streak", get(routes::progress::streak))
        .route("/api/progress/activity", get(routes::progress::activity))
        .route(
            "/api/progress/quiz",
            get(routes::progress::quiz_history).post(routes::progress::record_quiz),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/learners/register", post(routes::learners::register))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Restrict CORS to one origin when configured, otherwise allow any.
pub fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };

    Ok(CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
        .expose_headers(Any))
}

async fn health_check() -> &'static str {
    "OK"
}
