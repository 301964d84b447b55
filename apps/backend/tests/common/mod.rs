//! Common test utilities for integration tests.
//!
//! Tests run against the in-memory store with a manual clock, so day
//! boundaries can be crossed without waiting. `TestContext::postgres`
//! builds the same router on a real database for the ignored suites.

pub mod fixtures;

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use manabu_backend::db::{MemoryStore, PgStore, ProgressStore};
use manabu_backend::{build_router, AppState};
use manabu_core::ManualClock;

/// Test context holding the store, the clock and the router.
pub struct TestContext {
    pub store: Arc<dyn ProgressStore>,
    pub clock: Arc<ManualClock>,
    app: Router,
}

impl TestContext {
    /// In-memory context with the clock at [`start`].
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Context backed by the in-memory store, keeping a handle to it.
    pub fn with_memory(store: Arc<MemoryStore>) -> Self {
        Self::with_store(store)
    }

    /// Context backed by PostgreSQL.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or the connection fails.
    pub async fn postgres() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let store = PgStore::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        store
            .run_migrations()
            .await
            .expect("Failed to run migrations");

        Self::with_store(Arc::new(store))
    }

    fn with_store(store: Arc<dyn ProgressStore>) -> Self {
        let clock = Arc::new(ManualClock::new(start()));
        let state = AppState::new(store.clone(), clock.clone());
        let app = build_router(state, CorsLayer::permissive());

        Self { store, clock, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).unwrap()
    }

    /// Register a learner through the API and return its id and token.
    pub async fn register(&self, server: &TestServer, name: Option<&str>) -> (Uuid, String) {
        let response = server
            .post("/api/learners/register")
            .json(&fixtures::register_request(name))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let learner_id = Uuid::parse_str(body["learner_id"].as_str().unwrap()).unwrap();
        let token = body["token"].as_str().unwrap().to_string();
        (learner_id, token)
    }

    /// Move the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        self.clock.advance(Duration::days(days));
    }

    /// Format authorization header.
    pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
        (
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        )
    }
}

/// Fixed starting instant for every test clock.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 15, 10, 30, 0).unwrap()
}
