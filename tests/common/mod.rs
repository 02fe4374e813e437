#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};

use pflix_api::{
    api::{create_router, AppState},
    auth::JwtConfig,
    error::{AppError, AppResult},
    models::{ContentKind, DiscoverParams},
    services::catalog::CatalogProvider,
};

pub const UNAVAILABLE: &str = "Catalog temporarily unavailable";

/// Deterministic catalog: ids are derived from the arguments so tests can
/// tell which operation produced an item.
pub struct StubCatalog {
    failing: bool,
}

impl StubCatalog {
    pub fn healthy() -> Self {
        Self { failing: false }
    }

    pub fn failing() -> Self {
        Self { failing: true }
    }

    fn respond(&self, body: Value) -> AppResult<Value> {
        if self.failing {
            return Err(AppError::ServiceUnavailable(UNAVAILABLE.to_string()));
        }
        Ok(body)
    }
}

fn item(id: i64, vote: f64) -> Value {
    json!({
        "id": id,
        "title": format!("Title {}", id),
        "poster_path": format!("/{}.jpg", id),
        "vote_average": vote
    })
}

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn discover(&self, params: &DiscoverParams) -> AppResult<Value> {
        self.respond(json!({
            "kind": params.kind,
            "genre": params.genre,
            "year": params.year,
            "sort_by": params.sort_by,
            "page": params.page,
            "results": []
        }))
    }

    async fn trending(&self, kind: ContentKind, page: u32) -> AppResult<Value> {
        let base = match kind {
            ContentKind::Movie => 100,
            ContentKind::Tv => 200,
        };
        self.respond(json!({
            "kind": kind,
            "page": page,
            "results": [item(base, 8.0), item(base + 1, 7.0), item(base + 2, 6.0), item(base + 3, 5.0)]
        }))
    }

    async fn search(&self, query: &str, kind: ContentKind, page: u32) -> AppResult<Value> {
        self.respond(json!({ "query": query, "kind": kind, "page": page, "results": [] }))
    }

    async fn details(&self, id: i64, kind: ContentKind) -> AppResult<Value> {
        self.respond(json!({ "id": id, "kind": kind, "credits": {}, "videos": {}, "similar": {} }))
    }

    async fn similar(&self, id: i64, _kind: ContentKind, page: u32) -> AppResult<Value> {
        self.respond(json!({ "page": page, "results": [item(id + 1, 7.5), item(id + 2, 7.0)] }))
    }

    async fn by_genre(&self, genre_id: i64, kind: ContentKind, page: u32) -> AppResult<Value> {
        self.respond(json!({
            "kind": kind,
            "page": page,
            "results": [item(genre_id * 1000, 9.0), item(genre_id * 1000 + 1, 8.0)]
        }))
    }

    async fn watch_providers(&self, id: i64, _kind: ContentKind) -> AppResult<Value> {
        self.respond(json!({ "id": id, "results": { "US": { "flatrate": [] } } }))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        expiry_hours: 1,
    }
}

pub fn server_with(catalog: StubCatalog) -> TestServer {
    let state = AppState::in_memory(Arc::new(catalog), jwt_config());
    let app = create_router(state, "http://localhost:5173");
    TestServer::new(app).unwrap()
}

pub fn test_server() -> TestServer {
    server_with(StubCatalog::healthy())
}

/// Registers a fresh account and returns its bearer token
pub async fn register(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/auth/register")
        .json(&json!({ "email": email, "password": "secret123", "name": "Test User" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["accessToken"]
        .as_str()
        .unwrap()
        .to_string()
}

pub fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}
