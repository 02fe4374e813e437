mod common;

use axum::http::{header, HeaderValue, StatusCode};
use serde_json::{json, Value};

use common::{bearer, register, server_with, test_server, StubCatalog, UNAVAILABLE};

#[tokio::test]
async fn test_health_check() {
    let server = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let server = test_server();

    let response = server
        .get("/health")
        .add_header(
            header::HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-me-42"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trace-me-42");

    let response = server.get("/health").await;
    let generated = response.header("x-request-id");
    assert!(!generated.is_empty());
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_register_login_and_profile() {
    let server = test_server();

    let response = server
        .post("/auth/register")
        .json(&json!({ "email": "Ana@Example.com", "password": "popcorn", "name": "Ana" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert!(body["user"].get("passwordHash").is_none());

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "ana@example.com", "password": "popcorn" }))
        .await;
    response.assert_status_ok();
    let token = response.json::<Value>()["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = bearer(server.get("/auth/profile"), &token).await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["name"], "Ana");
    assert!(profile["createdAt"].is_string());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = test_server();
    register(&server, "dup@example.com").await;

    let response = server
        .post("/auth/register")
        .json(&json!({ "email": "dup@example.com", "password": "another1", "name": "Dup" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_validation() {
    let server = test_server();

    let short_password = server
        .post("/auth/register")
        .json(&json!({ "email": "a@example.com", "password": "12345", "name": "A" }))
        .await;
    short_password.assert_status(StatusCode::BAD_REQUEST);

    let bad_email = server
        .post("/auth/register")
        .json(&json!({ "email": "not-an-email", "password": "123456", "name": "A" }))
        .await;
    bad_email.assert_status(StatusCode::BAD_REQUEST);

    let missing_field = server
        .post("/auth/register")
        .json(&json!({ "email": "a@example.com" }))
        .await;
    missing_field.assert_status(StatusCode::BAD_REQUEST);
    assert!(missing_field.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let server = test_server();
    register(&server, "ana@example.com").await;

    let wrong_password = server
        .post("/auth/login")
        .json(&json!({ "email": "ana@example.com", "password": "wrong-pass" }))
        .await;
    let unknown_email = server
        .post("/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "secret123" }))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>(),
        unknown_email.json::<Value>()
    );
}

#[tokio::test]
async fn test_protected_routes_reject_missing_or_bad_tokens() {
    let server = test_server();

    for path in ["/auth/profile", "/interactions/ratings", "/analytics/stats", "/recommendations"] {
        server.get(path).await.assert_status(StatusCode::UNAUTHORIZED);
        bearer(server.get(path), "not.a.token")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

// ---------------------------------------------------------------------------
// Catalog proxy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_trending_relays_catalog_payload() {
    let server = test_server();

    let movies: Value = server.get("/movies/trending").await.json();
    assert_eq!(movies["kind"], "movie");
    assert_eq!(movies["page"], 1);
    assert_eq!(movies["results"][0]["id"], 100);

    let tv: Value = server
        .get("/movies/tv/trending")
        .add_query_param("page", 3)
        .await
        .json();
    assert_eq!(tv["kind"], "tv");
    assert_eq!(tv["page"], 3);
}

#[tokio::test]
async fn test_discover_defaults_and_filters() {
    let server = test_server();

    let defaults: Value = server.get("/movies/discover").await.json();
    assert_eq!(defaults["kind"], "movie");
    assert_eq!(defaults["sort_by"], "primary_release_date.desc");
    assert_eq!(defaults["page"], 1);

    let filtered: Value = server
        .get("/movies/discover")
        .add_query_param("type", "tv")
        .add_query_param("genre", "18")
        .add_query_param("year", "2008")
        .await
        .json();
    assert_eq!(filtered["kind"], "tv");
    assert_eq!(filtered["genre"], "18");
    assert_eq!(filtered["year"], "2008");
}

#[tokio::test]
async fn test_unknown_type_falls_back_to_movie() {
    let server = test_server();
    let details: Value = server
        .get("/movies/550")
        .add_query_param("type", "anime")
        .await
        .json();
    assert_eq!(details["kind"], "movie");
    assert_eq!(details["id"], 550);
}

#[tokio::test]
async fn test_search_requires_query() {
    let server = test_server();

    server
        .get("/movies/search")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/movies/search")
        .add_query_param("query", "   ")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let found: Value = server
        .get("/movies/search")
        .add_query_param("query", "breaking bad")
        .add_query_param("type", "tv")
        .await
        .json();
    assert_eq!(found["query"], "breaking bad");
    assert_eq!(found["kind"], "tv");
}

#[tokio::test]
async fn test_item_routes() {
    let server = test_server();

    let similar: Value = server.get("/movies/550/similar").await.json();
    assert_eq!(similar["results"][0]["id"], 551);

    let genre: Value = server
        .get("/movies/genre/878")
        .add_query_param("page", 2)
        .await
        .json();
    assert_eq!(genre["page"], 2);
    assert_eq!(genre["results"][0]["id"], 878_000);

    let providers: Value = server
        .get("/movies/1396/watch-providers")
        .add_query_param("type", "tv")
        .await
        .json();
    assert_eq!(providers["id"], 1396);

    server
        .get("/movies/not-a-number")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_failure_is_service_unavailable() {
    let server = server_with(StubCatalog::failing());

    for path in ["/movies/trending", "/movies/discover", "/movies/550", "/movies/550/similar"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json::<Value>(), json!({ "error": UNAVAILABLE }));
    }
}
