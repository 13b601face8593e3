use std::time::Duration;

use http::StatusCode;
use httpmock::prelude::*;
use marquee::{AppState, Credential, Method, Request, Router, UpstreamClient, UpstreamConfig, app};
use serde_json::{Value, json};

const KEY: &str = "test-key";

fn app_for(base_url: &str, credential: Option<&str>, timeout: Duration) -> Router<AppState> {
    let config = UpstreamConfig::new(base_url, credential.map(Credential::new))
        .unwrap()
        .with_timeout(timeout);
    app::router(AppState::new(UpstreamClient::new(config).unwrap()))
}

fn app_with_mock(server: &MockServer) -> Router<AppState> {
    app_for(&server.base_url(), Some(KEY), Duration::from_secs(2))
}

async fn get(app: &Router<AppState>, uri: &str) -> (StatusCode, Value) {
    let res = app.handle(Request::new(Method::Get, uri)).await;
    let body = serde_json::from_slice(res.body()).unwrap_or(Value::Null);
    (res.status_code(), body)
}

// ── Listing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn page_two_queries_letter_b() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auto-complete")
                .query_param("q", "b")
                .header("x-rapidapi-key", KEY)
                .header("x-rapidapi-host", "127.0.0.1");
            then.status(200).json_body(json!({ "d": [{ "id": "tt1" }, { "id": "tt2" }], "q": "b" }));
        })
        .await;

    let (status, body) = get(&app_with_mock(&server), "/movies?page=2").await;

    upstream.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "success",
            "page": 2,
            "query_used": "b",
            "results": 2,
            "data": [{ "id": "tt1" }, { "id": "tt2" }],
        })
    );
}

#[tokio::test]
async fn missing_or_garbled_page_means_page_one() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET).path("/auto-complete").query_param("q", "a");
            then.status(200).json_body(json!({ "q": "a" }));
        })
        .await;
    let app = app_with_mock(&server);

    for uri in ["/movies", "/movies?page=abc"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["page"], 1);
        assert_eq!(body["results"], 0);
        assert_eq!(body["data"], json!([]));
    }
    assert_eq!(upstream.hits_async().await, 2);
}

#[tokio::test]
async fn out_of_range_pages_never_reach_upstream() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|_when, then| {
            then.status(200).json_body(json!({ "d": [] }));
        })
        .await;
    let app = app_with_mock(&server);

    let (status, body) = get(&app, "/movies?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "status": "fail", "message": "Page number must be at least 1" }));

    let (status, body) = get(&app, "/movies?page=-3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Page number must be at least 1");

    let (status, body) = get(&app, "/movies?page=27").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "status": "error", "message": "Page limit exceeded" }));

    assert_eq!(upstream.hits_async().await, 0);
}

// ── Search ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_forwards_trimmed_query() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET).path("/auto-complete").query_param("q", "the matrix");
            then.status(200).json_body(json!({ "d": [{ "l": "The Matrix" }] }));
        })
        .await;

    let (status, body) = get(&app_with_mock(&server), "/movies/search?q=%20the+matrix%20").await;

    upstream.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "results": 1, "data": [{ "l": "The Matrix" }] }));
}

#[tokio::test]
async fn short_or_missing_search_query_is_rejected_without_upstream() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|_when, then| {
            then.status(200).json_body(json!({ "d": [] }));
        })
        .await;
    let app = app_with_mock(&server);

    let (status, body) = get(&app, "/movies/search?q=a").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Search query must be at least 2 characters long");

    let (status, body) = get(&app, "/movies/search?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide a search query");

    let (status, body) = get(&app, "/movies/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide a search query");

    assert_eq!(upstream.hits_async().await, 0);
}

// ── Detail ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn detail_passes_payload_through_unmodified() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/title/get-overview-details")
                .query_param("tconst", "tt1234567");
            then.status(200).json_body(json!({ "title": "Foo" }));
        })
        .await;

    let (status, body) = get(&app_with_mock(&server), "/movies/tt1234567").await;

    upstream.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "data": { "title": "Foo" } }));
}

#[tokio::test]
async fn empty_detail_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/title/get-overview-details");
            then.status(200).json_body(json!({}));
        })
        .await;

    let (status, body) = get(&app_with_mock(&server), "/movies/tt0111161").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "status": "fail", "message": "Movie not found" }));
}

#[tokio::test]
async fn malformed_ids_are_rejected_without_upstream() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|_when, then| {
            then.status(200).json_body(json!({ "title": "Foo" }));
        })
        .await;
    let app = app_with_mock(&server);

    for uri in ["/movies/tt123", "/movies/nm0000001", "/movies/tt123456789"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Invalid IMDb ID format.");
    }

    let (status, body) = get(&app, "/movies/%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Movie id is required");

    assert_eq!(upstream.hits_async().await, 0);
}

// ── Upstream failures ─────────────────────────────────────────────────────────

#[tokio::test]
async fn upstream_error_field_becomes_400() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|_when, then| {
            then.status(200).json_body(json!({ "error": "x" }));
        })
        .await;
    let app = app_with_mock(&server);

    for uri in ["/movies?page=1", "/movies/search?q=alien", "/movies/tt0111161"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({ "status": "fail", "message": "x" }));
    }
}

#[tokio::test]
async fn upstream_non_2xx_mirrors_status_and_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|_when, then| {
            then.status(403).json_body(json!({ "message": "You are not subscribed to this API." }));
        })
        .await;

    let (status, body) = get(&app_with_mock(&server), "/movies/search?q=alien").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "status": "fail", "message": "You are not subscribed to this API." }));
}

#[tokio::test]
async fn upstream_5xx_without_body_uses_generic_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|_when, then| {
            then.status(503);
        })
        .await;

    let (status, body) = get(&app_with_mock(&server), "/movies?page=3").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "status": "error", "message": "Upstream request failed" }));
}

#[tokio::test]
async fn upstream_empty_body_is_no_data() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|_when, then| {
            then.status(200).body("");
        })
        .await;

    let (status, body) = get(&app_with_mock(&server), "/movies/tt0111161").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No data returned from upstream");
}

#[tokio::test]
async fn falsy_upstream_body_is_no_data() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|_when, then| {
            then.status(200).header("content-type", "application/json").body("false");
        })
        .await;

    let (status, body) = get(&app_with_mock(&server), "/movies/tt0111161").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "status": "fail", "message": "No data returned from upstream" }));
}

#[tokio::test]
async fn slow_upstream_times_out_as_504() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|_when, then| {
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({ "d": [] }));
        })
        .await;
    let app = app_for(&server.base_url(), Some(KEY), Duration::from_millis(200));

    let (status, body) = get(&app, "/movies/search?q=alien").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body, json!({ "status": "error", "message": "Failed to connect to upstream" }));
}

#[tokio::test]
async fn unreachable_upstream_is_502() {
    let app = app_for("http://127.0.0.1:1", Some(KEY), Duration::from_secs(2));

    let (status, body) = get(&app, "/movies/tt0111161").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Failed to connect to upstream");
}

#[tokio::test]
async fn missing_credential_fails_fast() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|_when, then| {
            then.status(200).json_body(json!({ "d": [] }));
        })
        .await;
    let app = app_for(&server.base_url(), None, Duration::from_secs(2));

    let (status, body) = get(&app, "/movies/search?q=alien").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "status": "error", "message": "API_KEY is not defined in environment variables" })
    );

    let (status, _) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    assert_eq!(upstream.hits_async().await, 0);
}

// ── Everything else ───────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_route_is_404_with_path() {
    let app = app_for("http://127.0.0.1:1", Some(KEY), Duration::from_secs(1));

    let (status, body) = get(&app, "/films?x=1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "status": "fail", "message": "Can't find /films?x=1 on this server!" }));
}

#[tokio::test]
async fn trailing_slash_and_head_reach_movie_handlers() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET).path("/auto-complete").query_param("q", "a");
            then.status(200).json_body(json!({ "d": [{ "id": "tt1" }] }));
        })
        .await;
    let app = app_with_mock(&server);

    let (status, body) = get(&app, "/movies/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query_used"], "a");

    let res = app.handle(Request::new(Method::Head, "/movies")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert!(res.body().is_empty());

    assert_eq!(upstream.hits_async().await, 2);
}

#[tokio::test]
async fn videos_placeholder_answers_any_method() {
    let app = app_for("http://127.0.0.1:1", Some(KEY), Duration::from_secs(1));

    for (method, uri) in [(Method::Get, "/videos"), (Method::Post, "/videos/upload")] {
        let res = app.handle(Request::new(method, uri)).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"Videos endpoint");
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    }
}

#[tokio::test]
async fn health_probes() {
    let app = app_for("http://127.0.0.1:1", Some(KEY), Duration::from_secs(1));

    let res = app.handle(Request::new(Method::Get, "/healthz")).await;
    assert_eq!(res.body(), b"ok");

    let res = app.handle(Request::new(Method::Get, "/readyz")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"ready");
}
