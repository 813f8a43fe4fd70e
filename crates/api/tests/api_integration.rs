//! API integration tests.
//!
//! These tests drive the router end to end against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware,
};
use buzzify_api::{AppState, auth_middleware, router as api_router};
use buzzify_common::config::{AuthConfig, Config, DatabaseConfig, FeedConfig, ServerConfig};
use buzzify_db::entities::{post, user};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Value};
use serde_json::{Value as Json, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            url: "https://buzzify.example".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: SECRET.to_string(),
            issuer: None,
            leeway_secs: 0,
        },
        feed: FeedConfig::default(),
    }
}

/// Create the test router, with auth middleware, over a prepared mock database.
fn create_test_router(db: MockDatabase) -> Router {
    let state = AppState::new(Arc::new(db.into_connection()), &create_test_config());

    api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn session_token(subject: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "sub": subject,
            "email": "alice@example.com",
            "username": "alice",
            "exp": Utc::now().timestamp() + 3600,
        }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn create_test_user(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        external_id: format!("ext_{id}"),
        email: format!("{username}@example.com"),
        username: username.to_string(),
        name: None,
        bio: None,
        image: None,
        location: None,
        website: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn create_test_post(id: &str, author_id: &str) -> post::Model {
    post::Model {
        id: id.to_string(),
        author_id: author_id.to_string(),
        description: Some("hello".to_string()),
        image: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn count(n: i64) -> BTreeMap<&'static str, Value> {
    maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn post_json(uri: &str, token: Option<&str>, body: &Json) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn read_json(response: axum::response::Response) -> Json {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/nonexistent/endpoint", None, &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggle_without_session_is_unauthenticated() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json(
            "/following/toggle",
            None,
            &json!({ "userId": "someone" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_invalid_token_is_anonymous() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json(
            "/following/status",
            Some("not-a-jwt"),
            &json!({ "userId": "someone" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["isFollowing"], false);
}

#[tokio::test]
async fn test_saved_list_requires_user() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/saved/list", None, &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_like_info_anonymous() {
    let db = empty_db().append_query_results([[count(3)]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(post_json("/likes/info", None, &json!({ "postId": "p1" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"], json!({ "likes": 3, "isLikedByUser": false }));
}

#[tokio::test]
async fn test_like_toggle_signed_in() {
    let alice = create_test_user("alice_id", "alice");
    let db = empty_db()
        // auth middleware: identity -> local user
        .append_query_results([[alice.clone()]])
        // post exists
        .append_query_results([[create_test_post("p1", "bob_id")]])
        // like count after toggle
        .append_query_results([[count(6)]])
        // no edge to delete, insert succeeds
        .append_exec_results([exec(0), exec(1)]);
    let app = create_test_router(db);

    let token = session_token(&alice.external_id);
    let response = app
        .oneshot(post_json(
            "/likes/toggle",
            Some(&token),
            &json!({ "postId": "p1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"], json!({ "likes": 6, "isLikedByUser": true }));
}

#[tokio::test]
async fn test_store_failure_during_auth_is_not_unauthenticated() {
    let db = empty_db().append_query_errors([DbErr::Custom("connection refused".to_string())]);
    let app = create_test_router(db);

    let token = session_token("ext_alice_id");
    let response = app
        .oneshot(post_json(
            "/likes/toggle",
            Some(&token),
            &json!({ "postId": "p1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_unsynced_identity_is_anonymous() {
    let db = empty_db().append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_router(db);

    let token = session_token("ext_unknown");
    let response = app
        .oneshot(post_json(
            "/likes/toggle",
            Some(&token),
            &json!({ "postId": "p1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_self_follow_rejected() {
    let alice = create_test_user("alice_id", "alice");
    let db = empty_db().append_query_results([[alice.clone()]]);
    let app = create_test_router(db);

    let token = session_token(&alice.external_id);
    let response = app
        .oneshot(post_json(
            "/following/toggle",
            Some(&token),
            &json!({ "userId": "alice_id" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_OPERATION");
}

#[tokio::test]
async fn test_like_toggle_missing_post() {
    let alice = create_test_user("alice_id", "alice");
    let db = empty_db()
        .append_query_results([[alice.clone()]])
        .append_query_results([Vec::<post::Model>::new()]);
    let app = create_test_router(db);

    let token = session_token(&alice.external_id);
    let response = app
        .oneshot(post_json(
            "/likes/toggle",
            Some(&token),
            &json!({ "postId": "gone" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn test_sync_creates_user_for_new_identity() {
    let created = create_test_user("new_id", "alice");
    let db = empty_db()
        // auth middleware: no local user yet
        .append_query_results([Vec::<user::Model>::new()])
        // sync: lookup by external id, username clash check
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([Vec::<user::Model>::new()])
        // insert returning
        .append_query_results([[created]]);
    let app = create_test_router(db);

    let token = session_token("ext_new_id");
    let response = app
        .oneshot(post_json("/users/sync", Some(&token), &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["id"], "new_id");
}

#[tokio::test]
async fn test_sync_requires_identity() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/users/sync", None, &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_post_requires_content() {
    let alice = create_test_user("alice_id", "alice");
    let db = empty_db().append_query_results([[alice.clone()]]);
    let app = create_test_router(db);

    let token = session_token(&alice.external_id);
    let response = app
        .oneshot(post_json("/posts/create", Some(&token), &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_revalidate_stream_is_event_stream() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/revalidate/stream")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
}
