mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{app, call, call_with_token, get, post, signup};

#[tokio::test]
async fn register_rejects_duplicates_and_missing_fields() {
    let app = app();
    let body = json!({"username": "ann", "email": "ann@example.com", "password": "pw"});

    let (status, created) = post(&app, "/api/register", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["username"], "ann");
    assert!(created["data"]["id"].is_i64());

    let (status, err) = post(&app, "/api/register", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Username already exists");

    let (status, err) = post(
        &app,
        "/api/register",
        json!({"username": "ann2", "email": "ann@example.com", "password": "pw"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Email already registered");

    let (status, err) = post(&app, "/api/register", json!({"username": "bob", "email": "bob@example.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "All fields are required");
}

#[tokio::test]
async fn login_issues_tokens_and_refresh_renews_access() {
    let app = app();
    post(
        &app,
        "/api/register",
        json!({"username": "ann", "email": "ann@example.com", "password": "pw"}),
    )
    .await;

    let (status, _) = post(&app, "/api/login", json!({"username": "ann", "password": "wrong"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, tokens) = post(&app, "/api/login", json!({"username": "ann", "password": "pw"})).await;
    assert_eq!(status, StatusCode::OK);
    let access = tokens["data"]["access"].as_str().unwrap().to_string();
    let refresh = tokens["data"]["refresh"].as_str().unwrap().to_string();

    // An access token cannot be used to refresh
    let (status, _) = post(&app, "/api/token/refresh", json!({"refresh": access})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, renewed) = post(&app, "/api/token/refresh", json!({"refresh": refresh})).await;
    assert_eq!(status, StatusCode::OK);
    let renewed = renewed["data"]["access"].as_str().unwrap().to_string();

    let (status, me) = call_with_token(&app, Method::GET, "/api/auth/whoami", None, Some(&renewed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["user_name"], "ann");
    assert_eq!(me["data"]["skills"], json!([]));
}

#[tokio::test]
async fn whoami_requires_a_bearer_token() {
    let app = app();

    let (status, body) = get(&app, "/api/auth/whoami").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = call_with_token(&app, Method::GET, "/api/auth/whoami", None, Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_is_assigned_only_once() {
    let app = app();
    post(
        &app,
        "/api/register",
        json!({"username": "fred", "email": "fred@example.com", "password": "pw"}),
    )
    .await;

    let (status, err) = post(&app, "/api/set-role", json!({"username": "fred", "role": "admin"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Invalid role.");

    let (status, ok) = post(&app, "/api/set-role", json!({"username": "fred", "role": "freelancer"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ok["data"]["profile"]["role"], "freelancer");
    assert_eq!(ok["data"]["message"], "Role 'freelancer' saved successfully!");

    let (status, err) = post(&app, "/api/set-role", json!({"username": "fred", "role": "client"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["error"], "Role already assigned!");

    let (status, _) = post(&app, "/api/set-role", json!({"username": "ghost", "role": "client"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(&app, "/api/set-role", json!({"username": "fred"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn renamed_profile_logs_in_under_its_new_name() {
    let app = app();
    let id = signup(&app, "ann", "client").await;

    let (status, renamed) = call(
        &app,
        Method::PATCH,
        &format!("/api/profiles/{}", id),
        Some(json!({"user_name": "anna", "email": "anna@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", renamed);
    assert_eq!(renamed["data"]["user_name"], "anna");

    let (status, _) = post(&app, "/api/login", json!({"username": "ann", "password": "pw-ann"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, tokens) = post(&app, "/api/login", json!({"username": "anna", "password": "pw-ann"})).await;
    assert_eq!(status, StatusCode::OK, "{}", tokens);
    let access = tokens["data"]["access"].as_str().unwrap().to_string();

    let (status, me) = call_with_token(&app, Method::GET, "/api/auth/whoami", None, Some(&access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["id"], id);
    assert_eq!(me["data"]["email"], "anna@example.com");

    // The old name is free again for a new sign-up
    let (status, _) = post(
        &app,
        "/api/register",
        json!({"username": "ann", "email": "ann@example.com", "password": "pw"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}
