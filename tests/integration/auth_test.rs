//! Integration tests for the register, login, refresh, and logout flows.

mod helpers;

use http::StatusCode;

use helpers::{PASSWORD, Session, TestApp};

#[tokio::test]
async fn test_register_refresh_logout_scenario() {
    let app = TestApp::new();

    // Register
    let registered = app.register("alice", "alice@example.com").await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.username(), Some("alice"));
    assert_eq!(registered.body["auth"], true);
    assert!(registered.body["user"].get("password_hash").is_none());
    let original = Session::from_response(&registered);

    // Refresh with the issued token
    let refreshed = app
        .request("GET", "/api/v1/refresh", None, Some(&original.header()))
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert_eq!(refreshed.username(), Some("alice"));
    let rotated = Session::from_response(&refreshed);
    assert_ne!(rotated.refresh, original.refresh);

    // Replaying the consumed token fails
    let replay = app
        .request("GET", "/api/v1/refresh", None, Some(&original.header()))
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.body["message"], "Unauthorized");

    // Logout removes the stored record and clears both cookies
    let logged_out = app
        .request("POST", "/api/v1/logout", None, Some(&rotated.header()))
        .await;
    assert_eq!(logged_out.status, StatusCode::OK);
    assert_eq!(logged_out.body["auth"], false);
    assert!(logged_out.body["user"].is_null());
    assert!(logged_out.cleared("accessToken"));
    assert!(logged_out.cleared("refreshToken"));
    assert!(app.tokens.is_empty());

    // Neither token refreshes any more
    for session in [&original, &rotated] {
        let response = app
            .request("GET", "/api/v1/refresh", None, Some(&session.header()))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_login_success_sets_cookies() {
    let app = TestApp::new();
    app.register_session("bobby").await;

    let response = app.login("bobby", PASSWORD).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.username(), Some("bobby"));
    assert_eq!(response.body["auth"], true);
    assert!(response.cookie("accessToken").is_some());
    assert!(response.cookie("refreshToken").is_some());
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new();
    app.register_session("carol").await;

    let response = app.login("carol", "Wrongpass1").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "INVALID_CREDENTIALS");
    assert!(response.set_cookies.is_empty());
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let app = TestApp::new();

    let response = app.login("nobody", PASSWORD).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid username or password");
}

#[tokio::test]
async fn test_second_login_invalidates_first_refresh_token() {
    let app = TestApp::new();
    app.register_session("danny").await;

    let first = Session::from_response(&app.login("danny", PASSWORD).await);
    let second = Session::from_response(&app.login("danny", PASSWORD).await);

    let stale = app
        .request("GET", "/api/v1/refresh", None, Some(&first.header()))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let current = app
        .request("GET", "/api/v1/refresh", None, Some(&second.header()))
        .await;
    assert_eq!(current.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/refresh", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_register_duplicate_email_and_username() {
    let app = TestApp::new();
    app.register_session("erica").await;

    let same_email = app.register("erica2", "erica@example.com").await;
    assert_eq!(same_email.status, StatusCode::CONFLICT);
    assert!(same_email.set_cookies.is_empty());

    let same_username = app.register("erica", "other@example.com").await;
    assert_eq!(same_username.status, StatusCode::CONFLICT);
    assert_eq!(same_username.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new();

    let weak_password = serde_json::json!({
        "username": "frank",
        "name": "Frank",
        "email": "frank@example.com",
        "password": "weak",
    });
    let response = app
        .request("POST", "/api/v1/register", Some(weak_password), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let mismatch = serde_json::json!({
        "username": "frank",
        "name": "Frank",
        "email": "frank@example.com",
        "password": PASSWORD,
        "confirmpassword": "Password2",
    });
    let response = app
        .request("POST", "/api/v1/register", Some(mismatch), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let missing_fields = serde_json::json!({ "username": "frank" });
    let response = app
        .request("POST", "/api/v1/register", Some(missing_fields), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}
