//! Integration tests for the session gate and the routes that bypass it.

mod helpers;

use http::StatusCode;

use helpers::{Session, TestApp};

#[tokio::test]
async fn test_me_with_session() {
    let app = TestApp::new();
    let session = app.register_session("gatekeeper").await;

    let response = app
        .request("GET", "/api/v1/me", None, Some(&session.header()))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.username(), Some("gatekeeper"));
    assert!(response.body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_me_requires_both_cookies() {
    let app = TestApp::new();
    let session = app.register_session("halfling").await;

    let access_only = format!("accessToken={}", session.access);
    let refresh_only = format!("refreshToken={}", session.refresh);

    for cookie in [None, Some(access_only.as_str()), Some(refresh_only.as_str())] {
        let response = app.request("GET", "/api/v1/me", None, cookie).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["message"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_me_rejects_invalid_access_token() {
    let app = TestApp::new();
    let session = app.register_session("impostor").await;

    let forged = Session {
        access: "not-a-jwt".to_string(),
        refresh: session.refresh.clone(),
    };
    let response = app
        .request("GET", "/api/v1/me", None, Some(&forged.header()))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // A refresh token is not accepted in the access slot.
    let swapped = Session {
        access: session.refresh.clone(),
        refresh: session.refresh,
    };
    let response = app
        .request("GET", "/api/v1/me", None, Some(&swapped.header()))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_cookies_succeeds() {
    let app = TestApp::new();

    let response = app.request("POST", "/api/v1/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["auth"], false);
}

#[tokio::test]
async fn test_logout_with_expired_access_token_revokes_refresh() {
    let app = TestApp::new();
    let session = app.register_session("latecomer").await;

    // Stands in for an access token past its expiry.
    let stale = Session {
        access: "expired-access-token".to_string(),
        refresh: session.refresh.clone(),
    };
    let response = app
        .request("POST", "/api/v1/logout", None, Some(&stale.header()))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.cleared("accessToken"));
    assert!(response.cleared("refreshToken"));
    assert!(app.tokens.is_empty());

    let cookie = format!("refreshToken={}", session.refresh);
    let replay = app
        .request("GET", "/api/v1/refresh", None, Some(&cookie))
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gate_fails_after_logout_with_cleared_cookies() {
    let app = TestApp::new();
    let session = app.register_session("leaver").await;

    let logged_out = app
        .request("POST", "/api/v1/logout", None, Some(&session.header()))
        .await;
    assert_eq!(logged_out.status, StatusCode::OK);

    // The browser now holds the cleared (empty) cookies.
    let cleared = Session {
        access: logged_out.cookie("accessToken").unwrap_or_default().to_string(),
        refresh: logged_out.cookie("refreshToken").unwrap_or_default().to_string(),
    };
    let response = app
        .request("GET", "/api/v1/me", None, Some(&cleared.header()))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_is_reachable_without_access_token() {
    let app = TestApp::new();
    let session = app.register_session("renewer").await;

    let cookie = format!("refreshToken={}", session.refresh);
    let response = app
        .request("GET", "/api/v1/refresh", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let renewed = Session::from_response(&response);
    let me = app
        .request("GET", "/api/v1/me", None, Some(&renewed.header()))
        .await;
    assert_eq!(me.status, StatusCode::OK);
}
