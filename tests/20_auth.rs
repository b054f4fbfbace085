mod common;

use anyhow::Result;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde_json::json;

use precinct_api::auth::{decode_jwt, generate_jwt, Claims};
use precinct_api::database::models::{AccountChanges, AccountStatus};
use precinct_api::database::Store;

use common::{TestServer, OFFICER_PASSWORD};

#[tokio::test]
async fn login_issues_token_for_the_same_subject() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "ada", "password": OFFICER_PASSWORD })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "officer");
    assert_eq!(body["data"]["username"], "ada");
    assert_eq!(body["data"]["department"], "Central");

    let token = body["data"]["token"].as_str().unwrap();
    let claims = decode_jwt(token, &server.config.security)?;
    assert_eq!(claims.sub, server.officer.id.to_string());

    let account = server.store.find_account(server.officer.id).await?.unwrap();
    assert!(account.last_login.is_some());
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "username": "ada", "password": "wrong1234" })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (_, body) = server
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "username": "nobody", "password": "x" })))
        .await?;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
    Ok(())
}

#[tokio::test]
async fn login_requires_both_fields() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "username": " " })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELDS");
    assert_eq!(body["fields"], json!(["username", "password"]));
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_invalid_json() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/auth/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn protected_route_without_token_is_no_token() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.call(Method::GET, "/api/cases", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NO_TOKEN");
    Ok(())
}

#[tokio::test]
async fn tampered_token_is_invalid() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;
    let tampered = format!("{}x", token);

    let (status, body) = server.call(Method::GET, "/api/auth/me", Some(&tampered), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() -> Result<()> {
    let server = TestServer::spawn().await?;

    let mut claims = Claims::new(&server.officer, 1);
    claims.iat = Utc::now().timestamp() - 7200;
    claims.exp = Utc::now().timestamp() - 3600;
    let token = generate_jwt(&claims, &server.config.security)?;

    let (status, body) = server.call(Method::GET, "/api/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_EXPIRED");
    Ok(())
}

#[tokio::test]
async fn deactivated_account_token_is_refused() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;

    let deactivate = AccountChanges { status: Some(AccountStatus::Inactive), ..Default::default() };
    server.store.update_account(server.officer.id, &deactivate, Utc::now()).await?;

    let (status, body) = server.call(Method::GET, "/api/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INACTIVE_USER");

    let (_, body) = server
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "username": "ada", "password": OFFICER_PASSWORD })))
        .await?;
    assert_eq!(body["code"], "INACTIVE_USER");
    Ok(())
}

#[tokio::test]
async fn deleted_account_token_is_user_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;
    server.store.delete_account(server.officer.id).await?;

    let (status, body) = server.call(Method::GET, "/api/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "USER_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn me_returns_account_without_password_hash() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;

    let (status, body) = server.call(Method::GET, "/api/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ada");
    assert!(body["data"].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn register_creates_officer_account() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "bola",
                "email": "bola@precinct.gov",
                "password": "beat2024x",
                "name": "Bola Ade",
                "badge_number": "B-102"
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "officer");
    assert_eq!(body["data"]["status"], "active");

    server.login("bola", "beat2024x").await?;
    Ok(())
}

#[tokio::test]
async fn register_validates_input() -> Result<()> {
    let server = TestServer::spawn().await?;
    let register = |username: &str, email: &str, password: &str| {
        json!({ "username": username, "email": email, "password": password, "name": "Someone" })
    };

    let (_, body) = server
        .call(Method::POST, "/api/auth/register", None, Some(register("bola", "bola-at-precinct", "beat2024x")))
        .await?;
    assert_eq!(body["code"], "INVALID_EMAIL");

    let (_, body) = server
        .call(Method::POST, "/api/auth/register", None, Some(register("bola", "bola@precinct.gov", "password")))
        .await?;
    assert_eq!(body["code"], "WEAK_PASSWORD");

    let (status, body) = server
        .call(Method::POST, "/api/auth/register", None, Some(register("ADA", "new@precinct.gov", "beat2024x")))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_USERNAME");

    let (_, body) = server
        .call(Method::POST, "/api/auth/register", None, Some(register("bola", "ada@precinct.gov", "beat2024x")))
        .await?;
    assert_eq!(body["code"], "DUPLICATE_EMAIL");
    Ok(())
}

#[tokio::test]
async fn register_can_be_disabled() -> Result<()> {
    let mut config = precinct_api::config::AppConfig::development();
    config.api.allow_registration = false;
    let server = TestServer::spawn_with(config).await?;

    let (status, body) = server
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": "bola", "email": "bola@precinct.gov", "password": "beat2024x", "name": "Bola" })),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn profile_and_password_updates() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;

    let (status, body) = server
        .call(
            Method::PATCH,
            "/api/auth/profile",
            Some(&token),
            Some(json!({ "name": "Ada O. Okafor", "department": "Traffic" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada O. Okafor");
    assert_eq!(body["data"]["department"], "Traffic");

    let (status, body) = server
        .call(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            Some(json!({ "current_password": "not-it-1", "new_password": "newbeat2025" })),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (status, _) = server
        .call(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            Some(json!({ "current_password": OFFICER_PASSWORD, "new_password": "newbeat2025" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    server.login("ada", "newbeat2025").await?;
    assert!(server.login("ada", OFFICER_PASSWORD).await.is_err());
    Ok(())
}

#[tokio::test]
async fn overlapping_profile_edit_keeps_the_new_password() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;

    let profile = server.call(Method::PATCH, "/api/auth/profile", Some(&token), Some(json!({ "department": "Traffic" })));
    let password = server.call(
        Method::PUT,
        "/api/auth/password",
        Some(&token),
        Some(json!({ "current_password": OFFICER_PASSWORD, "new_password": "newbeat2025" })),
    );
    let (profile, password) = tokio::join!(profile, password);
    assert_eq!(profile?.0, StatusCode::OK);
    assert_eq!(password?.0, StatusCode::OK);

    server.login("ada", "newbeat2025").await?;
    let stored = server.store.find_account(server.officer.id).await?.unwrap();
    assert_eq!(stored.department.as_deref(), Some("Traffic"));
    Ok(())
}
