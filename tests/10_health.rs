mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};

#[tokio::test]
async fn health_endpoints_respond_without_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    for path in ["/health", "/api/health"] {
        let (status, body) = server.call(Method::GET, path, None, None).await?;
        assert_eq!(status, StatusCode::OK, "{}", path);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    }
    Ok(())
}

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.call(Method::GET, "/", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Precinct Records API");
    assert!(body["data"]["endpoints"]["cases"].is_string());
    Ok(())
}
