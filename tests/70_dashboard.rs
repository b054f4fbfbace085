mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::TestServer;

async fn seed(server: &TestServer, token: &str) -> Result<()> {
    let cases = [
        json!({ "type": "theft", "location": "Wuse II", "priority": "high" }),
        json!({ "type": "Theft", "location": "Garki", "status": "investigation" }),
        json!({ "type": "assault", "location": "Maitama", "status": "resolved", "priority": "high" }),
        json!({ "type": "fraud", "location": "CBD" }),
    ];
    for case in cases {
        server.call(Method::POST, "/api/cases", Some(token), Some(case)).await?;
    }

    for (badge, status) in [("PF-1", "active"), ("PF-2", "active"), ("PF-3", "on_leave")] {
        server
            .call(
                Method::POST,
                "/api/officers",
                Some(token),
                Some(json!({ "badge_number": badge, "name": "Officer", "rank": "Constable", "unit": "Patrol", "status": status })),
            )
            .await?;
    }

    server
        .call(Method::POST, "/api/reports", Some(token), Some(json!({ "title": "T", "type": "summary", "content": "C" })))
        .await?;
    server
        .call(
            Method::POST,
            "/api/incidents",
            Some(token),
            Some(json!({ "title": "Collision", "type": "traffic", "location": "Airport Road" })),
        )
        .await?;
    Ok(())
}

fn int(value: &Value) -> i64 {
    value.as_i64().unwrap_or(-1)
}

#[tokio::test]
async fn statistics_add_up() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;
    seed(&server, &token).await?;

    let (status, body) = server.call(Method::GET, "/api/dashboard/statistics", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];

    assert_eq!(int(&stats["total_cases"]), 4);
    assert_eq!(int(&stats["open"]), 2);
    assert_eq!(int(&stats["investigation"]), 1);
    assert_eq!(int(&stats["resolved"]), 1);
    assert_eq!(
        int(&stats["open"]) + int(&stats["investigation"]) + int(&stats["resolved"]) + int(&stats["others"]),
        int(&stats["total_cases"])
    );
    assert_eq!(int(&stats["high_priority"]), 2);
    assert_eq!(int(&stats["total_officers"]), 3);
    assert_eq!(int(&stats["active_officers"]), 2);
    assert_eq!(int(&stats["total_reports"]), 1);
    assert_eq!(int(&stats["total_incidents"]), 1);
    Ok(())
}

#[tokio::test]
async fn empty_statistics_are_zero() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;

    let (_, body) = server.call(Method::GET, "/api/dashboard/statistics", Some(&token), None).await?;
    assert_eq!(int(&body["data"]["total_cases"]), 0);
    assert_eq!(int(&body["data"]["others"]), 0);
    Ok(())
}

#[tokio::test]
async fn distribution_and_personnel() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;
    seed(&server, &token).await?;

    let (_, body) = server.call(Method::GET, "/api/dashboard/case-distribution", Some(&token), None).await?;
    assert_eq!(body["data"]["by_status"], json!({ "open": 2, "investigation": 1, "resolved": 1 }));
    assert_eq!(body["data"]["by_priority"], json!({ "low": 0, "medium": 2, "high": 2 }));
    assert_eq!(body["data"]["by_type"], json!({ "theft": 2, "assault": 1, "fraud": 1 }));

    let (_, body) = server.call(Method::GET, "/api/dashboard/personnel-status", Some(&token), None).await?;
    assert_eq!(body["data"], json!({ "active": 2, "on_leave": 1, "inactive": 0, "total": 3 }));
    Ok(())
}

#[tokio::test]
async fn recent_views_respect_limits() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.officer_token().await?;
    seed(&server, &token).await?;

    let (_, body) = server.call(Method::GET, "/api/dashboard/recent-cases", Some(&token), None).await?;
    let cases = body["data"].as_array().unwrap();
    assert_eq!(cases.len(), 4);
    assert_eq!(cases[0]["case_id"], "CA-0004");

    let (_, body) = server.call(Method::GET, "/api/dashboard/recent-cases?limit=2", Some(&token), None).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = server.call(Method::GET, "/api/dashboard/recent-activity", Some(&token), None).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["data"][0]["entity_type"], "incident");

    let (_, body) = server.call(Method::GET, "/api/dashboard/recent-activity?limit=3", Some(&token), None).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    Ok(())
}
