mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};

use common::{TestApp, ADMIN_KEY, CAP_KEY, GROOT_KEY};

const UNAUTHORIZED: &str = r#"{"status":{"message":"Unauthorized","code":"401","details":"You need to provide a correct authentication token using the header 'x-api-key'"}}"#;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::new();
    let res = app.send(Method::GET, "/health", None, None, None).await?;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json()?;
    assert_eq!(body["status"]["message"], "Success");
    assert_eq!(body["data"]["store"], "ok");
    Ok(())
}

#[tokio::test]
async fn admin_key_opens_tenant_routes() -> Result<()> {
    let app = TestApp::new();
    let res = app.get_json("/api/v2/admin/tenants", ADMIN_KEY).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()?["data"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn tenant_key_is_rejected_on_admin_routes_but_accepted_on_tenant_routes() -> Result<()> {
    let app = TestApp::new();

    let res = app.get_json("/api/v2/admin/tenants", CAP_KEY).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, UNAUTHORIZED);

    let res = app.get_json("/api/v2/reports", CAP_KEY).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn admin_key_is_not_a_tenant_user() -> Result<()> {
    let app = TestApp::new();
    let res = app.get_json("/api/v2/reports", ADMIN_KEY).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn missing_and_unknown_keys_get_the_literal_body() -> Result<()> {
    let app = TestApp::new();

    let res = app.send(Method::GET, "/api/v2/reports", None, Some("application/json"), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, UNAUTHORIZED);

    let res = app.get_json("/api/v2/reports", "N0TAK3Y").await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.header("content-type"), Some("application/json; charset=utf-8"));
    assert_eq!(res.body, UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn authentication_runs_before_validation() -> Result<()> {
    let app = TestApp::new();
    let res = app
        .send(Method::GET, "/api/v1/group_availability?group_type=site", Some("N0TAK3Y"), Some("text/html"), None)
        .await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn options_bypasses_authentication() -> Result<()> {
    let app = TestApp::new();

    for uri in ["/api/v2/reports", "/api/v2/recomputations", "/api/v2/admin/tenants", "/api/v1/AP"] {
        let res = app.send(Method::OPTIONS, uri, None, Some("text/html"), None).await?;
        assert_eq!(res.status, StatusCode::OK, "{}", uri);
        assert_eq!(res.header("allow"), Some("GET,POST,PUT,DELETE,OPTIONS"), "{}", uri);
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"), "{}", uri);
        assert!(res.body.is_empty(), "{}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn each_tenant_sees_only_its_own_reports() -> Result<()> {
    let app = TestApp::new();
    let body = r#"{"info": {"name": "Critical", "description": "avengers only"}}"#;
    let res = app
        .send(Method::POST, "/api/v2/reports", Some(CAP_KEY), Some("application/json"), Some(body))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app.get_json("/api/v2/reports", GROOT_KEY).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()?["data"].as_array().map(Vec::len), Some(0));
    Ok(())
}
