mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use axum::Router;
use iatf_intake::build_router;
use iatf_intake::config::Config;
use iatf_intake::state::AppState;
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

const BOUNDARY: &str = "iatf-test-boundary";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn app(base_template: Option<Value>) -> Router {
    build_router(Arc::new(AppState::with_base_template(Config::default(), base_template)))
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, Vec<u8>),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {XLSX_MIME}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn audit_workbook_bytes() -> Result<Vec<u8>> {
    let dir = tempdir()?;
    let path = dir.path().join("audit.xlsx");
    common::write_audit_workbook(&path)?;
    Ok(fs::read(path)?)
}

async fn send(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

async fn post_convert(app: Router, parts: &[Part<'_>]) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri("/iatf/convert")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))?;
    send(app, request).await
}

async fn get_json(app: Router, uri: &str) -> Result<(StatusCode, Value)> {
    let request = Request::builder().uri(uri).body(Body::empty())?;
    send(app, request).await
}

#[tokio::test]
async fn health_and_modes_respond() -> Result<()> {
    let (status, body) = get_json(app(None), "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get_json(app(None), "/iatf/modes").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default"], "standard");
    let values = body["modes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|mode| mode["value"].as_str().unwrap_or("").to_string())
        .collect::<Vec<_>>();
    assert_eq!(values, vec!["standard", "ems", "supporting", "comprehensive"]);
    Ok(())
}

#[tokio::test]
async fn convert_returns_per_file_outcomes() -> Result<()> {
    let workbook = audit_workbook_bytes()?;
    let parts = [
        Part::Text("mode", "comprehensive"),
        Part::File("file", "audit.xlsx", workbook),
        Part::File("file", "broken.xlsx", b"not a workbook".to_vec()),
    ];
    let (status, body) = post_convert(app(Some(common::base_template())), &parts).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "audit.xlsx");
    assert_eq!(items[0]["ok"], true);
    assert_eq!(items[0]["summary"]["mode"], "comprehensive");
    assert_eq!(items[0]["summary"]["sites"]["extended_manufacturing"], 2);
    let org = &items[0]["document"]["OrganizationInformation"];
    assert_eq!(org["OrganizationName"], "深圳示例科技有限公司");
    assert_eq!(org["HasProvidingSupportSites"], "1");

    assert_eq!(items[1]["name"], "broken.xlsx");
    assert_eq!(items[1]["ok"], false);
    assert_eq!(items[1]["error"]["code"], "WORKBOOK_UNREADABLE");
    Ok(())
}

#[tokio::test]
async fn uploaded_template_is_used_without_base() -> Result<()> {
    let workbook = audit_workbook_bytes()?;
    let template = r#"{ "Stage1Activities": { "Note": "user" }, "OrganizationInformation": {} }"#;
    let parts = [
        Part::Text("template", template),
        Part::File("file", "audit.xlsx", workbook),
    ];
    let (status, body) = post_convert(app(None), &parts).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let document = &body["items"][0]["document"];
    assert_eq!(document["Stage1Activities"]["Note"], "user");
    assert_eq!(document["AuditData"]["CbIdentificationNo"], "CB-0099");
    // 默认标准模式不写现场列表。
    assert!(document["OrganizationInformation"]
        .get("ExtendedManufacturingSites")
        .is_none());
    Ok(())
}

#[tokio::test]
async fn missing_template_is_rejected() -> Result<()> {
    let workbook = audit_workbook_bytes()?;
    let parts = [Part::File("file", "audit.xlsx", workbook)];
    let (status, body) = post_convert(app(None), &parts).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"]["code"], "TEMPLATE_MISSING");

    let parts = [
        Part::Text("template", "[1, 2, 3]"),
        Part::File("file", "audit.xlsx", audit_workbook_bytes()?),
    ];
    let (status, body) = post_convert(app(None), &parts).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"]["code"], "TEMPLATE_INVALID");
    Ok(())
}

#[tokio::test]
async fn bad_requests_are_rejected() -> Result<()> {
    let (status, body) = post_convert(app(Some(common::base_template())), &[Part::Text("mode", "ems")]).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"]["code"], "FILE_NOT_FOUND");

    let parts = [
        Part::Text("mode", "everything"),
        Part::File("file", "audit.xlsx", audit_workbook_bytes()?),
    ];
    let (status, body) = post_convert(app(Some(common::base_template())), &parts).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"]["code"], "INVALID_MODE");
    assert_eq!(body["ok"], false);
    Ok(())
}
