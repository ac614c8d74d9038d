use std::sync::Arc;

use attribute_catalog::config::Config;
use attribute_catalog::services::catalog::read_catalog;
use attribute_catalog::services::catalog::types::{DataType, ILA_SYSTEM_LINK};
use attribute_catalog::{app, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

const BOUNDARY: &str = "catalog-test-boundary";

fn router() -> Router {
    app(Arc::new(AppState::new(Config::default())))
}

fn multipart_body(file_name: &str, contents: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

const CSV: &str = "ID,Name,Active,JoinDate\n1,Alice,yes,01.02.2023\n2,Bob,no,15.03.2023\n3,Carol,yes,2023-04-20\n";

#[tokio::test]
async fn health_check_responds() {
    let response = router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn preview_returns_records_and_summary() {
    let body = multipart_body("people.csv", CSV.as_bytes(), &[("report_id", "R007")]);
    let response = router().oneshot(upload("/attributes/preview", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["row_count"], 3);
    assert_eq!(json["column_count"], 4);
    assert_eq!(json["summary"]["attribute_count"], 4);
    assert_eq!(json["summary"]["report_type"], "Manual");
    assert_eq!(json["records"][0]["report_code"], "R007_1");
    assert_eq!(json["records"][2]["data_type"], "flag");
    assert_eq!(json["records"][3]["data_type"], "date");
}

#[tokio::test]
async fn export_returns_named_workbook() {
    let body = multipart_body(
        "people.csv",
        CSV.as_bytes(),
        &[("report_id", "R42"), ("report_type", "ILA")],
    );
    let response = router().oneshot(upload("/attributes/export", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"R42_attributes.xlsx\""
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let table = read_catalog(&bytes).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.records[0].data_type, DataType::Number);
    assert!(table.iter().all(|r| r.system_link == ILA_SYSTEM_LINK));
}

#[tokio::test]
async fn blank_report_id_uses_default() {
    let body = multipart_body("people.csv", CSV.as_bytes(), &[("report_id", "  ")]);
    let response = router().oneshot(upload("/attributes/export", body)).await.unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"R001_attributes.xlsx\""
    );
}

#[tokio::test]
async fn unknown_report_type_is_bad_request() {
    let body = multipart_body("people.csv", CSV.as_bytes(), &[("report_type", "Weekly")]);
    let response = router().oneshot(upload("/attributes/preview", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_extension_is_bad_request() {
    let body = multipart_body("notes.txt", b"hello", &[]);
    let response = router().oneshot(upload("/attributes/export", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].as_str().unwrap().contains("Unsupported file type"));
}
