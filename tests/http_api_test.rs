// ==========================================
// HTTP 接口集成测试
// ==========================================
// 测试目标: 认证 / 预览 / 提交 / 关键错误 / 文件校验 / 导入历史
// 工具: tower::ServiceExt::oneshot（不监听端口）
// ==========================================

mod test_helpers;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::Value;
use showroom_import::app::{router, AppState, BULK_IMPORT_PATH};
use showroom_import::config::defaults;
use showroom_import::domain::UserRole;
use test_helpers::{
    create_test_db, multipart_body, multipart_content_type, seed_session, Part, CSV_MIME,
};
use tempfile::NamedTempFile;
use tower::ServiceExt;

const STAFF_TOKEN: &str = "staff-token";

struct TestApp {
    _tmp: NamedTempFile,
    db_path: String,
    app: Router,
}

fn setup() -> TestApp {
    let (tmp, db_path) = create_test_db().unwrap();
    seed_session(&db_path, STAFF_TOKEN, UserRole::Manager, Duration::hours(1));
    let state = AppState::new(db_path.clone()).unwrap();
    let app = router(state, defaults::MAX_FILE_BYTES);
    TestApp {
        _tmp: tmp,
        db_path,
        app,
    }
}

fn upload_request(token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(BULK_IMPORT_PATH)
        .header(header::CONTENT_TYPE, multipart_content_type());
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

fn csv_parts<'a>(csv: &'a str, metadata: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::File {
            name: "file",
            file_name: "products.csv",
            content_type: CSV_MIME,
            bytes: csv.as_bytes(),
        },
        Part::Text {
            name: "metadata",
            value: metadata,
        },
    ]
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let t = setup();
    let (status, body) = send(
        &t.app,
        upload_request(None, &csv_parts("Name\nSink\n", r#"{"fileType":"csv"}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_expired_session_is_unauthorized() {
    let t = setup();
    seed_session(&t.db_path, "expired", UserRole::Admin, Duration::hours(-1));
    let (status, _) = send(
        &t.app,
        upload_request(
            Some("expired"),
            &csv_parts("Name\nSink\n", r#"{"fileType":"csv"}"#),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_is_forbidden() {
    let t = setup();
    seed_session(&t.db_path, "customer", UserRole::Customer, Duration::hours(1));
    let (status, body) = send(
        &t.app,
        upload_request(
            Some("customer"),
            &csv_parts("Name\nSink\n", r#"{"fileType":"csv"}"#),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let t = setup();
    let request = Request::builder()
        .method("GET")
        .uri(BULK_IMPORT_PATH)
        .header(header::COOKIE, format!("session_token={}", STAFF_TOKEN))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["batches"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_preview_returns_truncated_result_without_writing() {
    let t = setup();
    let mut csv = String::from("Name,Price\n");
    for i in 0..15 {
        csv.push_str(&format!("Basin {},{}\n", i, 100 + i));
    }
    let mut parts = csv_parts(&csv, r#"{"fileType":"csv"}"#);
    parts.push(Part::Text {
        name: "preview",
        value: "true",
    });

    let (status, body) = send(&t.app, upload_request(Some(STAFF_TOKEN), &parts)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["preview"], true);
    assert_eq!(body["result"]["totalRows"], 15);
    assert_eq!(body["result"]["validRows"], 15);
    assert_eq!(body["result"]["data"].as_array().unwrap().len(), 10);

    let (_, history) = send(&t.app, history_request(None)).await;
    assert_eq!(history["batches"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_commit_then_history_by_batch() {
    let t = setup();
    let metadata = r#"{
        "fileType": "csv",
        "columnMapping": {"name": "Product Name", "price": "Price", "stockQuantity": "Qty"},
        "importOptions": {"bulkImportBatch": "spring-catalog", "defaultStatus": "published"}
    }"#;
    let parts = csv_parts(
        "Product Name,Price,Qty\n\"Kitchen Sink\",299.99,5\nFaucet,89,12\n",
        metadata,
    );

    let (status, body) = send(&t.app, upload_request(Some(STAFF_TOKEN), &parts)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["batchId"], "spring-catalog");
    assert_eq!(body["results"]["imported"], 2);
    assert_eq!(body["results"]["total"], 2);
    assert_eq!(body["originalResult"]["totalRows"], 2);
    assert!(body["originalResult"].get("data").is_none());

    let (status, history) = send(&t.app, history_request(Some("spring-catalog"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["batchId"], "spring-catalog");
    let products = history["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| p["status"] == "published"));

    let (_, all) = send(&t.app, history_request(None)).await;
    let batches = all["batches"].as_array().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0]["batchId"], "spring-catalog");
    assert_eq!(batches[0]["productCount"], 2);
}

#[tokio::test]
async fn test_missing_name_rejects_whole_upload() {
    let t = setup();
    let parts = csv_parts("Name,Price\nSink,10\n,20\n", r#"{"fileType":"csv"}"#);

    let (status, body) = send(&t.app, upload_request(Some(STAFF_TOKEN), &parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "File contains critical validation errors");
    assert_eq!(body["result"]["totalRows"], 2);
    assert_eq!(body["result"]["validRows"], 1);
    assert_eq!(body["result"]["errors"][0]["row"], 2);

    let (_, history) = send(&t.app, history_request(None)).await;
    assert_eq!(history["batches"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_invalid_mime_type_rejected() {
    let t = setup();
    let parts = vec![
        Part::File {
            name: "file",
            file_name: "catalog.pdf",
            content_type: "application/pdf",
            bytes: b"%PDF-1.4",
        },
        Part::Text {
            name: "metadata",
            value: r#"{"fileType":"csv"}"#,
        },
    ];
    let (status, body) = send(&t.app, upload_request(Some(STAFF_TOKEN), &parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid file type. Only Excel and CSV files are allowed"
    );
}

#[tokio::test]
async fn test_missing_file_and_metadata_rejected() {
    let t = setup();
    let only_metadata = vec![Part::Text {
        name: "metadata",
        value: r#"{"fileType":"csv"}"#,
    }];
    let (status, body) = send(&t.app, upload_request(Some(STAFF_TOKEN), &only_metadata)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");

    let only_file = vec![Part::File {
        name: "file",
        file_name: "products.csv",
        content_type: CSV_MIME,
        bytes: b"Name\nSink\n",
    }];
    let (status, body) = send(&t.app, upload_request(Some(STAFF_TOKEN), &only_file)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing import metadata");
}

#[tokio::test]
async fn test_malformed_metadata_is_a_generic_server_error() {
    let t = setup();
    let parts = csv_parts("Name\nSink\n", "{fileType: csv");
    let (status, body) = send(&t.app, upload_request(Some(STAFF_TOKEN), &parts)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to process bulk import");

    let (_, history) = send(&t.app, history_request(None)).await;
    assert_eq!(history["batches"], Value::Array(vec![]));
}

fn oversized_csv() -> String {
    let mut csv = String::from("Name,Description\n");
    let filler = "x".repeat(1000);
    while csv.len() < 12 * 1024 * 1024 {
        csv.push_str(&format!("Basin,{}\n", filler));
    }
    csv
}

#[tokio::test]
async fn test_oversized_upload_with_content_length_is_json_400() {
    let t = setup();
    let csv = oversized_csv();
    let body = multipart_body(&csv_parts(&csv, r#"{"fileType":"csv"}"#));
    let request = Request::builder()
        .method("POST")
        .uri(BULK_IMPORT_PATH)
        .header(header::CONTENT_TYPE, multipart_content_type())
        .header(header::CONTENT_LENGTH, body.len())
        .header(header::AUTHORIZATION, format!("Bearer {}", STAFF_TOKEN))
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "File size exceeds 10 MB limit");
}

#[tokio::test]
async fn test_oversized_streamed_upload_is_json_400() {
    let t = setup();
    let csv = oversized_csv();
    let (status, body) = send(
        &t.app,
        upload_request(Some(STAFF_TOKEN), &csv_parts(&csv, r#"{"fileType":"csv"}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "File size exceeds 10 MB limit");
}

fn history_request(batch_id: Option<&str>) -> Request<Body> {
    let uri = match batch_id {
        Some(id) => format!("{}?batchId={}", BULK_IMPORT_PATH, id),
        None => BULK_IMPORT_PATH.to_string(),
    };
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", STAFF_TOKEN))
        .body(Body::empty())
        .unwrap()
}
