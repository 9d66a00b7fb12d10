use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{DateTime, NaiveDate};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use club_attendance::api::router;
use club_attendance::clock::FixedClock;
use club_attendance::config::WindowConfig;
use club_attendance::error::AppError;
use club_attendance::models::{Member, NewMember};
use club_attendance::schedule::SessionSchedule;
use club_attendance::sheets::{MemorySheetStore, SheetStore};
use club_attendance::state::AppState;

fn app_at(now: &str) -> Router {
    let clock = Arc::new(FixedClock(DateTime::parse_from_rfc3339(now).unwrap()));
    let store = Arc::new(MemorySheetStore::new(clock.clone()));
    router(AppState::new(
        store,
        SessionSchedule::club_calendar().unwrap(),
        WindowConfig::default(),
        clock,
    ))
}

/// A store whose spreadsheet is unreachable and whose member lookup panics.
struct BrokenStore;

#[async_trait]
impl SheetStore for BrokenStore {
    async fn find_member(&self, _reg_number: &str) -> Result<Option<Member>, AppError> {
        panic!("boom")
    }

    async fn insert_member(&self, _member: &NewMember) -> Result<Member, AppError> {
        Err(AppError::Sheets("unreachable".to_string()))
    }

    async fn resolve_or_create_date_column(&self, _date: NaiveDate) -> Result<usize, AppError> {
        Err(AppError::Sheets("unreachable".to_string()))
    }

    async fn mark_present(&self, _reg_number: &str, _date: NaiveDate) -> Result<(), AppError> {
        Err(AppError::Sheets("unreachable".to_string()))
    }

    async fn is_present(&self, _reg_number: &str, _date: NaiveDate) -> Result<bool, AppError> {
        Err(AppError::Sheets("unreachable".to_string()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Sheets("spreadsheet not reachable".to_string()))
    }
}

fn broken_app() -> Router {
    let clock = Arc::new(FixedClock(
        DateTime::parse_from_rfc3339("2026-01-30T14:00:00+03:00").unwrap(),
    ));
    router(AppState::new(
        Arc::new(BrokenStore),
        SessionSchedule::club_calendar().unwrap(),
        WindowConfig::default(),
        clock,
    ))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn registration(reg_number: &str) -> Value {
    json!({
        "reg_number": reg_number,
        "full_name": "Asha Said",
        "email": "asha@example.com",
        "phone": "0712345678",
        "gender": "Female",
        "year_of_study": "3",
        "course": "CS",
        "departments": ["Programming", "Cybersecurity"]
    })
}

#[tokio::test]
async fn health_reports_connected_store() {
    let app = app_at("2026-01-30T14:00:00+03:00");

    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["google_sheets"], "connected");
    assert_eq!(body["timestamp"], "2026-01-30T14:00:00+03:00");
}

#[tokio::test]
async fn register_then_check_member() {
    let app = app_at("2026-01-28T10:00:00+03:00");

    let (status, body) =
        send(&app, "POST", "/api/register", Some(registration("T/DEG/2021/12"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["data"]["registration_date"], "2026-01-28");
    assert_eq!(body["data"]["departments"], json!(["Programming", "Cybersecurity"]));

    let (status, body) = send(
        &app,
        "POST",
        "/api/check-member",
        Some(json!({ "reg_number": "t/deg/2021/12" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["exists"], true);
    assert_eq!(body["data"]["member"]["full_name"], "Asha Said");
}

#[tokio::test]
async fn check_member_for_stranger() {
    let app = app_at("2026-01-28T10:00:00+03:00");

    let (status, body) = send(
        &app,
        "POST",
        "/api/check-member",
        Some(json!({ "reg_number": "T/DIP/2019/7" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["exists"], false);
    assert!(body["data"].get("member").is_none());
    assert_eq!(body["message"], "Member not found. Would you like to register?");
}

#[tokio::test]
async fn malformed_registration_number_is_rejected() {
    let app = app_at("2026-01-28T10:00:00+03:00");

    let (status, body) = send(
        &app,
        "POST",
        "/api/check-member",
        Some(json!({ "reg_number": "T/MSC/2020/1" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_REG_NUMBER");
}

#[tokio::test]
async fn duplicate_registration_is_conflict() {
    let app = app_at("2026-01-28T10:00:00+03:00");

    send(&app, "POST", "/api/register", Some(registration("T/DEG/2021/12"))).await;
    let (status, body) =
        send(&app, "POST", "/api/register", Some(registration("T/DEG/2021/12"))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_REGISTRATION");
}

#[tokio::test]
async fn registration_field_errors_are_bad_requests() {
    let app = app_at("2026-01-28T10:00:00+03:00");
    let mut payload = registration("T/DEG/2021/12");
    payload["email"] = json!("asha-at-example");

    let (status, body) = send(&app, "POST", "/api/register", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_EMAIL");
    assert_eq!(body["error"]["details"], "field: email");
}

#[tokio::test]
async fn mark_attendance_success_then_duplicate() {
    let app = app_at("2026-01-30T14:00:00+03:00");
    send(&app, "POST", "/api/register", Some(registration("T/DEG/2021/12"))).await;
    let payload = json!({ "reg_number": "T/DEG/2021/12", "session_code": "net30jan" });

    let (status, body) = send(&app, "POST", "/api/mark-attendance", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["department"], "Networking");
    assert_eq!(body["data"]["session_date"], "2026-01-30");
    assert_eq!(body["data"]["full_name"], "Asha Said");

    let (status, body) = send(&app, "POST", "/api/mark-attendance", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_ATTENDANCE");
    assert_eq!(
        body["error"]["details"],
        "You have already marked attendance for 2026-01-30"
    );
}

#[tokio::test]
async fn mark_attendance_error_statuses() {
    let app = app_at("2026-01-30T12:30:00+03:00");
    send(&app, "POST", "/api/register", Some(registration("T/DEG/2021/12"))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/mark-attendance",
        Some(json!({ "reg_number": "T/DEG/2021/99", "session_code": "NET30JAN" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "MEMBER_NOT_FOUND");

    let (status, body) = send(
        &app,
        "POST",
        "/api/mark-attendance",
        Some(json!({ "reg_number": "T/DEG/2021/12", "session_code": "NET30JAN" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TIME_WINDOW_CLOSED");
}

#[tokio::test]
async fn mark_attendance_requires_both_fields() {
    let app = app_at("2026-01-30T14:00:00+03:00");

    let (status, body) = send(
        &app,
        "POST",
        "/api/mark-attendance",
        Some(json!({ "reg_number": "T/DEG/2021/12" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn invalid_json_body_is_invalid_request() {
    let app = app_at("2026-01-30T14:00:00+03:00");
    let request = Request::builder()
        .uri("/api/register")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn session_info_envelope() {
    let app = app_at("2026-01-30T22:00:00+03:00");

    let (status, body) = send(&app, "GET", "/api/session-info", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["has_session"], true);
    assert_eq!(body["data"]["session"]["time"], "13:30 - 15:30 EAT");
    let window = &body["data"]["session"]["attendance_window"];
    assert_eq!(window["is_active"], true);
    assert_eq!(window["time_remaining"], "2h 0m");
    assert_eq!(window["start"], "2026-01-30T13:00:00+03:00");
    assert!(body["data"]["next_session"].get("code").is_none());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = app_at("2026-01-30T14:00:00+03:00");

    let (status, body) = send(&app, "GET", "/api/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn wrongly_typed_registration_fields_keep_their_codes() {
    let app = app_at("2026-01-28T10:00:00+03:00");
    let cases = [
        ("year_of_study", json!(2.5), "INVALID_YEAR"),
        ("year_of_study", json!(null), "INVALID_YEAR"),
        ("year_of_study", json!("third"), "INVALID_YEAR"),
        ("departments", json!(null), "INVALID_DEPARTMENTS"),
        ("departments", json!("Programming"), "INVALID_DEPARTMENTS"),
        ("departments", json!([1, 2]), "INVALID_DEPARTMENTS"),
    ];

    for (field, value, code) in cases {
        let mut payload = registration("T/DEG/2021/12");
        payload[field] = value.clone();

        let (status, body) = send(&app, "POST", "/api/register", Some(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{} = {}", field, value);
        assert_eq!(body["error"]["code"], code, "{} = {}", field, value);
        assert_eq!(body["error"]["details"], format!("field: {}", field));
    }
}

#[tokio::test]
async fn health_is_degraded_when_store_is_unreachable() {
    let app = broken_app();

    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["google_sheets"], "error");
}

#[tokio::test]
async fn handler_panic_renders_unknown_error() {
    let app = broken_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/check-member",
        Some(json!({ "reg_number": "T/DEG/2021/12" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNKNOWN_ERROR");
    assert_eq!(body["error"]["details"], "boom");
}
