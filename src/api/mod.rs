use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::error::AppError;
use crate::models::{AttendanceReceipt, Member, NewMemberRequest, SessionInfo};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
struct CheckMemberRequest {
    reg_number: Option<String>,
}

#[derive(Serialize)]
struct CheckMemberData {
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    member: Option<Member>,
}

#[derive(Deserialize)]
struct MarkAttendanceRequest {
    reg_number: Option<String>,
    session_code: Option<String>,
}

#[derive(Serialize)]
struct ServicesHealth {
    google_sheets: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    services: ServicesHealth,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/check-member", post(check_member))
        .route("/api/register", post(register))
        .route("/api/mark-attendance", post(mark_attendance))
        .route("/api/session-info", get(session_info))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let google_sheets = match state.store.ping().await {
        Ok(()) => "connected",
        Err(err) => {
            error!("health check failed: {}", err);
            "error"
        }
    };

    Json(HealthResponse {
        status: if google_sheets == "connected" { "healthy" } else { "degraded" },
        timestamp: state.clock.now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        services: ServicesHealth { google_sheets },
    })
}

async fn check_member(
    State(state): State<AppState>,
    payload: Result<Json<CheckMemberRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CheckMemberData>>, AppError> {
    let Json(req) = payload?;
    let raw = req
        .reg_number
        .ok_or_else(|| AppError::BadRequest("Registration number is required".to_string()))?;
    let reg_number = state.members.validate_and_normalize(&raw)?;

    let response = match state.members.get_info(&reg_number).await? {
        Some(member) => ApiResponse::success(CheckMemberData {
            exists: true,
            member: Some(member),
        }),
        None => ApiResponse::success(CheckMemberData {
            exists: false,
            member: None,
        })
        .with_message("Member not found. Would you like to register?"),
    };
    Ok(Json(response))
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<NewMemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Member>>), AppError> {
    let Json(req) = payload?;
    let member = state.members.register_member(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(member).with_message("Registration successful")),
    ))
}

async fn mark_attendance(
    State(state): State<AppState>,
    payload: Result<Json<MarkAttendanceRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AttendanceReceipt>>, AppError> {
    let Json(req) = payload?;
    let (Some(raw), Some(session_code)) = (req.reg_number, req.session_code) else {
        return Err(AppError::BadRequest(
            "Registration number and session code are required".to_string(),
        ));
    };
    let reg_number = state.members.validate_and_normalize(&raw)?;

    let receipt = state
        .attendance
        .mark_attendance(&reg_number, &session_code)
        .await?;
    Ok(Json(
        ApiResponse::success(receipt).with_message("Attendance marked successfully"),
    ))
}

async fn session_info(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SessionInfo>>, AppError> {
    let info = state.attendance.current_session_info()?;
    Ok(Json(ApiResponse::success(info)))
}

async fn not_found() -> AppError {
    AppError::NotFound
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    warn!("recovered from panic in request handler: {}", details);
    AppError::InternalServerError(details).into_response()
}
