use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    /// A request field failed validation. `code` is field specific, e.g. `INVALID_EMAIL`.
    #[error("{message}")]
    Validation {
        code: &'static str,
        field: &'static str,
        message: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Member not found")]
    MemberNotFound,

    #[error("Your membership is inactive")]
    MemberInactive,

    #[error("Attendance marking window closed")]
    TimeWindowClosed(String),

    #[error("{0}")]
    InvalidSessionCode(String),

    #[error("Attendance already marked")]
    DuplicateAttendance(NaiveDate),

    #[error("Member already registered")]
    DuplicateRegistration(String),

    #[error("Spreadsheet error: {0}")]
    Sheets(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal server error")]
    InternalServerError(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl AppError {
    pub fn validation(code: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            code,
            field,
            message: message.into(),
        }
    }

    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::BadRequest(_) => "INVALID_REQUEST",
            AppError::MemberNotFound => "MEMBER_NOT_FOUND",
            AppError::MemberInactive => "MEMBER_INACTIVE",
            AppError::TimeWindowClosed(_) => "TIME_WINDOW_CLOSED",
            AppError::InvalidSessionCode(_) => "INVALID_SESSION_CODE",
            AppError::DuplicateAttendance(_) => "DUPLICATE_ATTENDANCE",
            AppError::DuplicateRegistration(_) => "DUPLICATE_REGISTRATION",
            AppError::Sheets(_) => "SHEETS_API_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::NotFound => "NOT_FOUND",
            AppError::InternalServerError(_) => "UNKNOWN_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. }
            | AppError::BadRequest(_)
            | AppError::TimeWindowClosed(_)
            | AppError::InvalidSessionCode(_) => StatusCode::BAD_REQUEST,
            AppError::MemberNotFound | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MemberInactive => StatusCode::FORBIDDEN,
            AppError::DuplicateAttendance(_) | AppError::DuplicateRegistration(_) => {
                StatusCode::CONFLICT
            }
            AppError::Sheets(_) | AppError::Config(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn details(&self) -> Option<String> {
        match self {
            AppError::Validation { field, .. } => Some(format!("field: {}", field)),
            AppError::BadRequest(_) | AppError::NotFound => None,
            AppError::MemberNotFound => {
                Some("Registration number not in database. Please register first.".to_string())
            }
            AppError::MemberInactive => Some("Please contact club administration".to_string()),
            AppError::TimeWindowClosed(reason) => Some(reason.clone()),
            AppError::InvalidSessionCode(_) => {
                Some("The session code provided is incorrect".to_string())
            }
            AppError::DuplicateAttendance(date) => Some(format!(
                "You have already marked attendance for {}",
                date.format("%Y-%m-%d")
            )),
            AppError::DuplicateRegistration(reg_number) => Some(format!(
                "Registration number {} is already registered",
                reg_number
            )),
            AppError::Sheets(msg) | AppError::Config(msg) | AppError::InternalServerError(msg) => {
                Some(msg.clone())
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Sheets(_) => "Database error".to_string(),
            AppError::Config(_) => "Server misconfigured".to_string(),
            AppError::InternalServerError(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Sheets(format!("request to Google Sheets failed: {}", e))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Sheets(format!("unexpected Google Sheets payload: {}", e))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Sheets(format!("failed to sign service account assertion: {}", e))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{} ({}): {:?}", self.code(), status, self.details());
        }

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code(),
                message: self.message(),
                details: self.details(),
            },
        });

        (status, body).into_response()
    }
}
