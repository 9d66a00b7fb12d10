use chrono::NaiveDate;
use serde::Serialize;

/// A scheduled Friday session and its secret code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub date: NaiveDate,
    pub department: String,
    #[serde(skip_serializing)]
    pub code: String,
    pub description: String,
}

/// Returned by a successful attendance mark.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceReceipt {
    pub reg_number: String,
    pub full_name: String,
    pub session_date: NaiveDate,
    pub department: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceWindow {
    pub start: String,
    pub end: String,
    pub is_active: bool,
    pub reason: Option<String>,
    pub time_remaining: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDetails {
    pub date: NaiveDate,
    pub day: &'static str,
    pub department: String,
    pub description: String,
    pub time: &'static str,
    pub attendance_window: AttendanceWindow,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub has_session: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub next_session: Option<Session>,
}
