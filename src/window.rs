use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Weekday,
};

use crate::config::WindowConfig;
use crate::models::{AttendanceWindow, Session};
use crate::schedule::{SessionSchedule, resolve_current_friday};

/// Where "now" falls relative to the weekly Friday 13:00 → Saturday 00:00 window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowState {
    Open,
    NotYetOpen { reason: String },
    Closed { reason: String },
}

impl WindowState {
    pub fn is_open(&self) -> bool {
        matches!(self, WindowState::Open)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            WindowState::Open => None,
            WindowState::NotYetOpen { reason } | WindowState::Closed { reason } => {
                Some(reason.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    Missing,
    NoSession(NaiveDate),
    Mismatch,
}

impl CodeError {
    pub fn reason(&self) -> String {
        match self {
            CodeError::Missing => "Session code is required".to_string(),
            CodeError::NoSession(date) => {
                format!("No session scheduled for {}", date.format("%Y-%m-%d"))
            }
            CodeError::Mismatch => "Invalid session code".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    config: WindowConfig,
}

impl TimeWindow {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    pub fn start_hour(&self) -> u32 {
        self.config.start_hour
    }

    pub fn offset(&self) -> FixedOffset {
        self.config.utc_offset
    }

    pub fn state_at(&self, now: DateTime<FixedOffset>) -> WindowState {
        let now = now.with_timezone(&self.config.utc_offset);
        let start_hour = self.config.start_hour;
        match now.weekday() {
            Weekday::Fri => {
                if now.time().hour() >= start_hour {
                    WindowState::Open
                } else {
                    WindowState::NotYetOpen {
                        reason: format!("Attendance marking starts at {}:00 on Friday", start_hour),
                    }
                }
            }
            // The window ends at Saturday 00:00, so the whole of Saturday is past it.
            Weekday::Sat => WindowState::Closed {
                reason: "Attendance marking window closed (ended at Saturday 00:00)".to_string(),
            },
            _ => WindowState::Closed {
                reason: format!(
                    "Attendance can only be marked from Friday {:02}:00 to Saturday 00:00",
                    start_hour
                ),
            },
        }
    }

    /// Window bounds for the week of `friday`, in the club's offset.
    pub fn bounds(
        &self,
        friday: NaiveDate,
    ) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let offset = self.config.utc_offset;
        let start = friday.and_time(NaiveTime::from_hms_opt(self.config.start_hour, 0, 0)?);
        let end = friday.checked_add_days(Days::new(1))?.and_time(NaiveTime::MIN);
        Some((
            offset.from_local_datetime(&start).single()?,
            offset.from_local_datetime(&end).single()?,
        ))
    }

    /// Time left before the window closes, e.g. `"2h 15m"`. `None` when closed.
    pub fn time_remaining(&self, now: DateTime<FixedOffset>) -> Option<String> {
        if !self.state_at(now).is_open() {
            return None;
        }
        let friday = now.with_timezone(&self.config.utc_offset).date_naive();
        let (_, end) = self.bounds(friday)?;
        let remaining = (end - now).num_seconds().max(0);
        Some(format!("{}h {}m", remaining / 3600, (remaining % 3600) / 60))
    }

    pub fn describe(&self, now: DateTime<FixedOffset>) -> Option<AttendanceWindow> {
        let today = now.with_timezone(&self.config.utc_offset).date_naive();
        let (start, end) = self.bounds(resolve_current_friday(today))?;
        let state = self.state_at(now);
        Some(AttendanceWindow {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
            is_active: state.is_open(),
            reason: state.reason().map(str::to_string),
            time_remaining: self.time_remaining(now),
        })
    }
}

/// Checks `code` against the session scheduled for `date`, ignoring case.
pub fn validate_session_code<'a>(
    schedule: &'a SessionSchedule,
    code: &str,
    date: NaiveDate,
) -> Result<&'a Session, CodeError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(CodeError::Missing);
    }
    let session = schedule
        .resolve_session_for_date(date)
        .ok_or(CodeError::NoSession(date))?;
    if session.code.to_uppercase() != code.to_uppercase() {
        return Err(CodeError::Mismatch);
    }
    Ok(session)
}
