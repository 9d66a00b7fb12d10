use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::AppError;
use crate::models::{AttendanceReceipt, SessionDetails, SessionInfo};
use crate::schedule::{SESSION_TIME, SessionSchedule, resolve_current_friday};
use crate::services::member_service::MemberService;
use crate::services::validation::normalize_reg_number;
use crate::sheets::SheetStore;
use crate::window::{TimeWindow, validate_session_code};

pub struct AttendanceService {
    store: Arc<dyn SheetStore>,
    members: Arc<MemberService>,
    schedule: Arc<SessionSchedule>,
    window: TimeWindow,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn SheetStore>,
        members: Arc<MemberService>,
        schedule: Arc<SessionSchedule>,
        window: TimeWindow,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            members,
            schedule,
            window,
            clock,
        }
    }

    fn current_friday(&self) -> NaiveDate {
        let today = self.clock.now().with_timezone(&self.window.offset()).date_naive();
        resolve_current_friday(today)
    }

    /// Runs the marking checks in order and stops at the first failure:
    /// member exists, member active, window open, code valid, not yet marked.
    pub async fn mark_attendance(
        &self,
        reg_number: &str,
        session_code: &str,
    ) -> Result<AttendanceReceipt, AppError> {
        let reg_number = normalize_reg_number(reg_number);

        let member = self
            .members
            .get_info(&reg_number)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        if !member.active {
            return Err(AppError::MemberInactive);
        }

        let state = self.window.state_at(self.clock.now());
        if let Some(reason) = state.reason() {
            return Err(AppError::TimeWindowClosed(reason.to_string()));
        }

        let friday = self.current_friday();
        let session = validate_session_code(&self.schedule, session_code, friday)
            .map_err(|e| AppError::InvalidSessionCode(e.reason()))?;

        if self.store.is_present(&reg_number, friday).await? {
            warn!("{} already marked present for {}", reg_number, friday);
            return Err(AppError::DuplicateAttendance(friday));
        }

        self.store
            .mark_present(&reg_number, friday)
            .await
            .map_err(|e| match e {
                AppError::Sheets(msg) => AppError::Sheets(msg),
                other => AppError::Sheets(other.to_string()),
            })?;

        info!("{} marked present for {} ({})", reg_number, friday, session.department);
        Ok(AttendanceReceipt {
            reg_number,
            full_name: member.full_name,
            session_date: friday,
            department: session.department.clone(),
        })
    }

    pub async fn has_marked_attendance(
        &self,
        reg_number: &str,
        date: NaiveDate,
    ) -> Result<bool, AppError> {
        self.store.is_present(&normalize_reg_number(reg_number), date).await
    }

    /// This week's session with its window status, plus the session after it.
    pub fn current_session_info(&self) -> Result<SessionInfo, AppError> {
        let now = self.clock.now();
        let friday = self.current_friday();
        let next_session = self.schedule.next_session_after(friday).cloned();

        let Some(session) = self.schedule.resolve_session_for_date(friday) else {
            return Ok(SessionInfo {
                has_session: false,
                session: None,
                message: Some("No session scheduled for this week".to_string()),
                next_session,
            });
        };

        let attendance_window = self.window.describe(now).ok_or_else(|| {
            AppError::InternalServerError(format!(
                "cannot compute attendance window for {}",
                friday
            ))
        })?;

        Ok(SessionInfo {
            has_session: true,
            session: Some(SessionDetails {
                date: friday,
                day: "Friday",
                department: session.department.clone(),
                description: session.description.clone(),
                time: SESSION_TIME,
                attendance_window,
            }),
            message: None,
            next_session,
        })
    }
}
