use std::sync::Arc;

use crate::clock::Clock;
use crate::config::WindowConfig;
use crate::schedule::SessionSchedule;
use crate::services::{AttendanceService, MemberService};
use crate::sheets::SheetStore;
use crate::window::TimeWindow;

/// Handles built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SheetStore>,
    pub members: Arc<MemberService>,
    pub attendance: Arc<AttendanceService>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SheetStore>,
        schedule: SessionSchedule,
        window: WindowConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let members = Arc::new(MemberService::new(store.clone()));
        let attendance = Arc::new(AttendanceService::new(
            store.clone(),
            members.clone(),
            Arc::new(schedule),
            TimeWindow::new(window),
            clock.clone(),
        ));
        Self {
            store,
            members,
            attendance,
            clock,
        }
    }
}
