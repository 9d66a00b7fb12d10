pub mod attendance_service;
pub mod member_service;
pub mod validation;

pub use attendance_service::AttendanceService;
pub use member_service::MemberService;
