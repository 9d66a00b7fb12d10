pub mod member;
pub mod session;

pub use member::{
    Course, Department, DepartmentsInput, Gender, Member, NewMember, NewMemberRequest, YearInput,
};
pub use session::{AttendanceReceipt, AttendanceWindow, Session, SessionDetails, SessionInfo};
