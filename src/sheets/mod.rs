pub mod auth;
pub mod dto;
pub mod google;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::{Member, NewMember};

pub use google::SheetsHttpClient;
pub use memory::MemorySheetStore;

/// Cell value written for an attended session.
pub const PRESENT: &str = "Present";
pub const DEFAULT_ROLE: &str = "Member";

pub const REG_NUMBER_HEADER: &str = "Reg Number";
pub const FULL_NAME_HEADER: &str = "Full Name";

/// Header row of the Members sheet, in column order.
pub static MEMBER_HEADERS: [&str; 11] = [
    REG_NUMBER_HEADER,
    FULL_NAME_HEADER,
    "Email",
    "Phone",
    "Gender",
    "Year of Study",
    "Course",
    "Departments",
    "Active",
    "Role",
    "Registration Date",
];

/// Fixed leading headers of the Attendance sheet; date columns follow.
pub static ATTENDANCE_HEADERS: [&str; 2] = [REG_NUMBER_HEADER, FULL_NAME_HEADER];

/// Row/column operations against the club spreadsheet.
///
/// Nothing here locks: two writers creating the same date column at once can
/// both append a header. The spreadsheet is last-write-wins.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn find_member(&self, reg_number: &str) -> Result<Option<Member>, AppError>;
    /// Appends the member row and a companion `Reg Number | Full Name` attendance row.
    async fn insert_member(&self, member: &NewMember) -> Result<Member, AppError>;
    /// 1-based index of the attendance column headed by `date`, created if missing.
    async fn resolve_or_create_date_column(&self, date: NaiveDate) -> Result<usize, AppError>;
    async fn mark_present(&self, reg_number: &str, date: NaiveDate) -> Result<(), AppError>;
    async fn is_present(&self, reg_number: &str, date: NaiveDate) -> Result<bool, AppError>;
    async fn ping(&self) -> Result<(), AppError>;
}

pub fn date_header(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `1 -> A`, `26 -> Z`, `27 -> AA`.
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Sheet names are always quoted so spaces and punctuation survive.
pub fn quote_sheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

fn cell(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|i| row.get(i))
        .map(|s| s.trim())
        .unwrap_or("")
}

fn header_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn same_key(cell: &str, reg_number: &str) -> bool {
    cell.trim().eq_ignore_ascii_case(reg_number.trim())
}

/// Scans a Members grid (header row first) for `reg_number`.
pub fn find_member_in(grid: &[Vec<String>], reg_number: &str) -> Option<Member> {
    let (headers, rows) = grid.split_first()?;
    let key = header_index(headers, REG_NUMBER_HEADER)?;
    rows.iter()
        .find(|row| same_key(cell(row, Some(key)), reg_number))
        .map(|row| member_from_row(headers, row))
}

/// Reads a member row by header name. Empty `Active` means active.
pub fn member_from_row(headers: &[String], row: &[String]) -> Member {
    let get = |name: &str| cell(row, header_index(headers, name)).to_string();

    let active_cell = get("Active");
    let role = get("Role");

    Member {
        reg_number: get(REG_NUMBER_HEADER),
        full_name: get(FULL_NAME_HEADER),
        email: get("Email"),
        phone: get("Phone"),
        gender: get("Gender"),
        year_of_study: get("Year of Study").parse().ok(),
        course: get("Course"),
        departments: get("Departments")
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect(),
        active: active_cell.is_empty() || active_cell.eq_ignore_ascii_case("TRUE"),
        role: if role.is_empty() { DEFAULT_ROLE.to_string() } else { role },
        registration_date: get("Registration Date"),
    }
}

/// Cells of a new Members row, in `MEMBER_HEADERS` order.
pub fn member_row(member: &NewMember, registration_date: NaiveDate) -> Vec<String> {
    vec![
        member.reg_number.clone(),
        member.full_name.clone(),
        member.email.clone(),
        member.phone.clone(),
        member.gender.as_str().to_string(),
        member.year_of_study.to_string(),
        member.course.as_str().to_string(),
        member.departments_cell(),
        "TRUE".to_string(),
        DEFAULT_ROLE.to_string(),
        date_header(registration_date),
    ]
}

pub fn stored_member(member: &NewMember, registration_date: NaiveDate) -> Member {
    Member {
        reg_number: member.reg_number.clone(),
        full_name: member.full_name.clone(),
        email: member.email.clone(),
        phone: member.phone.clone(),
        gender: member.gender.as_str().to_string(),
        year_of_study: Some(member.year_of_study),
        course: member.course.as_str().to_string(),
        departments: member
            .departments
            .iter()
            .map(|d| d.as_str().to_string())
            .collect(),
        active: true,
        role: DEFAULT_ROLE.to_string(),
        registration_date: date_header(registration_date),
    }
}

/// 1-based index of the row whose first cell is `reg_number`.
pub fn attendance_row_index(key_column: &[String], reg_number: &str) -> Option<usize> {
    key_column
        .iter()
        .skip(1)
        .position(|c| same_key(c, reg_number))
        .map(|i| i + 2)
}

/// Whether the Attendance grid has `Present` for the member under `date`.
/// A missing date column or member row reads as not present.
pub fn is_present_in(grid: &[Vec<String>], reg_number: &str, date: NaiveDate) -> bool {
    let Some((headers, rows)) = grid.split_first() else {
        return false;
    };
    let Some(date_col) = header_index(headers, &date_header(date)) else {
        return false;
    };
    let key = header_index(headers, REG_NUMBER_HEADER).unwrap_or(0);
    rows.iter()
        .find(|row| same_key(cell(row, Some(key)), reg_number))
        .is_some_and(|row| cell(row, Some(date_col)) == PRESENT)
}

/// 1-based index of `date`'s header in the attendance header row.
pub fn date_column_in(headers: &[String], date: NaiveDate) -> Option<usize> {
    header_index(headers, &date_header(date)).map(|i| i + 1)
}
