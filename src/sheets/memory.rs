use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::clock::Clock;
use crate::error::AppError;
use crate::models::{Member, NewMember};
use crate::sheets::{self, ATTENDANCE_HEADERS, MEMBER_HEADERS, PRESENT, SheetStore};

struct Grids {
    members: Vec<Vec<String>>,
    attendance: Vec<Vec<String>>,
}

/// In-process spreadsheet with the same wide-format layout as the Google sheets.
pub struct MemorySheetStore {
    grids: Mutex<Grids>,
    clock: Arc<dyn Clock>,
}

fn header(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

impl MemorySheetStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            grids: Mutex::new(Grids {
                members: vec![header(&MEMBER_HEADERS)],
                attendance: vec![header(&ATTENDANCE_HEADERS)],
            }),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Grids>, AppError> {
        self.grids
            .lock()
            .map_err(|_| AppError::Sheets("in-memory sheet lock poisoned".to_string()))
    }

    /// Direct edit of the Members grid, as a club admin would do in the spreadsheet.
    pub fn edit_members<F>(&self, edit: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Vec<Vec<String>>),
    {
        edit(&mut self.lock()?.members);
        Ok(())
    }

    /// Direct edit of the Attendance grid.
    pub fn edit_attendance<F>(&self, edit: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Vec<Vec<String>>),
    {
        edit(&mut self.lock()?.attendance);
        Ok(())
    }

    pub fn attendance_snapshot(&self) -> Result<Vec<Vec<String>>, AppError> {
        Ok(self.lock()?.attendance.clone())
    }

    fn ensure_date_column(grids: &mut Grids, date: NaiveDate) -> usize {
        if grids.attendance.is_empty() {
            grids.attendance.push(header(&ATTENDANCE_HEADERS));
        }
        let headers = &mut grids.attendance[0];
        if let Some(col) = sheets::date_column_in(headers, date) {
            return col;
        }
        headers.push(sheets::date_header(date));
        headers.len()
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn find_member(&self, reg_number: &str) -> Result<Option<Member>, AppError> {
        Ok(sheets::find_member_in(&self.lock()?.members, reg_number))
    }

    async fn insert_member(&self, member: &NewMember) -> Result<Member, AppError> {
        let registration_date = self.clock.now().date_naive();
        let mut grids = self.lock()?;
        grids.members.push(sheets::member_row(member, registration_date));
        grids
            .attendance
            .push(vec![member.reg_number.clone(), member.full_name.clone()]);
        Ok(sheets::stored_member(member, registration_date))
    }

    async fn resolve_or_create_date_column(&self, date: NaiveDate) -> Result<usize, AppError> {
        let mut grids = self.lock()?;
        Ok(Self::ensure_date_column(&mut grids, date))
    }

    async fn mark_present(&self, reg_number: &str, date: NaiveDate) -> Result<(), AppError> {
        let mut grids = self.lock()?;
        let key_column: Vec<String> = grids
            .attendance
            .iter()
            .map(|row| row.first().cloned().unwrap_or_default())
            .collect();
        let row = sheets::attendance_row_index(&key_column, reg_number).ok_or_else(|| {
            AppError::Sheets(format!("Member {} not found in attendance sheet", reg_number))
        })?;

        let col = Self::ensure_date_column(&mut grids, date);
        let cells = &mut grids.attendance[row - 1];
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = PRESENT.to_string();
        Ok(())
    }

    async fn is_present(&self, reg_number: &str, date: NaiveDate) -> Result<bool, AppError> {
        Ok(sheets::is_present_in(&self.lock()?.attendance, reg_number, date))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}
