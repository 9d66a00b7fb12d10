use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::AppError;
use crate::models::Session;

const NETWORKING: &str = "Design and implementation of robust networks";
const MAINTENANCE: &str = "Hardware/software troubleshooting and repair";
const GRAPHICS: &str = "Visual design using Adobe tools & Canva";
const AI_ML: &str = "AI-driven automation and prototyping";
const CYBER: &str = "Ethical hacking, digital forensics, and secure computing";
const PROGRAMMING: &str = "Software development in Python, JavaScript, PHP, etc.";

/// Meeting slot shown alongside every session.
pub const SESSION_TIME: &str = "13:30 - 15:30 EAT";

/// (date, department, code, description)
pub type CalendarEntry = (&'static str, &'static str, &'static str, &'static str);

const CLUB_CALENDAR: [CalendarEntry; 10] = [
    ("2026-01-30", "Networking", "NET30JAN", NETWORKING),
    ("2026-02-06", "Computer Maintenance", "COMP06FEB", MAINTENANCE),
    ("2026-02-13", "Graphic Design", "GRAPH13FEB", GRAPHICS),
    ("2026-02-20", "Artificial Intelligence (AI) & Machine Learning", "AI20FEB", AI_ML),
    ("2026-02-27", "Cybersecurity", "CYBER27FEB", CYBER),
    ("2026-03-06", "Programming", "PROG06MAR", PROGRAMMING),
    ("2026-03-13", "Networking", "NET13MAR", NETWORKING),
    ("2026-03-20", "Computer Maintenance", "COMP20MAR", MAINTENANCE),
    ("2026-03-27", "Graphic Design", "GRAPH27MAR", GRAPHICS),
    ("2026-04-03", "Artificial Intelligence (AI) & Machine Learning", "AI03APR", AI_ML),
];

/// Static calendar of Friday sessions, keyed and ordered by date.
#[derive(Debug, Clone)]
pub struct SessionSchedule {
    sessions: BTreeMap<NaiveDate, Session>,
}

impl SessionSchedule {
    /// Builds a schedule, refusing two sessions on the same date.
    pub fn new(sessions: impl IntoIterator<Item = Session>) -> Result<Self, AppError> {
        let mut map = BTreeMap::new();
        for session in sessions {
            let date = session.date;
            if map.insert(date, session).is_some() {
                return Err(AppError::Config(format!(
                    "more than one session scheduled for {}",
                    date
                )));
            }
        }
        Ok(Self { sessions: map })
    }

    /// The club's built-in semester calendar.
    pub fn club_calendar() -> Result<Self, AppError> {
        Self::from_entries(&CLUB_CALENDAR)
    }

    /// Builds a schedule from `YYYY-MM-DD` calendar rows.
    pub fn from_entries(entries: &[CalendarEntry]) -> Result<Self, AppError> {
        let sessions = entries
            .iter()
            .map(|&(date, department, code, description)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
                    AppError::Config(format!("invalid session date '{}': {}", date, e))
                })?;
                Ok(Session {
                    date,
                    department: department.to_string(),
                    code: code.to_string(),
                    description: description.to_string(),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        Self::new(sessions)
    }

    pub fn resolve_session_for_date(&self, date: NaiveDate) -> Option<&Session> {
        self.sessions.get(&date)
    }

    /// First session strictly after `date`.
    pub fn next_session_after(&self, date: NaiveDate) -> Option<&Session> {
        self.sessions
            .range(date.succ_opt()?..)
            .next()
            .map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Today when it is Friday, otherwise the most recent Friday before it.
pub fn resolve_current_friday(today: NaiveDate) -> NaiveDate {
    let since_friday = (today.weekday().num_days_from_monday() + 7
        - Weekday::Fri.num_days_from_monday())
        % 7;
    today
        .checked_sub_days(Days::new(u64::from(since_friday)))
        .unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn club_calendar_has_every_friday() {
        let schedule = SessionSchedule::club_calendar().unwrap();
        assert_eq!(schedule.len(), CLUB_CALENDAR.len());
        let first = schedule.resolve_session_for_date(date("2026-01-30")).unwrap();
        assert_eq!(first.code, "NET30JAN");
        assert_eq!(first.department, "Networking");
        assert!(schedule.resolve_session_for_date(date("2026-01-31")).is_none());
    }

    #[test]
    fn current_friday_resolution() {
        // 2026-01-30 is a Friday.
        assert_eq!(resolve_current_friday(date("2026-01-30")), date("2026-01-30"));
        assert_eq!(resolve_current_friday(date("2026-01-31")), date("2026-01-30"));
        assert_eq!(resolve_current_friday(date("2026-02-01")), date("2026-01-30"));
        assert_eq!(resolve_current_friday(date("2026-02-02")), date("2026-01-30"));
        assert_eq!(resolve_current_friday(date("2026-02-05")), date("2026-01-30"));
        assert_eq!(resolve_current_friday(date("2026-02-06")), date("2026-02-06"));
    }

    #[test]
    fn next_session_is_strictly_after() {
        let schedule = SessionSchedule::club_calendar().unwrap();
        let next = schedule.next_session_after(date("2026-01-30")).unwrap();
        assert_eq!(next.date, date("2026-02-06"));
        let next = schedule.next_session_after(date("2026-01-01")).unwrap();
        assert_eq!(next.date, date("2026-01-30"));
        assert!(schedule.next_session_after(date("2026-04-03")).is_none());
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let session = Session {
            date: date("2026-05-01"),
            department: "Programming".to_string(),
            code: "PROG01MAY".to_string(),
            description: String::new(),
        };
        assert!(SessionSchedule::new(vec![session.clone(), session]).is_err());

        let repeated = [
            ("2026-05-01", "Programming", "PROG01MAY", ""),
            ("2026-05-01", "Cybersecurity", "CYBER01MAY", ""),
        ];
        assert!(SessionSchedule::from_entries(&repeated).is_err());
    }

    #[test]
    fn unparseable_dates_are_rejected() {
        let entries = [
            ("2026-05-01", "Programming", "PROG01MAY", ""),
            ("2026-13-01", "Cybersecurity", "CYBER01XXX", ""),
        ];
        let err = SessionSchedule::from_entries(&entries).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.details().unwrap().contains("2026-13-01"));
    }
}
