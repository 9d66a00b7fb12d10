use std::env;
use std::str::FromStr;

use chrono::FixedOffset;

use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Google,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(StoreBackend::Google),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::Config(format!(
                "STORE_BACKEND must be 'google' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub members_sheet: String,
    pub attendance_sheet: String,
    pub credentials_path: String,
    pub api_base: String,
}

impl SheetsConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let spreadsheet_id = env::var("SPREADSHEET_ID")
            .map_err(|_| AppError::Config("SPREADSHEET_ID is not set".to_string()))?;
        let credentials_path = env::var("GOOGLE_APPLICATION_CREDENTIALS").map_err(|_| {
            AppError::Config("GOOGLE_APPLICATION_CREDENTIALS is not set".to_string())
        })?;

        Ok(Self {
            spreadsheet_id,
            members_sheet: env::var("MEMBERS_SHEET").unwrap_or_else(|_| "Members".to_string()),
            attendance_sheet: env::var("ATTENDANCE_SHEET")
                .unwrap_or_else(|_| "Attendance".to_string()),
            credentials_path,
            api_base: env::var("SHEETS_API_BASE")
                .unwrap_or_else(|_| "https://sheets.googleapis.com".to_string()),
        })
    }
}

/// Attendance window and club timezone settings.
#[derive(Clone, Copy, Debug)]
pub struct WindowConfig {
    /// Hour (local time) at which marking opens on Friday.
    pub start_hour: u32,
    pub utc_offset: FixedOffset,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start_hour: 13,
            // EAT, UTC+3
            utc_offset: FixedOffset::east_opt(3 * 3600).expect("valid offset"),
        }
    }
}

impl WindowConfig {
    pub fn new(start_hour: u32, utc_offset_hours: i32) -> Result<Self, AppError> {
        if start_hour > 23 {
            return Err(AppError::Config(format!(
                "ATTENDANCE_START_HOUR must be between 0 and 23, got {}",
                start_hour
            )));
        }
        let utc_offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::Config(format!("UTC_OFFSET_HOURS out of range: {}", utc_offset_hours))
            })?;
        Ok(Self {
            start_hour,
            utc_offset,
        })
    }

    /// Reads `ATTENDANCE_START_HOUR` and `UTC_OFFSET_HOURS`, falling back to 13:00 EAT.
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::new(
            parse_var("ATTENDANCE_START_HOUR", 13u32)?,
            parse_var("UTC_OFFSET_HOURS", 3i32)?,
        )
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Only present for the Google backend.
    pub sheets: Option<SheetsConfig>,
    pub window: WindowConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var("PORT", 3000u16)?;
        let store_backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::Google,
        };
        let sheets = match store_backend {
            StoreBackend::Google => Some(SheetsConfig::new_from_env()?),
            StoreBackend::Memory => None,
        };
        let window = WindowConfig::new_from_env()?;

        Ok(Self {
            host,
            port,
            store_backend,
            sheets,
            window,
        })
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}
