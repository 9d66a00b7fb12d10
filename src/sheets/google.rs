use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, Url};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::SheetsConfig;
use crate::error::AppError;
use crate::models::{Member, NewMember};
use crate::sheets::auth::{ServiceAccountKey, TokenSource};
use crate::sheets::dto::{self, ValueRange};
use crate::sheets::{
    self, ATTENDANCE_HEADERS, MEMBER_HEADERS, PRESENT, SheetStore, column_letter, quote_sheet,
};

/// `{api_base}/v4/spreadsheets/{id}/{segments...}`, each segment percent-encoded.
fn spreadsheet_url(config: &SheetsConfig, segments: &[&str]) -> Result<Url, AppError> {
    let mut url = Url::parse(&config.api_base)
        .map_err(|e| AppError::Config(format!("invalid SHEETS_API_BASE: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| AppError::Config("SHEETS_API_BASE cannot be a base URL".to_string()))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", config.spreadsheet_id.as_str()])
        .extend(segments);
    Ok(url)
}

fn values_url(config: &SheetsConfig, range: &str) -> Result<Url, AppError> {
    spreadsheet_url(config, &["values", range])
}

fn append_url(config: &SheetsConfig, range: &str) -> Result<Url, AppError> {
    let mut url = values_url(config, &format!("{}:append", range))?;
    url.query_pairs_mut()
        .append_pair("valueInputOption", "RAW")
        .append_pair("insertDataOption", "INSERT_ROWS");
    Ok(url)
}

fn update_url(config: &SheetsConfig, range: &str) -> Result<Url, AppError> {
    let mut url = values_url(config, range)?;
    url.query_pairs_mut().append_pair("valueInputOption", "RAW");
    Ok(url)
}

/// Google Sheets v4 client for the club spreadsheet.
pub struct SheetsHttpClient {
    client: Client,
    config: SheetsConfig,
    tokens: TokenSource,
    clock: Arc<dyn Clock>,
}

impl SheetsHttpClient {
    pub fn new(config: SheetsConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let key = ServiceAccountKey::from_file(&config.credentials_path)?;
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        let tokens = TokenSource::new(key, client.clone());
        Ok(Self {
            client,
            config,
            tokens,
            clock,
        })
    }

    pub fn members_sheet(&self) -> &str {
        &self.config.members_sheet
    }

    pub fn attendance_sheet(&self) -> &str {
        &self.config.attendance_sheet
    }

    async fn check(response: Response, action: &str) -> Result<Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Sheets(format!(
            "Google Sheets API error while {} ({}): {}",
            action, status, body
        )))
    }

    /// `values.get` over an A1 range. Trailing empty cells come back omitted.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, AppError> {
        let url = values_url(&self.config, range)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.tokens.bearer().await?)
            .send()
            .await?;
        let response = Self::check(response, "reading values").await?;
        let body_text = response.text().await?;
        let parsed: ValueRange = serde_json::from_str(&body_text)?;
        Ok(parsed.values)
    }

    /// `values.append` of whole rows below the table found in `range`.
    pub async fn append_rows(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), AppError> {
        let url = append_url(&self.config, range)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(self.tokens.bearer().await?)
            .json(&ValueRange::rows(rows))
            .send()
            .await?;
        let response = Self::check(response, "appending rows").await?;
        let body_text = response.text().await?;
        let parsed: dto::AppendValuesResponse = serde_json::from_str(&body_text)?;
        debug!(
            "appended to {:?}: {:?}",
            parsed.table_range,
            parsed.updates.and_then(|u| u.updated_range)
        );
        Ok(())
    }

    /// `values.update` of the given range.
    pub async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), AppError> {
        let url = update_url(&self.config, range)?;

        let response = self
            .client
            .put(url)
            .bearer_auth(self.tokens.bearer().await?)
            .json(&ValueRange::rows(rows))
            .send()
            .await?;
        let response = Self::check(response, "updating values").await?;
        let body_text = response.text().await?;
        let parsed: dto::UpdateValuesResponse = serde_json::from_str(&body_text)?;
        debug!("updated {:?} ({:?} cells)", parsed.updated_range, parsed.updated_cells);
        Ok(())
    }

    async fn update_cell(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), AppError> {
        let range = format!("{}!{}{}", quote_sheet(sheet), column_letter(col), row);
        self.update_values(&range, vec![vec![value.to_string()]]).await
    }

    /// Current header row of `sheet`.
    pub async fn header_row(&self, sheet: &str) -> Result<Vec<String>, AppError> {
        let rows = self.get_values(&format!("{}!1:1", quote_sheet(sheet))).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Writes `headers` into row 1 of `sheet`, starting at column A.
    pub async fn write_header_row(&self, sheet: &str, headers: &[&str]) -> Result<(), AppError> {
        let range = format!("{}!A1", quote_sheet(sheet));
        let row = headers.iter().map(|h| h.to_string()).collect();
        self.update_values(&range, vec![row]).await
    }

    /// Header rows each sheet must start with.
    pub fn expected_headers(&self) -> [(&str, &[&str]); 2] {
        [
            (self.members_sheet(), &MEMBER_HEADERS[..]),
            (self.attendance_sheet(), &ATTENDANCE_HEADERS[..]),
        ]
    }
}

#[async_trait]
impl SheetStore for SheetsHttpClient {
    async fn find_member(&self, reg_number: &str) -> Result<Option<Member>, AppError> {
        let grid = self.get_values(&quote_sheet(&self.config.members_sheet)).await?;
        Ok(sheets::find_member_in(&grid, reg_number))
    }

    async fn insert_member(&self, member: &NewMember) -> Result<Member, AppError> {
        let registration_date = self.clock.now().date_naive();

        self.append_rows(
            &quote_sheet(&self.config.members_sheet),
            vec![sheets::member_row(member, registration_date)],
        )
        .await?;
        self.append_rows(
            &quote_sheet(&self.config.attendance_sheet),
            vec![vec![member.reg_number.clone(), member.full_name.clone()]],
        )
        .await?;

        info!("registered member {}", member.reg_number);
        Ok(sheets::stored_member(member, registration_date))
    }

    async fn resolve_or_create_date_column(&self, date: NaiveDate) -> Result<usize, AppError> {
        let headers = self.header_row(&self.config.attendance_sheet).await?;
        if let Some(col) = sheets::date_column_in(&headers, date) {
            return Ok(col);
        }

        let next_col = headers.len() + 1;
        self.update_cell(&self.config.attendance_sheet, 1, next_col, &sheets::date_header(date))
            .await?;
        info!("created attendance column {} for {}", column_letter(next_col), date);
        Ok(next_col)
    }

    async fn mark_present(&self, reg_number: &str, date: NaiveDate) -> Result<(), AppError> {
        let key_column: Vec<String> = self
            .get_values(&format!("{}!A:A", quote_sheet(&self.config.attendance_sheet)))
            .await?
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect();
        let row = sheets::attendance_row_index(&key_column, reg_number).ok_or_else(|| {
            AppError::Sheets(format!("Member {} not found in attendance sheet", reg_number))
        })?;

        let col = self.resolve_or_create_date_column(date).await?;
        self.update_cell(&self.config.attendance_sheet, row, col, PRESENT).await
    }

    async fn is_present(&self, reg_number: &str, date: NaiveDate) -> Result<bool, AppError> {
        let grid = self
            .get_values(&quote_sheet(&self.config.attendance_sheet))
            .await?;
        Ok(sheets::is_present_in(&grid, reg_number, date))
    }

    async fn ping(&self) -> Result<(), AppError> {
        let mut url = spreadsheet_url(&self.config, &[])?;
        url.query_pairs_mut().append_pair("fields", "spreadsheetId");
        let response = self
            .client
            .get(url)
            .bearer_auth(self.tokens.bearer().await?)
            .send()
            .await?;
        let response = Self::check(response, "checking spreadsheet").await?;
        let body_text = response.text().await?;
        let meta: dto::SpreadsheetMeta = serde_json::from_str(&body_text)?;
        debug!("spreadsheet {} reachable", meta.spreadsheet_id);
        Ok(())
    }
}
