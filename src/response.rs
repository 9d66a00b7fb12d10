use serde::Serialize;

/// Success envelope: `{ "success": true, "data": ..., "message": ... }`.
///
/// Failures are rendered by [`crate::error::AppError`] as
/// `{ "success": false, "error": { "code", "message", "details" } }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
