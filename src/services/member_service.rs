use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{Member, NewMemberRequest};
use crate::services::validation;
use crate::sheets::SheetStore;

pub struct MemberService {
    store: Arc<dyn SheetStore>,
}

impl MemberService {
    pub fn new(store: Arc<dyn SheetStore>) -> Self {
        Self { store }
    }

    pub fn validate_and_normalize(&self, reg_number: &str) -> Result<String, AppError> {
        validation::validate_and_normalize(reg_number)
    }

    pub async fn register_member(&self, req: &NewMemberRequest) -> Result<Member, AppError> {
        let member = validation::validate_registration(req)?;

        if self.member_exists(&member.reg_number).await? {
            warn!("duplicate registration attempt for {}", member.reg_number);
            return Err(AppError::DuplicateRegistration(member.reg_number));
        }

        let stored = self.store.insert_member(&member).await?;
        info!(
            "member {} registered for {} department(s)",
            stored.reg_number,
            stored.departments.len()
        );
        Ok(stored)
    }

    pub async fn member_exists(&self, reg_number: &str) -> Result<bool, AppError> {
        Ok(self.store.find_member(reg_number).await?.is_some())
    }

    /// False for unknown members.
    pub async fn is_active(&self, reg_number: &str) -> Result<bool, AppError> {
        Ok(self
            .store
            .find_member(reg_number)
            .await?
            .is_some_and(|m| m.active))
    }

    pub async fn get_info(&self, reg_number: &str) -> Result<Option<Member>, AppError> {
        self.store.find_member(reg_number).await
    }
}
