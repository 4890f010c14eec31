use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::guard::SubmissionKey;

/// Body of a duplicate check. `amount` accepts a JSON number or a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDuplicateRequest {
    pub phone: Option<String>,
    pub amount: Option<Decimal>,
}

impl CheckDuplicateRequest {
    pub fn new(phone: impl Into<String>, amount: Decimal) -> Self {
        Self {
            phone: Some(phone.into()),
            amount: Some(amount),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        match &self.phone {
            None => errors.push(ValidationError::new("phone", "phone is required")),
            Some(phone) if phone.trim().is_empty() => {
                errors.push(ValidationError::new("phone", "phone cannot be empty"))
            }
            Some(_) => {}
        }
        if self.amount.is_none() {
            errors.push(ValidationError::new("amount", "amount is required"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validates the body and builds its deduplication key.
    pub fn submission_key(&self) -> Result<SubmissionKey, AppError> {
        if let Err(errors) = self.validate() {
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::Validation(message));
        }

        match (&self.phone, self.amount) {
            (Some(phone), Some(amount)) => Ok(SubmissionKey::new(phone, amount)),
            _ => Err(AppError::Validation("phone and amount are required".to_string())),
        }
    }
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
