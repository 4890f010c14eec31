use serde::{Deserialize, Serialize};

use crate::guard::Decision;

/// Body returned by the duplicate check endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDuplicateResponse {
    pub is_duplicate: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<i64>,
}

impl CheckDuplicateResponse {
    pub fn accepted() -> Self {
        Self {
            is_duplicate: false,
            message: "OK".to_string(),
            wait_time: None,
        }
    }

    pub fn rejected(elapsed_minutes: i64, remaining_minutes: i64) -> Self {
        Self {
            is_duplicate: true,
            message: format!(
                "Duplicate order! You already ordered {} minutes ago. Please wait for admin confirmation.",
                elapsed_minutes
            ),
            wait_time: Some(remaining_minutes),
        }
    }
}

impl From<Decision> for CheckDuplicateResponse {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Accepted => Self::accepted(),
            Decision::Rejected {
                elapsed_minutes,
                remaining_minutes,
            } => Self::rejected(elapsed_minutes, remaining_minutes),
        }
    }
}

/// Error body: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_serialization() {
        let json = serde_json::to_value(CheckDuplicateResponse::accepted()).unwrap();
        assert_eq!(json, serde_json::json!({ "isDuplicate": false, "message": "OK" }));
    }

    #[test]
    fn test_rejected_serialization() {
        let response = CheckDuplicateResponse::from(Decision::Rejected {
            elapsed_minutes: 5,
            remaining_minutes: 25,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["isDuplicate"], true);
        assert_eq!(json["waitTime"], 25);
        assert!(json["message"].as_str().unwrap().contains("5 minutes ago"));
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_string(&ErrorResponse::new("Method not allowed")).unwrap();
        assert_eq!(json, r#"{"error":"Method not allowed"}"#);
    }
}
