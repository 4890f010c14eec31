use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

const SEPARATOR: char = '-';

/// Deduplication key built from the requester's phone number and the order amount.
///
/// The phone is kept exactly as submitted. The amount is rendered in its
/// shortest decimal form, so `50000`, `50000.0` and `"50000.00"` all map to
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionKey(String);

impl SubmissionKey {
    pub fn new(phone: &str, amount: Decimal) -> Self {
        Self(format!("{}{}{}", phone, SEPARATOR, amount.normalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
