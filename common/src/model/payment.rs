use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Sentinel accepted by the payment listing in place of a patient id.
pub const ALL_PATIENTS: &str = "ALL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payment {
    pub id: String,
    pub patient_id: String,
    pub amount: f64,
    /// Upper-cased and trimmed before it is stored.
    pub mode: String,
    pub date: Timestamp,
    #[serde(skip)]
    pub owner_username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
}

/// Canonical form of a payment mode: trimmed and upper-cased.
pub fn normalize_mode(mode: &str) -> String {
    mode.trim().to_uppercase()
}
