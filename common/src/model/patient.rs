use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Status stamped on every patient created through the API.
pub const STATUS_ACTIVE: &str = "ACTIVE";

/// A patient record as exchanged over HTTP.
///
/// Optional clinical fields that were never set read back as empty strings or `0`; the
/// record does not preserve the difference between "empty" and "unset".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    pub id: String,
    pub full_name: String,
    pub phone_number: String,
    pub age: i64,
    pub gender: String,
    pub chief_complaint: String,
    pub present_history: String,
    pub medical_history: String,
    pub observation: String,
    pub palpation: String,
    pub examination: String,
    pub rehab: String,
    pub diagnosis: String,
    pub created_time: Timestamp,
    pub updated_time: Timestamp,
    /// Running total of what the patient has paid.
    pub last_paid_amount: f64,
    pub status: String,
    /// Owning identity. Never leaves the server.
    #[serde(skip)]
    pub owner_username: String,
}

/// Sparse patient mutation: only the fields present are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present_history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palpation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rehab: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_paid_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
