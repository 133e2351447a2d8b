use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub username: String,
    /// PHC-format credential hash.
    #[serde(skip)]
    pub password_hash: String,
    #[serde(default)]
    pub created_time: Timestamp,
}
