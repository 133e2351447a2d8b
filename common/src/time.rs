//! Tolerant date-time codec shared by the HTTP payloads, the store and the importer.
//!
//! Clients and the legacy spreadsheet produce inconsistent date formats. A [`Timestamp`]
//! accepts, in order of preference:
//!
//! 1. an offset-aware RFC 3339 timestamp (`2025-02-24T10:00:00+05:30`),
//! 2. an offset-naive timestamp (`2025-02-24T10:00:00` or `2025-02-24 10:00:00`), read as UTC,
//! 3. a bare date (`2025-02-24`), read as midnight UTC.
//!
//! Empty or `null` input is the zero sentinel ([`Timestamp::ZERO`]) rather than an error.
//! Every value is held in UTC with whole-second precision, so the textual form produced by
//! [`Timestamp::to_rfc3339`] orders the same way as the instants themselves.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_LAYOUT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized date-time '{0}'")]
pub struct TimeParseError(pub String);

/// A point in time normalized to UTC, or the zero sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Option<DateTime<Utc>>);

impl Timestamp {
    /// The "no value" sentinel. Stored as NULL, serialized as `""`.
    pub const ZERO: Timestamp = Timestamp(None);

    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    pub fn from_utc(at: DateTime<Utc>) -> Self {
        Timestamp(Some(at.trunc_subsecs(0)))
    }

    /// Interprets a zone-less wall-clock time as UTC.
    pub fn from_naive_utc(at: NaiveDateTime) -> Self {
        Self::from_utc(at.and_utc())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    /// Returns `self`, or `other` when `self` is the zero sentinel.
    pub fn or(self, other: Timestamp) -> Timestamp {
        if self.is_zero() { other } else { self }
    }

    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let s = input.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("null") {
            return Ok(Self::ZERO);
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_utc(at.with_timezone(&Utc)));
        }
        for layout in NAIVE_LAYOUTS {
            if let Ok(at) = NaiveDateTime::parse_from_str(s, layout) {
                return Ok(Self::from_naive_utc(at));
            }
        }
        if let Ok(day) = NaiveDate::parse_from_str(s, DATE_LAYOUT) {
            return Ok(Self::from_naive_utc(day.and_hms_opt(0, 0, 0).unwrap_or_default()));
        }
        Err(TimeParseError(s.to_string()))
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`, or an empty string for the zero sentinel.
    pub fn to_rfc3339(&self) -> String {
        match self.0 {
            Some(at) => at.to_rfc3339_opts(SecondsFormat::Secs, true),
            None => String::new(),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::from_utc(at)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(s) => Timestamp::parse(&s).map_err(serde::de::Error::custom),
            None => Ok(Timestamp::ZERO),
        }
    }
}
