//! Date layouts found in the legacy sheets.
//!
//! Anything unparseable becomes the zero sentinel: a bad date cell never rejects a row.

use chrono::{NaiveDate, NaiveDateTime};
use common::Timestamp;

const SHEET_LAYOUTS: [&str; 2] = ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];
const PAYMENT_LAYOUTS: [&str; 1] = ["%Y-%m-%d %H:%M:%S"];
const PAYMENT_DATE_LAYOUTS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Details-sheet timestamps, e.g. `24/02/2025 16:54` or `24/02/2025 16:54DATE`.
pub fn parse_sheet_date(raw: &str) -> Timestamp {
    let s = raw.trim();
    let s = s.strip_suffix("DATE").unwrap_or(s).trim();
    if s.is_empty() {
        return Timestamp::ZERO;
    }
    first_datetime(s, &SHEET_LAYOUTS).unwrap_or(Timestamp::ZERO)
}

/// Payment-sheet dates: `2025-02-24 16:54:00`, `2025-02-24` or `24/02/2025`.
pub fn parse_payment_date(raw: &str) -> Timestamp {
    let s = raw.trim();
    if s.is_empty() {
        return Timestamp::ZERO;
    }
    first_datetime(s, &PAYMENT_LAYOUTS)
        .or_else(|| {
            PAYMENT_DATE_LAYOUTS.iter().find_map(|layout| {
                NaiveDate::parse_from_str(s, layout)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(Timestamp::from_naive_utc)
            })
        })
        .unwrap_or(Timestamp::ZERO)
}

fn first_datetime(s: &str, layouts: &[&str]) -> Option<Timestamp> {
    layouts
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
        .map(Timestamp::from_naive_utc)
}
