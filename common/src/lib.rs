//! Wire models shared by the clinic backend's HTTP surface, store and importer.

pub mod model;
pub mod requests;
pub mod time;

pub use time::{TimeParseError, Timestamp};
