//! Multi-tenant clinical records backend.
//!
//! Patients and their payments are partitioned per owner (the authenticated username) and
//! served over an actix-web API backed by pooled SQLite. The legacy spreadsheet export is
//! brought in by the [`import`] pipeline.

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod import;
pub mod logging;
pub mod middleware;
pub mod services;
pub mod store;
