//! Schema bootstrap.
//!
//! Brings a database of any historical shape up to the one the repositories expect. Runs on
//! every start. Each step is idempotent on its own: "already exists" for a create or add
//! and "does not exist" for a drop are expected outcomes. Any other failure aborts the
//! sequence. Steps run in a fixed order: tables, added columns, owner backfill, indexes,
//! legacy cleanup.

use rusqlite::{params, Connection};
use thiserror::Error;

/// Owner stamped onto rows that predate the ownership column.
pub const DEFAULT_LEGACY_OWNER: &str = "admin";

#[derive(Error, Debug)]
#[error("bootstrap step '{step}' failed: {source}")]
pub struct BootstrapError {
    pub step: String,
    #[source]
    pub source: rusqlite::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tolerates {
    AlreadyExists,
    Missing,
    Nothing,
}

struct Step {
    name: &'static str,
    sql: &'static str,
    tolerates: Tolerates,
    binds_owner: bool,
}

const fn create(name: &'static str, sql: &'static str) -> Step {
    Step { name, sql, tolerates: Tolerates::AlreadyExists, binds_owner: false }
}

const fn remove(name: &'static str, sql: &'static str) -> Step {
    Step { name, sql, tolerates: Tolerates::Missing, binds_owner: false }
}

const fn backfill(name: &'static str, sql: &'static str) -> Step {
    Step { name, sql, tolerates: Tolerates::Nothing, binds_owner: true }
}

const STEPS: &[Step] = &[
    // Tables
    create(
        "create users",
        "CREATE TABLE users (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            created_time TEXT NOT NULL
        )",
    ),
    create(
        "create patients",
        "CREATE TABLE patients (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            phone_number TEXT,
            age INTEGER,
            gender TEXT,
            chief_complaint TEXT,
            present_history TEXT,
            medical_history TEXT,
            observation TEXT,
            palpation TEXT,
            examination TEXT,
            rehab TEXT,
            diagnosis TEXT,
            created_time TEXT NOT NULL,
            updated_time TEXT NOT NULL,
            last_paid_amount REAL,
            status TEXT
        )",
    ),
    create(
        "create payments",
        "CREATE TABLE payments (
            id TEXT PRIMARY KEY,
            patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
            amount REAL NOT NULL,
            payment_mode TEXT,
            paid_date TEXT
        )",
    ),
    // Ownership columns, absent from databases created before multi-tenancy
    create(
        "add patients.owner_username",
        "ALTER TABLE patients ADD COLUMN owner_username TEXT",
    ),
    create(
        "add payments.owner_username",
        "ALTER TABLE payments ADD COLUMN owner_username TEXT",
    ),
    backfill(
        "backfill patients owner",
        "UPDATE patients SET owner_username = ?1 WHERE owner_username IS NULL",
    ),
    backfill(
        "backfill payments owner",
        "UPDATE payments SET owner_username = ?1 WHERE owner_username IS NULL",
    ),
    // Indexes
    create(
        "index patients.phone_number",
        "CREATE INDEX idx_patients_phone ON patients(phone_number)",
    ),
    create(
        "index payments.patient_id",
        "CREATE INDEX idx_payments_patient ON payments(patient_id)",
    ),
    // Legacy cleanup
    remove("drop idx_payments_unique_id", "DROP INDEX idx_payments_unique_id"),
    remove(
        "drop payments.unique_payment_id",
        "ALTER TABLE payments DROP COLUMN unique_payment_id",
    ),
    remove(
        "drop payments.created_time",
        "ALTER TABLE payments DROP COLUMN created_time",
    ),
    remove(
        "drop patients.exercise_table_json",
        "ALTER TABLE patients DROP COLUMN exercise_table_json",
    ),
    remove(
        "drop patients.exercise_table_raw",
        "ALTER TABLE patients DROP COLUMN exercise_table_raw",
    ),
];

/// Run every bootstrap step against `conn`, stamping `legacy_owner` on unowned rows.
pub fn bootstrap(conn: &Connection, legacy_owner: &str) -> Result<(), BootstrapError> {
    for step in STEPS {
        let outcome = if step.binds_owner {
            conn.execute(step.sql, params![legacy_owner]).map(|changed| {
                if changed > 0 {
                    log::info!("{}: stamped {} legacy rows with owner '{}'", step.name, changed, legacy_owner);
                }
            })
        } else {
            conn.execute(step.sql, []).map(|_| ())
        };

        match outcome {
            Ok(()) => log::debug!("bootstrap: {} applied", step.name),
            Err(err) if is_tolerated(step.tolerates, &err) => {
                log::debug!("bootstrap: {} skipped ({})", step.name, err)
            }
            Err(source) => {
                return Err(BootstrapError {
                    step: step.name.to_string(),
                    source,
                })
            }
        }
    }
    Ok(())
}

fn is_tolerated(tolerates: Tolerates, err: &rusqlite::Error) -> bool {
    let msg = err.to_string();
    match tolerates {
        Tolerates::AlreadyExists => {
            msg.contains("already exists") || msg.contains("duplicate column name")
        }
        Tolerates::Missing => msg.contains("no such index") || msg.contains("no such column"),
        Tolerates::Nothing => false,
    }
}
