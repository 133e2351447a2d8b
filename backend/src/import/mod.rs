//! # Legacy import pipeline
//!
//! Replays the two sheets of the legacy workbook (patient details and payments, exported as
//! CSV) through the repositories. Runs single-threaded, one row at a time.
//!
//! Legacy natural keys become stable ids through [`derive_id`], and rows are written with
//! upserts, so importing the same export twice leaves the store unchanged (a blank date cell
//! keeps whatever time is already stored). A bad row is
//! logged with its sheet row number and skipped; only setup problems (unreadable file,
//! missing sheet, empty details sheet) end the run.

mod dates;
mod sheet;

pub use dates::{parse_payment_date, parse_sheet_date};

use crate::store::{PatientRepo, PaymentRepo, Store, StoreError};
use common::model::{Patient, Payment};
use sheet::cell;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const DETAIL_COLUMNS: usize = 17;
const TIME_COLUMNS: usize = 15;
const PAYMENT_COLUMNS: usize = 5;

/// Sheet row number of the `i`-th data row (1-based, after the header).
fn sheet_row(i: usize) -> usize {
    i + 2
}

/// Stable id for a legacy key: UUID v5 in the OID namespace. An empty key has no id.
pub fn derive_id(legacy_key: &str) -> String {
    let key = legacy_key.trim();
    if key.is_empty() {
        return String::new();
    }
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ImportMode {
    /// Patient details, then payments when a payments export is given.
    #[default]
    Full,
    PaymentsOnly,
    /// Only rewrite created/updated times of patients already imported.
    UpdateTimesOnly,
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub details: Option<PathBuf>,
    pub payments: Option<PathBuf>,
    pub details_sheet: String,
    pub payments_sheet: String,
    pub mode: ImportMode,
    /// Owner stamped on every imported record.
    pub owner: String,
}

/// Fatal setup failures. Nothing row-specific ends up here.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{0} export is required for this mode")]
    MissingInput(&'static str),

    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("sheet '{sheet}' not found in {}", path.display())]
    MissingSheet { sheet: String, path: PathBuf },

    #[error("no data rows in {}", path.display())]
    NoDataRows { path: PathBuf },
}

/// A single row that could not be imported. Never aborts the run.
#[derive(Error, Debug)]
pub enum ImportRowError {
    #[error("row {row}: expected {expected} columns, found {found}")]
    ShortRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: empty {key} key")]
    EmptyKey { row: usize, key: &'static str },

    #[error("row {row}: no dates to apply")]
    NoDates { row: usize },

    #[error("row {row}: patient not found (patient_id={patient_id})")]
    UnknownPatient { row: usize, patient_id: String },

    #[error("row {row}: {source}")]
    Store {
        row: usize,
        #[source]
        source: StoreError,
    },
}

impl ImportRowError {
    /// Skips are expected data gaps; everything else is a failed write.
    pub fn is_skip(&self) -> bool {
        !matches!(self, ImportRowError::Store { .. })
    }
}

/// Outcome counts for one sheet pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    fn record(&mut self, sheet: &str, row: usize, outcome: Result<(), ImportRowError>) {
        match outcome {
            Ok(()) => {
                log::debug!("{}: row {} imported", sheet, row);
                self.imported += 1;
            }
            Err(e) => {
                log::warn!("{}: {}", sheet, e);
                if e.is_skip() {
                    self.skipped += 1;
                } else {
                    self.failed += 1;
                }
            }
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} skipped, {} failed",
            self.imported, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub patients: Option<Tally>,
    pub payments: Option<Tally>,
    pub timestamps: Option<Tally>,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            ("patients", self.patients),
            ("payments", self.payments),
            ("timestamps", self.timestamps),
        ]
        .into_iter()
        .filter_map(|(name, tally)| tally.map(|t| format!("{name}: {t}")))
        .collect();
        if parts.is_empty() {
            write!(f, "nothing imported")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

pub struct Importer {
    patients: PatientRepo,
    payments: PaymentRepo,
}

impl Importer {
    pub fn new(store: Store) -> Self {
        Self {
            patients: PatientRepo::new(store.clone()),
            payments: PaymentRepo::new(store),
        }
    }

    /// Run the sheets selected by `opts.mode`.
    pub fn run(&self, opts: &ImportOptions) -> Result<ImportReport, ImportError> {
        let mut report = ImportReport::default();
        match opts.mode {
            ImportMode::Full => {
                let details = opts.details.as_deref().ok_or(ImportError::MissingInput("details"))?;
                let rows = details_rows(details, &opts.details_sheet)?;
                report.patients = Some(self.import_details(&opts.owner, &rows));
                if let Some(payments) = opts.payments.as_deref() {
                    let rows = sheet::read_rows(&sheet::resolve(payments, &opts.payments_sheet)?)?;
                    report.payments = Some(self.import_payments(&opts.owner, &rows));
                }
            }
            ImportMode::PaymentsOnly => {
                let payments = opts.payments.as_deref().ok_or(ImportError::MissingInput("payments"))?;
                let rows = sheet::read_rows(&sheet::resolve(payments, &opts.payments_sheet)?)?;
                report.payments = Some(self.import_payments(&opts.owner, &rows));
            }
            ImportMode::UpdateTimesOnly => {
                let details = opts.details.as_deref().ok_or(ImportError::MissingInput("details"))?;
                let rows = details_rows(details, &opts.details_sheet)?;
                report.timestamps = Some(self.update_times(&opts.owner, &rows));
            }
        }
        log::info!("import finished: {}", report);
        Ok(report)
    }

    /// Upsert one patient per details row.
    pub fn import_details(&self, owner: &str, rows: &[Vec<String>]) -> Tally {
        let mut tally = Tally::default();
        for (i, row) in rows.iter().enumerate() {
            let row_no = sheet_row(i);
            tally.record("details", row_no, self.import_detail_row(owner, row_no, row));
        }
        log::info!("details: {}", tally);
        tally
    }

    fn import_detail_row(&self, owner: &str, row_no: usize, row: &[String]) -> Result<(), ImportRowError> {
        require_columns(row_no, row, DETAIL_COLUMNS)?;
        let id = derive_id(cell(row, 0));
        if id.is_empty() {
            return Err(ImportRowError::EmptyKey { row: row_no, key: "patient" });
        }
        let patient = Patient {
            id,
            full_name: cell(row, 1).to_string(),
            phone_number: cell(row, 2).to_string(),
            age: cell(row, 3).parse().unwrap_or(0),
            gender: cell(row, 4).to_string(),
            chief_complaint: cell(row, 5).to_string(),
            present_history: cell(row, 6).to_string(),
            medical_history: cell(row, 7).to_string(),
            observation: cell(row, 8).to_string(),
            palpation: cell(row, 9).to_string(),
            examination: cell(row, 10).to_string(),
            rehab: cell(row, 11).to_string(),
            diagnosis: cell(row, 12).to_string(),
            created_time: parse_sheet_date(cell(row, 13)),
            updated_time: parse_sheet_date(cell(row, 14)),
            last_paid_amount: cell(row, 15).parse().unwrap_or(0.0),
            status: cell(row, 16).to_string(),
            owner_username: String::new(),
        };
        self.patients
            .upsert(owner, patient)
            .map(|_| ())
            .map_err(|source| ImportRowError::Store { row: row_no, source })
    }

    /// Upsert one payment per payments row. Rows without both legacy keys and payments of
    /// unknown patients are skipped.
    pub fn import_payments(&self, owner: &str, rows: &[Vec<String>]) -> Tally {
        let mut tally = Tally::default();
        for (i, row) in rows.iter().enumerate() {
            let row_no = sheet_row(i);
            tally.record("payments", row_no, self.import_payment_row(owner, row_no, row));
        }
        log::info!("payments: {}", tally);
        tally
    }

    fn import_payment_row(&self, owner: &str, row_no: usize, row: &[String]) -> Result<(), ImportRowError> {
        require_columns(row_no, row, PAYMENT_COLUMNS)?;
        let patient_id = derive_id(cell(row, 0));
        if patient_id.is_empty() {
            return Err(ImportRowError::EmptyKey { row: row_no, key: "patient" });
        }
        // Without a payment key the row would get a fresh id on every replay.
        let id = derive_id(cell(row, 1));
        if id.is_empty() {
            return Err(ImportRowError::EmptyKey { row: row_no, key: "payment" });
        }
        let payment = Payment {
            id,
            patient_id: patient_id.clone(),
            amount: cell(row, 2).parse().unwrap_or(0.0),
            mode: cell(row, 3).to_string(),
            date: parse_payment_date(cell(row, 4)),
            owner_username: String::new(),
        };
        match self.payments.upsert(owner, payment) {
            Ok(_) => Ok(()),
            Err(StoreError::ForeignKey(_)) => Err(ImportRowError::UnknownPatient {
                row: row_no,
                patient_id,
            }),
            Err(source) => Err(ImportRowError::Store { row: row_no, source }),
        }
    }

    /// Push the sheet's created/updated times onto patients already in the store.
    ///
    /// A row with one date empty gets the other for both; a row with neither is skipped.
    pub fn update_times(&self, owner: &str, rows: &[Vec<String>]) -> Tally {
        let mut tally = Tally::default();
        for (i, row) in rows.iter().enumerate() {
            let row_no = sheet_row(i);
            tally.record("timestamps", row_no, self.update_time_row(owner, row_no, row));
        }
        log::info!("timestamps: {}", tally);
        tally
    }

    fn update_time_row(&self, owner: &str, row_no: usize, row: &[String]) -> Result<(), ImportRowError> {
        require_columns(row_no, row, TIME_COLUMNS)?;
        let id = derive_id(cell(row, 0));
        if id.is_empty() {
            return Err(ImportRowError::EmptyKey { row: row_no, key: "patient" });
        }
        let created = parse_sheet_date(cell(row, 13));
        let updated = parse_sheet_date(cell(row, 14));
        if created.is_zero() && updated.is_zero() {
            return Err(ImportRowError::NoDates { row: row_no });
        }
        let (created, updated) = (created.or(updated), updated.or(created));
        match self.patients.update_times(owner, &id, created, updated) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(ImportRowError::UnknownPatient {
                row: row_no,
                patient_id: id,
            }),
            Err(source) => Err(ImportRowError::Store { row: row_no, source }),
        }
    }
}

fn details_rows(path: &Path, sheet_name: &str) -> Result<Vec<Vec<String>>, ImportError> {
    let file = sheet::resolve(path, sheet_name)?;
    let rows = sheet::read_rows(&file)?;
    if rows.is_empty() {
        return Err(ImportError::NoDataRows { path: file });
    }
    Ok(rows)
}

fn require_columns(row_no: usize, row: &[String], expected: usize) -> Result<(), ImportRowError> {
    if row.len() < expected {
        return Err(ImportRowError::ShortRow {
            row: row_no,
            expected,
            found: row.len(),
        });
    }
    Ok(())
}
