//! Payment database operations.

use common::model::{normalize_mode, Payment, PaymentUpdate, ALL_PATIENTS};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use super::scope::scoped_where;
use super::set_clause::SetClause;
use super::{read_text, read_time, time_value, Store, StoreError, StoreResult};

const COLUMNS: &str = "id, patient_id, amount, payment_mode, paid_date, owner_username";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        amount: row.get(2)?,
        mode: read_text(row, 3)?,
        date: read_time(row, 4)?,
        owner_username: read_text(row, 5)?,
    })
}

/// Owner-partitioned payments. Every payment references an existing patient; deleting the
/// patient deletes its payments.
///
/// Only existence of the referenced patient is checked by the store, not that it shares
/// the payment's owner.
#[derive(Clone)]
pub struct PaymentRepo {
    store: Store,
}

impl PaymentRepo {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Insert a new payment under `owner`.
    ///
    /// A reference to a missing patient fails with [`StoreError::ForeignKey`].
    pub fn create(&self, owner: &str, payment: Payment) -> StoreResult<Payment> {
        let payment = prepare(owner, payment);
        let conn = self.store.conn()?;
        conn.execute(
            &format!("INSERT INTO payments ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                payment.id,
                payment.patient_id,
                payment.amount,
                payment.mode,
                time_value(&payment.date),
                payment.owner_username,
            ],
        )?;
        Ok(payment)
    }

    /// Insert or overwrite a payment keyed on `(id, owner)` in one statement.
    ///
    /// Replaying the same derived id leaves exactly one row holding the latest values. An id
    /// already held by another owner is reported as a conflict and left untouched.
    pub fn upsert(&self, owner: &str, payment: Payment) -> StoreResult<Payment> {
        let payment = prepare(owner, payment);
        let conn = self.store.conn()?;
        let changed = conn.execute(
            &format!(
                "INSERT INTO payments ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(id) DO UPDATE SET \
                    patient_id = excluded.patient_id, \
                    amount = excluded.amount, \
                    payment_mode = excluded.payment_mode, \
                    paid_date = excluded.paid_date \
                 WHERE payments.owner_username = excluded.owner_username"
            ),
            params![
                payment.id,
                payment.patient_id,
                payment.amount,
                payment.mode,
                time_value(&payment.date),
                payment.owner_username,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::Conflict(format!(
                "payment {} belongs to another owner",
                payment.id
            )));
        }
        Ok(payment)
    }

    /// Payments of `owner`, latest payment date first.
    ///
    /// An empty filter or [`ALL_PATIENTS`] lists every payment; anything else is a patient id.
    pub fn list(&self, owner: &str, patient_filter: &str) -> StoreResult<Vec<Payment>> {
        let filter = patient_filter.trim();
        let scope = if filter.is_empty() || filter == ALL_PATIENTS {
            scoped_where(owner)
        } else {
            scoped_where(owner).and_eq("patient_id", filter.to_string())
        };
        let (where_sql, where_params) = scope.render(1);

        let conn = self.store.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM payments {where_sql} ORDER BY paid_date DESC"
        ))?;
        let rows = stmt.query_map(params_from_iter(where_params.iter()), map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_by_id(&self, owner: &str, id: &str) -> StoreResult<Payment> {
        let conn = self.store.conn()?;
        fetch(&conn, owner, id)
    }

    /// Apply the present fields of `upd` (amount, mode, date) and return the stored row.
    ///
    /// The mode is re-normalized and the date kept in UTC. An empty update is a plain read.
    pub fn update(&self, owner: &str, id: &str, upd: &PaymentUpdate) -> StoreResult<Payment> {
        let mut set = SetClause::new();
        set.set_opt("amount", upd.amount)
            .set_opt("payment_mode", upd.mode.as_deref().map(normalize_mode))
            .set_opt("paid_date", upd.date.as_ref().map(time_value));

        let conn = self.store.conn()?;
        let scope = scoped_where(owner).and_eq("id", id.to_string());
        let Some(stmt) = set.to_update("payments", &scope) else {
            return fetch(&conn, owner, id);
        };
        let changed = conn.execute(&stmt.sql, params_from_iter(stmt.params.iter()))?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        fetch(&conn, owner, id)
    }

    /// Hard delete scoped by id and owner.
    pub fn delete(&self, owner: &str, id: &str) -> StoreResult<()> {
        let (where_sql, where_params) = scoped_where(owner).and_eq("id", id.to_string()).render(1);
        let conn = self.store.conn()?;
        let changed = conn.execute(
            &format!("DELETE FROM payments {where_sql}"),
            params_from_iter(where_params.iter()),
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Normalize mode and stamp id and owner before a write.
fn prepare(owner: &str, mut payment: Payment) -> Payment {
    payment.mode = normalize_mode(&payment.mode);
    if payment.id.is_empty() {
        payment.id = Uuid::new_v4().to_string();
    }
    payment.owner_username = owner.to_string();
    payment
}

fn fetch(conn: &rusqlite::Connection, owner: &str, id: &str) -> StoreResult<Payment> {
    let (where_sql, where_params) = scoped_where(owner).and_eq("id", id.to_string()).render(1);
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM payments {where_sql}"),
        params_from_iter(where_params.iter()),
        map_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound)
}
