//! Patient database operations.

use common::model::{Patient, PatientUpdate, STATUS_ACTIVE};
use common::Timestamp;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use super::scope::scoped_where;
use super::set_clause::SetClause;
use super::{read_text, read_time, time_value, Store, StoreError, StoreResult};

const COLUMNS: &str = "id, full_name, phone_number, age, gender, chief_complaint, present_history, \
     medical_history, observation, palpation, examination, rehab, diagnosis, \
     created_time, updated_time, last_paid_amount, status, owner_username";

/// Map a row selected with [`COLUMNS`]. NULLs become empty strings and zeros.
fn map_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        full_name: read_text(row, 1)?,
        phone_number: read_text(row, 2)?,
        age: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
        gender: read_text(row, 4)?,
        chief_complaint: read_text(row, 5)?,
        present_history: read_text(row, 6)?,
        medical_history: read_text(row, 7)?,
        observation: read_text(row, 8)?,
        palpation: read_text(row, 9)?,
        examination: read_text(row, 10)?,
        rehab: read_text(row, 11)?,
        diagnosis: read_text(row, 12)?,
        created_time: read_time(row, 13)?,
        updated_time: read_time(row, 14)?,
        last_paid_amount: row.get::<_, Option<f64>>(15)?.unwrap_or_default(),
        status: read_text(row, 16)?,
        owner_username: read_text(row, 17)?,
    })
}

/// The 18 insert parameters of a patient, in [`COLUMNS`] order, then any extras.
macro_rules! insert_params {
    ($p:expr $(, $extra:expr)*) => {
        params![
            $p.id,
            $p.full_name,
            $p.phone_number,
            $p.age,
            $p.gender,
            $p.chief_complaint,
            $p.present_history,
            $p.medical_history,
            $p.observation,
            $p.palpation,
            $p.examination,
            $p.rehab,
            $p.diagnosis,
            time_value(&$p.created_time),
            time_value(&$p.updated_time),
            $p.last_paid_amount,
            $p.status,
            $p.owner_username,
            $($extra,)*
        ]
    };
}

/// Owner-partitioned patient records.
#[derive(Clone)]
pub struct PatientRepo {
    store: Store,
}

impl PatientRepo {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Insert a new patient under `owner`.
    ///
    /// Assigns an id when none is given, defaults the timestamps to now (the update time
    /// follows the creation time) and always starts the record as `ACTIVE`.
    pub fn create(&self, owner: &str, mut patient: Patient) -> StoreResult<Patient> {
        if patient.id.is_empty() {
            patient.id = Uuid::new_v4().to_string();
        }
        patient.created_time = patient.created_time.or(Timestamp::now());
        patient.updated_time = patient.updated_time.or(patient.created_time);
        patient.status = STATUS_ACTIVE.to_string();
        patient.owner_username = owner.to_string();

        let conn = self.store.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO patients ({COLUMNS}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
            ),
            insert_params!(patient),
        )?;
        Ok(patient)
    }

    /// Insert or overwrite a patient keyed on `(id, owner)`.
    ///
    /// Used for replayable imports: the caller's status and running paid amount are kept
    /// (a blank status still becomes `ACTIVE`). A zero timestamp defaults to now on insert
    /// and leaves the stored column alone on overwrite. A row with the same id under another
    /// owner is left untouched and reported as a conflict.
    ///
    /// Returns the row as stored.
    pub fn upsert(&self, owner: &str, mut patient: Patient) -> StoreResult<Patient> {
        if patient.id.is_empty() {
            patient.id = Uuid::new_v4().to_string();
        }
        let given_created = time_value(&patient.created_time);
        let given_updated = time_value(&patient.updated_time);
        patient.created_time = patient.created_time.or(Timestamp::now());
        patient.updated_time = patient.updated_time.or(patient.created_time);
        if patient.status.trim().is_empty() {
            patient.status = STATUS_ACTIVE.to_string();
        }
        patient.owner_username = owner.to_string();

        let conn = self.store.conn()?;
        let stored = conn
            .query_row(
                &format!(
                    "INSERT INTO patients ({COLUMNS}) VALUES \
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18) \
                     ON CONFLICT(id) DO UPDATE SET \
                        full_name = excluded.full_name, \
                        phone_number = excluded.phone_number, \
                        age = excluded.age, \
                        gender = excluded.gender, \
                        chief_complaint = excluded.chief_complaint, \
                        present_history = excluded.present_history, \
                        medical_history = excluded.medical_history, \
                        observation = excluded.observation, \
                        palpation = excluded.palpation, \
                        examination = excluded.examination, \
                        rehab = excluded.rehab, \
                        diagnosis = excluded.diagnosis, \
                        created_time = COALESCE(?19, patients.created_time), \
                        updated_time = COALESCE(?20, patients.updated_time), \
                        last_paid_amount = excluded.last_paid_amount, \
                        status = excluded.status \
                     WHERE patients.owner_username = excluded.owner_username \
                     RETURNING {COLUMNS}"
                ),
                insert_params!(patient, given_created, given_updated),
                map_row,
            )
            .optional()?;
        stored.ok_or_else(|| {
            StoreError::Conflict(format!("patient {} belongs to another owner", patient.id))
        })
    }

    /// All patients of `owner`, newest first.
    pub fn list(&self, owner: &str) -> StoreResult<Vec<Patient>> {
        let (where_sql, where_params) = scoped_where(owner).render(1);
        let conn = self.store.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM patients {where_sql} ORDER BY created_time DESC"
        ))?;
        let rows = stmt.query_map(params_from_iter(where_params.iter()), map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Point lookup. A wrong owner is indistinguishable from a missing id.
    pub fn get_by_id(&self, owner: &str, id: &str) -> StoreResult<Patient> {
        let conn = self.store.conn()?;
        fetch(&conn, owner, id)
    }

    /// Apply the fields present in `upd` and return the row as stored afterwards.
    ///
    /// An empty update writes nothing and returns the current row. Any write also bumps
    /// `updated_time`. The re-read is a separate statement, so a concurrent writer landing
    /// in between shows up in the returned snapshot.
    pub fn update(&self, owner: &str, id: &str, upd: &PatientUpdate) -> StoreResult<Patient> {
        let mut set = SetClause::new();
        set.set_opt("full_name", upd.full_name.clone())
            .set_opt("phone_number", upd.phone_number.clone())
            .set_opt("age", upd.age)
            .set_opt("gender", upd.gender.clone())
            .set_opt("chief_complaint", upd.chief_complaint.clone())
            .set_opt("present_history", upd.present_history.clone())
            .set_opt("medical_history", upd.medical_history.clone())
            .set_opt("observation", upd.observation.clone())
            .set_opt("palpation", upd.palpation.clone())
            .set_opt("examination", upd.examination.clone())
            .set_opt("rehab", upd.rehab.clone())
            .set_opt("diagnosis", upd.diagnosis.clone())
            .set_opt("last_paid_amount", upd.last_paid_amount)
            .set_opt("status", upd.status.clone());

        let conn = self.store.conn()?;
        if set.is_empty() {
            return fetch(&conn, owner, id);
        }
        set.set("updated_time", time_value(&Timestamp::now()));

        let scope = scoped_where(owner).and_eq("id", id.to_string());
        if let Some(stmt) = set.to_update("patients", &scope) {
            let changed = conn.execute(&stmt.sql, params_from_iter(stmt.params.iter()))?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }
        }
        fetch(&conn, owner, id)
    }

    /// Overwrite only the creation and update times of an existing patient.
    pub fn update_times(
        &self,
        owner: &str,
        id: &str,
        created: Timestamp,
        updated: Timestamp,
    ) -> StoreResult<()> {
        let mut set = SetClause::new();
        set.set("created_time", time_value(&created))
            .set("updated_time", time_value(&updated));
        let scope = scoped_where(owner).and_eq("id", id.to_string());
        let conn = self.store.conn()?;
        if let Some(stmt) = set.to_update("patients", &scope) {
            let changed = conn.execute(&stmt.sql, params_from_iter(stmt.params.iter()))?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }
        }
        Ok(())
    }
}

fn fetch(conn: &rusqlite::Connection, owner: &str, id: &str) -> StoreResult<Patient> {
    let (where_sql, where_params) = scoped_where(owner).and_eq("id", id.to_string()).render(1);
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM patients {where_sql}"),
        params_from_iter(where_params.iter()),
        map_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::{bootstrap, DEFAULT_LEGACY_OWNER};

    fn setup_repo() -> PatientRepo {
        let store = Store::open_in_memory().unwrap();
        bootstrap(&store.conn().unwrap(), DEFAULT_LEGACY_OWNER).unwrap();
        PatientRepo::new(store)
    }

    fn sample(name: &str) -> Patient {
        Patient {
            full_name: name.into(),
            phone_number: "98450 11223".into(),
            age: 34,
            gender: "F".into(),
            chief_complaint: "Lower back pain".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_assigns_server_fields() {
        let repo = setup_repo();
        let mut input = sample("Asha");
        input.status = "DISCHARGED".into();

        let created = repo.create("clinic-a", input).unwrap();
        assert_eq!(created.id.len(), 36);
        assert_eq!(created.status, STATUS_ACTIVE);
        assert!(!created.created_time.is_zero());
        assert_eq!(created.updated_time, created.created_time);
    }

    #[test]
    fn test_get_is_owner_scoped() {
        let repo = setup_repo();
        let created = repo.create("clinic-a", sample("Asha")).unwrap();

        let fetched = repo.get_by_id("clinic-a", &created.id).unwrap();
        assert_eq!(fetched, created);

        let err = repo.get_by_id("clinic-b", &created.id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        let err = repo.get_by_id("clinic-a", "no-such-id").unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_list_newest_first_and_partitioned() {
        let repo = setup_repo();
        let mut older = sample("Older");
        older.created_time = Timestamp::parse("2024-01-01T09:00:00Z").unwrap();
        let mut newer = sample("Newer");
        newer.created_time = Timestamp::parse("2025-01-01T09:00:00Z").unwrap();
        repo.create("clinic-a", older).unwrap();
        repo.create("clinic-a", newer).unwrap();
        repo.create("clinic-b", sample("Other")).unwrap();

        let names: Vec<String> = repo
            .list("clinic-a")
            .unwrap()
            .into_iter()
            .map(|p| p.full_name)
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[test]
    fn test_list_coerces_nulls() {
        let repo = setup_repo();
        repo.store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO patients (id, full_name, created_time, updated_time, owner_username)
                 VALUES ('bare', 'Bare', '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z', 'clinic-a')",
                [],
            )
            .unwrap();

        let patients = repo.list("clinic-a").unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].phone_number, "");
        assert_eq!(patients[0].age, 0);
        assert_eq!(patients[0].last_paid_amount, 0.0);
        assert_eq!(patients[0].status, "");
    }

    #[test]
    fn test_empty_update_returns_current_row() {
        let repo = setup_repo();
        let created = repo.create("clinic-a", sample("Asha")).unwrap();

        let same = repo
            .update("clinic-a", &created.id, &PatientUpdate::default())
            .unwrap();
        assert_eq!(same, created);

        let err = repo
            .update("clinic-b", &created.id, &PatientUpdate::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_partial_update_touches_only_present_fields() {
        let repo = setup_repo();
        let mut input = sample("Asha");
        input.created_time = Timestamp::parse("2024-03-01T08:00:00Z").unwrap();
        let created = repo.create("clinic-a", input).unwrap();

        let upd = PatientUpdate {
            diagnosis: Some("Lumbar strain".into()),
            age: Some(35),
            ..Default::default()
        };
        let updated = repo.update("clinic-a", &created.id, &upd).unwrap();
        assert_eq!(updated.diagnosis, "Lumbar strain");
        assert_eq!(updated.age, 35);
        assert_eq!(updated.full_name, created.full_name);
        assert_eq!(updated.phone_number, created.phone_number);
        assert_eq!(updated.created_time, created.created_time);
        assert!(updated.updated_time > created.updated_time);

        assert_eq!(repo.get_by_id("clinic-a", &created.id).unwrap(), updated);
    }

    #[test]
    fn test_update_wrong_owner_is_not_found() {
        let repo = setup_repo();
        let created = repo.create("clinic-a", sample("Asha")).unwrap();
        let upd = PatientUpdate {
            status: Some("INACTIVE".into()),
            ..Default::default()
        };

        let err = repo.update("clinic-b", &created.id, &upd).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(repo.get_by_id("clinic-a", &created.id).unwrap().status, STATUS_ACTIVE);
    }

    #[test]
    fn test_upsert_keeps_sheet_status_and_is_idempotent() {
        let repo = setup_repo();
        let mut p = sample("Asha");
        p.id = "fixed-id".into();
        p.status = "COMPLETED".into();
        p.last_paid_amount = 1500.0;
        repo.upsert("clinic-a", p.clone()).unwrap();

        p.full_name = "Asha R".into();
        repo.upsert("clinic-a", p).unwrap();

        let all = repo.list("clinic-a").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].full_name, "Asha R");
        assert_eq!(all[0].status, "COMPLETED");
        assert_eq!(all[0].last_paid_amount, 1500.0);
    }

    #[test]
    fn test_upsert_refuses_other_owners_row() {
        let repo = setup_repo();
        let mut p = sample("Asha");
        p.id = "shared-id".into();
        repo.upsert("clinic-a", p.clone()).unwrap();

        let err = repo.upsert("clinic-b", p).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(repo.get_by_id("clinic-a", "shared-id").unwrap().full_name, "Asha");
    }

    #[test]
    fn test_upsert_blank_times_keep_stored_values() {
        let repo = setup_repo();
        let mut p = sample("Asha");
        p.id = "replayed".into();
        let first = repo.upsert("clinic-a", p.clone()).unwrap();
        assert!(!first.created_time.is_zero());

        let c = Timestamp::parse("2023-05-01T10:00:00Z").unwrap();
        let u = Timestamp::parse("2023-06-01T10:00:00Z").unwrap();
        repo.update_times("clinic-a", "replayed", c, u).unwrap();

        let replayed = repo.upsert("clinic-a", p.clone()).unwrap();
        assert_eq!(replayed.created_time, c);
        assert_eq!(replayed.updated_time, u);
        assert_eq!(repo.get_by_id("clinic-a", "replayed").unwrap(), replayed);

        let newer = Timestamp::parse("2024-02-01T00:00:00Z").unwrap();
        p.created_time = newer;
        let dated = repo.upsert("clinic-a", p).unwrap();
        assert_eq!(dated.created_time, newer);
        assert_eq!(dated.updated_time, u);
    }

    #[test]
    fn test_update_times() {
        let repo = setup_repo();
        let created = repo.create("clinic-a", sample("Asha")).unwrap();
        let c = Timestamp::parse("2023-05-01T10:00:00Z").unwrap();
        let u = Timestamp::parse("2023-06-01T10:00:00Z").unwrap();

        repo.update_times("clinic-a", &created.id, c, u).unwrap();
        let fetched = repo.get_by_id("clinic-a", &created.id).unwrap();
        assert_eq!(fetched.created_time, c);
        assert_eq!(fetched.updated_time, u);
        assert_eq!(fetched.full_name, "Asha");

        let err = repo.update_times("clinic-a", "missing", c, u).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
