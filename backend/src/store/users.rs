//! Login identities.

use common::model::User;
use common::Timestamp;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{read_time, Store, StoreError, StoreResult};

fn map_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_time: read_time(row, 3)?,
    })
}

#[derive(Clone)]
pub struct UserRepo {
    store: Store,
}

impl UserRepo {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn get_by_username(&self, username: &str) -> StoreResult<User> {
        let conn = self.store.conn()?;
        conn.query_row(
            "SELECT id, username, password_hash, created_time FROM users WHERE username = ?1",
            params![username],
            map_row,
        )
        .optional()?
        .ok_or(StoreError::NotFound)
    }

    /// Create a new login. An existing username is a [`StoreError::Conflict`].
    pub fn create(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_time: Timestamp::now(),
        };
        let conn = self.store.conn()?;
        conn.execute(
            "INSERT INTO users (id, username, password_hash, created_time) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id,
                user.username,
                user.password_hash,
                user.created_time.to_rfc3339(),
            ],
        )?;
        Ok(user)
    }

    /// Create `username` or replace its password hash if it already exists.
    pub fn upsert(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        let conn = self.store.conn()?;
        conn.execute(
            "INSERT INTO users (id, username, password_hash, created_time) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash",
            params![
                Uuid::new_v4().to_string(),
                username,
                password_hash,
                Timestamp::now().to_rfc3339(),
            ],
        )?;
        drop(conn);
        self.get_by_username(username)
    }
}
