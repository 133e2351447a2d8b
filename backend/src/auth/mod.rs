//! Credentials and bearer tokens.
//!
//! - `password`: argon2 hashing of login passwords.
//! - `token`: issuance and verification of the signed tokens that carry the owner identity.

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

use crate::store::{StoreError, UserRepo};
use common::model::User;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing or malformed authorization header")]
    MissingBearer,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token expiry is out of range")]
    ExpiryOutOfRange,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Create a new login for `username`. Refuses (with a store conflict) a name that is taken.
pub fn register_user(users: &UserRepo, username: &str, password: &str) -> Result<User, AuthError> {
    let hash = hash_password(password)?;
    let user = users.create(username, &hash)?;
    log::info!("registered user '{}'", user.username);
    Ok(user)
}

/// Create `username`, or rotate its password if it already exists.
pub fn seed_user(users: &UserRepo, username: &str, password: &str) -> Result<User, AuthError> {
    let hash = hash_password(password)?;
    let user = users.upsert(username, &hash)?;
    log::info!("seeded user '{}'", user.username);
    Ok(user)
}
