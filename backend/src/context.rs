//! Shared state handed to every request handler.

use crate::auth::TokenService;
use crate::error::ApiError;
use crate::store::{PatientRepo, PaymentRepo, Store, StoreError, UserRepo};
use actix_web::web;
use std::time::Duration;

/// Repositories and the token service, constructed once at start-up and shared through
/// `web::Data`.
#[derive(Clone)]
pub struct AppContext {
    pub patients: PatientRepo,
    pub payments: PaymentRepo,
    pub users: UserRepo,
    pub tokens: TokenService,
    pub store_timeout: Duration,
}

impl AppContext {
    pub fn new(store: Store, tokens: TokenService, store_timeout: Duration) -> Self {
        Self {
            patients: PatientRepo::new(store.clone()),
            payments: PaymentRepo::new(store.clone()),
            users: UserRepo::new(store),
            tokens,
            store_timeout,
        }
    }

    /// Run blocking store work off the async workers, bounded by the store timeout.
    ///
    /// When the timeout elapses the caller gets a storage error; the blocking call itself
    /// runs to completion in the background.
    pub async fn run<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&AppContext) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let ctx = self.clone();
        let task = web::block(move || work(&ctx));
        match tokio::time::timeout(self.store_timeout, task).await {
            Ok(Ok(result)) => result.map_err(ApiError::from),
            Ok(Err(e)) => {
                log::error!("store task failed: {}", e);
                Err(ApiError::Storage("storage failure".to_string()))
            }
            Err(_) => {
                log::error!("store operation exceeded {:?}", self.store_timeout);
                Err(ApiError::Storage("storage timeout".to_string()))
            }
        }
    }
}
