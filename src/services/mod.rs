pub mod forecasting;
mod loads;
mod users;

use std::sync::Arc;

pub use forecasting::{ForecastError, ForecastService};
pub use loads::LoadService;
pub use users::{SeedReport, SeedUser, UserService};

use crate::{
    auth::{AuthError, PasswordError, PasswordHasher, TokenIssuer},
    config::LoadboardConfig,
    db::{DbError, DbPool},
};

/// Errors from the user and load services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Password hashing failed: {0}")]
    Password(#[from] PasswordError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub loads: LoadService,
    pub forecasting: ForecastService,
}

impl Services {
    pub fn new(db: Arc<DbPool>, tokens: Arc<TokenIssuer>, config: &LoadboardConfig) -> Self {
        let hasher = PasswordHasher::new(config.auth.password_iterations);
        Self {
            users: UserService::new(db.clone(), hasher, tokens),
            loads: LoadService::new(db.clone()),
            forecasting: ForecastService::new(db.loads(), config.forecasting.clone()),
        }
    }
}
