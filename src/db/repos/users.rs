use async_trait::async_trait;

use crate::{
    db::error::DbResult,
    models::{CreateUser, User},
};

/// User records, keyed by email address.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a new user. Fails with `DbError::Conflict` when the email is taken.
    async fn create(&self, input: CreateUser) -> DbResult<User>;

    /// Insert or replace the user stored under `input.email`.
    async fn upsert(&self, input: CreateUser) -> DbResult<User>;

    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>>;
}
