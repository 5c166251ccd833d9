use std::sync::Arc;

use serde::Deserialize;

use super::ServiceError;
use crate::{
    auth::{AuthError, PasswordHasher, TokenIssuer},
    db::{DbError, DbPool},
    models::{CreateUser, RegisterUser, Role, User},
};

/// A record from a seed file. Only `email` and `role` are required.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub user_name: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub seeded: usize,
    pub skipped: usize,
}

/// Service layer for user registration and login
#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
}

impl UserService {
    pub fn new(db: Arc<DbPool>, hasher: PasswordHasher, tokens: Arc<TokenIssuer>) -> Self {
        Self { db, hasher, tokens }
    }

    /// Register a new user. Fails when the email is already taken.
    #[tracing::instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn register(&self, input: RegisterUser) -> Result<User, ServiceError> {
        let users = self.db.users();
        if users.get_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::BadRequest("Email already registered".into()));
        }

        let password_hash = self.hash_password(input.password).await?;
        let user = users
            .create(CreateUser {
                email: input.email,
                password_hash,
                role: input.role,
                user_name: input.user_name,
                company_name: input.company_name,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                DbError::Conflict(_) => ServiceError::BadRequest("Email already registered".into()),
                other => other.into(),
            })?;

        tracing::info!("User registered");
        Ok(user)
    }

    /// Check an email/password pair. Unknown emails and wrong passwords fail
    /// the same way.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let user = self.db.users().get_by_email(email).await?;

        // Unknown emails still pay for a hash so they are not faster to reject
        let hasher = self.hasher;
        let password = password.to_string();
        let encoded = user.as_ref().map(|u| u.password_hash.clone());
        let valid = tokio::task::spawn_blocking(move || match encoded {
            Some(encoded) => hasher.verify(&password, &encoded),
            None => hasher.verify_absent(&password),
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("password verification task failed: {e}")))?;

        match user {
            Some(user) if valid => Ok(user),
            _ => Err(AuthError::InvalidCredentials.into()),
        }
    }

    /// Authenticate and issue an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let user = self.authenticate(email, password).await?;
        let token = self.tokens.issue(&user.email, user.role)?;
        tracing::info!(email = %user.email, "Issued access token");
        Ok(token)
    }

    /// Upsert seed users, all sharing `password`. Records without an email or
    /// role are skipped.
    pub async fn seed(
        &self,
        records: Vec<SeedUser>,
        password: &str,
    ) -> Result<SeedReport, ServiceError> {
        let users = self.db.users();
        let mut report = SeedReport::default();

        for record in records {
            let (Some(email), Some(role)) = (record.email.clone(), record.role) else {
                tracing::warn!(?record, "Skipping seed record without email or role");
                report.skipped += 1;
                continue;
            };

            let password_hash = self.hash_password(password.to_string()).await?;
            users
                .upsert(CreateUser {
                    email: email.clone(),
                    password_hash,
                    role,
                    user_name: record.user_name,
                    company_name: record.company_name,
                })
                .await?;

            tracing::info!(%email, %role, "Seeded user");
            report.seeded += 1;
        }

        Ok(report)
    }

    async fn hash_password(&self, password: String) -> Result<String, ServiceError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {e}")))?
            .map_err(ServiceError::from)
    }
}
