use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use super::common::parse_role;
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::UserRepo,
    },
    models::{CreateUser, User},
};

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &SqliteRow) -> DbResult<User> {
    Ok(User {
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: parse_role(&row.get::<String, _>("role"))?,
        user_name: row.get("user_name"),
        company_name: row.get("company_name"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn create(&self, input: CreateUser) -> DbResult<User> {
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, role, user_name, company_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.role.as_str())
        .bind(&input.user_name)
        .bind(&input.company_name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("User with email '{}' already exists", input.email))
            }
            _ => DbError::from(e),
        })?;

        Ok(User {
            email: input.email,
            password_hash: input.password_hash,
            role: input.role,
            user_name: input.user_name,
            company_name: input.company_name,
            created_at: now,
        })
    }

    async fn upsert(&self, input: CreateUser) -> DbResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, role, user_name, company_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (email) DO UPDATE SET
                password_hash = excluded.password_hash,
                role = excluded.role,
                user_name = excluded.user_name,
                company_name = excluded.company_name
            RETURNING email, password_hash, role, user_name, company_name, created_at
            "#,
        )
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.role.as_str())
        .bind(&input.user_name)
        .bind(&input.company_name)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let result = sqlx::query(
            r#"
            SELECT email, password_hash, role, user_name, company_name, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.as_ref().map(user_from_row).transpose()
    }
}
