use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_status, parse_uuid};
use crate::{
    db::{error::DbResult, repos::LoadRepo},
    models::{AcceptOutcome, CreateLoad, Load, LoadStatus},
};

const LOAD_COLUMNS: &str = "id, shipper_id, origin, destination, weight, material_type, \
                            status, loader_id, posted_at, accepted_at";

const NEWEST_FIRST: &str = "ORDER BY posted_at IS NULL, posted_at DESC, id";

pub struct SqliteLoadRepo {
    pool: SqlitePool,
}

impl SqliteLoadRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn load_from_row(row: &SqliteRow) -> DbResult<Load> {
    Ok(Load {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        shipper_id: row.get("shipper_id"),
        origin: row.get("origin"),
        destination: row.get("destination"),
        weight: row.get("weight"),
        material_type: row.get("material_type"),
        status: parse_status(&row.get::<String, _>("status"))?,
        loader_id: row.get("loader_id"),
        posted_at: row.get("posted_at"),
        accepted_at: row.get("accepted_at"),
    })
}

#[async_trait]
impl LoadRepo for SqliteLoadRepo {
    async fn create(&self, input: CreateLoad) -> DbResult<Load> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO loads (id, shipper_id, origin, destination, weight, material_type, status, posted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.shipper_id)
        .bind(&input.origin)
        .bind(&input.destination)
        .bind(input.weight)
        .bind(&input.material_type)
        .bind(LoadStatus::StandBy.as_str())
        .bind(input.posted_at)
        .execute(&self.pool)
        .await?;

        Ok(Load {
            id,
            shipper_id: input.shipper_id,
            origin: input.origin,
            destination: input.destination,
            weight: input.weight,
            material_type: input.material_type,
            status: LoadStatus::StandBy,
            loader_id: None,
            posted_at: Some(input.posted_at),
            accepted_at: None,
        })
    }

    async fn list_by_status(&self, status: LoadStatus) -> DbResult<Vec<Load>> {
        let query = format!("SELECT {LOAD_COLUMNS} FROM loads WHERE status = ? {NEWEST_FIRST}");
        let rows = sqlx::query(&query)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(load_from_row).collect()
    }

    async fn list_by_shipper(&self, shipper_id: &str) -> DbResult<Vec<Load>> {
        let query =
            format!("SELECT {LOAD_COLUMNS} FROM loads WHERE shipper_id = ? {NEWEST_FIRST}");
        let rows = sqlx::query(&query)
            .bind(shipper_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(load_from_row).collect()
    }

    async fn list_by_loader(&self, loader_id: &str, status: LoadStatus) -> DbResult<Vec<Load>> {
        let query = format!(
            "SELECT {LOAD_COLUMNS} FROM loads WHERE loader_id = ? AND status = ? {NEWEST_FIRST}"
        );
        let rows = sqlx::query(&query)
            .bind(loader_id)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(load_from_row).collect()
    }

    async fn accept(
        &self,
        id: Uuid,
        loader_id: &str,
        accepted_at: DateTime<Utc>,
    ) -> DbResult<AcceptOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE loads
            SET status = ?, loader_id = ?, accepted_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(LoadStatus::Active.as_str())
        .bind(loader_id)
        .bind(accepted_at)
        .bind(id.to_string())
        .bind(LoadStatus::StandBy.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(AcceptOutcome::Accepted);
        }

        // Lost the guard: either the load is missing or no longer stand by.
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM loads WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match status {
            None => Ok(AcceptOutcome::NotFound),
            Some(s) => Ok(AcceptOutcome::Unavailable(parse_status(&s)?)),
        }
    }

    async fn list_posted_timestamps(&self) -> DbResult<Vec<DateTime<Utc>>> {
        let timestamps: Vec<DateTime<Utc>> =
            sqlx::query_scalar("SELECT posted_at FROM loads WHERE posted_at IS NOT NULL")
                .fetch_all(&self.pool)
                .await?;

        Ok(timestamps)
    }
}
