use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{AcceptOutcome, CreateLoad, Load, LoadStatus},
};

/// Load records.
///
/// Every listing is ordered newest first by `posted_at`, then by `id`; loads
/// without a posting time sort last.
#[async_trait]
pub trait LoadRepo: Send + Sync {
    /// Insert a new load with status `stand by`.
    async fn create(&self, input: CreateLoad) -> DbResult<Load>;

    async fn list_by_status(&self, status: LoadStatus) -> DbResult<Vec<Load>>;

    async fn list_by_shipper(&self, shipper_id: &str) -> DbResult<Vec<Load>>;

    async fn list_by_loader(&self, loader_id: &str, status: LoadStatus) -> DbResult<Vec<Load>>;

    /// Transition a load from `stand by` to `active` for `loader_id`.
    ///
    /// The status check and the write happen atomically, so at most one of
    /// several concurrent callers observes `AcceptOutcome::Accepted`.
    async fn accept(
        &self,
        id: Uuid,
        loader_id: &str,
        accepted_at: DateTime<Utc>,
    ) -> DbResult<AcceptOutcome>;

    /// Posting timestamps of every load, in no particular order. Loads without
    /// a posting time are skipped.
    async fn list_posted_timestamps(&self) -> DbResult<Vec<DateTime<Utc>>>;
}
