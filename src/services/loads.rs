use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::ServiceError;
use crate::{
    db::DbPool,
    models::{AcceptOutcome, CreateLoad, Load, LoadStatus, PostLoad, Role, User},
};

/// Service layer for posting, listing and accepting loads
#[derive(Clone)]
pub struct LoadService {
    db: Arc<DbPool>,
}

fn require_role(user: &User, role: Role, message: &str) -> Result<(), ServiceError> {
    if user.role == role {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(message.to_string()))
    }
}

impl LoadService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Post a new load on behalf of a shipper.
    #[tracing::instrument(skip(self, user, input), fields(shipper = %user.email))]
    pub async fn post(&self, user: &User, input: PostLoad) -> Result<Load, ServiceError> {
        require_role(user, Role::Shipper, "Only shippers can post loads")?;

        let load = self
            .db
            .loads()
            .create(CreateLoad {
                shipper_id: user.email.clone(),
                origin: input.origin,
                destination: input.destination,
                weight: input.weight,
                material_type: input.material_type,
                posted_at: Utc::now(),
            })
            .await?;

        tracing::info!(load_id = %load.id, "Load posted");
        Ok(load)
    }

    /// Loads waiting for a loader, newest first.
    pub async fn available(&self) -> Result<Vec<Load>, ServiceError> {
        Ok(self.db.loads().list_by_status(LoadStatus::StandBy).await?)
    }

    /// Loads posted by the given shipper, newest first.
    pub async fn posted_by(&self, user: &User) -> Result<Vec<Load>, ServiceError> {
        require_role(user, Role::Shipper, "Only shippers can view their posted loads")?;
        Ok(self.db.loads().list_by_shipper(&user.email).await?)
    }

    /// Active loads accepted by the given loader, newest first.
    pub async fn active_for(&self, user: &User) -> Result<Vec<Load>, ServiceError> {
        require_role(user, Role::Loader, "Only loaders can view their active loads")?;
        Ok(self
            .db
            .loads()
            .list_by_loader(&user.email, LoadStatus::Active)
            .await?)
    }

    /// Accept a `stand by` load for the given loader.
    #[tracing::instrument(skip(self, user), fields(loader = %user.email))]
    pub async fn accept(&self, user: &User, load_id: Uuid) -> Result<(), ServiceError> {
        require_role(user, Role::Loader, "Only loaders can accept loads")?;

        match self
            .db
            .loads()
            .accept(load_id, &user.email, Utc::now())
            .await?
        {
            AcceptOutcome::Accepted => {
                tracing::info!("Load accepted");
                Ok(())
            }
            AcceptOutcome::NotFound => Err(ServiceError::NotFound("Load not found".into())),
            AcceptOutcome::Unavailable(status) => {
                tracing::debug!(%status, "Load no longer available");
                Err(ServiceError::BadRequest("Load not available".into()))
            }
        }
    }
}
