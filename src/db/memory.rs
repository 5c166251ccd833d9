//! Process-local store backed by `parking_lot` locks.
//!
//! Data lives only as long as the process. Used for local development and as
//! the store behind router and service tests.

use std::{cmp::Reverse, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{LoadRepo, UserRepo},
    },
    models::{AcceptOutcome, CreateLoad, CreateUser, Load, LoadStatus, User},
};

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn user_from_input(input: CreateUser) -> User {
    User {
        email: input.email,
        password_hash: input.password_hash,
        role: input.role,
        user_name: input.user_name,
        company_name: input.company_name,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, input: CreateUser) -> DbResult<User> {
        let mut users = self.users.write();
        if users.contains_key(&input.email) {
            return Err(DbError::Conflict(format!(
                "User with email '{}' already exists",
                input.email
            )));
        }
        let user = user_from_input(input);
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn upsert(&self, input: CreateUser) -> DbResult<User> {
        let user = user_from_input(input);
        self.users.write().insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        Ok(self.users.read().get(email).cloned())
    }
}

#[derive(Default)]
pub struct MemoryLoadRepo {
    loads: Arc<RwLock<HashMap<Uuid, Load>>>,
}

impl MemoryLoadRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed load record as-is.
    ///
    /// Lets tests stage records that the HTTP surface cannot produce, such as
    /// loads with no posting time or with a back-dated one.
    #[cfg(test)]
    pub fn insert_raw(&self, load: Load) {
        self.loads.write().insert(load.id, load);
    }

    fn collect_sorted(&self, keep: impl Fn(&Load) -> bool) -> Vec<Load> {
        let mut loads: Vec<Load> = self
            .loads
            .read()
            .values()
            .filter(|load| keep(load))
            .cloned()
            .collect();
        sort_newest_first(&mut loads);
        loads
    }
}

/// Newest `posted_at` first, ties by ascending id; loads without a posting
/// time go last.
fn sort_newest_first(loads: &mut [Load]) {
    loads.sort_by_key(|load| (load.posted_at.is_none(), Reverse(load.posted_at), load.id));
}

#[async_trait]
impl LoadRepo for MemoryLoadRepo {
    async fn create(&self, input: CreateLoad) -> DbResult<Load> {
        let load = Load {
            id: Uuid::new_v4(),
            shipper_id: input.shipper_id,
            origin: input.origin,
            destination: input.destination,
            weight: input.weight,
            material_type: input.material_type,
            status: LoadStatus::StandBy,
            loader_id: None,
            posted_at: Some(input.posted_at),
            accepted_at: None,
        };
        self.loads.write().insert(load.id, load.clone());
        Ok(load)
    }

    async fn list_by_status(&self, status: LoadStatus) -> DbResult<Vec<Load>> {
        Ok(self.collect_sorted(|load| load.status == status))
    }

    async fn list_by_shipper(&self, shipper_id: &str) -> DbResult<Vec<Load>> {
        Ok(self.collect_sorted(|load| load.shipper_id == shipper_id))
    }

    async fn list_by_loader(&self, loader_id: &str, status: LoadStatus) -> DbResult<Vec<Load>> {
        Ok(self.collect_sorted(|load| {
            load.status == status && load.loader_id.as_deref() == Some(loader_id)
        }))
    }

    async fn accept(
        &self,
        id: Uuid,
        loader_id: &str,
        accepted_at: DateTime<Utc>,
    ) -> DbResult<AcceptOutcome> {
        // Check and write under one write guard.
        let mut loads = self.loads.write();
        let Some(load) = loads.get_mut(&id) else {
            return Ok(AcceptOutcome::NotFound);
        };
        if load.status != LoadStatus::StandBy {
            return Ok(AcceptOutcome::Unavailable(load.status));
        }
        load.status = LoadStatus::Active;
        load.loader_id = Some(loader_id.to_string());
        load.accepted_at = Some(accepted_at);
        Ok(AcceptOutcome::Accepted)
    }

    async fn list_posted_timestamps(&self) -> DbResult<Vec<DateTime<Utc>>> {
        Ok(self
            .loads
            .read()
            .values()
            .filter_map(|load| load.posted_at)
            .collect())
    }
}
