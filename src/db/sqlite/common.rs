use uuid::Uuid;

use crate::{
    db::error::{DbError, DbResult},
    models::{LoadStatus, Role},
};

/// Parse a UUID string from the database, returning a DbError on failure
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {}", e)))
}

pub fn parse_role(s: &str) -> DbResult<Role> {
    Role::from_str(s).ok_or_else(|| DbError::Internal(format!("Invalid role in database: {}", s)))
}

pub fn parse_status(s: &str) -> DbResult<LoadStatus> {
    LoadStatus::from_str(s)
        .ok_or_else(|| DbError::Internal(format!("Invalid load status in database: {}", s)))
}
