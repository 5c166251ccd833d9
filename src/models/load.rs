use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of a load.
///
/// Loads are posted as `stand by`, become `active` once a loader accepts
/// them, and move on to `in_transit` and `delivered` afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    #[serde(rename = "stand by")]
    StandBy,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "in_transit")]
    InTransit,
    #[serde(rename = "delivered")]
    Delivered,
}

impl LoadStatus {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandBy => "stand by",
            Self::Active => "active",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
        }
    }

    /// Parse from database string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "stand by" => Some(Self::StandBy),
            "active" => Some(Self::Active),
            "in_transit" => Some(Self::InTransit),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A freight load document.
///
/// Documents written by older clients may lack any of the optional fields;
/// readers must handle their absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Load {
    pub id: Uuid,
    /// Email of the shipper who posted the load.
    pub shipper_id: String,
    pub origin: String,
    pub destination: String,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    pub material_type: Option<String>,
    pub status: LoadStatus,
    /// Email of the loader who accepted the load.
    pub loader_id: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Repository input for inserting a load. New loads always start as `stand by`.
#[derive(Debug, Clone)]
pub struct CreateLoad {
    pub shipper_id: String,
    pub origin: String,
    pub destination: String,
    pub weight: Option<f64>,
    pub material_type: Option<String>,
    pub posted_at: DateTime<Utc>,
}

/// Request body for posting a load.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostLoad {
    #[validate(length(min = 1, max = 255))]
    pub origin: String,
    #[validate(length(min = 1, max = 255))]
    pub destination: String,
    #[validate(range(exclusive_min = 0.0))]
    pub weight: Option<f64>,
    #[validate(length(min = 1, max = 255))]
    pub material_type: Option<String>,
}

/// Outcome of a conditional `stand by` → `active` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted,
    NotFound,
    /// The load exists but is no longer `stand by`.
    Unavailable(LoadStatus),
}
