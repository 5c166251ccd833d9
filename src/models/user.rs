use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Marketplace role of a user.
///
/// Shippers post loads; loaders accept them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Shipper,
    Loader,
}

impl Role {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shipper => "shipper",
            Self::Loader => "loader",
        }
    }

    /// Parse from database string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "shipper" => Some(Self::Shipper),
            "loader" => Some(Self::Loader),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user. The email address is the document key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    /// Encoded PBKDF2 hash; never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub user_name: Option<String>,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository input for inserting or replacing a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub user_name: Option<String>,
    pub company_name: Option<String>,
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: Role,
    #[validate(length(min = 1, max = 255))]
    pub user_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub company_name: Option<String>,
}

/// Public view of a user, returned by `GET /users/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub role: Role,
    pub user_name: Option<String>,
    pub company_name: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            role: user.role,
            user_name: user.user_name,
            company_name: user.company_name,
        }
    }
}
