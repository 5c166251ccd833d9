//! Password login and bearer tokens.
//!
//! Passwords are stored as PBKDF2-HMAC-SHA256 hashes; successful logins are
//! issued HS256 access tokens whose subject is the user's email.

mod error;
mod jwt;
mod password;

pub use error::AuthError;
pub use jwt::TokenIssuer;
pub use password::{PasswordError, PasswordHasher};
