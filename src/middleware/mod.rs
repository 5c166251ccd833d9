mod auth;
mod request_id;

pub use auth::{CurrentUser, require_user};
pub use request_id::request_id_middleware;
