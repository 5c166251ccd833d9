mod common;
mod loads;
mod users;

pub use loads::SqliteLoadRepo;
pub use users::SqliteUserRepo;
