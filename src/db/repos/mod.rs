mod loads;
mod users;

pub use loads::LoadRepo;
pub use users::UserRepo;
