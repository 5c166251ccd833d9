mod forecast;
mod load;
mod user;

pub use forecast::*;
pub use load::*;
pub use user::*;
