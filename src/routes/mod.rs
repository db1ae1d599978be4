mod auth;
mod health_check;
mod users;

pub use auth::{login, signup};
pub use health_check::health_check;
pub use users::{get_me, get_user, get_users};
