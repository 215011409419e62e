//! Authentication

mod errors;
mod models;
mod service;
mod session;

pub use errors::*;
pub use models::*;
pub use service::*;
pub use session::{AuthSession, TOKEN_KEY, USER_KEY};
