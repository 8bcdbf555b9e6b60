//! Database initialization, models and account queries

pub mod init;
pub mod models;
pub mod sessions;
pub mod users;

pub use init::*;
pub use models::*;
