//! # Oshi Quotes Common Library
//!
//! Shared code for the oshi-quotes service and its tooling:
//! - Database initialization, schema and models
//! - Password hashing and session tokens
//! - Configuration loading and root folder resolution
//! - Common error type

pub mod auth;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
