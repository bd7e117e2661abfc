//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and schema bootstrap (db)
//! - HTTP application assembly (server)
//! - Configuration loading (config)
//! - Password hashing, session tokens and extractors (auth)
//! - Repository implementations (repositories)
//! - Default and demo data (seed)
//! - Application state (state)

pub mod auth;
pub mod config;
pub mod db;
pub mod repositories;
pub mod seed;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::AppState;
