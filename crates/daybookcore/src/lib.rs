//! Daybookcore - storage and shared utilities for the Marks E-Daybook bot
//!
//! This crate has no Telegram dependency. It owns everything the bot needs
//! below the transport layer.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and input validation
//! - `storage`: SQLite pool, embedded migrations and per-entity queries

pub mod core;
pub mod storage;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use storage::{create_memory_pool, create_pool, get_connection, DbConnection, DbPool};
