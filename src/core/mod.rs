// src/core/mod.rs
//! Core services: configuration, database and file system access

pub mod config_manager;
pub mod database;
pub mod fs_ops;

pub use config_manager::{ConfigManager, GeminiConfig};
pub use database::{Database, SCHEMA_VERSION};
pub use fs_ops::FsOps;
