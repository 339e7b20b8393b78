//! Shared configuration for Sprout.
//!
//! This crate provides configuration management used by the server binary
//! and wired down into the database layer and the event processor.

pub mod config;

pub use config::{AppConfig, CacheConfig, DatabaseConfig, ServerConfig};
