//! Shared types, errors, and configuration for Patungan.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers with decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - The notification dispatcher interface

pub mod config;
pub mod error;
pub mod notify;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use notify::{LogNotifier, NotificationEvent, Notifier};
