//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Repositories run every multi-step mutation inside a single database
//! transaction; racy preconditions are re-validated under row locks
//! before the mutation is applied.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    ExpenseRepository, InvitationRepository, LedgerRepository, MemberRepository, TripRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
