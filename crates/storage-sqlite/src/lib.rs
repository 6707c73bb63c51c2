//! SQLite storage implementation for Fundledger.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `fundledger-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. `core` is database-agnostic and works with traits.
//!
//! Mutations run on a single writer actor that owns one connection and
//! executes each job inside an immediate transaction; that is what makes a
//! ledger post plus its investor aggregate update (or a processed fund flow
//! with its tax event) a single atomic unit.

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod fund_flows;
pub mod investors;
pub mod ledger;
pub mod nav;
pub mod reconciliation;
pub mod settings;
pub mod tax_events;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, DbConnection, DbPool,
    DbTransactionExecutor, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from fundledger-core for convenience
pub use fundledger_core::errors::{DatabaseError, Error, Result};
