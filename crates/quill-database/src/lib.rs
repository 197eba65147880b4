//! # quill-database
//!
//! PostgreSQL connection management, embedded migrations, and the
//! repositories backing users and refresh-token records.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
