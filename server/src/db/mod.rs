//! Database module for PostgreSQL persistence.

mod todos;

pub use todos::PgStore;
