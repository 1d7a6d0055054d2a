//! Server unit and integration tests.
//!
//! - `common` - Seeded in-memory SQLite backend
//! - `store_backend` - Storage backend dispatch and the commands built on it
//! - `cli` - Argument parsing and database URL resolution

pub mod common;
