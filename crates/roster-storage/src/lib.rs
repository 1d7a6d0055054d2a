//! Storage abstraction for the roster directory.
//!
//! Backend crates (e.g., roster-store-sqlite, roster-store-postgres) implement the
//! [`Store`] trait so `roster-core` doesn't depend on any specific database engine
//! or schema details.

mod store;
pub mod types;

pub use store::*;
pub use types::*;

use thiserror::Error;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Build a `LIKE` pattern matching `keyword` anywhere in a column.
///
/// `%`, `_` and `\` in the keyword are escaped, so queries using the pattern
/// must declare `ESCAPE '\'`.
pub fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
