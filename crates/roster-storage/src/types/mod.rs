//! Type definitions for roster storage.

mod candidates;
mod ids;
mod search;
mod users;

// Re-export all types from submodules
pub use candidates::*;
pub use ids::*;
pub use search::*;
pub use users::*;
