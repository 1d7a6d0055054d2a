//! Directory search and match group assembly on top of [`roster_storage::Store`].

pub mod directory;
mod error;
pub mod matching;
pub mod validation;

pub use directory::Directory;
pub use error::{DirectoryError, MatchError};
pub use matching::{
    DepartmentFilter, MatchGroupAssembler, MatchGroupConfig, OfficeFilter, DEFAULT_DEADLINE,
};
