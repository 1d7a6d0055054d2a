//! User views returned by the directory queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{FileId, UserId};

/// Icon file attached to a user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub file_id: FileId,
    pub file_name: String,
}

/// Compact user record used by listings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: UserId,
    pub user_name: String,
    pub user_icon: FileRef,
    pub office_name: String,
}

/// User record returned by searches
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchedUser {
    pub user_id: UserId,
    pub user_name: String,
    pub kana: String,
    pub entry_date: NaiveDate,
    pub office_name: String,
    pub user_icon: FileRef,
}

/// The attributes of a user needed to evaluate match filters relative to them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForFilter {
    pub user_id: UserId,
    pub user_name: String,
    pub office_name: String,
    pub user_icon: FileRef,
    /// Department the user currently belongs to, if any
    pub department_name: Option<String>,
    pub skill_names: Vec<String>,
}
