//! Search dimensions supported by the directory.

use serde::{Deserialize, Serialize};

/// The user attribute a keyword search runs against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchField {
    /// Display name (substring, case-insensitive)
    Name,
    /// Kana reading (substring)
    Kana,
    /// Mail address (substring)
    Mail,
    /// Active department name, current members only
    Department,
    /// Active role name, current members only
    Role,
    /// Office name
    Office,
    /// Skill name
    Skill,
    /// Free-text goal (store text search)
    Goal,
}

impl SearchField {
    pub const ALL: [SearchField; 8] = [
        SearchField::Name,
        SearchField::Kana,
        SearchField::Mail,
        SearchField::Department,
        SearchField::Role,
        SearchField::Office,
        SearchField::Skill,
        SearchField::Goal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Kana => "kana",
            SearchField::Mail => "mail",
            SearchField::Department => "department",
            SearchField::Role => "role",
            SearchField::Office => "office",
            SearchField::Skill => "skill",
            SearchField::Goal => "goal",
        }
    }
}

impl std::fmt::Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown search field: {}", s))
    }
}
