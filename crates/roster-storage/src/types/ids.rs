//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Office identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficeId(pub Uuid);

/// Uploaded file identifier (user icons).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub Uuid);

/// Department identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DepartmentId(pub Uuid);

/// Role identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RoleId(pub Uuid);

/// Skill identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SkillId(pub Uuid);

/// Match group identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchGroupId(pub Uuid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display_and_parse() {
        let uuid = Uuid::new_v4();
        let user_id = UserId(uuid);
        assert_eq!(user_id.to_string(), uuid.to_string());

        let parsed: UserId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed, user_id);
    }

    #[test]
    fn test_user_id_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&UserId(uuid)).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn test_typed_ids_hash() {
        use std::collections::HashSet;

        let uuid = Uuid::new_v4();
        let mut set = HashSet::new();
        set.insert(UserId(uuid));
        assert!(set.contains(&UserId(uuid)));
        assert!(!set.contains(&UserId(Uuid::new_v4())));
    }

    #[test]
    fn test_typed_ids_inner_access() {
        let uuid = Uuid::new_v4();
        assert_eq!(DepartmentId(uuid).0, uuid);
        assert_eq!(OfficeId(uuid).0, uuid);
        assert_eq!(SkillId(uuid).0, uuid);
        assert_eq!(MatchGroupId(uuid).0, uuid);
    }
}
