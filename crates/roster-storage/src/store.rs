//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait `roster-core` depends on.
///
/// Every method is a read-only query.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Directory ──────────────────────────────────────

    /// Get the user whose mail and password hash both match.
    async fn get_user_id_by_mail_and_password(
        &self,
        mail: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError>;

    /// List users ordered by entry date, then kana.
    async fn list_users(&self, limit: u32, offset: u32) -> Result<Vec<UserSummary>, StoreError>;

    /// Get a single user by ID.
    async fn get_user(&self, user_id: &UserId) -> Result<UserSummary, StoreError>;

    /// Get every existing user among `user_ids`.
    async fn get_users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserSummary>, StoreError>;

    /// Get search views for `user_ids`, in the same order. Unknown IDs are skipped.
    async fn get_searched_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<SearchedUser>, StoreError>;

    /// Find the IDs of users whose `field` matches `keyword`.
    async fn search_user_ids(
        &self,
        field: SearchField,
        keyword: &str,
    ) -> Result<Vec<UserId>, StoreError>;

    /// Get the owner view used to evaluate match filters.
    async fn get_user_for_filter(&self, user_id: &UserId) -> Result<UserForFilter, StoreError>;

    // ───────────────────────────────────── Matching ───────────────────────────────────────

    /// Find a department by exact name.
    async fn find_department_id_by_name(&self, name: &str) -> Result<DepartmentId, StoreError>;

    /// Get the office a user works at.
    async fn get_office_id_of_user(&self, user_id: &UserId) -> Result<OfficeId, StoreError>;

    /// Resolve skill names to IDs. Names without a skill are ignored.
    async fn find_skill_ids_by_names(&self, names: &[String]) -> Result<Vec<SkillId>, StoreError>;

    /// List every user who shared a match group with `user_id` (may include the user).
    async fn list_match_partners(&self, user_id: &UserId) -> Result<Vec<UserId>, StoreError>;

    /// Find the users satisfying every clause of `query`.
    async fn find_candidate_ids(&self, query: &CandidateQuery) -> Result<Vec<UserId>, StoreError>;
}
