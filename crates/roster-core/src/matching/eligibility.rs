//! Resolves the owner's filter scopes into store identifiers.

use std::collections::HashSet;

use roster_storage::{DepartmentId, OfficeId, SkillId, Store, StoreError, UserForFilter, UserId};
use tracing::debug;

use super::MatchGroupConfig;
use crate::MatchError;

/// Identifiers the candidate predicate is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EligibilityScopes {
    pub department_id: DepartmentId,
    pub office_id: OfficeId,
    /// `None` when no skill filter is configured. `Some` and empty when none of
    /// the configured names exists, which leaves nobody eligible.
    pub skill_ids: Option<Vec<SkillId>>,
    /// Users that may not be drawn. Always contains the owner, without duplicates.
    pub excluded_user_ids: Vec<UserId>,
}

fn owner_error(e: StoreError, what: impl FnOnce() -> String) -> MatchError {
    match e {
        StoreError::NotFound => MatchError::OwnerResolution(what()),
        other => MatchError::StoreUnavailable(other),
    }
}

/// Resolve everything the candidate query needs relative to `owner`.
///
/// The department and office are resolved even when their filter is off, so
/// an owner without a current department is rejected for every config.
pub async fn resolve_scopes<S: Store + ?Sized>(
    store: &S,
    config: &MatchGroupConfig,
    owner: &UserForFilter,
) -> Result<EligibilityScopes, MatchError> {
    let department_name = owner.department_name.as_deref().ok_or_else(|| {
        MatchError::OwnerResolution(format!("user {} has no current department", owner.user_id))
    })?;

    let department_id = store
        .find_department_id_by_name(department_name)
        .await
        .map_err(|e| owner_error(e, || format!("department '{}' not found", department_name)))?;

    let office_id = store
        .get_office_id_of_user(&owner.user_id)
        .await
        .map_err(|e| owner_error(e, || format!("office of user {} not found", owner.user_id)))?;

    let skill_ids = if config.skill_filter.is_empty() {
        None
    } else {
        Some(store.find_skill_ids_by_names(&config.skill_filter).await?)
    };

    let partners = if config.never_matched_filter {
        store.list_match_partners(&owner.user_id).await?
    } else {
        Vec::new()
    };

    let mut seen = HashSet::new();
    let mut excluded_user_ids: Vec<UserId> = partners
        .into_iter()
        .filter(|id| id != &owner.user_id && seen.insert(id.clone()))
        .collect();
    excluded_user_ids.push(owner.user_id.clone());

    debug!(
        owner = %owner.user_id,
        skills = ?skill_ids.as_ref().map(Vec::len),
        excluded = excluded_user_ids.len(),
        "resolved eligibility scopes"
    );

    Ok(EligibilityScopes {
        department_id,
        office_id,
        skill_ids,
        excluded_user_ids,
    })
}
