//! Turns resolved scopes into a [`CandidateQuery`] and runs it.

use roster_storage::{CandidateClause, CandidateQuery, Store, UserId};
use tracing::debug;

use super::eligibility::EligibilityScopes;
use super::{DepartmentFilter, MatchGroupConfig, OfficeFilter};
use crate::MatchError;

/// Build the conjunction of every active filter.
///
/// The exclusion clause is always present since it carries the owner.
pub fn build_candidate_query(
    config: &MatchGroupConfig,
    scopes: &EligibilityScopes,
) -> CandidateQuery {
    let mut query = CandidateQuery::new();

    match config.department_filter {
        DepartmentFilter::None => {}
        DepartmentFilter::OnlyMyDepartment => {
            query = query.and(CandidateClause::CurrentlyInDepartment(
                scopes.department_id.clone(),
            ));
        }
        DepartmentFilter::ExcludeMyDepartment => {
            query = query.and(CandidateClause::NotInDepartment(scopes.department_id.clone()));
        }
    }

    match config.office_filter {
        OfficeFilter::None => {}
        OfficeFilter::OnlyMyOffice => {
            query = query.and(CandidateClause::InOffice(scopes.office_id.clone()));
        }
        OfficeFilter::ExcludeMyOffice => {
            query = query.and(CandidateClause::NotInOffice(scopes.office_id.clone()));
        }
    }

    if let Some(skill_ids) = &scopes.skill_ids {
        query = query.and(CandidateClause::HasAnySkill(skill_ids.clone()));
    }

    query.and(CandidateClause::NotAmong(scopes.excluded_user_ids.clone()))
}

/// Evaluate `query`. An unsatisfiable query never reaches the store.
pub async fn find_candidates<S: Store + ?Sized>(
    store: &S,
    query: &CandidateQuery,
) -> Result<Vec<UserId>, MatchError> {
    if query.is_unsatisfiable() {
        debug!("candidate query is unsatisfiable, skipping lookup");
        return Ok(Vec::new());
    }
    Ok(store.find_candidate_ids(query).await?)
}
