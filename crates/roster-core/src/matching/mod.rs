//! Random match group assembly.
//!
//! A request flows through three stages: the owner's scopes are resolved
//! ([`eligibility`]), turned into a [`CandidateQuery`](roster_storage::CandidateQuery)
//! that the store evaluates ([`candidates`]), and the resulting pool is sampled
//! ([`sampler`]). The first two stages run under a deadline.

pub mod candidates;
pub mod eligibility;
pub mod sampler;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use roster_storage::{Store, StoreError, UserForFilter, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::MatchError;
use candidates::{build_candidate_query, find_candidates};
use eligibility::resolve_scopes;
use sampler::sample_group;

/// Deadline applied to scope resolution and the candidate lookup.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Department relation between the owner and the candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DepartmentFilter {
    #[default]
    None,
    OnlyMyDepartment,
    ExcludeMyDepartment,
}

impl FromStr for DepartmentFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "onlyMyDepartment" | "only-my-department" => Ok(Self::OnlyMyDepartment),
            "excludeMyDepartment" | "exclude-my-department" => Ok(Self::ExcludeMyDepartment),
            other => Err(format!("unknown department filter '{}'", other)),
        }
    }
}

/// Office relation between the owner and the candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OfficeFilter {
    #[default]
    None,
    OnlyMyOffice,
    ExcludeMyOffice,
}

impl FromStr for OfficeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "onlyMyOffice" | "only-my-office" => Ok(Self::OnlyMyOffice),
            "excludeMyOffice" | "exclude-my-office" => Ok(Self::ExcludeMyOffice),
            other => Err(format!("unknown office filter '{}'", other)),
        }
    }
}

/// Filters and size of a requested match group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchGroupConfig {
    #[serde(default)]
    pub department_filter: DepartmentFilter,
    #[serde(default)]
    pub office_filter: OfficeFilter,
    /// Skill names; candidates need at least one of them. Empty disables the filter.
    #[serde(default)]
    pub skill_filter: Vec<String>,
    /// Skip everyone who already shared a match group with the owner.
    #[serde(default)]
    pub never_matched_filter: bool,
    /// Requested group size, owner included.
    pub num_of_members: usize,
}

impl MatchGroupConfig {
    /// A config with every filter disabled.
    pub fn new(num_of_members: usize) -> Self {
        Self {
            department_filter: DepartmentFilter::None,
            office_filter: OfficeFilter::None,
            skill_filter: Vec::new(),
            never_matched_filter: false,
            num_of_members,
        }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.num_of_members == 0 {
            return Err(MatchError::InvalidConfig(
                "numOfMembers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Assembles random match groups from the users in a [`Store`].
pub struct MatchGroupAssembler<S: ?Sized> {
    store: Arc<S>,
    deadline: Duration,
}

impl<S: Store + ?Sized> MatchGroupAssembler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Assemble a group around `owner`.
    ///
    /// The result holds `min(num_of_members, pool + 1)` distinct users, owner last.
    pub async fn assemble(
        &self,
        config: &MatchGroupConfig,
        owner: &UserForFilter,
    ) -> Result<Vec<UserId>, MatchError> {
        let pool = self.candidate_pool(config, owner).await?;
        let mut rng = rand::rng();
        let group = sample_group(pool, &owner.user_id, config.num_of_members, &mut rng);
        info!(
            owner = %owner.user_id,
            requested = config.num_of_members,
            assembled = group.len(),
            "assembled match group"
        );
        Ok(group)
    }

    /// Like [`assemble`](Self::assemble), drawing from `rng`.
    pub async fn assemble_with_rng<R: Rng + ?Sized>(
        &self,
        config: &MatchGroupConfig,
        owner: &UserForFilter,
        rng: &mut R,
    ) -> Result<Vec<UserId>, MatchError> {
        let pool = self.candidate_pool(config, owner).await?;
        Ok(sample_group(pool, &owner.user_id, config.num_of_members, rng))
    }

    /// Look the owner up by ID, then assemble their group.
    pub async fn assemble_for_user(
        &self,
        config: &MatchGroupConfig,
        user_id: &UserId,
    ) -> Result<(UserForFilter, Vec<UserId>), MatchError> {
        let owner = self
            .store
            .get_user_for_filter(user_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => {
                    MatchError::OwnerResolution(format!("user {} not found", user_id))
                }
                other => MatchError::StoreUnavailable(other),
            })?;
        let group = self.assemble(config, &owner).await?;
        Ok((owner, group))
    }

    /// Every user eligible to join `owner`'s group, owner excluded.
    pub async fn candidate_pool(
        &self,
        config: &MatchGroupConfig,
        owner: &UserForFilter,
    ) -> Result<Vec<UserId>, MatchError> {
        config.validate()?;

        let lookup = async {
            let scopes = resolve_scopes(self.store.as_ref(), config, owner).await?;
            let query = build_candidate_query(config, &scopes);
            find_candidates(self.store.as_ref(), &query).await
        };
        let pool = tokio::time::timeout(self.deadline, lookup)
            .await
            .map_err(|_| MatchError::Timeout(self.deadline))??;

        debug!(owner = %owner.user_id, pool = pool.len(), "resolved candidate pool");
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserializes_camel_case() {
        let config: MatchGroupConfig = serde_json::from_str(
            r#"{
                "departmentFilter": "excludeMyDepartment",
                "officeFilter": "onlyMyOffice",
                "skillFilter": ["rust"],
                "neverMatchedFilter": true,
                "numOfMembers": 4
            }"#,
        )
        .unwrap();

        assert_eq!(config.department_filter, DepartmentFilter::ExcludeMyDepartment);
        assert_eq!(config.office_filter, OfficeFilter::OnlyMyOffice);
        assert_eq!(config.skill_filter, vec!["rust".to_string()]);
        assert!(config.never_matched_filter);
        assert_eq!(config.num_of_members, 4);
    }

    #[test]
    fn test_config_filters_default_to_none() {
        let config: MatchGroupConfig = serde_json::from_str(r#"{"numOfMembers": 2}"#).unwrap();
        assert_eq!(config, MatchGroupConfig::new(2));
    }

    #[test]
    fn test_zero_members_is_invalid() {
        assert!(matches!(
            MatchGroupConfig::new(0).validate(),
            Err(MatchError::InvalidConfig(_))
        ));
        assert!(MatchGroupConfig::new(1).validate().is_ok());
    }

    #[test]
    fn test_filter_names_parse() {
        assert_eq!(
            "exclude-my-department".parse::<DepartmentFilter>().unwrap(),
            DepartmentFilter::ExcludeMyDepartment
        );
        assert_eq!(
            "onlyMyOffice".parse::<OfficeFilter>().unwrap(),
            OfficeFilter::OnlyMyOffice
        );
        assert!("sideways".parse::<OfficeFilter>().is_err());
    }
}
