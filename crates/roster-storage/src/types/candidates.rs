//! Composable predicates describing who may join a match group.
//!
//! Backends render each clause with bound parameters and AND them together.

use super::{DepartmentId, OfficeId, SkillId, UserId};

/// A single eligibility predicate over the user population.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CandidateClause {
    /// Currently belongs (`belong = true`) to the department.
    CurrentlyInDepartment(DepartmentId),
    /// Currently belongs to some other department and not to this one.
    NotInDepartment(DepartmentId),
    /// Works at the office.
    InOffice(OfficeId),
    /// Works at any other office.
    NotInOffice(OfficeId),
    /// Has at least one of the skills. An empty list matches nobody.
    HasAnySkill(Vec<SkillId>),
    /// Is none of the listed users. An empty list excludes nobody.
    NotAmong(Vec<UserId>),
}

impl CandidateClause {
    /// True when the clause can never match a row.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, CandidateClause::HasAnySkill(ids) if ids.is_empty())
    }
}

/// Conjunction of [`CandidateClause`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateQuery {
    clauses: Vec<CandidateClause>,
}

impl CandidateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause to the conjunction.
    pub fn and(mut self, clause: CandidateClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[CandidateClause] {
        &self.clauses
    }

    /// True when any clause is unsatisfiable, so the whole query matches nobody.
    pub fn is_unsatisfiable(&self) -> bool {
        self.clauses.iter().any(CandidateClause::is_unsatisfiable)
    }
}
