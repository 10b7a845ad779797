//! # Roles and the Role Resolver Seam
//!
//! The actor's role is always resolved relative to one appraisal: the same
//! employee can be the appraiser of one appraisal and the appraisee of
//! another. The `RoleResolver` collaborator answers the one question the
//! core cannot answer itself — whether an employee id exists and whether it
//! carries the manager capability.

use crate::types::{EmployeeId, EmployeeRef, MeritError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// ACTOR ROLE
// =============================================================================

/// A viewer's role relative to one appraisal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// The employee under review.
    Appraisee,
    /// The manager conducting the review.
    Appraiser,
    /// The second-level reviewer signing the review off.
    Reviewer,
    /// Any employee holding none of the three positions.
    Other,
}

impl ActorRole {
    /// All roles in a fixed order, for exhaustive table checks.
    pub const ALL: [Self; 4] = [Self::Appraisee, Self::Appraiser, Self::Reviewer, Self::Other];

    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Appraisee => "appraisee",
            Self::Appraiser => "appraiser",
            Self::Reviewer => "reviewer",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ROLE RESOLVER TRAIT
// =============================================================================

/// The external identity collaborator.
///
/// Resolves an employee id to a reference carrying the `manager_eligible`
/// capability. The capability is an explicit boolean decided by the
/// resolver, never derived from a role-name string inside the core.
///
/// # Extension Point
///
/// Implementors must be `Send + Sync`; the shipped surfaces wire in a
/// roster-backed [`StaticResolver`], a production deployment would wrap its
/// HR directory here.
pub trait RoleResolver: Send + Sync {
    /// Resolve an employee id.
    ///
    /// Returns `MeritError::EmployeeNotFound` for ids unknown to the
    /// directory.
    fn resolve(&self, id: EmployeeId) -> Result<EmployeeRef, MeritError>;
}

// =============================================================================
// STATIC RESOLVER
// =============================================================================

/// A fixed, map-backed role resolver.
///
/// Used by the shipped surfaces (loaded from the TOML roster) and by tests.
/// Deterministic by construction: `BTreeMap` keyed by employee id.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    employees: BTreeMap<EmployeeId, EmployeeRef>,
}

impl StaticResolver {
    /// Create an empty resolver; every lookup fails until employees are added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an employee.
    pub fn insert(&mut self, employee: EmployeeRef) {
        self.employees.insert(employee.id, employee);
    }

    /// Number of known employees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl RoleResolver for StaticResolver {
    fn resolve(&self, id: EmployeeId) -> Result<EmployeeRef, MeritError> {
        self.employees
            .get(&id)
            .copied()
            .ok_or(MeritError::EmployeeNotFound(id))
    }
}

impl FromIterator<EmployeeRef> for StaticResolver {
    fn from_iter<I: IntoIterator<Item = EmployeeRef>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for employee in iter {
            resolver.insert(employee);
        }
        resolver
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_employee() {
        let resolver: StaticResolver =
            [EmployeeRef::new(EmployeeId(1), true)].into_iter().collect();

        let found = resolver.resolve(EmployeeId(1)).expect("resolve");
        assert!(found.manager_eligible);
    }

    #[test]
    fn resolve_unknown_employee_fails() {
        let resolver = StaticResolver::new();
        let result = resolver.resolve(EmployeeId(42));
        assert!(matches!(result, Err(MeritError::EmployeeNotFound(EmployeeId(42)))));
    }

    #[test]
    fn insert_replaces_capability() {
        let mut resolver = StaticResolver::new();
        resolver.insert(EmployeeRef::new(EmployeeId(1), false));
        resolver.insert(EmployeeRef::new(EmployeeId(1), true));

        assert_eq!(resolver.len(), 1);
        let found = resolver.resolve(EmployeeId(1)).expect("resolve");
        assert!(found.manager_eligible);
    }

    #[test]
    fn role_names_are_stable() {
        assert_eq!(ActorRole::Appraisee.name(), "appraisee");
        assert_eq!(ActorRole::Other.to_string(), "other");
    }
}
