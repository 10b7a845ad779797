//! # Employee Roster
//!
//! The shipped surfaces resolve employees through a TOML roster file:
//!
//! ```toml
//! [[employee]]
//! id = 1
//!
//! [[employee]]
//! id = 2
//! manager_eligible = true
//! ```
//!
//! `manager_eligible` defaults to false. Only employees carrying the flag
//! may be assigned as appraisers; the core enforces that, the roster just
//! states who carries it.

use merit_core::{EmployeeId, EmployeeRef, MeritError, StaticResolver};
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// ROSTER FILE FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    employee: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
struct RosterEntry {
    id: u64,
    #[serde(default)]
    manager_eligible: bool,
}

// =============================================================================
// LOADING
// =============================================================================

/// Parse a roster from TOML text.
///
/// Duplicate ids are allowed; the last entry wins.
pub fn parse_roster(text: &str) -> Result<StaticResolver, MeritError> {
    let file: RosterFile = toml::from_str(text)
        .map_err(|e| MeritError::DeserializationError(format!("Parse roster: {}", e)))?;

    Ok(file
        .employee
        .into_iter()
        .map(|entry| EmployeeRef::new(EmployeeId(entry.id), entry.manager_eligible))
        .collect())
}

/// Load a roster file from disk.
pub fn load_roster(path: &Path) -> Result<StaticResolver, MeritError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| MeritError::IoError(format!("Read roster '{}': {}", path.display(), e)))?;
    parse_roster(&text)
}

/// Load a roster, falling back to an empty directory when the file is absent.
///
/// An empty directory still serves reads; every create fails with
/// `EmployeeNotFound` until a roster exists.
pub fn load_roster_or_empty(path: &Path) -> Result<StaticResolver, MeritError> {
    if path.exists() {
        load_roster(path)
    } else {
        tracing::warn!(
            "Roster file {:?} not found; starting with an empty employee directory",
            path
        );
        Ok(StaticResolver::new())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use merit_core::RoleResolver;

    #[test]
    fn parses_employees_with_eligibility() {
        let roster = parse_roster(
            r#"
            [[employee]]
            id = 1

            [[employee]]
            id = 2
            manager_eligible = true
            "#,
        )
        .expect("roster should parse");

        assert_eq!(roster.len(), 2);
        let alice = roster.resolve(EmployeeId(1)).expect("employee 1");
        assert!(!alice.manager_eligible);
        let mira = roster.resolve(EmployeeId(2)).expect("employee 2");
        assert!(mira.manager_eligible);
    }

    #[test]
    fn empty_text_yields_empty_directory() {
        let roster = parse_roster("").expect("empty roster should parse");
        assert!(roster.is_empty());
        assert!(matches!(
            roster.resolve(EmployeeId(1)),
            Err(MeritError::EmployeeNotFound(EmployeeId(1)))
        ));
    }

    #[test]
    fn malformed_toml_is_a_deserialization_error() {
        let err = parse_roster("[[employee]]\nid = \"not a number\"")
            .expect_err("bad id must fail");
        assert!(matches!(err, MeritError::DeserializationError(_)));
    }

    #[test]
    fn duplicate_id_last_entry_wins() {
        let roster = parse_roster(
            r#"
            [[employee]]
            id = 5

            [[employee]]
            id = 5
            manager_eligible = true
            "#,
        )
        .expect("roster should parse");

        assert_eq!(roster.len(), 1);
        let employee = roster.resolve(EmployeeId(5)).expect("employee 5");
        assert!(employee.manager_eligible);
    }

    #[test]
    fn missing_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        let roster = load_roster_or_empty(&path).expect("fallback should succeed");
        assert!(roster.is_empty());
    }

    #[test]
    fn roster_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roster.toml");
        std::fs::write(&path, "[[employee]]\nid = 7\nmanager_eligible = true\n")
            .expect("write roster");

        let roster = load_roster(&path).expect("roster should load");
        assert!(roster.resolve(EmployeeId(7)).expect("employee 7").manager_eligible);
    }
}
