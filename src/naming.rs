// Copyright (c) 2025 - Cowboy AI, Inc.
//! Naming Registry
//!
//! Deterministic, collision-checked identifier generation. The registry is
//! process-local with a lifecycle of exactly one composer run; re-running
//! the composer with an identical spec reproduces identical identifiers.

use crate::errors::{ComposerError, ComposerResult};
use std::collections::BTreeSet;

/// Scope used for region-spanning resources
pub const GLOBAL_SCOPE: &str = "global";

/// Maps `(scope, logical name)` pairs to generated identifiers.
///
/// Global-scope names come out as `{logical}-{suffix}`; region-scoped names
/// carry the region code as a qualifier, `{logical}-{region}-{suffix}`, so
/// two regions may declare the same logical name without colliding.
#[derive(Debug, Clone)]
pub struct NamingRegistry {
    environment_suffix: String,
    reserved: BTreeSet<(String, String)>,
}

impl NamingRegistry {
    /// Create a registry for one composer run
    pub fn new(environment_suffix: impl Into<String>) -> Self {
        Self {
            environment_suffix: environment_suffix.into(),
            reserved: BTreeSet::new(),
        }
    }

    /// Reserve a name within a scope and return the generated identifier.
    ///
    /// Fails with [`ComposerError::NameCollision`] if the same
    /// `(scope, logical_name)` pair is reserved twice in one run. This is
    /// the only source of non-determinism risk the registry must close:
    /// every identifier is otherwise a pure function of its inputs.
    pub fn reserve(&mut self, scope: &str, logical_name: &str) -> ComposerResult<String> {
        let key = (scope.to_string(), logical_name.to_string());
        if !self.reserved.insert(key) {
            return Err(ComposerError::NameCollision {
                scope: scope.to_string(),
                logical_name: logical_name.to_string(),
            });
        }

        let id = if scope == GLOBAL_SCOPE {
            format!("{}-{}", logical_name, self.environment_suffix)
        } else {
            format!("{}-{}-{}", logical_name, scope, self.environment_suffix)
        };
        Ok(id)
    }

    /// Reserve a name in the global scope
    pub fn reserve_global(&mut self, logical_name: &str) -> ComposerResult<String> {
        self.reserve(GLOBAL_SCOPE, logical_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_scope_omits_qualifier() {
        let mut names = NamingRegistry::new("dev");
        assert_eq!(names.reserve_global("zone").unwrap(), "zone-dev");
    }

    #[test]
    fn test_region_scope_qualifies() {
        let mut names = NamingRegistry::new("dev");
        assert_eq!(names.reserve("us-east-1", "vpc").unwrap(), "vpc-us-east-1-dev");
    }

    #[test]
    fn test_same_logical_name_across_scopes_is_fine() {
        let mut names = NamingRegistry::new("dev");
        assert!(names.reserve("us-east-1", "vpc").is_ok());
        assert!(names.reserve("eu-west-1", "vpc").is_ok());
    }

    #[test]
    fn test_double_reservation_collides() {
        let mut names = NamingRegistry::new("dev");
        names.reserve("us-east-1", "vpc").unwrap();
        assert_eq!(
            names.reserve("us-east-1", "vpc"),
            Err(ComposerError::NameCollision {
                scope: "us-east-1".to_string(),
                logical_name: "vpc".to_string(),
            })
        );
    }

    #[test]
    fn test_identifiers_are_deterministic_across_runs() {
        let run = || {
            let mut names = NamingRegistry::new("prod");
            vec![
                names.reserve_global("zone").unwrap(),
                names.reserve("us-east-1", "vpc").unwrap(),
                names.reserve("us-east-1", "alb").unwrap(),
            ]
        };
        assert_eq!(run(), run());
    }
}
