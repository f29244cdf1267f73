// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Spec Value Objects
//!
//! The immutable input to a composer run. A [`DeploymentSpec`] names the
//! environment, the regions to expand (first entry is primary), the tag set
//! stamped on every resource, and where the provisioning state lives.
//!
//! Validation here covers structural defects only (empty suffix, no
//! regions, duplicate region names). Cross-region invariants such as CIDR
//! overlap are deliberately left to the graph validator so they can be
//! reported together with everything else found in the same run.

use crate::errors::{ComposerError, ComposerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One region to expand into a subgraph.
///
/// `cidr_index` selects the region's /16 block from the fixed allocation
/// table (index 0 → 10.0.0.0/16, index 1 → 10.1.0.0/16, ...). Two regions
/// sharing an index will overlap; the graph validator reports that as a
/// violation rather than this type rejecting it, so a misconfigured spec
/// surfaces every overlap in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Cloud region code, e.g. "us-east-1"
    pub name: String,
    /// Index into the fixed /16 allocation table
    pub cidr_index: u8,
    /// Number of availability zones to spread subnets across
    pub availability_zone_count: u8,
}

impl RegionSpec {
    /// Create a region spec
    pub fn new(name: impl Into<String>, cidr_index: u8, availability_zone_count: u8) -> Self {
        Self {
            name: name.into(),
            cidr_index,
            availability_zone_count,
        }
    }
}

/// Where the provisioning tool keeps its state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLocation {
    /// Bucket holding the state objects
    pub bucket: String,
    /// Region the bucket lives in
    pub region: String,
}

impl StateLocation {
    /// Create a state location
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
        }
    }
}

/// Top-level declarative input for one composer run.
///
/// The first entry of `regions` is implicitly the primary region and is the
/// only region permitted to host singleton global-facing services (audit
/// trail, DNS zone ownership).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Environment suffix appended to every generated identifier
    pub environment_suffix: String,
    /// Regions to expand; first is primary
    pub regions: Vec<RegionSpec>,
    /// Tags stamped on every taggable resource
    pub tags: BTreeMap<String, String>,
    /// State-backend location
    pub state_location: StateLocation,
}

impl DeploymentSpec {
    /// Create a spec with no regions yet; add them with [`with_region`].
    ///
    /// [`with_region`]: DeploymentSpec::with_region
    pub fn new(environment_suffix: impl Into<String>, state_location: StateLocation) -> Self {
        Self {
            environment_suffix: environment_suffix.into(),
            regions: Vec::new(),
            tags: BTreeMap::new(),
            state_location,
        }
    }

    /// Append a region; the first region added is primary
    pub fn with_region(mut self, region: RegionSpec) -> Self {
        self.regions.push(region);
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// The primary region, when at least one region is declared
    pub fn primary(&self) -> Option<&RegionSpec> {
        self.regions.first()
    }

    /// Whether the named region is the primary one
    pub fn is_primary(&self, name: &str) -> bool {
        self.primary().is_some_and(|r| r.name == name)
    }

    /// Structural validation of the spec.
    ///
    /// # Rules
    /// - Environment suffix must be non-empty and identifier-safe
    /// - At least one region must be declared
    /// - Region names must be distinct
    /// - Every region needs at least one availability zone
    /// - State bucket and region must be non-empty
    pub fn validate(&self) -> ComposerResult<()> {
        if self.environment_suffix.is_empty() {
            return Err(ComposerError::SpecValidation(
                "environment suffix cannot be empty".to_string(),
            ));
        }

        if !self
            .environment_suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ComposerError::SpecValidation(format!(
                "environment suffix '{}' contains characters outside [a-zA-Z0-9-]",
                self.environment_suffix
            )));
        }

        if self.regions.is_empty() {
            return Err(ComposerError::SpecValidation(
                "at least one region must be declared".to_string(),
            ));
        }

        let mut seen = std::collections::BTreeSet::new();
        for region in &self.regions {
            if region.name.is_empty() {
                return Err(ComposerError::SpecValidation(
                    "region name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(region.name.as_str()) {
                return Err(ComposerError::SpecValidation(format!(
                    "region '{}' declared more than once",
                    region.name
                )));
            }
            if region.availability_zone_count == 0 {
                return Err(ComposerError::SpecValidation(format!(
                    "region '{}' must span at least one availability zone",
                    region.name
                )));
            }
        }

        if self.state_location.bucket.is_empty() || self.state_location.region.is_empty() {
            return Err(ComposerError::SpecValidation(
                "state location requires a bucket and a region".to_string(),
            ));
        }

        Ok(())
    }
}
