// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-topology
//!
//! Deterministic deployment specs for the scenario and property tests.
//! Nothing here draws on clocks or randomness: identical fixture calls
//! produce identical specs, which is exactly the determinism the composer
//! itself promises.

use cim_topology::{DeploymentSpec, RegionSpec, StateLocation};

/// Scenario A: one region, index 0, three AZs
pub fn single_region_spec() -> DeploymentSpec {
    DeploymentSpec::new("test", StateLocation::new("state-bucket", "r1"))
        .with_region(RegionSpec::new("r1", 0, 3))
}

/// Scenario B: two regions on indices 0 and 1
pub fn two_region_spec() -> DeploymentSpec {
    DeploymentSpec::new("test", StateLocation::new("state-bucket", "us-east-1"))
        .with_region(RegionSpec::new("us-east-1", 0, 2))
        .with_region(RegionSpec::new("eu-west-1", 1, 2))
        .with_tag("team", "platform")
        .with_tag("env", "test")
}

/// Scenario C: two regions sharing CIDR index 0
pub fn overlapping_spec() -> DeploymentSpec {
    DeploymentSpec::new("test", StateLocation::new("state-bucket", "us-east-1"))
        .with_region(RegionSpec::new("us-east-1", 0, 2))
        .with_region(RegionSpec::new("eu-west-1", 0, 2))
}

/// Three regions for peering-pair and ordering checks
pub fn three_region_spec() -> DeploymentSpec {
    DeploymentSpec::new("prod", StateLocation::new("state-bucket", "us-east-1"))
        .with_region(RegionSpec::new("us-east-1", 0, 3))
        .with_region(RegionSpec::new("eu-west-1", 1, 3))
        .with_region(RegionSpec::new("ap-south-1", 2, 2))
        .with_tag("team", "platform")
}
