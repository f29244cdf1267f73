// Copyright (c) 2025 - Cowboy AI, Inc.
//! Two-Region Plan Example
//!
//! Composes a two-region deployment spec into a provisioning document and
//! prints it. Run with `RUST_LOG=debug` to watch the pipeline stages:
//!
//! ```text
//! DeploymentSpec ──> link globals ──> build each region ──> wire ──> validate ──> encode
//! ```

use cim_topology::{compose, ComposeFailure, DeploymentSpec, RegionSpec, StateLocation};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let spec = DeploymentSpec::new("demo", StateLocation::new("demo-state-bucket", "us-east-1"))
        .with_region(RegionSpec::new("us-east-1", 0, 3))
        .with_region(RegionSpec::new("eu-west-1", 1, 3))
        .with_tag("team", "platform")
        .with_tag("env", "demo");

    match compose(&spec) {
        Ok(document) => match document.to_json_string() {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to render document: {e}"),
        },
        Err(ComposeFailure::Invalid(violations)) => {
            eprintln!("spec produced an invalid graph:");
            for violation in violations {
                eprintln!("  - {violation}");
            }
            std::process::exit(1);
        }
        Err(ComposeFailure::Error(e)) => {
            eprintln!("composition failed: {e}");
            std::process::exit(1);
        }
    }
}
