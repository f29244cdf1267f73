// Copyright (c) 2025 - Cowboy AI, Inc.
//! Multi-Region Topology Composer
//!
//! Turns a declarative [`DeploymentSpec`] into a fully resolved
//! [`ResourceGraph`] — nodes are infrastructure resources, edges are
//! "must exist before" and "value flows into" relationships — plus a
//! serialized [`Document`] in the provisioning-dialect JSON shape.
//!
//! ## Pipeline
//!
//! 1. **Link**: global-scope nodes (global database cluster, replicated
//!    table, shared DNS zone) are created before any region builds
//! 2. **Build**: each region expands into a subgraph of networks, data
//!    stores, compute, and observability resources
//! 3. **Wire**: peering connections and weighted DNS records span the
//!    built regions
//! 4. **Validate**: invariant checks collect every [`Violation`] in one
//!    pass; any breach blocks encoding
//! 5. **Encode**: a stable topological sort feeds per-node encoding
//!    through the [`NodeEncoder`] binding-layer seam
//!
//! The whole run is synchronous and pure: no I/O beyond reading the spec
//! and returning the document, no state between runs, identical inputs
//! producing byte-identical output.
//!
//! ## Usage
//!
//! ```rust
//! use cim_topology::{compose, DeploymentSpec, RegionSpec, StateLocation};
//!
//! let spec = DeploymentSpec::new("dev", StateLocation::new("state-bucket", "us-east-1"))
//!     .with_region(RegionSpec::new("us-east-1", 0, 3))
//!     .with_region(RegionSpec::new("eu-west-1", 1, 3))
//!     .with_tag("team", "platform");
//!
//! let document = compose(&spec).unwrap();
//! println!("{}", document.to_json_string().unwrap());
//! ```

pub mod builder;
pub mod cidr;
pub mod composer;
pub mod domain;
pub mod encode;
pub mod errors;
pub mod linker;
pub mod naming;
pub mod validate;

// Re-export commonly used types
pub use composer::{compose, compose_with, ComposeFailure};
pub use domain::{
    AttrValue, DeploymentSpec, Region, RegionSpec, ResourceGraph, ResourceKind, ResourceNode,
    StateLocation,
};
pub use encode::{DefaultBindings, Document, NodeEncoder, PlanEncoder};
pub use errors::{ComposerError, ComposerResult};
pub use linker::{GlobalRefs, GlobalResourceLinker};
pub use naming::NamingRegistry;
pub use validate::{GraphValidator, Violation};
