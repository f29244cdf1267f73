// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Domain Models
//!
//! Core domain concepts for multi-region topology composition: the
//! declarative deployment input, the resource-node model, and the graph
//! that owns the expanded topology.
//!
//! # Value Objects
//!
//! - [`DeploymentSpec`] - validated declarative input; first region is primary
//! - [`RegionSpec`] - one region's name, CIDR index, and AZ count
//! - [`StateLocation`] - where the provisioning tool keeps its state
//!
//! # Graph Model
//!
//! - [`ResourceKind`] - closed set of resource kinds with dialect type names
//! - [`ResourceNode`] - one resource: attributes, placement, dependencies
//! - [`AttrValue`] - attribute union; `Ref` variants carry value wiring
//! - [`ResourceGraph`] - exclusive owner of all nodes, fresh per run

pub mod graph;
pub mod node;
pub mod spec;

// Re-export value objects
pub use graph::ResourceGraph;
pub use node::{AttrValue, Export, Region, ResourceKind, ResourceNode};
pub use spec::{DeploymentSpec, RegionSpec, StateLocation};
