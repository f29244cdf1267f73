// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Composer Pipeline
//!
//! The whole run is a pure, synchronous, in-memory transformation: spec
//! validation, global linking, per-region expansion, merge, global wiring,
//! invariant validation, and finally encoding. Nothing external is mutated;
//! a run either returns a complete [`Document`] or fails with the full set
//! of detected problems. There is no partial-success state to roll back.
//!
//! Region subgraphs have no data dependency on one another beyond the
//! already-materialized [`GlobalRefs`](crate::linker::GlobalRefs), so
//! builds run sequentially in spec order without that ordering carrying
//! any meaning; all required sequencing lives in explicit `depends_on`
//! edges.

use crate::builder::RegionTopologyBuilder;
use crate::cidr::CidrAllocator;
use crate::domain::DeploymentSpec;
use crate::encode::{DefaultBindings, Document, NodeEncoder, PlanEncoder};
use crate::errors::ComposerError;
use crate::linker::GlobalResourceLinker;
use crate::naming::NamingRegistry;
use crate::validate::{GraphValidator, Violation};
use thiserror::Error;
use tracing::{info, info_span};

/// Why a composer run produced no document
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ComposeFailure {
    /// A construction phase hit a hard defect and aborted immediately
    #[error(transparent)]
    Error(#[from] ComposerError),

    /// The assembled graph breached invariants; every violation found in
    /// the run is carried here together, never just the first
    #[error("deployment plan failed validation with {} violation(s)", .0.len())]
    Invalid(Vec<Violation>),
}

/// Compose a deployment spec into a provisioning document using the
/// default binding layer.
pub fn compose(spec: &DeploymentSpec) -> Result<Document, ComposeFailure> {
    compose_with(spec, &DefaultBindings)
}

/// Compose with a caller-supplied binding layer.
///
/// Phases: validate spec → link global nodes → build each region → merge →
/// wire cross-region resources → validate graph → encode. Any non-empty
/// violation list is fatal and encoding is never attempted.
pub fn compose_with<E: NodeEncoder>(
    spec: &DeploymentSpec,
    bindings: &E,
) -> Result<Document, ComposeFailure> {
    let span = info_span!("compose", suffix = %spec.environment_suffix);
    let _guard = span.enter();

    spec.validate()?;

    let mut names = NamingRegistry::new(&spec.environment_suffix);
    let mut cidrs = CidrAllocator::new();
    let mut linker = GlobalResourceLinker::new(&mut names);
    let (mut graph, global_refs) = linker.link(spec)?;

    for region in &spec.regions {
        let is_primary = spec.is_primary(&region.name);
        let subgraph = RegionTopologyBuilder::new(&mut names, &mut cidrs, &spec.tags)
            .build(region, &global_refs, is_primary)?;
        graph.merge(subgraph)?;
    }

    let mut linker = GlobalResourceLinker::new(&mut names);
    linker.wire(spec, &global_refs, &mut graph)?;

    let violations = GraphValidator::validate(&graph, spec);
    if !violations.is_empty() {
        return Err(ComposeFailure::Invalid(violations));
    }

    let document = PlanEncoder::new(bindings).encode(&graph, spec)?;
    info!(nodes = graph.len(), "composed deployment document");
    Ok(document)
}
