// Copyright (c) 2025 - Cowboy AI, Inc.
//! Graph Validation
//!
//! Collect-all invariant checking over an assembled resource graph. Every
//! check runs independently even when an earlier one fails, and the result
//! is a list of structured [`Violation`]s rather than a thrown error: a
//! misconfiguration in one region is most often symptomatic of a systemic
//! naming or CIDR template defect, and the caller should see every
//! instance of it in one pass.

use crate::cidr;
use crate::domain::{DeploymentSpec, ResourceGraph, ResourceKind};
use serde::Serialize;
use std::fmt;
use tracing::{info_span, warn};

/// A structured, non-fatal-by-construction report of an invariant breach
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Violation {
    /// A `depends_on` chain loops back on itself
    Cycle {
        /// Ids of the nodes participating in the cycle
        members: Vec<String>,
    },
    /// A node's id disagrees with the id the graph indexes it under
    DuplicateId {
        /// The conflicting id
        id: String,
    },
    /// Two regions resolved to overlapping address blocks
    CidrOverlap {
        /// First region
        region_a: String,
        /// Second region
        region_b: String,
        /// The shared block
        block: String,
    },
    /// A node references an id absent from the graph
    DanglingReference {
        /// Referencing node
        from: String,
        /// Missing target id
        to: String,
    },
    /// A global-facing singleton exists zero or multiple times
    SingletonViolation {
        /// Resource kind expected exactly once
        kind: String,
        /// Observed count
        count: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Cycle { members } => {
                write!(f, "dependency cycle among [{}]", members.join(", "))
            }
            Violation::DuplicateId { id } => write!(f, "duplicate node id '{}'", id),
            Violation::CidrOverlap {
                region_a,
                region_b,
                block,
            } => write!(
                f,
                "regions '{}' and '{}' overlap at {}",
                region_a, region_b, block
            ),
            Violation::DanglingReference { from, to } => {
                write!(f, "node '{}' references missing node '{}'", from, to)
            }
            Violation::SingletonViolation { kind, count } => {
                write!(f, "expected exactly one {} node, found {}", kind, count)
            }
        }
    }
}

/// Runs every invariant check and accumulates the breaches
pub struct GraphValidator;

impl GraphValidator {
    /// Validate a merged graph against its deployment spec.
    ///
    /// Checks: acyclicity, id consistency, CIDR non-overlap across regions,
    /// reference completeness, and exactly-one-primary singletons. An empty
    /// result means the graph is valid; in the reference flow any non-empty
    /// result is fatal and blocks encoding.
    pub fn validate(graph: &ResourceGraph, spec: &DeploymentSpec) -> Vec<Violation> {
        let span = info_span!("validate_graph", nodes = graph.len());
        let _guard = span.enter();

        let mut violations = Vec::new();
        Self::check_acyclic(graph, &mut violations);
        Self::check_id_consistency(graph, &mut violations);
        Self::check_cidr_overlap(spec, &mut violations);
        Self::check_references(graph, &mut violations);
        Self::check_singletons(graph, &mut violations);

        for violation in &violations {
            warn!(%violation, "invariant breach");
        }
        violations
    }

    fn check_acyclic(graph: &ResourceGraph, out: &mut Vec<Violation>) {
        if let Err(members) = graph.topo_sort() {
            out.push(Violation::Cycle { members });
        }
    }

    fn check_id_consistency(graph: &ResourceGraph, out: &mut Vec<Violation>) {
        for (key, node) in &graph.nodes {
            if key != &node.id {
                out.push(Violation::DuplicateId { id: node.id.clone() });
            }
        }
    }

    fn check_cidr_overlap(spec: &DeploymentSpec, out: &mut Vec<Violation>) {
        for (i, left) in spec.regions.iter().enumerate() {
            for right in spec.regions.iter().skip(i + 1) {
                let left_block = cidr::region_block(left.cidr_index);
                let right_block = cidr::region_block(right.cidr_index);
                if cidr::blocks_overlap(&left_block, &right_block) {
                    out.push(Violation::CidrOverlap {
                        region_a: left.name.clone(),
                        region_b: right.name.clone(),
                        block: left_block.to_string(),
                    });
                }
            }
        }
    }

    fn check_references(graph: &ResourceGraph, out: &mut Vec<Violation>) {
        for node in graph.iter() {
            let mut seen = std::collections::BTreeSet::new();
            for target in node.referenced_nodes() {
                if !graph.contains(target) && seen.insert(target) {
                    out.push(Violation::DanglingReference {
                        from: node.id.clone(),
                        to: target.to_string(),
                    });
                }
            }
        }
    }

    fn check_singletons(graph: &ResourceGraph, out: &mut Vec<Violation>) {
        for kind in [ResourceKind::DnsZone, ResourceKind::AuditTrail] {
            let count = graph.nodes_of_kind(kind).count();
            if count != 1 {
                out.push(Violation::SingletonViolation {
                    kind: kind.type_name().to_string(),
                    count,
                });
            }
        }
    }
}
