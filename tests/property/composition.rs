// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Topology Composition
//!
//! These properties must hold for every well-formed deployment spec:
//! determinism of the encoded document, uniqueness of generated node ids,
//! non-overlap of region address blocks, and global-before-regional
//! creation order.

use cim_topology::cidr;
use cim_topology::{compose, DeploymentSpec, Region, RegionSpec, ResourceKind, StateLocation};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Region name pool; proptest picks a distinct subset per case
const REGION_NAMES: &[&str] = &[
    "us-east-1",
    "us-west-2",
    "eu-west-1",
    "eu-central-1",
    "ap-south-1",
    "ap-northeast-1",
];

/// Generate a well-formed spec: 1..=4 regions with distinct names and
/// distinct CIDR indices, 1..=4 AZs each
fn deployment_spec() -> impl Strategy<Value = DeploymentSpec> {
    (
        1usize..=4,
        proptest::sample::subsequence((0u8..16).collect::<Vec<_>>(), 4),
        prop::collection::vec(1u8..=4, 4),
        "[a-z][a-z0-9]{0,6}",
    )
        .prop_map(|(region_count, indices, az_counts, suffix)| {
            let mut spec =
                DeploymentSpec::new(suffix, StateLocation::new("state-bucket", "us-east-1"))
                    .with_tag("team", "platform");
            for i in 0..region_count {
                spec = spec.with_region(RegionSpec::new(
                    REGION_NAMES[i],
                    indices[i],
                    az_counts[i],
                ));
            }
            spec
        })
}

proptest! {
    /// Property: composing the same spec twice yields byte-identical output
    #[test]
    fn prop_composition_is_deterministic(spec in deployment_spec()) {
        let first = compose(&spec).unwrap().to_json_string().unwrap();
        let second = compose(&spec).unwrap().to_json_string().unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: every generated node id is unique within the document
    #[test]
    fn prop_node_ids_are_unique(spec in deployment_spec()) {
        let doc = compose(&spec).unwrap();
        let mut seen = BTreeSet::new();
        for blocks in doc.resource.values() {
            for id in blocks.keys() {
                prop_assert!(seen.insert(id.clone()), "duplicate node id {}", id);
            }
        }
    }

    /// Property: distinct CIDR indices never yield overlapping blocks
    #[test]
    fn prop_region_blocks_never_overlap(a in 0u8..=255, b in 0u8..=255) {
        prop_assume!(a != b);
        let block_a = cidr::region_block(a);
        let block_b = cidr::region_block(b);
        prop_assert!(!cidr::blocks_overlap(&block_a, &block_b));
    }

    /// Property: exactly one audit trail and one DNS zone regardless of
    /// region count
    #[test]
    fn prop_exactly_one_primary_singleton(spec in deployment_spec()) {
        let doc = compose(&spec).unwrap();
        prop_assert_eq!(doc.resource["aws_cloudtrail"].len(), 1);
        prop_assert_eq!(doc.resource["aws_route53_zone"].len(), 1);
    }

    /// Property: in the rebuilt graph, global nodes topologically precede
    /// every regional node that depends on them
    #[test]
    fn prop_global_before_regional(spec in deployment_spec()) {
        // Rebuild through the library's own pieces to inspect the graph
        let mut names = cim_topology::NamingRegistry::new(&spec.environment_suffix);
        let mut cidrs = cim_topology::cidr::CidrAllocator::new();
        let mut linker = cim_topology::GlobalResourceLinker::new(&mut names);
        let (mut graph, refs) = linker.link(&spec).unwrap();
        for region in &spec.regions {
            let is_primary = spec.is_primary(&region.name);
            let subgraph = cim_topology::builder::RegionTopologyBuilder::new(
                &mut names,
                &mut cidrs,
                &spec.tags,
            )
            .build(region, &refs, is_primary)
            .unwrap();
            graph.merge(subgraph).unwrap();
        }
        let mut linker = cim_topology::GlobalResourceLinker::new(&mut names);
        linker.wire(&spec, &refs, &mut graph).unwrap();

        let order: Vec<&str> = graph
            .topo_sort()
            .unwrap()
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        let position = |id: &str| order.iter().position(|o| *o == id);

        for node in graph.iter() {
            if node.region == Region::Global {
                continue;
            }
            for dep in &node.depends_on {
                let Some(target) = graph.get(dep) else { continue };
                if target.region == Region::Global
                    || target.kind == ResourceKind::GlobalDatabaseCluster
                {
                    prop_assert!(
                        position(dep) < position(&node.id),
                        "global node {} must precede {}",
                        dep,
                        node.id
                    );
                }
            }
        }
    }
}
