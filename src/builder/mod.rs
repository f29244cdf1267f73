// Copyright (c) 2025 - Cowboy AI, Inc.
//! Region Topology Builder
//!
//! Expands one region's service set into a subgraph of resource nodes and
//! intra-region `depends_on` edges, in dependency order: network fabric,
//! then data stores, then compute and messaging, then observability.
//!
//! The builder registers every identifier through the shared
//! [`NamingRegistry`] and derives every address through the shared CIDR
//! table, so cross-region uniqueness falls out of construction rather than
//! convention. Primary-only singletons (the audit trail) are created only
//! when `is_primary` is set; a secondary region duplicating them is the
//! most common defect class this expansion can introduce, and the graph
//! validator treats it as a hard invariant breach.

mod compute;
mod data;
mod network;
mod observability;

pub(crate) use compute::ComputeIds;
pub(crate) use data::DataIds;
pub(crate) use network::NetworkIds;

use crate::cidr::CidrAllocator;
use crate::domain::{AttrValue, RegionSpec, ResourceGraph};
use crate::errors::ComposerResult;
use crate::linker::GlobalRefs;
use crate::naming::NamingRegistry;
use std::collections::BTreeMap;
use tracing::{debug, info_span};

/// Builds one region's subgraph from the shared naming and address state
pub struct RegionTopologyBuilder<'a> {
    names: &'a mut NamingRegistry,
    cidrs: &'a mut CidrAllocator,
    tags: &'a BTreeMap<String, String>,
}

impl<'a> RegionTopologyBuilder<'a> {
    /// Create a builder backed by the run's shared registries
    pub fn new(
        names: &'a mut NamingRegistry,
        cidrs: &'a mut CidrAllocator,
        tags: &'a BTreeMap<String, String>,
    ) -> Self {
        Self { names, cidrs, tags }
    }

    /// Expand a region into its subgraph.
    ///
    /// Regions have no data dependency on each other beyond the
    /// already-materialized `global_refs`, so callers may build them in
    /// any order; all required sequencing is carried by explicit
    /// `depends_on` edges inside the subgraph.
    pub fn build(
        &mut self,
        region: &RegionSpec,
        global_refs: &GlobalRefs,
        is_primary: bool,
    ) -> ComposerResult<ResourceGraph> {
        let span = info_span!("build_region", region = %region.name, is_primary);
        let _guard = span.enter();

        let mut graph = ResourceGraph::new();
        let block = self.cidrs.allocate_region_block(region.cidr_index);
        debug!(%block, "allocated region block");

        let net = self.network_tier(region, block, &mut graph)?;
        let data = self.data_tier(region, &net, global_refs, &mut graph)?;
        let compute = self.compute_tier(region, &net, &data, global_refs, is_primary, &mut graph)?;
        self.observability_tier(region, &data, &compute, is_primary, &mut graph)?;

        debug!(nodes = graph.len(), "region subgraph complete");
        Ok(graph)
    }

    /// Reserve a region-scoped identifier
    fn reserve(&mut self, region: &RegionSpec, logical: &str) -> ComposerResult<String> {
        self.names.reserve(&region.name, logical)
    }

    /// Tag block for a resource: spec tags plus Name, plus extras
    fn resource_tags(&self, name: &str, extra: &[(&str, &str)]) -> AttrValue {
        let mut tags: BTreeMap<String, AttrValue> = self
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), AttrValue::String(v.clone())))
            .collect();
        tags.insert("Name".to_string(), AttrValue::String(name.to_string()));
        for (key, value) in extra {
            tags.insert(key.to_string(), AttrValue::String(value.to_string()));
        }
        AttrValue::Map(tags)
    }

    /// Availability-zone name for an index, e.g. "us-east-1" + 0 → "us-east-1a"
    fn az_name(region: &RegionSpec, az: u8) -> String {
        format!("{}{}", region.name, (b'a' + az) as char)
    }
}
