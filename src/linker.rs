// Copyright (c) 2025 - Cowboy AI, Inc.
//! Global Resource Linker
//!
//! Creates region-spanning resources and wires their identifiers into the
//! per-region builders. The one non-negotiable sequencing rule in the whole
//! system lives here: global nodes are created *before* any region builds,
//! so every regional database cluster can carry a `depends_on` edge to the
//! global cluster node.
//!
//! After all regions are built, [`GlobalResourceLinker::wire`] runs a
//! second pass over the merged graph: peering connections between every
//! unordered pair of regions, and a weighted DNS record plus health check
//! per region, pointed at that region's load balancer.

use crate::domain::{
    AttrValue, DeploymentSpec, Region, ResourceGraph, ResourceKind, ResourceNode,
};
use crate::errors::ComposerResult;
use crate::naming::NamingRegistry;
use std::collections::BTreeMap;
use tracing::{debug, info_span};

const PRIMARY_DNS_WEIGHT: i64 = 100;
const SECONDARY_DNS_WEIGHT: i64 = 50;

/// Opaque identifiers of region-spanning resources, handed to each
/// region's builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalRefs {
    /// Global database cluster node id; `None` for single-region
    /// deployments, which intentionally omit the global cluster placeholder
    pub global_cluster_id: Option<String>,
    /// Replicated table name
    pub table_name: String,
    /// Shared DNS zone node id
    pub zone_id: String,
    /// Shared DNS zone apex name
    pub zone_name: String,
}

impl GlobalRefs {
    /// Whether the modeled domain can forward alarms across regions.
    ///
    /// It cannot: no native cross-region notification mechanism exists, so
    /// this is a known limitation surfaced as a capability flag. Alarms
    /// stay regional, each notifying its own region's topic; nothing is
    /// silently wired in their place.
    pub const fn cross_region_alarm_forwarding(&self) -> bool {
        false
    }
}

/// Creates global nodes up front and performs the post-build wiring pass
pub struct GlobalResourceLinker<'a> {
    names: &'a mut NamingRegistry,
}

impl<'a> GlobalResourceLinker<'a> {
    /// Create a linker backed by the run's naming registry
    pub fn new(names: &'a mut NamingRegistry) -> Self {
        Self { names }
    }

    /// First pass: create the global-scope nodes and return their handles.
    ///
    /// Must run before any region build. With a single region the global
    /// database cluster is omitted (documented mode, not an omission bug);
    /// the zone and the replicated table exist in every mode.
    pub fn link(&mut self, spec: &DeploymentSpec) -> ComposerResult<(ResourceGraph, GlobalRefs)> {
        let span = info_span!("link_global", regions = spec.regions.len());
        let _guard = span.enter();

        let mut graph = ResourceGraph::new();

        let zone_id = self.names.reserve_global("zone")?;
        let zone_name = format!("{}.example.com", spec.environment_suffix);
        graph.insert(
            ResourceNode::new(&zone_id, ResourceKind::DnsZone, Region::Global)
                .with_attr("name", zone_name.clone())
                .with_attr("comment", "shared zone for all regional endpoints")
                .with_export("zone_name_servers", "name_servers"),
        )?;

        let table_name = self.names.reserve_global("app-table")?;
        graph.insert(
            ResourceNode::new(&table_name, ResourceKind::GlobalTable, Region::Global)
                .with_attr("name", table_name.clone())
                .with_attr("hash_key", "pk")
                .with_attr(
                    "attribute",
                    AttrValue::List(vec![AttrValue::Map(BTreeMap::from([
                        ("name".to_string(), AttrValue::from("pk")),
                        ("type".to_string(), AttrValue::from("S")),
                    ]))]),
                )
                .with_attr(
                    "replica",
                    AttrValue::List(
                        spec.regions
                            .iter()
                            .map(|r| {
                                AttrValue::Map(BTreeMap::from([(
                                    "region_name".to_string(),
                                    AttrValue::String(r.name.clone()),
                                )]))
                            })
                            .collect(),
                    ),
                )
                .with_export("table_name", "name"),
        )?;

        let global_cluster_id = if spec.regions.len() >= 2 {
            let id = self.names.reserve_global("global-aurora")?;
            graph.insert(
                ResourceNode::new(&id, ResourceKind::GlobalDatabaseCluster, Region::Global)
                    .with_attr("global_cluster_identifier", id.clone())
                    .with_attr("engine", "aurora-postgresql")
                    .with_attr("storage_encrypted", true),
            )?;
            Some(id)
        } else {
            debug!("single-region deployment, omitting global database cluster");
            None
        };

        let refs = GlobalRefs {
            global_cluster_id,
            table_name,
            zone_id,
            zone_name,
        };
        Ok((graph, refs))
    }

    /// Second pass over the merged graph: peering between every unordered
    /// region pair, and weighted DNS + health check per region.
    pub fn wire(
        &mut self,
        spec: &DeploymentSpec,
        refs: &GlobalRefs,
        graph: &mut ResourceGraph,
    ) -> ComposerResult<()> {
        let span = info_span!("wire_global");
        let _guard = span.enter();

        let load_balancers = nodes_by_region(graph, ResourceKind::LoadBalancer);
        let networks = nodes_by_region(graph, ResourceKind::Network);

        for region in &spec.regions {
            let Some(lb) = load_balancers.get(region.name.as_str()) else {
                continue;
            };
            let lb = lb.clone();

            let health_check = self.names.reserve_global(&format!("hc-{}", region.name))?;
            graph.insert(
                ResourceNode::new(&health_check, ResourceKind::HealthCheck, Region::Global)
                    .with_attr("fqdn", AttrValue::reference(&lb, "dns_name"))
                    .with_attr("port", 80i64)
                    .with_attr("type", "HTTP")
                    .with_attr("resource_path", "/healthz")
                    .with_attr("failure_threshold", 3i64)
                    .with_attr("request_interval", 30i64)
                    .with_dependency(&lb),
            )?;

            let weight = if spec.is_primary(&region.name) {
                PRIMARY_DNS_WEIGHT
            } else {
                SECONDARY_DNS_WEIGHT
            };
            let record = self.names.reserve_global(&format!("dns-{}", region.name))?;
            graph.insert(
                ResourceNode::new(&record, ResourceKind::DnsRecord, Region::Global)
                    .with_attr("zone_id", AttrValue::reference(&refs.zone_id, "zone_id"))
                    .with_attr("name", format!("app.{}", refs.zone_name))
                    .with_attr("type", "CNAME")
                    .with_attr("ttl", 60i64)
                    .with_attr("set_identifier", region.name.clone())
                    .with_attr(
                        "weighted_routing_policy",
                        AttrValue::Map(BTreeMap::from([(
                            "weight".to_string(),
                            AttrValue::Int(weight),
                        )])),
                    )
                    .with_attr(
                        "records",
                        AttrValue::List(vec![AttrValue::reference(&lb, "dns_name")]),
                    )
                    .with_attr("health_check_id", AttrValue::reference(&health_check, "id"))
                    .with_dependency(&lb)
                    .with_dependency(&health_check)
                    .with_dependency(&refs.zone_id),
            )?;
        }

        for (i, left) in spec.regions.iter().enumerate() {
            for right in spec.regions.iter().skip(i + 1) {
                let (Some(left_vpc), Some(right_vpc)) = (
                    networks.get(left.name.as_str()),
                    networks.get(right.name.as_str()),
                ) else {
                    continue;
                };
                let peering = self
                    .names
                    .reserve_global(&format!("peer-{}-{}", left.name, right.name))?;
                graph.insert(
                    ResourceNode::new(
                        &peering,
                        ResourceKind::PeeringConnection,
                        Region::Named(left.name.clone()),
                    )
                    .with_attr("vpc_id", AttrValue::reference(left_vpc, "id"))
                    .with_attr("peer_vpc_id", AttrValue::reference(right_vpc, "id"))
                    .with_attr("peer_region", right.name.clone())
                    .with_attr("auto_accept", false)
                    .with_dependency(left_vpc)
                    .with_dependency(right_vpc),
                )?;
            }
        }

        Ok(())
    }
}

/// Map region name → node id for one kind
fn nodes_by_region(graph: &ResourceGraph, kind: ResourceKind) -> BTreeMap<String, String> {
    graph
        .nodes_of_kind(kind)
        .filter_map(|n| n.region.name().map(|r| (r.to_string(), n.id.clone())))
        .collect()
}
