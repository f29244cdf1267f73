// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plan Encoding
//!
//! Serializes a validated [`ResourceGraph`] into the provisioning-dialect
//! JSON document. Nodes are topologically sorted with ties broken by id
//! ascending, so identical graphs always produce byte-identical documents;
//! per-node attribute blocks are delegated to the binding layer through
//! [`NodeEncoder`]. Any delegate failure aborts encoding with no partial
//! output.

mod bindings;

pub use bindings::{BindingError, DefaultBindings, NodeEncoder};

use crate::domain::{DeploymentSpec, ResourceGraph};
use crate::errors::{ComposerError, ComposerResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info_span};

/// State-backend descriptor, derived purely from the spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// State bucket
    pub bucket: String,
    /// Object key, `{suffix}/{stack id}.tfstate`
    pub key: String,
    /// Bucket region
    pub region: String,
    /// Always encrypted at rest
    pub encrypt: bool,
}

/// `terraform` top-level block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformBlock {
    /// Backend map, keyed by backend type
    pub backend: BTreeMap<String, BackendConfig>,
}

/// One provider entry; the primary region carries no alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// Provider region
    pub region: String,
    /// Alias for secondary regions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// One exported output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEntry {
    /// Interpolation the output resolves to
    pub value: Value,
}

/// The fully encoded provisioning document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Backend descriptor
    pub terraform: TerraformBlock,
    /// Providers, one entry per distinct region
    pub provider: BTreeMap<String, Vec<ProviderEntry>>,
    /// Resources keyed by kind type name, then node id
    pub resource: BTreeMap<String, BTreeMap<String, Value>>,
    /// Exported outputs
    pub output: BTreeMap<String, OutputEntry>,
}

impl Document {
    /// Stable, pretty-printed JSON rendering of the document
    pub fn to_json_string(&self) -> ComposerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ComposerError::Encoding {
            id: "document".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Serializes a validated graph through a binding-layer delegate
pub struct PlanEncoder<'a, E: NodeEncoder> {
    bindings: &'a E,
}

impl<'a, E: NodeEncoder> PlanEncoder<'a, E> {
    /// Create an encoder over the given binding layer
    pub fn new(bindings: &'a E) -> Self {
        Self { bindings }
    }

    /// Encode the graph into the output document.
    ///
    /// Fails with [`ComposerError::Encoding`] wrapping the first delegate
    /// failure; no partial document is returned.
    pub fn encode(&self, graph: &ResourceGraph, spec: &DeploymentSpec) -> ComposerResult<Document> {
        let span = info_span!("encode_plan", nodes = graph.len());
        let _guard = span.enter();

        let sorted = graph.topo_sort().map_err(|members| ComposerError::Encoding {
            id: members.first().cloned().unwrap_or_default(),
            reason: "graph has a dependency cycle".to_string(),
        })?;

        let mut resource: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
        let mut output = BTreeMap::new();
        for node in sorted {
            let block = self
                .bindings
                .encode_node(node, graph)
                .map_err(|e| ComposerError::Encoding {
                    id: node.id.clone(),
                    reason: e.to_string(),
                })?;
            resource
                .entry(node.kind.type_name().to_string())
                .or_default()
                .insert(node.id.clone(), block);

            if let Some(export) = &node.export {
                let value = bindings::interpolate(graph, &node.id, &export.attribute).map_err(
                    |e| ComposerError::Encoding {
                        id: node.id.clone(),
                        reason: e.to_string(),
                    },
                )?;
                output.insert(
                    export.name.clone(),
                    OutputEntry {
                        value: Value::String(value),
                    },
                );
            }
        }

        let document = Document {
            terraform: backend_block(spec),
            provider: provider_block(spec),
            resource,
            output,
        };
        debug!(
            kinds = document.resource.len(),
            outputs = document.output.len(),
            "document assembled"
        );
        Ok(document)
    }
}

fn backend_block(spec: &DeploymentSpec) -> TerraformBlock {
    let stack_id = format!("topology-{}", spec.environment_suffix);
    TerraformBlock {
        backend: BTreeMap::from([(
            "s3".to_string(),
            BackendConfig {
                bucket: spec.state_location.bucket.clone(),
                key: format!("{}/{}.tfstate", spec.environment_suffix, stack_id),
                region: spec.state_location.region.clone(),
                encrypt: true,
            },
        )]),
    }
}

fn provider_block(spec: &DeploymentSpec) -> BTreeMap<String, Vec<ProviderEntry>> {
    let entries = spec
        .regions
        .iter()
        .enumerate()
        .map(|(i, region)| ProviderEntry {
            region: region.name.clone(),
            alias: if i == 0 { None } else { Some(region.name.clone()) },
        })
        .collect();
    BTreeMap::from([("aws".to_string(), entries)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Region, RegionSpec, ResourceKind, ResourceNode, StateLocation};
    use pretty_assertions::assert_eq;

    fn spec() -> DeploymentSpec {
        DeploymentSpec::new("dev", StateLocation::new("state-bucket", "us-east-1"))
            .with_region(RegionSpec::new("us-east-1", 0, 2))
            .with_region(RegionSpec::new("eu-west-1", 1, 2))
    }

    fn graph() -> ResourceGraph {
        let mut g = ResourceGraph::new();
        g.insert(
            ResourceNode::new("vpc-x", ResourceKind::Network, Region::Named("us-east-1".into()))
                .with_attr("cidr_block", "10.0.0.0/16"),
        )
        .unwrap();
        g.insert(
            ResourceNode::new("alb-x", ResourceKind::LoadBalancer, Region::Named("us-east-1".into()))
                .with_dependency("vpc-x")
                .with_export("primary_lb_dns_name", "dns_name"),
        )
        .unwrap();
        g
    }

    #[test]
    fn test_backend_descriptor_shape() {
        let doc = PlanEncoder::new(&DefaultBindings).encode(&graph(), &spec()).unwrap();
        let backend = &doc.terraform.backend["s3"];
        assert_eq!(backend.bucket, "state-bucket");
        assert_eq!(backend.key, "dev/topology-dev.tfstate");
        assert_eq!(backend.region, "us-east-1");
        assert!(backend.encrypt);
    }

    #[test]
    fn test_primary_provider_has_no_alias() {
        let doc = PlanEncoder::new(&DefaultBindings).encode(&graph(), &spec()).unwrap();
        let providers = &doc.provider["aws"];
        assert_eq!(providers[0].alias, None);
        assert_eq!(providers[1].alias.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_resources_grouped_by_type_name() {
        let doc = PlanEncoder::new(&DefaultBindings).encode(&graph(), &spec()).unwrap();
        assert!(doc.resource["aws_vpc"].contains_key("vpc-x"));
        assert!(doc.resource["aws_lb"].contains_key("alb-x"));
    }

    #[test]
    fn test_exports_become_outputs() {
        let doc = PlanEncoder::new(&DefaultBindings).encode(&graph(), &spec()).unwrap();
        assert_eq!(
            doc.output["primary_lb_dns_name"].value,
            Value::String("${aws_lb.alb-x.dns_name}".to_string())
        );
    }

    #[test]
    fn test_encoding_is_byte_stable() {
        let encoder = PlanEncoder::new(&DefaultBindings);
        let a = encoder.encode(&graph(), &spec()).unwrap().to_json_string().unwrap();
        let b = encoder.encode(&graph(), &spec()).unwrap().to_json_string().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_delegate_failure_aborts_without_partial_output() {
        let mut g = graph();
        g.insert(
            ResourceNode::new("sn", ResourceKind::Subnet, Region::Named("us-east-1".into()))
                .with_attr("vpc_id", crate::domain::AttrValue::reference("missing", "id")),
        )
        .unwrap();

        let result = PlanEncoder::new(&DefaultBindings).encode(&g, &spec());
        assert!(matches!(result, Err(ComposerError::Encoding { .. })));
    }

    #[test]
    fn test_document_round_trips_through_serde() {
        let doc = PlanEncoder::new(&DefaultBindings).encode(&graph(), &spec()).unwrap();
        let text = doc.to_json_string().unwrap();
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(doc, back);
    }
}
