// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Node Model
//!
//! A single closed set of resource kinds plus one attribute-value union
//! replaces any provider-specific construct hierarchy: every resource the
//! composer can emit is a [`ResourceNode`] tagged with a [`ResourceKind`],
//! and the per-kind shape lives entirely in its attribute map. Attribute
//! values are opaque to the composer except for [`AttrValue::Ref`], which
//! is what cross-node value wiring and dangling-reference checking inspect.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Resource kinds in the topology graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Regional network (VPC)
    Network,
    /// Per-AZ subnet
    Subnet,
    /// Route table
    RouteTable,
    /// Subnet-to-route-table association
    RouteTableAssociation,
    /// Security group with sibling-referencing ingress rules
    SecurityGroup,
    /// Regional encryption key
    KmsKey,
    /// Human-readable alias for a key
    KmsAlias,
    /// Database subnet group
    DbSubnetGroup,
    /// Regional database cluster
    DatabaseCluster,
    /// Cluster member instance
    DatabaseInstance,
    /// Region-spanning database cluster placeholder
    GlobalDatabaseCluster,
    /// Region-spanning replicated table
    GlobalTable,
    /// Work queue
    Queue,
    /// Execution role for the compute function
    FunctionRole,
    /// Compute entry point
    Function,
    /// Invocation permission bridging load balancer and function
    FunctionPermission,
    /// Regional load balancer
    LoadBalancer,
    /// Load balancer target group
    TargetGroup,
    /// Load balancer listener
    Listener,
    /// Object storage bucket
    Bucket,
    /// Bucket versioning configuration
    BucketVersioning,
    /// Bucket encryption configuration
    BucketEncryption,
    /// Notification topic
    Topic,
    /// Metric alarm
    Alarm,
    /// Shared DNS zone
    DnsZone,
    /// Weighted DNS record
    DnsRecord,
    /// Endpoint health check
    HealthCheck,
    /// Backup vault
    BackupVault,
    /// Backup plan
    BackupPlan,
    /// Tag-based backup selection
    BackupSelection,
    /// Audit trail (primary region only)
    AuditTrail,
    /// Inter-region network peering
    PeeringConnection,
}

impl ResourceKind {
    /// The provisioning-dialect type string this kind encodes as
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Network => "aws_vpc",
            ResourceKind::Subnet => "aws_subnet",
            ResourceKind::RouteTable => "aws_route_table",
            ResourceKind::RouteTableAssociation => "aws_route_table_association",
            ResourceKind::SecurityGroup => "aws_security_group",
            ResourceKind::KmsKey => "aws_kms_key",
            ResourceKind::KmsAlias => "aws_kms_alias",
            ResourceKind::DbSubnetGroup => "aws_db_subnet_group",
            ResourceKind::DatabaseCluster => "aws_rds_cluster",
            ResourceKind::DatabaseInstance => "aws_rds_cluster_instance",
            ResourceKind::GlobalDatabaseCluster => "aws_rds_global_cluster",
            ResourceKind::GlobalTable => "aws_dynamodb_global_table",
            ResourceKind::Queue => "aws_sqs_queue",
            ResourceKind::FunctionRole => "aws_iam_role",
            ResourceKind::Function => "aws_lambda_function",
            ResourceKind::FunctionPermission => "aws_lambda_permission",
            ResourceKind::LoadBalancer => "aws_lb",
            ResourceKind::TargetGroup => "aws_lb_target_group",
            ResourceKind::Listener => "aws_lb_listener",
            ResourceKind::Bucket => "aws_s3_bucket",
            ResourceKind::BucketVersioning => "aws_s3_bucket_versioning",
            ResourceKind::BucketEncryption => {
                "aws_s3_bucket_server_side_encryption_configuration"
            }
            ResourceKind::Topic => "aws_sns_topic",
            ResourceKind::Alarm => "aws_cloudwatch_metric_alarm",
            ResourceKind::DnsZone => "aws_route53_zone",
            ResourceKind::DnsRecord => "aws_route53_record",
            ResourceKind::HealthCheck => "aws_route53_health_check",
            ResourceKind::BackupVault => "aws_backup_vault",
            ResourceKind::BackupPlan => "aws_backup_plan",
            ResourceKind::BackupSelection => "aws_backup_selection",
            ResourceKind::AuditTrail => "aws_cloudtrail",
            ResourceKind::PeeringConnection => "aws_vpc_peering_connection",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Where a node lives: one region, or spanning all of them
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    /// Region-spanning resource, provisioned through the primary provider
    Global,
    /// Resource pinned to a named region
    Named(String),
}

impl Region {
    /// The region name, or None for global resources
    pub fn name(&self) -> Option<&str> {
        match self {
            Region::Global => None,
            Region::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Global => write!(f, "global"),
            Region::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Attribute value union.
///
/// Opaque to the composer except for `Ref`, which names another node and
/// one of its attributes; the validator checks these resolve and the
/// encoder renders them as provisioning-dialect interpolations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// Literal string (includes opaque policy payloads)
    String(String),
    /// Integer
    Int(i64),
    /// Boolean
    Bool(bool),
    /// Ordered list
    List(Vec<AttrValue>),
    /// Nested attribute block
    Map(BTreeMap<String, AttrValue>),
    /// Value flowing in from another node's attribute
    Ref {
        /// Target node id
        node: String,
        /// Attribute exposed by the target
        attribute: String,
    },
}

impl AttrValue {
    /// Reference another node's attribute
    pub fn reference(node: impl Into<String>, attribute: impl Into<String>) -> Self {
        AttrValue::Ref {
            node: node.into(),
            attribute: attribute.into(),
        }
    }

    /// Collect every node id this value (transitively) references
    pub fn referenced_nodes<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            AttrValue::Ref { node, .. } => out.push(node),
            AttrValue::List(items) => {
                for item in items {
                    item.referenced_nodes(out);
                }
            }
            AttrValue::Map(entries) => {
                for value in entries.values() {
                    value.referenced_nodes(out);
                }
            }
            _ => {}
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(value: Vec<AttrValue>) -> Self {
        AttrValue::List(value)
    }
}

impl From<BTreeMap<String, AttrValue>> for AttrValue {
    fn from(value: BTreeMap<String, AttrValue>) -> Self {
        AttrValue::Map(value)
    }
}

/// A value exported from the final document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    /// Output name in the document's `output` section
    pub name: String,
    /// Attribute of the owning node whose value is exported
    pub attribute: String,
}

/// One infrastructure resource in the topology graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Graph-unique identifier
    pub id: String,
    /// Closed resource kind tag
    pub kind: ResourceKind,
    /// Region placement
    pub region: Region,
    /// Kind-specific attribute block
    pub attributes: BTreeMap<String, AttrValue>,
    /// Ids of nodes that must exist before this one
    pub depends_on: BTreeSet<String>,
    /// Present when this node contributes a document output
    pub export: Option<Export>,
}

impl ResourceNode {
    /// Create a node with empty attributes and no dependencies
    pub fn new(id: impl Into<String>, kind: ResourceKind, region: Region) -> Self {
        Self {
            id: id.into(),
            kind,
            region,
            attributes: BTreeMap::new(),
            depends_on: BTreeSet::new(),
            export: None,
        }
    }

    /// Set an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a creation-order dependency on another node
    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.depends_on.insert(id.into());
        self
    }

    /// Mark one attribute of this node as a document output
    pub fn with_export(mut self, name: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.export = Some(Export {
            name: name.into(),
            attribute: attribute.into(),
        });
        self
    }

    /// Every node id referenced by this node's attributes or dependencies
    pub fn referenced_nodes(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.depends_on.iter().map(String::as_str).collect();
        for value in self.attributes.values() {
            value.referenced_nodes(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_type_names() {
        assert_eq!(ResourceKind::Network.type_name(), "aws_vpc");
        assert_eq!(ResourceKind::DatabaseCluster.type_name(), "aws_rds_cluster");
        assert_eq!(ResourceKind::DnsRecord.type_name(), "aws_route53_record");
    }

    #[test]
    fn test_region_display() {
        assert_eq!(Region::Global.to_string(), "global");
        assert_eq!(Region::Named("us-east-1".into()).to_string(), "us-east-1");
        assert_eq!(Region::Global.name(), None);
    }

    #[test]
    fn test_node_builder() {
        let node = ResourceNode::new("vpc-us-east-1-dev", ResourceKind::Network, Region::Named("us-east-1".into()))
            .with_attr("cidr_block", "10.0.0.0/16")
            .with_attr("enable_dns_support", true)
            .with_dependency("kms-us-east-1-dev");

        assert_eq!(node.attributes.len(), 2);
        assert!(node.depends_on.contains("kms-us-east-1-dev"));
    }

    #[test]
    fn test_referenced_nodes_walks_nested_values() {
        let nested = AttrValue::Map(BTreeMap::from([(
            "inner".to_string(),
            AttrValue::List(vec![AttrValue::reference("sg-app", "id")]),
        )]));
        let node = ResourceNode::new("fn", ResourceKind::Function, Region::Global)
            .with_attr("vpc_config", nested)
            .with_dependency("role");

        let mut refs = node.referenced_nodes();
        refs.sort();
        assert_eq!(refs, vec!["role", "sg-app"]);
    }
}
