// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composer Scenario Tests
//!
//! End-to-end checks of the compose pipeline against the reference
//! scenarios: single-region mode, two-region wiring, CIDR overlap
//! rejection, and dangling-reference reporting.

mod fixtures;

use cim_topology::{
    compose, AttrValue, ComposeFailure, DeploymentSpec, GraphValidator, Region, RegionSpec,
    ResourceGraph, ResourceKind, ResourceNode, StateLocation, Violation,
};
use pretty_assertions::assert_eq;

#[test]
fn scenario_a_single_region() {
    let doc = compose(&fixtures::single_region_spec()).unwrap();

    // CIDR index 0 → 10.0.0.0/16
    let vpc = &doc.resource["aws_vpc"]["vpc-r1-test"];
    assert_eq!(vpc["cidr_block"], serde_json::json!("10.0.0.0/16"));

    // Exactly one cluster, and single-region mode omits the global cluster
    assert_eq!(doc.resource["aws_rds_cluster"].len(), 1);
    assert!(!doc.resource.contains_key("aws_rds_global_cluster"));
    let cluster = &doc.resource["aws_rds_cluster"]["aurora-r1-test"];
    assert!(cluster.get("global_cluster_identifier").is_none());

    // No peers to peer with
    assert!(!doc.resource.contains_key("aws_vpc_peering_connection"));
}

#[test]
fn scenario_b_two_regions() {
    let doc = compose(&fixtures::two_region_spec()).unwrap();

    assert_eq!(
        doc.resource["aws_vpc"]["vpc-us-east-1-test"]["cidr_block"],
        serde_json::json!("10.0.0.0/16")
    );
    assert_eq!(
        doc.resource["aws_vpc"]["vpc-eu-west-1-test"]["cidr_block"],
        serde_json::json!("10.1.0.0/16")
    );

    // Two weighted records sharing one zone, each on its own health check
    assert_eq!(doc.resource["aws_route53_zone"].len(), 1);
    let records = &doc.resource["aws_route53_record"];
    assert_eq!(records.len(), 2);
    assert_eq!(
        records["dns-us-east-1-test"]["health_check_id"],
        serde_json::json!("${aws_route53_health_check.hc-us-east-1-test.id}")
    );
    assert_eq!(
        records["dns-eu-west-1-test"]["health_check_id"],
        serde_json::json!("${aws_route53_health_check.hc-eu-west-1-test.id}")
    );

    // Both regional clusters join the global cluster
    for id in ["aurora-us-east-1-test", "aurora-eu-west-1-test"] {
        let cluster = &doc.resource["aws_rds_cluster"][id];
        assert_eq!(
            cluster["global_cluster_identifier"],
            serde_json::json!("${aws_rds_global_cluster.global-aurora-test.id}")
        );
    }

    // One peering connection for the single unordered pair
    assert_eq!(doc.resource["aws_vpc_peering_connection"].len(), 1);
}

#[test]
fn scenario_c_overlapping_cidr_blocks_encoding() {
    let result = compose(&fixtures::overlapping_spec());
    let Err(ComposeFailure::Invalid(violations)) = result else {
        panic!("expected validation failure, got {:?}", result);
    };
    assert!(violations
        .iter()
        .any(|v| matches!(v, Violation::CidrOverlap { .. })));
}

#[test]
fn scenario_d_dangling_reference_reported() {
    let spec = fixtures::single_region_spec();
    let mut graph = ResourceGraph::new();
    graph
        .insert(ResourceNode::new("zone-test", ResourceKind::DnsZone, Region::Global))
        .unwrap();
    graph
        .insert(ResourceNode::new(
            "audit-trail-r1-test",
            ResourceKind::AuditTrail,
            Region::Named("r1".into()),
        ))
        .unwrap();
    graph
        .insert(
            ResourceNode::new("handler-r1-test", ResourceKind::Function, Region::Named("r1".into()))
                .with_attr("role", AttrValue::reference("fn-role-r1-test", "arn")),
        )
        .unwrap();

    let violations = GraphValidator::validate(&graph, &spec);
    assert_eq!(
        violations,
        vec![Violation::DanglingReference {
            from: "handler-r1-test".to_string(),
            to: "fn-role-r1-test".to_string(),
        }]
    );
}

#[test]
fn exactly_one_primary_in_multi_region_output() {
    let doc = compose(&fixtures::three_region_spec()).unwrap();

    assert_eq!(doc.resource["aws_cloudtrail"].len(), 1);
    assert!(doc.resource["aws_cloudtrail"].contains_key("audit-trail-us-east-1-prod"));
    assert_eq!(doc.resource["aws_route53_zone"].len(), 1);

    // 3 regions → 3 unordered peering pairs
    assert_eq!(doc.resource["aws_vpc_peering_connection"].len(), 3);
}

#[test]
fn state_backend_descriptor_derived_from_spec() {
    let doc = compose(&fixtures::two_region_spec()).unwrap();
    let backend = &doc.terraform.backend["s3"];
    assert_eq!(backend.bucket, "state-bucket");
    assert_eq!(backend.key, "test/topology-test.tfstate");
    assert_eq!(backend.region, "us-east-1");
    assert!(backend.encrypt);
}

#[test]
fn providers_cover_every_region_with_primary_unaliased() {
    let doc = compose(&fixtures::three_region_spec()).unwrap();
    let providers = &doc.provider["aws"];
    assert_eq!(providers.len(), 3);
    assert_eq!(providers[0].region, "us-east-1");
    assert_eq!(providers[0].alias, None);
    assert_eq!(providers[1].alias.as_deref(), Some("eu-west-1"));
    assert_eq!(providers[2].alias.as_deref(), Some("ap-south-1"));
}

#[test]
fn exported_outputs_present() {
    let doc = compose(&fixtures::two_region_spec()).unwrap();
    assert!(doc.output.contains_key("primary_lb_dns_name"));
    assert!(doc.output.contains_key("zone_name_servers"));
    assert!(doc.output.contains_key("table_name"));
    assert!(doc.output.contains_key("db_endpoint_us_east_1"));
    assert!(doc.output.contains_key("db_endpoint_eu_west_1"));
}

#[test]
fn global_nodes_precede_their_regional_dependents() {
    // Rebuild the graph the way compose does, then check the sort order
    let spec = fixtures::two_region_spec();
    let doc = compose(&spec).unwrap();

    // The encoded clusters depend on the global cluster; its resource
    // block must exist and regional blocks must reference it by address,
    // which only resolves if the global node was created first.
    assert!(doc.resource["aws_rds_global_cluster"].contains_key("global-aurora-test"));
    let cluster = &doc.resource["aws_rds_cluster"]["aurora-us-east-1-test"];
    let deps: Vec<&str> = cluster["depends_on"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(deps.contains(&"aws_rds_global_cluster.global-aurora-test"));
}

#[test]
fn empty_region_list_is_a_spec_error() {
    let spec = DeploymentSpec::new("test", StateLocation::new("b", "us-east-1"));
    assert!(matches!(compose(&spec), Err(ComposeFailure::Error(_))));
}

#[test]
fn excessive_az_count_exhausts_address_space() {
    let spec = DeploymentSpec::new("test", StateLocation::new("b", "us-east-1"))
        .with_region(RegionSpec::new("us-east-1", 0, 11));
    assert!(matches!(
        compose(&spec),
        Err(ComposeFailure::Error(
            cim_topology::ComposerError::AddressSpaceExhausted(_)
        ))
    ));
}
