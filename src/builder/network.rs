// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network tier: VPC, subnets, route tables, security groups

use super::RegionTopologyBuilder;
use crate::cidr::{self, SubnetTier};
use crate::domain::{AttrValue, Region, RegionSpec, ResourceGraph, ResourceKind, ResourceNode};
use crate::errors::ComposerResult;
use ipnet::Ipv4Net;
use std::collections::BTreeMap;

/// Identifiers the later tiers wire against
pub(crate) struct NetworkIds {
    pub public_subnets: Vec<String>,
    pub private_subnets: Vec<String>,
    pub sg_lb: String,
    pub sg_app: String,
    pub sg_db: String,
}

impl RegionTopologyBuilder<'_> {
    pub(crate) fn network_tier(
        &mut self,
        region: &RegionSpec,
        block: Ipv4Net,
        graph: &mut ResourceGraph,
    ) -> ComposerResult<NetworkIds> {
        let placement = Region::Named(region.name.clone());

        let vpc = self.reserve(region, "vpc")?;
        graph.insert(
            ResourceNode::new(&vpc, ResourceKind::Network, placement.clone())
                .with_attr("cidr_block", block.to_string())
                .with_attr("enable_dns_support", true)
                .with_attr("enable_dns_hostnames", true)
                .with_attr("tags", self.resource_tags(&vpc, &[])),
        )?;

        let mut public_subnets = Vec::new();
        let mut private_subnets = Vec::new();
        for az in 0..region.availability_zone_count {
            for (tier, out) in [
                (SubnetTier::Public, &mut public_subnets),
                (SubnetTier::Private, &mut private_subnets),
            ] {
                let id = self.reserve(region, &format!("subnet-{}-{}", tier.as_str(), az))?;
                let subnet_block = cidr::subnet(block, tier, az)?;
                let mut node = ResourceNode::new(&id, ResourceKind::Subnet, placement.clone())
                    .with_attr("vpc_id", AttrValue::reference(&vpc, "id"))
                    .with_attr("cidr_block", subnet_block.to_string())
                    .with_attr("availability_zone", Self::az_name(region, az))
                    .with_attr("tags", self.resource_tags(&id, &[("tier", tier.as_str())]))
                    .with_dependency(&vpc);
                if tier == SubnetTier::Public {
                    node = node.with_attr("map_public_ip_on_launch", true);
                }
                graph.insert(node)?;
                out.push(id);
            }
        }

        for (tier, subnets) in [
            (SubnetTier::Public, &public_subnets),
            (SubnetTier::Private, &private_subnets),
        ] {
            let rt = self.reserve(region, &format!("rt-{}", tier.as_str()))?;
            graph.insert(
                ResourceNode::new(&rt, ResourceKind::RouteTable, placement.clone())
                    .with_attr("vpc_id", AttrValue::reference(&vpc, "id"))
                    .with_attr("tags", self.resource_tags(&rt, &[]))
                    .with_dependency(&vpc),
            )?;
            for (az, subnet) in subnets.iter().enumerate() {
                let rta = self.reserve(region, &format!("rta-{}-{}", tier.as_str(), az))?;
                graph.insert(
                    ResourceNode::new(&rta, ResourceKind::RouteTableAssociation, placement.clone())
                        .with_attr("subnet_id", AttrValue::reference(subnet, "id"))
                        .with_attr("route_table_id", AttrValue::reference(&rt, "id"))
                        .with_dependency(subnet)
                        .with_dependency(&rt),
                )?;
            }
        }

        // Ingress references sibling security groups, never raw addresses,
        // so rules stay valid regardless of address assignment order. The
        // load balancer group is the one internet-facing exception.
        let sg_lb = self.reserve(region, "sg-lb")?;
        graph.insert(
            ResourceNode::new(&sg_lb, ResourceKind::SecurityGroup, placement.clone())
                .with_attr("vpc_id", AttrValue::reference(&vpc, "id"))
                .with_attr("description", "internet-facing load balancer ingress")
                .with_attr(
                    "ingress",
                    AttrValue::List(vec![ingress_from_cidr(80, "0.0.0.0/0")]),
                )
                .with_attr("egress", AttrValue::List(vec![open_egress()]))
                .with_attr("tags", self.resource_tags(&sg_lb, &[]))
                .with_dependency(&vpc),
        )?;

        let sg_app = self.reserve(region, "sg-app")?;
        graph.insert(
            ResourceNode::new(&sg_app, ResourceKind::SecurityGroup, placement.clone())
                .with_attr("vpc_id", AttrValue::reference(&vpc, "id"))
                .with_attr("description", "application tier, reachable from the load balancer")
                .with_attr(
                    "ingress",
                    AttrValue::List(vec![ingress_from_group(80, &sg_lb)]),
                )
                .with_attr("egress", AttrValue::List(vec![open_egress()]))
                .with_attr("tags", self.resource_tags(&sg_app, &[]))
                .with_dependency(&vpc)
                .with_dependency(&sg_lb),
        )?;

        let sg_db = self.reserve(region, "sg-db")?;
        graph.insert(
            ResourceNode::new(&sg_db, ResourceKind::SecurityGroup, placement)
                .with_attr("vpc_id", AttrValue::reference(&vpc, "id"))
                .with_attr("description", "database tier, reachable from the application tier")
                .with_attr(
                    "ingress",
                    AttrValue::List(vec![ingress_from_group(5432, &sg_app)]),
                )
                .with_attr("egress", AttrValue::List(vec![open_egress()]))
                .with_attr("tags", self.resource_tags(&sg_db, &[]))
                .with_dependency(&vpc)
                .with_dependency(&sg_app),
        )?;

        Ok(NetworkIds {
            public_subnets,
            private_subnets,
            sg_lb,
            sg_app,
            sg_db,
        })
    }
}

fn ingress_from_group(port: i64, group: &str) -> AttrValue {
    AttrValue::Map(BTreeMap::from([
        ("from_port".to_string(), AttrValue::Int(port)),
        ("to_port".to_string(), AttrValue::Int(port)),
        ("protocol".to_string(), AttrValue::from("tcp")),
        (
            "security_groups".to_string(),
            AttrValue::List(vec![AttrValue::reference(group, "id")]),
        ),
    ]))
}

fn ingress_from_cidr(port: i64, cidr: &str) -> AttrValue {
    AttrValue::Map(BTreeMap::from([
        ("from_port".to_string(), AttrValue::Int(port)),
        ("to_port".to_string(), AttrValue::Int(port)),
        ("protocol".to_string(), AttrValue::from("tcp")),
        (
            "cidr_blocks".to_string(),
            AttrValue::List(vec![AttrValue::from(cidr)]),
        ),
    ]))
}

fn open_egress() -> AttrValue {
    AttrValue::Map(BTreeMap::from([
        ("from_port".to_string(), AttrValue::Int(0)),
        ("to_port".to_string(), AttrValue::Int(0)),
        ("protocol".to_string(), AttrValue::from("-1")),
        (
            "cidr_blocks".to_string(),
            AttrValue::List(vec![AttrValue::from("0.0.0.0/0")]),
        ),
    ]))
}
