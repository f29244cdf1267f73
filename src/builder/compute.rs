// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute and messaging tier: queues, function, load balancer

use super::{DataIds, NetworkIds, RegionTopologyBuilder};
use crate::domain::{AttrValue, Region, RegionSpec, ResourceGraph, ResourceKind, ResourceNode};
use crate::errors::ComposerResult;
use crate::linker::GlobalRefs;
use std::collections::BTreeMap;

/// Trust policy attached to the function's execution role. Security-policy
/// content is an opaque payload to the composer; it is carried verbatim and
/// never interpreted.
const FUNCTION_TRUST_POLICY: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":{"Service":"lambda.amazonaws.com"},"Action":"sts:AssumeRole"}]}"#;

/// Identifiers the observability tier wires against
pub(crate) struct ComputeIds {
    pub load_balancer: String,
    pub function: String,
}

impl RegionTopologyBuilder<'_> {
    pub(crate) fn compute_tier(
        &mut self,
        region: &RegionSpec,
        net: &NetworkIds,
        data: &DataIds,
        global_refs: &GlobalRefs,
        is_primary: bool,
        graph: &mut ResourceGraph,
    ) -> ComposerResult<ComputeIds> {
        let placement = Region::Named(region.name.clone());

        let dlq = self.reserve(region, "work-dlq")?;
        graph.insert(
            ResourceNode::new(&dlq, ResourceKind::Queue, placement.clone())
                .with_attr("name", dlq.clone())
                .with_attr("message_retention_seconds", 1_209_600i64)
                .with_attr("tags", self.resource_tags(&dlq, &[])),
        )?;

        let queue = self.reserve(region, "work-queue")?;
        graph.insert(
            ResourceNode::new(&queue, ResourceKind::Queue, placement.clone())
                .with_attr("name", queue.clone())
                .with_attr("visibility_timeout_seconds", 30i64)
                .with_attr(
                    "redrive_policy",
                    AttrValue::Map(BTreeMap::from([
                        (
                            "deadLetterTargetArn".to_string(),
                            AttrValue::reference(&dlq, "arn"),
                        ),
                        ("maxReceiveCount".to_string(), AttrValue::Int(5)),
                    ])),
                )
                .with_attr("tags", self.resource_tags(&queue, &[]))
                .with_dependency(&dlq),
        )?;

        let role = self.reserve(region, "fn-role")?;
        graph.insert(
            ResourceNode::new(&role, ResourceKind::FunctionRole, placement.clone())
                .with_attr("name", role.clone())
                .with_attr("assume_role_policy", FUNCTION_TRUST_POLICY)
                .with_attr("tags", self.resource_tags(&role, &[])),
        )?;

        let function = self.reserve(region, "handler")?;
        let mut function_node =
            ResourceNode::new(&function, ResourceKind::Function, placement.clone())
                .with_attr("function_name", function.clone())
                .with_attr("role", AttrValue::reference(&role, "arn"))
                .with_attr("handler", "bootstrap")
                .with_attr("runtime", "provided.al2023")
                .with_attr("timeout", 30i64)
                .with_attr("memory_size", 512i64)
                .with_attr(
                    "vpc_config",
                    AttrValue::Map(BTreeMap::from([
                        (
                            "subnet_ids".to_string(),
                            AttrValue::List(
                                net.private_subnets
                                    .iter()
                                    .map(|s| AttrValue::reference(s, "id"))
                                    .collect(),
                            ),
                        ),
                        (
                            "security_group_ids".to_string(),
                            AttrValue::List(vec![AttrValue::reference(&net.sg_app, "id")]),
                        ),
                    ])),
                )
                .with_attr(
                    "environment",
                    AttrValue::Map(BTreeMap::from([(
                        "variables".to_string(),
                        AttrValue::Map(BTreeMap::from([
                            (
                                "DB_ENDPOINT".to_string(),
                                AttrValue::reference(&data.db_cluster, "endpoint"),
                            ),
                            ("QUEUE_URL".to_string(), AttrValue::reference(&queue, "url")),
                            (
                                "DATA_BUCKET".to_string(),
                                AttrValue::reference(&data.data_bucket, "bucket"),
                            ),
                            (
                                "TABLE_NAME".to_string(),
                                AttrValue::String(global_refs.table_name.clone()),
                            ),
                        ])),
                    )])),
                )
                .with_attr("tags", self.resource_tags(&function, &[]))
                .with_dependency(&role)
                .with_dependency(&queue)
                .with_dependency(&net.sg_app);
        for subnet in &net.private_subnets {
            function_node = function_node.with_dependency(subnet);
        }
        graph.insert(function_node)?;

        let target_group = self.reserve(region, "alb-tg")?;
        graph.insert(
            ResourceNode::new(&target_group, ResourceKind::TargetGroup, placement.clone())
                .with_attr("name", target_group.clone())
                .with_attr("target_type", "lambda")
                .with_attr("tags", self.resource_tags(&target_group, &[])),
        )?;

        // The permission node is the bridge: the listener depends on it,
        // which gives the load balancer path its edge to the function.
        let permission = self.reserve(region, "handler-invoke")?;
        graph.insert(
            ResourceNode::new(&permission, ResourceKind::FunctionPermission, placement.clone())
                .with_attr("action", "lambda:InvokeFunction")
                .with_attr(
                    "function_name",
                    AttrValue::reference(&function, "function_name"),
                )
                .with_attr("principal", "elasticloadbalancing.amazonaws.com")
                .with_attr("source_arn", AttrValue::reference(&target_group, "arn"))
                .with_dependency(&function)
                .with_dependency(&target_group),
        )?;

        let load_balancer = self.reserve(region, "alb")?;
        let mut lb_node =
            ResourceNode::new(&load_balancer, ResourceKind::LoadBalancer, placement.clone())
                .with_attr("name", load_balancer.clone())
                .with_attr("internal", false)
                .with_attr("load_balancer_type", "application")
                .with_attr(
                    "subnets",
                    AttrValue::List(
                        net.public_subnets
                            .iter()
                            .map(|s| AttrValue::reference(s, "id"))
                            .collect(),
                    ),
                )
                .with_attr(
                    "security_groups",
                    AttrValue::List(vec![AttrValue::reference(&net.sg_lb, "id")]),
                )
                .with_attr("tags", self.resource_tags(&load_balancer, &[]))
                .with_dependency(&net.sg_lb);
        for subnet in &net.public_subnets {
            lb_node = lb_node.with_dependency(subnet);
        }
        if is_primary {
            lb_node = lb_node.with_export("primary_lb_dns_name", "dns_name");
        }
        graph.insert(lb_node)?;

        let listener = self.reserve(region, "alb-listener")?;
        graph.insert(
            ResourceNode::new(&listener, ResourceKind::Listener, placement)
                .with_attr("load_balancer_arn", AttrValue::reference(&load_balancer, "arn"))
                .with_attr("port", 80i64)
                .with_attr("protocol", "HTTP")
                .with_attr(
                    "default_action",
                    AttrValue::Map(BTreeMap::from([
                        ("type".to_string(), AttrValue::from("forward")),
                        (
                            "target_group_arn".to_string(),
                            AttrValue::reference(&target_group, "arn"),
                        ),
                    ])),
                )
                .with_dependency(&load_balancer)
                .with_dependency(&target_group)
                .with_dependency(&permission),
        )?;

        Ok(ComputeIds {
            load_balancer,
            function,
        })
    }
}
