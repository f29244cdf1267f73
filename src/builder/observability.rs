// Copyright (c) 2025 - Cowboy AI, Inc.
//! Observability tier: topic, alarms, primary-only audit trail
//!
//! Alarms stay regional and notify their own region's topic. There is no
//! native cross-region alarm forwarding in the modeled domain; see
//! [`crate::linker::GlobalRefs::cross_region_alarm_forwarding`].

use super::{ComputeIds, DataIds, RegionTopologyBuilder};
use crate::domain::{AttrValue, Region, RegionSpec, ResourceGraph, ResourceKind, ResourceNode};
use crate::errors::ComposerResult;
use std::collections::BTreeMap;

impl RegionTopologyBuilder<'_> {
    pub(crate) fn observability_tier(
        &mut self,
        region: &RegionSpec,
        data: &DataIds,
        compute: &ComputeIds,
        is_primary: bool,
        graph: &mut ResourceGraph,
    ) -> ComposerResult<()> {
        let placement = Region::Named(region.name.clone());

        let topic = self.reserve(region, "alerts")?;
        graph.insert(
            ResourceNode::new(&topic, ResourceKind::Topic, placement.clone())
                .with_attr("name", topic.clone())
                .with_attr("kms_master_key_id", AttrValue::reference(&data.kms_key, "arn"))
                .with_attr("tags", self.resource_tags(&topic, &[]))
                .with_dependency(&data.kms_key),
        )?;

        self.alarm(
            region,
            "alarm-db-cpu",
            &topic,
            AlarmSpec {
                namespace: "AWS/RDS",
                metric_name: "CPUUtilization",
                statistic: "Average",
                comparison: "GreaterThanThreshold",
                threshold: 80,
                dimension: ("DBClusterIdentifier", &data.db_cluster),
                source: &data.db_cluster,
            },
            graph,
        )?;

        self.alarm(
            region,
            "alarm-fn-errors",
            &topic,
            AlarmSpec {
                namespace: "AWS/Lambda",
                metric_name: "Errors",
                statistic: "Sum",
                comparison: "GreaterThanOrEqualToThreshold",
                threshold: 1,
                dimension: ("FunctionName", &compute.function),
                source: &compute.function,
            },
            graph,
        )?;

        self.alarm(
            region,
            "alarm-lb-5xx",
            &topic,
            AlarmSpec {
                namespace: "AWS/ApplicationELB",
                metric_name: "HTTPCode_ELB_5XX_Count",
                statistic: "Sum",
                comparison: "GreaterThanOrEqualToThreshold",
                threshold: 10,
                dimension: ("LoadBalancer", &compute.load_balancer),
                source: &compute.load_balancer,
            },
            graph,
        )?;

        // The audit trail is a global-facing singleton hosted by the
        // primary region alone; a duplicate in a secondary region is an
        // invariant breach the validator reports.
        if is_primary {
            let trail = self.reserve(region, "audit-trail")?;
            graph.insert(
                ResourceNode::new(&trail, ResourceKind::AuditTrail, placement)
                    .with_attr("name", trail.clone())
                    .with_attr("s3_bucket_name", AttrValue::reference(&data.logs_bucket, "id"))
                    .with_attr("include_global_service_events", true)
                    .with_attr("is_multi_region_trail", true)
                    .with_attr("enable_log_file_validation", true)
                    .with_attr("tags", self.resource_tags(&trail, &[]))
                    .with_dependency(&data.logs_bucket),
            )?;
        }

        Ok(())
    }

    fn alarm(
        &mut self,
        region: &RegionSpec,
        logical: &str,
        topic: &str,
        spec: AlarmSpec<'_>,
        graph: &mut ResourceGraph,
    ) -> ComposerResult<()> {
        let id = self.reserve(region, logical)?;
        let (dimension_key, dimension_source) = spec.dimension;
        graph.insert(
            ResourceNode::new(&id, ResourceKind::Alarm, Region::Named(region.name.clone()))
                .with_attr("alarm_name", id.clone())
                .with_attr("namespace", spec.namespace)
                .with_attr("metric_name", spec.metric_name)
                .with_attr("statistic", spec.statistic)
                .with_attr("comparison_operator", spec.comparison)
                .with_attr("threshold", spec.threshold)
                .with_attr("evaluation_periods", 5i64)
                .with_attr("period", 60i64)
                .with_attr(
                    "dimensions",
                    AttrValue::Map(BTreeMap::from([(
                        dimension_key.to_string(),
                        AttrValue::reference(dimension_source, "id"),
                    )])),
                )
                .with_attr(
                    "alarm_actions",
                    AttrValue::List(vec![AttrValue::reference(topic, "arn")]),
                )
                .with_dependency(spec.source)
                .with_dependency(topic),
        )?;
        Ok(())
    }
}

struct AlarmSpec<'a> {
    namespace: &'static str,
    metric_name: &'static str,
    statistic: &'static str,
    comparison: &'static str,
    threshold: i64,
    dimension: (&'static str, &'a str),
    source: &'a str,
}
