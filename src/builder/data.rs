// Copyright (c) 2025 - Cowboy AI, Inc.
//! Data tier: encryption key, database cluster, buckets, backup plan

use super::{NetworkIds, RegionTopologyBuilder};
use crate::domain::{AttrValue, Region, RegionSpec, ResourceGraph, ResourceKind, ResourceNode};
use crate::errors::ComposerResult;
use crate::linker::GlobalRefs;
use std::collections::BTreeMap;

/// Cluster instances are capped at one writer plus two readers no matter
/// how many AZs the region spans.
const MAX_DB_INSTANCES: u8 = 3;

const DB_ENGINE: &str = "aurora-postgresql";

/// Identifiers the later tiers wire against
pub(crate) struct DataIds {
    pub kms_key: String,
    pub db_cluster: String,
    pub data_bucket: String,
    pub logs_bucket: String,
}

impl RegionTopologyBuilder<'_> {
    pub(crate) fn data_tier(
        &mut self,
        region: &RegionSpec,
        net: &NetworkIds,
        global_refs: &GlobalRefs,
        graph: &mut ResourceGraph,
    ) -> ComposerResult<DataIds> {
        let placement = Region::Named(region.name.clone());

        let kms_key = self.reserve(region, "kms")?;
        graph.insert(
            ResourceNode::new(&kms_key, ResourceKind::KmsKey, placement.clone())
                .with_attr("description", format!("regional data key for {}", region.name))
                .with_attr("enable_key_rotation", true)
                .with_attr("deletion_window_in_days", 30i64)
                .with_attr("tags", self.resource_tags(&kms_key, &[])),
        )?;

        let kms_alias = self.reserve(region, "kms-alias")?;
        graph.insert(
            ResourceNode::new(&kms_alias, ResourceKind::KmsAlias, placement.clone())
                .with_attr("name", format!("alias/{}", kms_key))
                .with_attr("target_key_id", AttrValue::reference(&kms_key, "key_id"))
                .with_dependency(&kms_key),
        )?;

        let subnet_group = self.reserve(region, "db-subnets")?;
        let mut group_node =
            ResourceNode::new(&subnet_group, ResourceKind::DbSubnetGroup, placement.clone())
                .with_attr("name", subnet_group.clone())
                .with_attr(
                    "subnet_ids",
                    AttrValue::List(
                        net.private_subnets
                            .iter()
                            .map(|s| AttrValue::reference(s, "id"))
                            .collect(),
                    ),
                )
                .with_attr("tags", self.resource_tags(&subnet_group, &[]));
        for subnet in &net.private_subnets {
            group_node = group_node.with_dependency(subnet);
        }
        graph.insert(group_node)?;

        let db_cluster = self.reserve(region, "aurora")?;
        // The backup selection picks the cluster up by this tag, not by a
        // direct edge; label-based selection is the documented coupling.
        let mut cluster_node =
            ResourceNode::new(&db_cluster, ResourceKind::DatabaseCluster, placement.clone())
                .with_attr("cluster_identifier", db_cluster.clone())
                .with_attr("engine", DB_ENGINE)
                .with_attr("db_subnet_group_name", AttrValue::reference(&subnet_group, "name"))
                .with_attr(
                    "vpc_security_group_ids",
                    AttrValue::List(vec![AttrValue::reference(&net.sg_db, "id")]),
                )
                .with_attr("storage_encrypted", true)
                .with_attr("kms_key_id", AttrValue::reference(&kms_key, "arn"))
                .with_attr("tags", self.resource_tags(&db_cluster, &[("backup", &db_cluster)]))
                .with_dependency(&subnet_group)
                .with_dependency(&net.sg_db)
                .with_dependency(&kms_key)
                .with_export(
                    format!("db_endpoint_{}", region.name.replace('-', "_")),
                    "endpoint",
                );
        if let Some(global_cluster) = &global_refs.global_cluster_id {
            cluster_node = cluster_node
                .with_attr(
                    "global_cluster_identifier",
                    AttrValue::reference(global_cluster, "id"),
                )
                .with_dependency(global_cluster);
        }
        graph.insert(cluster_node)?;

        let instance_count = region.availability_zone_count.min(MAX_DB_INSTANCES);
        for i in 0..instance_count {
            let instance = self.reserve(region, &format!("aurora-{}", i))?;
            graph.insert(
                ResourceNode::new(&instance, ResourceKind::DatabaseInstance, placement.clone())
                    .with_attr("identifier", instance.clone())
                    .with_attr("cluster_identifier", AttrValue::reference(&db_cluster, "id"))
                    .with_attr("engine", DB_ENGINE)
                    .with_attr("instance_class", "db.r6g.large")
                    .with_attr("db_subnet_group_name", AttrValue::reference(&subnet_group, "name"))
                    .with_dependency(&db_cluster)
                    .with_dependency(&subnet_group),
            )?;
        }

        let data_bucket = self.bucket(region, "data", &kms_key, graph)?;
        let logs_bucket = self.bucket(region, "logs", &kms_key, graph)?;

        self.backup_chain(region, &kms_key, &db_cluster, graph)?;

        Ok(DataIds {
            kms_key,
            db_cluster,
            data_bucket,
            logs_bucket,
        })
    }

    /// A bucket plus its versioning and encryption companion nodes
    fn bucket(
        &mut self,
        region: &RegionSpec,
        logical: &str,
        kms_key: &str,
        graph: &mut ResourceGraph,
    ) -> ComposerResult<String> {
        let placement = Region::Named(region.name.clone());

        let bucket = self.reserve(region, logical)?;
        graph.insert(
            ResourceNode::new(&bucket, ResourceKind::Bucket, placement.clone())
                .with_attr("bucket", bucket.clone())
                .with_attr("force_destroy", false)
                .with_attr("tags", self.resource_tags(&bucket, &[])),
        )?;

        let versioning = self.reserve(region, &format!("{}-versioning", logical))?;
        graph.insert(
            ResourceNode::new(&versioning, ResourceKind::BucketVersioning, placement.clone())
                .with_attr("bucket", AttrValue::reference(&bucket, "id"))
                .with_attr(
                    "versioning_configuration",
                    AttrValue::Map(BTreeMap::from([(
                        "status".to_string(),
                        AttrValue::from("Enabled"),
                    )])),
                )
                .with_dependency(&bucket),
        )?;

        let encryption = self.reserve(region, &format!("{}-encryption", logical))?;
        graph.insert(
            ResourceNode::new(&encryption, ResourceKind::BucketEncryption, placement)
                .with_attr("bucket", AttrValue::reference(&bucket, "id"))
                .with_attr(
                    "rule",
                    AttrValue::Map(BTreeMap::from([(
                        "apply_server_side_encryption_by_default".to_string(),
                        AttrValue::Map(BTreeMap::from([
                            ("sse_algorithm".to_string(), AttrValue::from("aws:kms")),
                            (
                                "kms_master_key_id".to_string(),
                                AttrValue::reference(kms_key, "arn"),
                            ),
                        ])),
                    )])),
                )
                .with_dependency(&bucket)
                .with_dependency(kms_key),
        )?;

        Ok(bucket)
    }

    /// Vault, plan, and tag-based selection targeting the database cluster
    fn backup_chain(
        &mut self,
        region: &RegionSpec,
        kms_key: &str,
        db_cluster: &str,
        graph: &mut ResourceGraph,
    ) -> ComposerResult<()> {
        let placement = Region::Named(region.name.clone());

        let vault = self.reserve(region, "backup-vault")?;
        graph.insert(
            ResourceNode::new(&vault, ResourceKind::BackupVault, placement.clone())
                .with_attr("name", vault.clone())
                .with_attr("kms_key_arn", AttrValue::reference(kms_key, "arn"))
                .with_attr("tags", self.resource_tags(&vault, &[]))
                .with_dependency(kms_key),
        )?;

        let plan = self.reserve(region, "backup-plan")?;
        graph.insert(
            ResourceNode::new(&plan, ResourceKind::BackupPlan, placement.clone())
                .with_attr("name", plan.clone())
                .with_attr(
                    "rule",
                    AttrValue::Map(BTreeMap::from([
                        ("rule_name".to_string(), AttrValue::from("daily")),
                        (
                            "target_vault_name".to_string(),
                            AttrValue::reference(&vault, "name"),
                        ),
                        ("schedule".to_string(), AttrValue::from("cron(0 5 * * ? *)")),
                    ])),
                )
                .with_dependency(&vault),
        )?;

        // Selection by label, not by edge: the cluster carries the matching
        // "backup" tag, so there is deliberately no depends_on to it here.
        let selection = self.reserve(region, "backup-selection")?;
        graph.insert(
            ResourceNode::new(&selection, ResourceKind::BackupSelection, placement)
                .with_attr("name", selection.clone())
                .with_attr("plan_id", AttrValue::reference(&plan, "id"))
                .with_attr(
                    "selection_tag",
                    AttrValue::Map(BTreeMap::from([
                        ("type".to_string(), AttrValue::from("STRINGEQUALS")),
                        ("key".to_string(), AttrValue::from("backup")),
                        ("value".to_string(), AttrValue::from(db_cluster)),
                    ])),
                )
                .with_dependency(&plan),
        )?;

        Ok(())
    }
}
