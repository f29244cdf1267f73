// Copyright (c) 2025 - Cowboy AI, Inc.
//! Binding-Layer Seam
//!
//! Turning a [`ResourceNode`] into the literal attribute block for its kind
//! is a collaborator concern, consumed here as a pure function behind the
//! [`NodeEncoder`] trait. [`DefaultBindings`] is the in-tree delegate: it
//! renders attribute values structurally and rewrites `Ref` values into the
//! provisioning dialect's interpolation syntax.

use crate::domain::{AttrValue, ResourceGraph, ResourceNode};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Failure surfaced by a binding-layer delegate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BindingError(pub String);

/// Per-node encoding capability implemented once per resource kind set
pub trait NodeEncoder {
    /// Encode one node into its kind-specific attribute block
    fn encode_node(&self, node: &ResourceNode, graph: &ResourceGraph)
        -> Result<Value, BindingError>;
}

/// Default in-tree binding layer
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBindings;

impl NodeEncoder for DefaultBindings {
    fn encode_node(
        &self,
        node: &ResourceNode,
        graph: &ResourceGraph,
    ) -> Result<Value, BindingError> {
        let mut block = Map::new();
        for (key, value) in &node.attributes {
            block.insert(key.clone(), render(value, graph)?);
        }
        if !node.depends_on.is_empty() {
            let deps: Result<Vec<Value>, BindingError> = node
                .depends_on
                .iter()
                .map(|dep| {
                    let target = graph.get(dep).ok_or_else(|| {
                        BindingError(format!("dependency '{}' is not in the graph", dep))
                    })?;
                    Ok(json!(format!("{}.{}", target.kind.type_name(), target.id)))
                })
                .collect();
            block.insert("depends_on".to_string(), Value::Array(deps?));
        }
        Ok(Value::Object(block))
    }
}

/// Interpolation string for a node attribute, e.g. `${aws_vpc.vpc-x.id}`
pub fn interpolate(graph: &ResourceGraph, node_id: &str, attribute: &str) -> Result<String, BindingError> {
    let target = graph
        .get(node_id)
        .ok_or_else(|| BindingError(format!("reference to '{}' cannot be resolved", node_id)))?;
    Ok(format!(
        "${{{}.{}.{}}}",
        target.kind.type_name(),
        target.id,
        attribute
    ))
}

fn render(value: &AttrValue, graph: &ResourceGraph) -> Result<Value, BindingError> {
    Ok(match value {
        AttrValue::String(s) => json!(s),
        AttrValue::Int(i) => json!(i),
        AttrValue::Bool(b) => json!(b),
        AttrValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| render(item, graph))
                .collect::<Result<_, _>>()?,
        ),
        AttrValue::Map(entries) => {
            let mut out = Map::new();
            for (key, entry) in entries {
                out.insert(key.clone(), render(entry, graph)?);
            }
            Value::Object(out)
        }
        AttrValue::Ref { node, attribute } => json!(interpolate(graph, node, attribute)?),
    })
}
