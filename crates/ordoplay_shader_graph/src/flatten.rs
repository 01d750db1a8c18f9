// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flattening a live graph into the renderer-facing representation.

use crate::config::FlattenConfig;
use crate::curve::CurveValue;
use crate::graph::ShaderGraph;
use crate::node::{Node, NodeId};
use crate::nodes::MATERIAL_OUTPUT;
use crate::output::{FlattenedGraph, OutputConnection, OutputCurve, OutputNode};
use crate::socket::SocketValue;
use std::collections::{HashMap, HashSet};

/// Renderer name of the material output node
pub const OUTPUT_NODE_NAME: &str = "output";

/// Flatten a graph.
///
/// Nodes keep their insertion order and are addressed by index afterwards.
/// Input sockets that are fed by a connection contribute no value; their
/// value arrives through the corresponding [`OutputConnection`].
pub fn flatten(graph: &ShaderGraph, config: &FlattenConfig) -> FlattenedGraph {
    let connected: HashSet<(NodeId, &str)> = graph
        .connections()
        .map(|c| (c.to_node, c.to_socket.as_str()))
        .collect();

    let mut indices = HashMap::with_capacity(graph.node_count());
    let mut nodes = Vec::with_capacity(graph.node_count());
    for node in graph.nodes() {
        indices.insert(node.id, nodes.len());
        nodes.push(flatten_node(node, &connected, config));
    }

    let connections: Vec<OutputConnection> = graph
        .connections()
        .filter_map(|c| {
            let (Some(&source_node), Some(&dest_node)) = (indices.get(&c.from_node), indices.get(&c.to_node)) else {
                tracing::warn!("Dropping connection to a node outside the graph");
                return None;
            };
            Some(OutputConnection {
                source_node,
                source_socket: c.from_socket.clone(),
                dest_node,
                dest_socket: c.to_socket.clone(),
            })
        })
        .collect();

    tracing::debug!(
        "Flattened graph '{}': {} nodes, {} connections",
        graph.name,
        nodes.len(),
        connections.len()
    );

    FlattenedGraph { nodes, connections }
}

fn flatten_node(node: &Node, connected: &HashSet<(NodeId, &str)>, config: &FlattenConfig) -> OutputNode {
    let name = if node.node_type == MATERIAL_OUTPUT {
        OUTPUT_NODE_NAME
    } else {
        node.title.as_str()
    };
    let mut output = OutputNode::new(
        node.node_type.as_str(),
        name,
        node.position.x.floor() as i32,
        node.position.y.floor() as i32,
    );

    for socket in &node.inputs {
        if connected.contains(&(node.id, socket.internal_name.as_str())) {
            continue;
        }
        let Some(value) = socket.value() else {
            continue;
        };
        let key = socket.internal_name.clone();
        match value {
            SocketValue::Float(v) => {
                output.float_values.insert(key, v.get());
            }
            SocketValue::Int(v) => {
                output.int_values.insert(key, v.get());
            }
            SocketValue::Boolean(v) => {
                output.bool_values.insert(key, *v);
            }
            SocketValue::Vector(v) | SocketValue::Color(v) => {
                output.float3_values.insert(key, *v);
            }
            SocketValue::StringEnum(v) => {
                output.string_values.insert(key, v.selected().to_string());
            }
            SocketValue::Curve(curve) => {
                output.curve_values.insert(key, bake_curve(curve, config));
            }
            SocketValue::Closure => {}
        }
    }

    tracing::trace!("Flattened node '{}' ({})", output.name, output.node_type);
    output
}

/// Bake a curve into its renderer form
pub fn bake_curve(curve: &CurveValue, config: &FlattenConfig) -> OutputCurve {
    let evaluator = curve.evaluator(config.curve_segments);
    OutputCurve {
        control_points: curve.points().to_vec(),
        interpolation: curve.interpolation,
        samples: evaluator.sample_table(config.curve_table_size),
    }
}
