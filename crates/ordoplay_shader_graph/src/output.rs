// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flattened, renderer-facing graph representation.
//!
//! Nothing here refers back into a [`ShaderGraph`](crate::ShaderGraph):
//! nodes are identified by their index in [`FlattenedGraph::nodes`] and
//! sockets by internal name, so the whole structure can be cloned, stored or
//! sent to another thread freely.

use crate::curve::CurveInterpolation;
use crate::point::Point2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Curve parameter baked for the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputCurve {
    /// Control points as authored, for re-editing
    pub control_points: Vec<Point2>,
    /// Interpolation mode as authored
    pub interpolation: CurveInterpolation,
    /// Evaluated curve at evenly spaced x over `[0, 1]` inclusive
    pub samples: Vec<f32>,
}

/// A flattened node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputNode {
    /// Node type ID
    pub node_type: String,
    /// Name handed to the renderer
    pub name: String,
    /// Integer world position (x)
    pub world_x: i32,
    /// Integer world position (y)
    pub world_y: i32,
    /// Float parameters by socket internal name
    pub float_values: IndexMap<String, f32>,
    /// Vector and color parameters by socket internal name
    pub float3_values: IndexMap<String, [f32; 3]>,
    /// Boolean parameters by socket internal name
    pub bool_values: IndexMap<String, bool>,
    /// Integer parameters by socket internal name
    pub int_values: IndexMap<String, i32>,
    /// String enum parameters by socket internal name
    pub string_values: IndexMap<String, String>,
    /// Curve parameters by socket internal name
    pub curve_values: IndexMap<String, OutputCurve>,
}

impl OutputNode {
    /// Create a node with no parameter values
    pub fn new(node_type: impl Into<String>, name: impl Into<String>, world_x: i32, world_y: i32) -> Self {
        Self {
            node_type: node_type.into(),
            name: name.into(),
            world_x,
            world_y,
            ..Self::default()
        }
    }

    /// Whether the node carries no parameter values at all
    pub fn has_no_values(&self) -> bool {
        self.float_values.is_empty()
            && self.float3_values.is_empty()
            && self.bool_values.is_empty()
            && self.int_values.is_empty()
            && self.string_values.is_empty()
            && self.curve_values.is_empty()
    }
}

/// A flattened connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputConnection {
    /// Index of the source node
    pub source_node: usize,
    /// Output socket internal name on the source node
    pub source_socket: String,
    /// Index of the destination node
    pub dest_node: usize,
    /// Input socket internal name on the destination node
    pub dest_socket: String,
}

/// Output of a flattening pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlattenedGraph {
    /// Nodes, in the order they were added to the live graph
    pub nodes: Vec<OutputNode>,
    /// Connections between `nodes` by index
    pub connections: Vec<OutputConnection>,
}
