// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the shader graph.

use crate::point::Point2;
use crate::socket::{Socket, SocketDirection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable handle of a node inside a [`ShaderGraph`](crate::ShaderGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Constants and scene inputs
    Input,
    /// Material outputs
    Output,
    /// BSDFs and other closures
    Shader,
    /// Procedural and image textures
    Texture,
    /// Color adjustments
    Color,
    /// Vector operations
    Vector,
    /// Math and conversions
    Converter,
}

/// Node type definition
#[derive(Debug, Clone)]
pub struct NodeType {
    /// Unique type identifier, as written to encoded graphs
    pub id: String,
    /// Default title
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Input sockets with their declared defaults
    pub inputs: Vec<Socket>,
    /// Output sockets
    pub outputs: Vec<Socket>,
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Handle of this node
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Display title (can be customized)
    pub title: String,
    /// Position in the graph view
    pub position: Point2,
    /// Input sockets, in declaration order
    pub inputs: Vec<Socket>,
    /// Output sockets, in declaration order
    pub outputs: Vec<Socket>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            title: node_type.name.clone(),
            position: Point2::default(),
            inputs: node_type.inputs.clone(),
            outputs: node_type.outputs.clone(),
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Point2::new(x, y);
        self
    }

    /// Get an input socket by internal name
    pub fn input(&self, internal_name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.internal_name == internal_name)
    }

    /// Get a mutable input socket by internal name
    pub fn input_mut(&mut self, internal_name: &str) -> Option<&mut Socket> {
        self.inputs.iter_mut().find(|s| s.internal_name == internal_name)
    }

    /// Get an output socket by internal name
    pub fn output(&self, internal_name: &str) -> Option<&Socket> {
        self.outputs.iter().find(|s| s.internal_name == internal_name)
    }

    /// Get a mutable output socket by internal name
    pub fn output_mut(&mut self, internal_name: &str) -> Option<&mut Socket> {
        self.outputs.iter_mut().find(|s| s.internal_name == internal_name)
    }

    /// Get a socket by direction and internal name
    pub fn socket(&self, direction: SocketDirection, internal_name: &str) -> Option<&Socket> {
        match direction {
            SocketDirection::Input => self.input(internal_name),
            SocketDirection::Output => self.output(internal_name),
        }
    }

    /// Get all sockets, inputs first
    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

/// Registry of available node types.
///
/// Decoding rebuilds nodes through [`NodeRegistry::create_node`], so sockets
/// added to a type after a graph was saved come back with their declared
/// defaults.
pub struct NodeRegistry {
    /// Registered node types by ID
    types: indexmap::IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: indexmap::IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::new)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::{FloatValue, SocketType, SocketValue};

    fn test_type() -> NodeType {
        NodeType {
            id: "fresnel".to_string(),
            name: "Fresnel".to_string(),
            category: NodeCategory::Input,
            description: "Dielectric fresnel".to_string(),
            inputs: vec![Socket::input("IOR", "ior", SocketValue::Float(FloatValue::new(1.45, 0.0, 100.0)))],
            outputs: vec![Socket::output("Fac", "fac", SocketType::Float)],
        }
    }

    #[test]
    fn test_registry_creates_fresh_nodes() {
        let mut registry = NodeRegistry::new();
        registry.register(test_type());

        let a = registry.create_node("fresnel").unwrap();
        let b = registry.create_node("fresnel").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, "Fresnel");
        assert!(registry.create_node("unknown").is_none());
        assert_eq!(registry.types_in_category(NodeCategory::Input).count(), 1);
    }

    #[test]
    fn test_socket_lookup_by_direction() {
        let node = Node::new(&test_type()).with_position(10.0, 20.0);
        assert_eq!(node.position, Point2::new(10.0, 20.0));
        assert!(node.socket(SocketDirection::Input, "ior").is_some());
        assert!(node.socket(SocketDirection::Output, "ior").is_none());
        assert!(node.socket(SocketDirection::Output, "fac").is_some());
        assert_eq!(node.sockets().count(), 2);
    }
}
