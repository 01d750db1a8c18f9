// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::Connection;
use crate::node::{Node, NodeId};
use crate::point::Point2;
use indexmap::IndexMap;
use std::collections::HashMap;

/// A shader node graph.
///
/// Nodes are kept in insertion order, which is also the order they are
/// flattened in. Connections refer to nodes by [`NodeId`], and removing a
/// node removes every connection that touches it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderGraph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: Vec<Connection>,
}

impl ShaderGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: Vec::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|c| !c.involves_node(node_id));
        // Keep the remaining nodes in insertion order
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connect an output socket to an input socket
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_socket: &str,
        to_node: NodeId,
        to_socket: &str,
    ) -> Result<(), ConnectionError> {
        let source = self.nodes.get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?;
        let target = self.nodes.get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?;

        if source.output(from_socket).is_none() {
            return Err(if source.input(from_socket).is_some() {
                ConnectionError::NotAnOutput(from_socket.to_string())
            } else {
                ConnectionError::SocketNotFound(from_socket.to_string())
            });
        }
        if target.input(to_socket).is_none() {
            return Err(if target.output(to_socket).is_some() {
                ConnectionError::NotAnInput(to_socket.to_string())
            } else {
                ConnectionError::SocketNotFound(to_socket.to_string())
            });
        }

        if from_node == to_node {
            return Err(ConnectionError::SelfLoop);
        }

        // An input is fed by at most one connection
        if self.is_input_connected(to_node, to_socket) {
            return Err(ConnectionError::InputAlreadyConnected(to_socket.to_string()));
        }

        self.connections.push(Connection::new(from_node, from_socket, to_node, to_socket));
        Ok(())
    }

    /// Remove the connection feeding an input socket
    pub fn disconnect_input(&mut self, node_id: NodeId, input: &str) -> Option<Connection> {
        let index = self.connections.iter().position(|c| c.feeds(node_id, input))?;
        Some(self.connections.remove(index))
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.involves_node(node_id))
    }

    /// Whether an input socket is fed by a connection
    pub fn is_input_connected(&self, node_id: NodeId, input: &str) -> bool {
        self.connections.iter().any(|c| c.feeds(node_id, input))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Copy the selected nodes and the connections between them into a new graph.
    ///
    /// Node handles are preserved in the copy.
    pub fn extract(&self, selection: &[NodeId]) -> ShaderGraph {
        let mut copy = ShaderGraph::new(self.name.clone());
        for node in self.nodes.values().filter(|n| selection.contains(&n.id)) {
            copy.nodes.insert(node.id, node.clone());
        }
        copy.connections = self
            .connections
            .iter()
            .filter(|c| copy.nodes.contains_key(&c.from_node) && copy.nodes.contains_key(&c.to_node))
            .cloned()
            .collect();
        copy
    }

    /// Move another graph's nodes and connections into this graph.
    ///
    /// Every pasted node gets a fresh handle and is shifted by `offset`.
    /// Returns the new handles in the other graph's node order.
    pub fn paste(&mut self, other: ShaderGraph, offset: Point2) -> Vec<NodeId> {
        let mut remap = HashMap::with_capacity(other.nodes.len());
        let mut pasted = Vec::with_capacity(other.nodes.len());
        for (old_id, mut node) in other.nodes {
            node.id = NodeId::new();
            node.position = node.position + offset;
            remap.insert(old_id, node.id);
            pasted.push(self.add_node(node));
        }
        for connection in other.connections {
            let (Some(&from), Some(&to)) = (remap.get(&connection.from_node), remap.get(&connection.to_node)) else {
                continue;
            };
            if let Err(e) = self.connect(from, &connection.from_socket, to, &connection.to_socket) {
                tracing::warn!("Dropping pasted connection: {}", e);
            }
        }
        pasted
    }
}

impl Default for ShaderGraph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Socket not found
    #[error("Socket not found: {0}")]
    SocketNotFound(String),

    /// Connection source is an input socket
    #[error("Socket is not an output: {0}")]
    NotAnOutput(String),

    /// Connection target is an output socket
    #[error("Socket is not an input: {0}")]
    NotAnInput(String),

    /// Input already fed by another connection
    #[error("Input already connected: {0}")]
    InputAlreadyConnected(String),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}
