// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;

/// A connection from an output socket to an input socket.
///
/// Endpoints are node handles plus socket internal names, so a connection
/// never points into a node directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Source node
    pub from_node: NodeId,
    /// Output socket internal name on the source node
    pub from_socket: String,
    /// Target node
    pub to_node: NodeId,
    /// Input socket internal name on the target node
    pub to_socket: String,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        from_node: NodeId,
        from_socket: impl Into<String>,
        to_node: NodeId,
        to_socket: impl Into<String>,
    ) -> Self {
        Self {
            from_node,
            from_socket: from_socket.into(),
            to_node,
            to_socket: to_socket.into(),
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this connection feeds the given input socket
    pub fn feeds(&self, node_id: NodeId, input: &str) -> bool {
        self.to_node == node_id && self.to_socket == input
    }
}
