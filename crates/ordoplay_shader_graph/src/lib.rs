// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader node graph core for `OrdoPlay` Editor.
//!
//! This crate holds everything between the node editor and the renderer:
//! - The live graph model (nodes, typed sockets, connections)
//! - The built-in shader node registry
//! - Curve evaluation shared by curve previews and baking
//! - A versioned text codec for saving and the clipboard
//! - Flattening into the index-addressed renderer representation
//!
//! ## Architecture
//!
//! Nodes live in an insertion-ordered arena keyed by [`NodeId`] handles.
//! Connections refer to nodes by handle and to sockets by internal name, so
//! removing a node can never leave a connection pointing at freed memory.
//! [`flatten`] turns the live graph into plain owned data; [`codec`] encodes
//! that data and rebuilds live graphs from it.

pub mod point;
pub mod socket;
pub mod curve;
pub mod node;
pub mod connection;
pub mod graph;
pub mod nodes;
pub mod output;
pub mod config;
pub mod flatten;
pub mod codec;

pub use point::Point2;
pub use socket::{Socket, SocketDirection, SocketError, SocketType, SocketValue};
pub use curve::{CurveEvaluator, CurveInterpolation, CurveValue};
pub use node::{Node, NodeCategory, NodeId, NodeRegistry, NodeType};
pub use connection::Connection;
pub use graph::{ConnectionError, ShaderGraph};
pub use nodes::create_shader_registry;
pub use output::{FlattenedGraph, OutputConnection, OutputCurve, OutputNode};
pub use config::{ConfigError, FlattenConfig, GraphSettings};
pub use flatten::flatten;
pub use codec::{decode, decode_to_output, encode, encode_graph, DecodeIssue, DecodedGraph, EncodeError};
