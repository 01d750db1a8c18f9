// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text encoding of shader graphs for saving and the clipboard.
//!
//! The encoding is a versioned JSON document written from the flattened
//! representation:
//!
//! ```json
//! {
//!   "format": "ordoplay-shader-graph",
//!   "version": 1,
//!   "name": "Material",
//!   "nodes": [
//!     { "type": "value", "name": "Value", "x": 0, "y": 0 },
//!     { "type": "material_output", "name": "output", "x": 300, "y": 0 }
//!   ],
//!   "connections": [
//!     { "source_node": 0, "source_socket": "out", "dest_node": 1, "dest_socket": "surface" }
//!   ]
//! }
//! ```
//!
//! Socket values live in per-kind sections on each node (`floats`,
//! `float3s`, `bools`, `ints`, `strings`, `curves`), so the kind of a value
//! never has to be guessed from its text. Baked curve tables are not stored.
//!
//! Decoding never fails as a whole. Nodes are rebuilt through a
//! [`NodeRegistry`], and anything that cannot be applied (unknown node types,
//! unknown sockets, malformed values, connections to missing sockets) is
//! skipped and recorded as a [`DecodeIssue`]. A field of the wrong JSON type
//! is ignored in favour of its default rather than taking its whole entry
//! down with it.

use crate::config::FlattenConfig;
use crate::curve::{CurveInterpolation, CurveValue};
use crate::flatten::flatten;
use crate::graph::ShaderGraph;
use crate::node::{Node, NodeId, NodeRegistry};
use crate::output::{FlattenedGraph, OutputConnection, OutputNode};
use crate::point::Point2;
use crate::socket::{FloatValue, IntValue, Socket, SocketType, SocketValue};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format identifier written to every encoded graph
pub const FORMAT_NAME: &str = "ordoplay-shader-graph";

/// Current encoding version
pub const FORMAT_VERSION: u32 = 1;

// ============================================================================
// Encoding
// ============================================================================

#[derive(Serialize)]
struct DocumentOut<'a> {
    format: &'static str,
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    nodes: Vec<NodeOut<'a>>,
    connections: &'a [OutputConnection],
}

#[derive(Serialize)]
struct NodeOut<'a> {
    #[serde(rename = "type")]
    node_type: &'a str,
    name: &'a str,
    x: i32,
    y: i32,
    #[serde(skip_serializing_if = "is_empty")]
    floats: &'a IndexMap<String, f32>,
    #[serde(skip_serializing_if = "is_empty")]
    float3s: &'a IndexMap<String, [f32; 3]>,
    #[serde(skip_serializing_if = "is_empty")]
    bools: &'a IndexMap<String, bool>,
    #[serde(skip_serializing_if = "is_empty")]
    ints: &'a IndexMap<String, i32>,
    #[serde(skip_serializing_if = "is_empty")]
    strings: &'a IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    curves: IndexMap<&'a str, EncodedCurve>,
}

#[derive(Serialize, Deserialize)]
struct EncodedCurve {
    points: Vec<[f32; 2]>,
    interpolation: CurveInterpolation,
}

fn is_empty<V>(map: &&IndexMap<String, V>) -> bool {
    map.is_empty()
}

impl<'a> NodeOut<'a> {
    fn new(node: &'a OutputNode) -> Self {
        let curves = node
            .curve_values
            .iter()
            .map(|(name, curve)| {
                let encoded = EncodedCurve {
                    points: curve.control_points.iter().map(|p| p.to_array()).collect(),
                    interpolation: curve.interpolation,
                };
                (name.as_str(), encoded)
            })
            .collect();
        Self {
            node_type: &node.node_type,
            name: &node.name,
            x: node.world_x,
            y: node.world_y,
            floats: &node.float_values,
            float3s: &node.float3_values,
            bools: &node.bool_values,
            ints: &node.int_values,
            strings: &node.string_values,
            curves,
        }
    }
}

/// Error encoding a graph
#[derive(Debug, thiserror::Error)]
#[error("Failed to encode graph: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Encode flattened nodes and connections as text
pub fn encode(nodes: &[OutputNode], connections: &[OutputConnection]) -> Result<String, EncodeError> {
    write_document(None, nodes, connections)
}

/// Flatten a live graph and encode it together with the graph's name
pub fn encode_graph(graph: &ShaderGraph, config: &FlattenConfig) -> Result<String, EncodeError> {
    let flat = flatten(graph, config);
    write_document(Some(&graph.name), &flat.nodes, &flat.connections)
}

fn write_document(
    name: Option<&str>,
    nodes: &[OutputNode],
    connections: &[OutputConnection],
) -> Result<String, EncodeError> {
    let document = DocumentOut {
        format: FORMAT_NAME,
        version: FORMAT_VERSION,
        name,
        nodes: nodes.iter().map(NodeOut::new).collect(),
        connections,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

// ============================================================================
// Decoding
// ============================================================================

/// An entry skipped while decoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeIssue {
    /// Text is not an encoded graph document at all
    #[error("Unreadable graph document: {0}")]
    UnreadableDocument(String),

    /// Document belongs to a different format
    #[error("Unsupported graph format: {0}")]
    ForeignFormat(String),

    /// Document-level field has the wrong type and was ignored
    #[error("Ignoring malformed document field '{field}': {found}")]
    MalformedHeader {
        /// Field name
        field: &'static str,
        /// Value found in the document
        found: String,
    },

    /// Node entry could not be parsed
    #[error("Node {index}: malformed entry: {reason}")]
    MalformedNode {
        /// Position of the entry in the document
        index: usize,
        /// Parser message
        reason: String,
    },

    /// Node field has the wrong type; the default was used instead
    #[error("Node {index}: ignoring malformed field '{field}': {found}")]
    MalformedField {
        /// Position of the node entry in the document
        index: usize,
        /// Field name
        field: &'static str,
        /// Value found in the document
        found: String,
    },

    /// Node type is not in the registry
    #[error("Node {index}: unknown node type '{node_type}'")]
    UnknownNodeType {
        /// Position of the entry in the document
        index: usize,
        /// Node type ID found in the document
        node_type: String,
    },

    /// Node has no input socket with this name
    #[error("Node {index}: unknown socket '{socket}'")]
    UnknownSocket {
        /// Position of the node entry in the document
        index: usize,
        /// Socket internal name found in the document
        socket: String,
    },

    /// Value could not be parsed or does not fit the socket
    #[error("Node {index}: bad {section} value for '{socket}': {reason}")]
    MalformedValue {
        /// Position of the node entry in the document
        index: usize,
        /// Value section the entry was found in
        section: &'static str,
        /// Socket internal name
        socket: String,
        /// What was wrong with it
        reason: String,
    },

    /// Connection entry could not be parsed
    #[error("Connection {index}: malformed entry: {reason}")]
    MalformedConnection {
        /// Position of the entry in the document
        index: usize,
        /// Parser message
        reason: String,
    },

    /// Connection could not be resolved against the rebuilt nodes
    #[error("Connection {index}: {reason}")]
    DanglingConnection {
        /// Position of the entry in the document
        index: usize,
        /// Why it was dropped
        reason: String,
    },
}

/// Result of decoding an encoded graph
#[derive(Debug, Clone)]
pub struct DecodedGraph {
    /// Rebuilt live graph
    pub graph: ShaderGraph,
    /// Entries that were skipped
    pub issues: Vec<DecodeIssue>,
}

impl DecodedGraph {
    /// Whether every entry was decoded
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Collects skipped entries and logs them as they happen
#[derive(Default)]
struct IssueLog(Vec<DecodeIssue>);

impl IssueLog {
    fn push(&mut self, issue: DecodeIssue) {
        tracing::warn!("Skipping graph entry: {}", issue);
        self.0.push(issue);
    }
}

/// Fields of a JSON object, taken out one at a time
struct Fields<'a> {
    fields: Map<String, Value>,
    /// Node entry the fields belong to; `None` for the document itself
    node: Option<usize>,
    log: &'a mut IssueLog,
}

impl Fields<'_> {
    /// Take a field. A field that is present but unreadable is logged and
    /// treated as missing.
    fn take<T>(&mut self, field: &'static str, read: fn(Value) -> Result<T, Value>) -> Option<T> {
        let value = self.fields.remove(field).filter(|v| !v.is_null())?;
        match read(value) {
            Ok(parsed) => Some(parsed),
            Err(found) => {
                let found = found.to_string();
                self.log.push(match self.node {
                    Some(index) => DecodeIssue::MalformedField { index, field, found },
                    None => DecodeIssue::MalformedHeader { field, found },
                });
                None
            }
        }
    }
}

fn read_string(value: Value) -> Result<String, Value> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(other),
    }
}

fn read_array(value: Value) -> Result<Vec<Value>, Value> {
    match value {
        Value::Array(entries) => Ok(entries),
        other => Err(other),
    }
}

fn read_object(value: Value) -> Result<Map<String, Value>, Value> {
    match value {
        Value::Object(entries) => Ok(entries),
        other => Err(other),
    }
}

fn read_version(value: Value) -> Result<u64, Value> {
    value.as_u64().ok_or(value)
}

fn read_coordinate(value: Value) -> Result<f32, Value> {
    match value.as_f64() {
        Some(c) if (c as f32).is_finite() => Ok(c as f32),
        _ => Err(value),
    }
}

/// Document-level fields
struct Header {
    format: Option<String>,
    version: Option<u64>,
    name: Option<String>,
    nodes: Vec<Value>,
    connections: Vec<Value>,
}

impl Header {
    fn read(fields: Map<String, Value>, log: &mut IssueLog) -> Self {
        let mut fields = Fields { fields, node: None, log };
        Self {
            format: fields.take("format", read_string),
            version: fields.take("version", read_version),
            name: fields.take("name", read_string),
            nodes: fields.take("nodes", read_array).unwrap_or_default(),
            connections: fields.take("connections", read_array).unwrap_or_default(),
        }
    }
}

/// Decode an encoded graph into a fresh live graph
pub fn decode(text: &str, registry: &NodeRegistry) -> DecodedGraph {
    let mut graph = ShaderGraph::default();
    let mut log = IssueLog::default();

    let fields = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => {
            log.push(DecodeIssue::UnreadableDocument("expected a JSON object".to_string()));
            return DecodedGraph { graph, issues: log.0 };
        }
        Err(e) => {
            log.push(DecodeIssue::UnreadableDocument(e.to_string()));
            return DecodedGraph { graph, issues: log.0 };
        }
    };
    let header = Header::read(fields, &mut log);

    if let Some(format) = header.format.filter(|f| f != FORMAT_NAME) {
        log.push(DecodeIssue::ForeignFormat(format));
        return DecodedGraph { graph, issues: log.0 };
    }
    if let Some(version) = header.version.filter(|v| *v > u64::from(FORMAT_VERSION)) {
        tracing::warn!(
            "Graph version {} is newer than supported version {}; unknown entries will be dropped",
            version,
            FORMAT_VERSION
        );
    }
    if let Some(name) = header.name {
        graph.name = name;
    }

    // Document index -> handle of the rebuilt node, if it survived
    let mut handles: Vec<Option<NodeId>> = Vec::with_capacity(header.nodes.len());
    for (index, entry) in header.nodes.into_iter().enumerate() {
        let node = decode_node(index, entry, registry, &mut log);
        handles.push(node.map(|node| graph.add_node(node)));
    }

    for (index, entry) in header.connections.into_iter().enumerate() {
        let connection: OutputConnection = match serde_json::from_value(entry) {
            Ok(connection) => connection,
            Err(e) => {
                log.push(DecodeIssue::MalformedConnection { index, reason: e.to_string() });
                continue;
            }
        };
        let handle = |i: usize| handles.get(i).copied().flatten();
        let (Some(from), Some(to)) = (handle(connection.source_node), handle(connection.dest_node)) else {
            log.push(DecodeIssue::DanglingConnection {
                index,
                reason: "references a node that was not decoded".to_string(),
            });
            continue;
        };
        if let Err(e) = graph.connect(from, &connection.source_socket, to, &connection.dest_socket) {
            log.push(DecodeIssue::DanglingConnection { index, reason: e.to_string() });
        }
    }

    tracing::debug!(
        "Decoded graph '{}': {} nodes, {} connections, {} skipped entries",
        graph.name,
        graph.node_count(),
        graph.connection_count(),
        log.0.len()
    );

    DecodedGraph { graph, issues: log.0 }
}

/// Decode an encoded graph straight to its flattened form.
///
/// Skipped entries are logged and otherwise ignored.
pub fn decode_to_output(text: &str, registry: &NodeRegistry, config: &FlattenConfig) -> FlattenedGraph {
    let decoded = decode(text, registry);
    flatten(&decoded.graph, config)
}

fn decode_node(index: usize, entry: Value, registry: &NodeRegistry, log: &mut IssueLog) -> Option<Node> {
    let mut fields = match entry {
        Value::Object(fields) => fields,
        other => {
            log.push(DecodeIssue::MalformedNode { index, reason: format!("expected an object, found {other}") });
            return None;
        }
    };
    let node_type = match fields.remove("type") {
        Some(Value::String(node_type)) => node_type,
        Some(other) => {
            log.push(DecodeIssue::MalformedNode { index, reason: format!("node type must be a string, found {other}") });
            return None;
        }
        None => {
            log.push(DecodeIssue::MalformedNode { index, reason: "missing node type".to_string() });
            return None;
        }
    };
    let Some(node) = registry.create_node(&node_type) else {
        log.push(DecodeIssue::UnknownNodeType { index, node_type });
        return None;
    };

    let mut fields = Fields { fields, node: Some(index), log };
    let x = fields.take("x", read_coordinate).unwrap_or(0.0);
    let y = fields.take("y", read_coordinate).unwrap_or(0.0);
    let mut node = node.with_position(x, y);
    if let Some(name) = fields.take("name", read_string) {
        node.title = name;
    }
    let floats = fields.take("floats", read_object).unwrap_or_default();
    let float3s = fields.take("float3s", read_object).unwrap_or_default();
    let bools = fields.take("bools", read_object).unwrap_or_default();
    let ints = fields.take("ints", read_object).unwrap_or_default();
    let strings = fields.take("strings", read_object).unwrap_or_default();
    let curves = fields.take("curves", read_object).unwrap_or_default();

    let mut section = Section { node: &mut node, index, log: fields.log };
    section.apply("floats", floats, assign_float);
    section.apply("float3s", float3s, assign_float3);
    section.apply("bools", bools, assign_bool);
    section.apply("ints", ints, assign_int);
    section.apply("strings", strings, assign_string);
    section.apply("curves", curves, assign_curve);

    Some(node)
}

/// Applies one value section of a node entry
struct Section<'a> {
    node: &'a mut Node,
    index: usize,
    log: &'a mut IssueLog,
}

impl Section<'_> {
    fn apply<T: DeserializeOwned>(
        &mut self,
        section: &'static str,
        entries: Map<String, Value>,
        assign: fn(&Socket, T) -> Result<SocketValue, String>,
    ) {
        for (socket_name, raw) in entries {
            let Some(socket) = self.node.input_mut(&socket_name) else {
                self.log.push(DecodeIssue::UnknownSocket { index: self.index, socket: socket_name });
                continue;
            };
            let result = serde_json::from_value::<T>(raw)
                .map_err(|e| e.to_string())
                .and_then(|parsed| assign(socket, parsed))
                .and_then(|value| socket.set_value(value).map_err(|e| e.to_string()));
            if let Err(reason) = result {
                self.log.push(DecodeIssue::MalformedValue {
                    index: self.index,
                    section,
                    socket: socket_name,
                    reason,
                });
            }
        }
    }
}

fn wrong_type(socket: &Socket) -> String {
    format!("socket holds {} values", socket.socket_type())
}

fn assign_float(socket: &Socket, value: f32) -> Result<SocketValue, String> {
    match (socket.socket_type(), socket.value()) {
        (SocketType::Float, Some(SocketValue::Float(current))) => {
            let mut updated = *current;
            updated.set(value);
            Ok(SocketValue::Float(updated))
        }
        (SocketType::Float, _) => Ok(SocketValue::Float(FloatValue::unbounded(value))),
        _ => Err(wrong_type(socket)),
    }
}

fn assign_int(socket: &Socket, value: i32) -> Result<SocketValue, String> {
    match (socket.socket_type(), socket.value()) {
        (SocketType::Int, Some(SocketValue::Int(current))) => {
            let mut updated = *current;
            updated.set(value);
            Ok(SocketValue::Int(updated))
        }
        (SocketType::Int, _) => Ok(SocketValue::Int(IntValue::new(value, i32::MIN, i32::MAX))),
        _ => Err(wrong_type(socket)),
    }
}

fn assign_bool(socket: &Socket, value: bool) -> Result<SocketValue, String> {
    match socket.socket_type() {
        SocketType::Boolean => Ok(SocketValue::Boolean(value)),
        _ => Err(wrong_type(socket)),
    }
}

fn assign_float3(socket: &Socket, value: [f32; 3]) -> Result<SocketValue, String> {
    match socket.socket_type() {
        SocketType::Vector => Ok(SocketValue::Vector(value)),
        SocketType::Color => Ok(SocketValue::Color(value)),
        _ => Err(wrong_type(socket)),
    }
}

fn assign_string(socket: &Socket, value: String) -> Result<SocketValue, String> {
    match socket.value() {
        Some(SocketValue::StringEnum(current)) => {
            let mut updated = current.clone();
            if updated.select(&value) {
                Ok(SocketValue::StringEnum(updated))
            } else {
                Err(format!("'{value}' is not one of the socket's options"))
            }
        }
        _ => Err(wrong_type(socket)),
    }
}

fn assign_curve(socket: &Socket, value: EncodedCurve) -> Result<SocketValue, String> {
    match socket.socket_type() {
        SocketType::Curve => {
            let points: Vec<Point2> = value.points.into_iter().map(Point2::from).collect();
            Ok(SocketValue::Curve(CurveValue::new(points, value.interpolation)))
        }
        _ => Err(wrong_type(socket)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{create_shader_registry, MATERIAL_OUTPUT, VALUE};

    fn value_into_output() -> ShaderGraph {
        let registry = create_shader_registry();
        let mut graph = ShaderGraph::new("Round Trip");
        let mut value = registry.create_node(VALUE).unwrap().with_position(-120.0, 40.0);
        value
            .input_mut("value")
            .unwrap()
            .set_value(SocketValue::Float(FloatValue::unbounded(1.0)))
            .unwrap();
        let value = graph.add_node(value);
        let output = graph.add_node(registry.create_node(MATERIAL_OUTPUT).unwrap().with_position(200.0, 0.0));
        graph.connect(value, "out", output, "surface").unwrap();
        graph
    }

    fn edited_material() -> ShaderGraph {
        let registry = create_shader_registry();
        let mut graph = ShaderGraph::new("Edited");

        let mut bsdf = registry.create_node("principled_bsdf").unwrap().with_position(0.0, 0.0);
        bsdf.title = "Car \"Paint\" | coat".to_string();
        let roughness = bsdf.input_mut("roughness").unwrap();
        roughness.set_value(SocketValue::Float(FloatValue::new(0.125, 0.0, 1.0))).unwrap();
        let Some(SocketValue::StringEnum(distribution)) = bsdf.input("distribution").and_then(Socket::value) else {
            panic!("distribution is a string enum");
        };
        let mut distribution = distribution.clone();
        assert!(distribution.select("GGX"));
        bsdf.input_mut("distribution").unwrap().set_value(SocketValue::StringEnum(distribution)).unwrap();
        let bsdf = graph.add_node(bsdf);

        let mut curves = registry.create_node("rgb_curves").unwrap().with_position(-300.0, 80.0);
        curves
            .input_mut("curve_r")
            .unwrap()
            .set_value(SocketValue::Curve(CurveValue::new(
                [Point2::new(0.0, 0.1), Point2::new(0.4, 0.7), Point2::new(1.0, 0.9)],
                CurveInterpolation::Linear,
            )))
            .unwrap();
        let curves = graph.add_node(curves);

        let mut brick = registry.create_node("brick_texture").unwrap().with_position(-600.0, 80.0);
        brick.input_mut("offset_frequency").unwrap().set_value(SocketValue::Int(IntValue::new(4, 1, 99))).unwrap();
        let brick = graph.add_node(brick);

        let mut bump = registry.create_node("bump").unwrap();
        bump.input_mut("invert").unwrap().set_value(SocketValue::Boolean(true)).unwrap();
        let bump = graph.add_node(bump);

        let output = graph.add_node(registry.create_node(MATERIAL_OUTPUT).unwrap().with_position(300.0, 0.0));

        graph.connect(brick, "color", curves, "color").unwrap();
        graph.connect(curves, "color", bsdf, "base_color").unwrap();
        graph.connect(bump, "normal", bsdf, "normal").unwrap();
        graph.connect(bsdf, "BSDF", output, "surface").unwrap();
        graph
    }

    #[test]
    fn test_encode_decode_encode_is_stable() {
        let registry = create_shader_registry();
        let config = FlattenConfig::default();
        for graph in [value_into_output(), edited_material()] {
            let first = encode_graph(&graph, &config).unwrap();
            let decoded = decode(&first, &registry);
            assert!(decoded.is_complete(), "{:?}", decoded.issues);
            let second = encode_graph(&decoded.graph, &config).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_decoded_graph_keeps_values() {
        let registry = create_shader_registry();
        let config = FlattenConfig::default();
        let original = flatten(&edited_material(), &config);
        let text = encode(&original.nodes, &original.connections).unwrap();
        let decoded = decode(&text, &registry);

        let round_tripped = flatten(&decoded.graph, &config);
        assert_eq!(round_tripped, original);
        assert_eq!(round_tripped.nodes[0].name, "Car \"Paint\" | coat");
        assert_eq!(round_tripped.nodes[0].string_values["distribution"], "GGX");
        assert_eq!(round_tripped.nodes[1].curve_values["curve_r"].control_points.len(), 3);
        assert_eq!(round_tripped.nodes[2].int_values["offset_frequency"], 4);
        assert!(round_tripped.nodes[3].bool_values["invert"]);
    }

    #[test]
    fn test_value_kinds_are_tagged() {
        let flat = flatten(&edited_material(), &FlattenConfig::default());
        let text = encode(&flat.nodes, &flat.connections).unwrap();
        let document: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(document["format"], FORMAT_NAME);
        assert_eq!(document["version"], FORMAT_VERSION);
        assert!(document["nodes"][0]["floats"]["roughness"].is_number());
        assert!(document["nodes"][0]["strings"]["distribution"].is_string());
        assert!(document["nodes"][1]["curves"]["curve_r"]["points"].is_array());
        assert_eq!(document["nodes"][1]["curves"]["curve_r"]["interpolation"], "linear");
        assert!(document["nodes"][1]["curves"]["curve_r"].get("samples").is_none());
        assert!(document["nodes"][2]["ints"]["offset_frequency"].is_i64());
        assert!(document["nodes"][3]["bools"]["invert"].is_boolean());
        // Material output has no direct values at all
        assert!(document["nodes"][4].get("floats").is_none());
    }

    #[test]
    fn test_decode_skips_unknown_entries() {
        let registry = create_shader_registry();
        let text = r#"{
            "format": "ordoplay-shader-graph",
            "version": 1,
            "nodes": [
                { "type": "value", "name": "Value", "x": 0, "y": 0 },
                { "type": "hologram_bsdf", "name": "From The Future", "x": 10, "y": 10 },
                { "type": "principled_bsdf", "x": 20, "y": 20,
                  "floats": { "roughness": 0.25, "sheen": 0.5, "metallic": "shiny", "use_clamp": 1.0 },
                  "strings": { "distribution": "Beckmann" },
                  "bools": { "roughness": true } },
                { "type": "material_output", "name": "output", "x": 40, "y": 0 },
                { "name": "no type" }
            ],
            "connections": [
                { "source_node": 1, "source_socket": "BSDF", "dest_node": 3, "dest_socket": "surface" },
                { "source_node": 2, "source_socket": "BSDF", "dest_node": 3, "dest_socket": "surface" },
                { "source_node": 2, "source_socket": "BSDF", "dest_node": 3, "dest_socket": "volume_v2" },
                { "source_node": 0, "source_socket": "out", "dest_node": 17, "dest_socket": "surface" },
                { "source_node": "zero" }
            ]
        }"#;

        let decoded = decode(text, &registry);
        let graph = &decoded.graph;
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.connection_count(), 1);

        let bsdf = graph.nodes().nth(1).unwrap();
        assert_eq!(bsdf.title, "Principled BSDF");
        assert_eq!(bsdf.position, Point2::new(20.0, 20.0));
        match bsdf.input("roughness").and_then(Socket::value) {
            Some(SocketValue::Float(v)) => assert_eq!(v.get(), 0.25),
            other => panic!("unexpected value {other:?}"),
        }
        match bsdf.input("metallic").and_then(Socket::value) {
            Some(SocketValue::Float(v)) => assert_eq!(v.get(), 0.0),
            other => panic!("unexpected value {other:?}"),
        }
        match bsdf.input("distribution").and_then(Socket::value) {
            Some(SocketValue::StringEnum(v)) => assert_eq!(v.selected(), "Multiscatter GGX"),
            other => panic!("unexpected value {other:?}"),
        }

        let issues = &decoded.issues;
        assert!(issues.contains(&DecodeIssue::UnknownNodeType { index: 1, node_type: "hologram_bsdf".to_string() }));
        assert!(issues.contains(&DecodeIssue::UnknownSocket { index: 2, socket: "sheen".to_string() }));
        assert!(issues.contains(&DecodeIssue::UnknownSocket { index: 2, socket: "use_clamp".to_string() }));
        assert!(issues.iter().any(|i| matches!(
            i,
            DecodeIssue::MalformedValue { index: 2, section: "floats", socket, .. } if socket == "metallic"
        )));
        assert!(issues.iter().any(|i| matches!(
            i,
            DecodeIssue::MalformedValue { index: 2, section: "strings", socket, .. } if socket == "distribution"
        )));
        assert!(issues.iter().any(|i| matches!(
            i,
            DecodeIssue::MalformedValue { index: 2, section: "bools", socket, .. } if socket == "roughness"
        )));
        assert!(issues.iter().any(|i| matches!(i, DecodeIssue::MalformedNode { index: 4, .. })));
        assert!(issues.iter().any(|i| matches!(i, DecodeIssue::DanglingConnection { index: 0, .. })));
        assert!(issues.iter().any(|i| matches!(i, DecodeIssue::DanglingConnection { index: 2, .. })));
        assert!(issues.iter().any(|i| matches!(i, DecodeIssue::DanglingConnection { index: 3, .. })));
        assert!(issues.iter().any(|i| matches!(i, DecodeIssue::MalformedConnection { index: 4, .. })));
        assert_eq!(issues.len(), 11);
    }

    #[test]
    fn test_decode_fills_missing_fields_with_defaults() {
        let registry = create_shader_registry();
        let decoded = decode(r#"{ "nodes": [ { "type": "emission" } ] }"#, &registry);
        assert!(decoded.is_complete());
        let node = decoded.graph.nodes().next().unwrap();
        assert_eq!(node.title, "Emission");
        assert_eq!(node.position, Point2::new(0.0, 0.0));
        assert_eq!(node.input("color").and_then(Socket::value), Some(&SocketValue::Color([1.0, 1.0, 1.0])));
    }

    #[test]
    fn test_decode_clamps_out_of_range_values() {
        let registry = create_shader_registry();
        let text = r#"{ "nodes": [ { "type": "brick_texture", "floats": { "offset": 7.5 }, "ints": { "offset_frequency": 500 } } ] }"#;
        let flat = decode_to_output(text, &registry, &FlattenConfig::default());
        assert_eq!(flat.nodes[0].float_values["offset"], 1.0);
        assert_eq!(flat.nodes[0].int_values["offset_frequency"], 99);
    }

    #[test]
    fn test_decode_newer_version_still_loads() {
        let registry = create_shader_registry();
        let text = r#"{ "format": "ordoplay-shader-graph", "version": 9, "nodes": [ { "type": "value" } ], "layers": [] }"#;
        let decoded = decode(text, &registry);
        assert!(decoded.is_complete());
        assert_eq!(decoded.graph.node_count(), 1);
    }

    #[test]
    fn test_decode_rejects_foreign_documents() {
        let registry = create_shader_registry();

        let decoded = decode("not a graph", &registry);
        assert_eq!(decoded.graph.node_count(), 0);
        assert!(matches!(decoded.issues.as_slice(), [DecodeIssue::UnreadableDocument(_)]));

        let decoded = decode(r#"{ "format": "patch-bay", "nodes": [ { "type": "value" } ] }"#, &registry);
        assert_eq!(decoded.graph.node_count(), 0);
        assert_eq!(decoded.issues, vec![DecodeIssue::ForeignFormat("patch-bay".to_string())]);
    }

    #[test]
    fn test_decode_to_output_scenario() {
        let registry = create_shader_registry();
        let config = FlattenConfig::default();
        let text = encode_graph(&value_into_output(), &config).unwrap();
        let flat = decode_to_output(&text, &registry, &config);
        assert_eq!(flat.nodes.len(), 2);
        assert_eq!(flat.nodes[1].name, "output");
        assert_eq!(flat.connections.len(), 1);
        assert_eq!(flat.connections[0].source_socket, "out");
        assert_eq!(flat.connections[0].dest_socket, "surface");
    }

    #[test]
    fn test_constants_survive_round_trip() {
        let registry = create_shader_registry();
        let mut graph = ShaderGraph::new("Constants");
        let mut value = registry.create_node(VALUE).unwrap();
        value.input_mut("value").unwrap().set_value(SocketValue::Float(FloatValue::unbounded(0.7))).unwrap();
        graph.add_node(value);
        let mut rgb = registry.create_node("rgb").unwrap();
        rgb.input_mut("value").unwrap().set_value(SocketValue::Color([1.0, 0.0, 0.0])).unwrap();
        graph.add_node(rgb);

        let text = encode_graph(&graph, &FlattenConfig::default()).unwrap();
        let decoded = decode(&text, &registry);
        assert!(decoded.is_complete(), "{:?}", decoded.issues);

        let mut nodes = decoded.graph.nodes();
        match nodes.next().and_then(|n| n.input("value")).and_then(Socket::value) {
            Some(SocketValue::Float(v)) => assert_eq!(v.get(), 0.7),
            other => panic!("unexpected value {other:?}"),
        }
        assert_eq!(
            nodes.next().and_then(|n| n.input("value")).and_then(Socket::value),
            Some(&SocketValue::Color([1.0, 0.0, 0.0]))
        );
    }

    #[test]
    fn test_nan_float_keeps_round_trip_stable() {
        let registry = create_shader_registry();
        let config = FlattenConfig::default();
        let mut graph = ShaderGraph::default();
        let mut bsdf = registry.create_node("principled_bsdf").unwrap();
        let Some(SocketValue::Float(roughness)) = bsdf.input("roughness").and_then(Socket::value) else {
            panic!("roughness is a float");
        };
        let mut roughness = *roughness;
        roughness.set(f32::NAN);
        bsdf.input_mut("roughness").unwrap().set_value(SocketValue::Float(roughness)).unwrap();
        graph.add_node(bsdf);

        let first = encode_graph(&graph, &config).unwrap();
        assert!(!first.contains("null"));
        let second = encode_graph(&decode(&first, &registry).graph, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_graph_name_round_trips() {
        let registry = create_shader_registry();
        let mut graph = value_into_output();
        graph.name = "Car \"Paint\"".to_string();
        let text = encode_graph(&graph, &FlattenConfig::default()).unwrap();
        assert_eq!(decode(&text, &registry).graph.name, "Car \"Paint\"");

        let flat = flatten(&graph, &FlattenConfig::default());
        let unnamed = encode(&flat.nodes, &flat.connections).unwrap();
        assert_eq!(decode(&unnamed, &registry).graph.name, ShaderGraph::default().name);
    }

    #[test]
    fn test_malformed_header_fields_are_ignored() {
        let registry = create_shader_registry();
        let text = r#"{
            "version": "2",
            "format": 7,
            "name": ["not", "a", "name"],
            "nodes": [ { "type": "value" }, { "type": "material_output" } ],
            "connections": [ { "source_node": 0, "source_socket": "out", "dest_node": 1, "dest_socket": "surface" } ]
        }"#;
        let decoded = decode(text, &registry);
        assert_eq!(decoded.graph.node_count(), 2);
        assert_eq!(decoded.graph.connection_count(), 1);
        assert_eq!(decoded.graph.name, ShaderGraph::default().name);
        assert_eq!(
            decoded.issues,
            vec![
                DecodeIssue::MalformedHeader { field: "format", found: "7".to_string() },
                DecodeIssue::MalformedHeader { field: "version", found: "\"2\"".to_string() },
                DecodeIssue::MalformedHeader { field: "name", found: r#"["not","a","name"]"#.to_string() },
            ]
        );
    }

    #[test]
    fn test_non_array_lists_are_ignored() {
        let registry = create_shader_registry();
        let decoded = decode(r#"{ "nodes": { "type": "value" }, "connections": "none" }"#, &registry);
        assert_eq!(decoded.graph.node_count(), 0);
        assert!(matches!(
            decoded.issues.as_slice(),
            [DecodeIssue::MalformedHeader { field: "nodes", .. }, DecodeIssue::MalformedHeader { field: "connections", .. }]
        ));

        let decoded = decode(r#"{ "nodes": [ { "type": "value" } ], "connections": null }"#, &registry);
        assert_eq!(decoded.graph.node_count(), 1);
        assert!(decoded.is_complete());
    }

    #[test]
    fn test_malformed_node_fields_keep_the_node() {
        let registry = create_shader_registry();
        let text = r#"{
            "nodes": [
                { "type": "emission", "x": 10.5, "y": "up", "name": 7, "floats": { "strength": 3.0 }, "bools": [true] },
                { "type": "material_output", "x": 1e300 }
            ],
            "connections": [ { "source_node": 0, "source_socket": "emission", "dest_node": 1, "dest_socket": "surface" } ]
        }"#;
        let decoded = decode(text, &registry);
        assert_eq!(decoded.graph.node_count(), 2);
        assert_eq!(decoded.graph.connection_count(), 1);

        let emission = decoded.graph.nodes().next().unwrap();
        assert_eq!(emission.title, "Emission");
        assert_eq!(emission.position, Point2::new(10.5, 0.0));
        match emission.input("strength").and_then(Socket::value) {
            Some(SocketValue::Float(v)) => assert_eq!(v.get(), 3.0),
            other => panic!("unexpected value {other:?}"),
        }
        assert_eq!(decoded.graph.nodes().nth(1).unwrap().position, Point2::new(0.0, 0.0));

        assert_eq!(
            decoded.issues,
            vec![
                DecodeIssue::MalformedField { index: 0, field: "y", found: "\"up\"".to_string() },
                DecodeIssue::MalformedField { index: 0, field: "name", found: "7".to_string() },
                DecodeIssue::MalformedField { index: 0, field: "bools", found: "[true]".to_string() },
                DecodeIssue::MalformedField { index: 1, field: "x", found: "1e300".to_string() },
            ]
        );

        let flat = flatten(&decoded.graph, &FlattenConfig::default());
        assert_eq!(flat.nodes[0].world_x, 10);
    }
}
