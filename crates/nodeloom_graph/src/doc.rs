// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural save/restore document.
//!
//! [`GraphDoc`] is the serde-generic snapshot an external serializer needs:
//! node kinds, unique ids, port state, connection endpoints, and nested
//! subgraph content. The engine does not own a wire format, and a
//! collaborator may encode the document however it likes; [`save_ron`] and
//! [`load_ron`] cover the common case and the round-trip tests.

use crate::connection::Connection;
use crate::error::GraphError;
use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::port::{Port, PortType, PortValue};
use crate::registry::NodeRegistry;
use crate::subgraph::Subgraph;
use serde::{Deserialize, Serialize};

/// Snapshot of a whole graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDoc {
    /// Nodes in insertion (evaluation) order.
    pub nodes: Vec<NodeDoc>,
    /// Connections in insertion order.
    pub connections: Vec<Connection>,
}

/// Snapshot of one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDoc {
    /// Kind id, resolved through a [`NodeRegistry`] on restore.
    pub kind: String,
    /// Unique id, preserved across the round-trip.
    pub id: NodeId,
    /// Display name.
    pub name: String,
    /// Top-left corner.
    pub position: [f32; 2],
    /// Width and height.
    pub size: [f32; 2],
    /// Port state, in port order.
    pub ports: Vec<PortDoc>,
    /// Nested graph content for subgraph nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgraph: Option<GraphDoc>,
}

/// Snapshot of one port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDoc {
    /// Port name.
    pub name: String,
    /// Declared value type.
    pub port_type: PortType,
    /// Current value, if any.
    pub value: Option<PortValue>,
    /// Dirty flag.
    pub dirty: bool,
    /// Whether the port may be written by connections.
    pub receives_input: bool,
    /// Whether the port may feed connections.
    pub produces_output: bool,
}

impl From<&Port> for PortDoc {
    fn from(port: &Port) -> Self {
        Self {
            name: port.name().to_string(),
            port_type: port.port_type().clone(),
            value: port.value().cloned(),
            dirty: port.is_dirty(),
            receives_input: port.receives_input(),
            produces_output: port.produces_output(),
        }
    }
}

impl PortDoc {
    fn into_port(self) -> Result<Port, GraphError> {
        let mut port = Port::new(
            self.name,
            self.port_type,
            self.value,
            self.receives_input,
            self.produces_output,
        )?;
        port.set_dirty(self.dirty);
        Ok(port)
    }
}

impl Graph {
    /// Snapshot this graph into a document.
    pub fn to_doc(&self) -> GraphDoc {
        GraphDoc {
            nodes: self.nodes().map(node_doc).collect(),
            connections: self.connections().to_vec(),
        }
    }

    /// Rebuild a graph from a document, resolving node kinds through
    /// `registry`.
    ///
    /// Ids, port state, connections, and nested subgraph content are all
    /// restored; the id allocator resumes above the largest restored id, so
    /// identity stays stable across round-trips and later additions cannot
    /// collide.
    pub fn from_doc(doc: &GraphDoc, registry: &NodeRegistry) -> Result<Graph, GraphError> {
        let mut graph = Graph::new();
        for node_doc in &doc.nodes {
            let mut node = registry.create(&node_doc.kind)?;
            node.set_name(node_doc.name.clone());
            node.set_position(node_doc.position);
            if let Some(subgraph_doc) = &node_doc.subgraph {
                let inner = Graph::from_doc(subgraph_doc, registry)?;
                Subgraph::set_graph(&mut node, &inner)?;
            }
            let ports = node_doc
                .ports
                .iter()
                .cloned()
                .map(PortDoc::into_port)
                .collect::<Result<Vec<_>, _>>()?;
            node.set_ports(ports);
            node.set_size(node_doc.size);
            node.set_id(node_doc.id);
            graph.restore_node(node);
        }
        for connection in &doc.connections {
            graph.connect(
                connection.from_node,
                connection.from_port,
                connection.to_node,
                connection.to_port,
            )?;
        }
        Ok(graph)
    }
}

fn node_doc(node: &Node) -> NodeDoc {
    NodeDoc {
        kind: node.kind().to_string(),
        id: node.id(),
        name: node.name().to_string(),
        position: node.position(),
        size: node.size(),
        ports: node.ports().iter().map(PortDoc::from).collect(),
        subgraph: Subgraph::graph(node).map(Graph::to_doc),
    }
}

/// Serialize a graph to pretty ron.
pub fn save_ron(graph: &Graph) -> Result<String, GraphError> {
    ron::ser::to_string_pretty(&graph.to_doc(), ron::ser::PrettyConfig::default())
        .map_err(|e| GraphError::Document(e.to_string()))
}

/// Restore a graph from ron produced by [`save_ron`].
pub fn load_ron(text: &str, registry: &NodeRegistry) -> Result<Graph, GraphError> {
    let doc: GraphDoc = ron::from_str(text).map_err(|e| GraphError::Document(e.to_string()))?;
    Graph::from_doc(&doc, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::math::{BinaryMath, BinaryOp};
    use crate::nodes::value::{GraphInput, GraphOutput};

    #[test]
    fn test_ron_round_trip() {
        let registry = NodeRegistry::with_builtins();

        let mut graph = Graph::new();
        let a = graph.add_node(GraphInput::node("value"));
        let b = graph.add_node(BinaryMath::node(BinaryOp::Min));
        graph.connect(a, 0, b, 0).unwrap();
        graph
            .node_mut(a)
            .unwrap()
            .port_mut(0)
            .unwrap()
            .set_value(PortValue::Float(7.0));
        graph.node_mut(b).unwrap().set_position([120.0, 40.0]);

        let text = save_ron(&graph).unwrap();
        let mut restored = load_ron(&text, &registry).unwrap();

        assert_eq!(restored.node_count(), 2);
        assert_eq!(restored.connections(), graph.connections());

        let ra = restored.node(a).unwrap();
        assert_eq!(ra.kind(), "graph_input");
        assert_eq!(ra.port(0).unwrap().value(), Some(&PortValue::Float(7.0)));
        assert!(ra.port(0).unwrap().is_dirty());

        let rb = restored.node(b).unwrap();
        assert_eq!(rb.unique_name(), "2-Min");
        assert_eq!(rb.position(), [120.0, 40.0]);

        // identity stays stable: new ids continue above the restored maximum
        let c = restored.add_node(BinaryMath::node(BinaryOp::Add));
        assert_eq!(c, NodeId(3));
    }

    #[test]
    fn test_subgraph_round_trip() {
        let registry = NodeRegistry::with_builtins();

        let mut inner = Graph::new();
        let x = inner.add_node(GraphInput::node("x"));
        let y = inner.add_node(GraphOutput::node("y"));
        inner.connect(x, 0, y, 0).unwrap();

        let mut graph = Graph::new();
        let sg = graph.add_node(Subgraph::node_from(&inner).unwrap());
        graph
            .node_mut(sg)
            .unwrap()
            .port_mut(0)
            .unwrap()
            .set_value(PortValue::Float(6.0));

        let text = save_ron(&graph).unwrap();
        let restored = load_ron(&text, &registry).unwrap();

        let node = restored.node(sg).unwrap();
        assert_eq!(node.kind(), "subgraph");
        assert_eq!(node.ports().len(), 2);
        assert_eq!(node.port(0).unwrap().name(), "x");
        assert_eq!(node.port(0).unwrap().value(), Some(&PortValue::Float(6.0)));

        let nested = Subgraph::graph(node).unwrap();
        assert_eq!(nested.node_count(), 2);
        assert_eq!(nested.connections().len(), 1);
    }

    #[test]
    fn test_unknown_kind_fails_restore() {
        let registry = NodeRegistry::with_builtins();
        let mut graph = Graph::new();
        graph.add_node(GraphInput::node("value"));
        let mut doc = graph.to_doc();
        doc.nodes[0].kind = "vanished".to_string();

        let result = Graph::from_doc(&doc, &registry);
        assert!(matches!(result, Err(GraphError::UnknownKind(_))));
    }

    #[test]
    fn test_malformed_text() {
        let registry = NodeRegistry::with_builtins();
        assert!(matches!(
            load_ron("(nodes: oops", &registry),
            Err(GraphError::Document(_))
        ));
    }
}
