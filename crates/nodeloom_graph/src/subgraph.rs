// SPDX-License-Identifier: MIT OR Apache-2.0
//! A node whose computation is a nested graph.

use crate::error::GraphError;
use crate::graph::Graph;
use crate::node::{Node, NodeBehavior, NodeId};
use crate::port::{clean_inputs, Port};
use std::any::Any;

/// Kind id under which subgraph nodes are registered.
pub const SUBGRAPH_KIND: &str = "subgraph";

/// Pairing between an outer port on the subgraph node and the inner port it
/// mirrors. The outer port's index equals the pair's position in the list.
#[derive(Debug, Clone, Copy)]
struct PortPair {
    inner_node: NodeId,
    inner_port: usize,
}

/// A node behavior that owns a nested [`Graph`] and mirrors selected inner
/// ports onto the node, direction-inverted, so the containing graph can
/// treat the whole nested network as one opaque node.
///
/// Each update pushes dirty outer inputs into their paired inner ports,
/// pulls dirty inner values out to the paired outer outputs, and advances
/// the nested graph by one tick, so values crossing the boundary obey the
/// same one-step lag as any other connection.
#[derive(Debug, Clone, Default)]
pub struct Subgraph {
    graph: Graph,
    pairs: Vec<PortPair>,
}

impl Subgraph {
    /// An empty subgraph node.
    pub fn node() -> Node {
        Node::new("SubGraph", Vec::new(), Box::new(Subgraph::default()))
    }

    /// A subgraph node wrapping a deep copy of `graph`.
    pub fn node_from(graph: &Graph) -> Result<Node, GraphError> {
        let mut node = Self::node();
        Self::set_graph(&mut node, graph)?;
        Ok(node)
    }

    /// Install a deep copy of `graph` on `node`, replacing any nested graph
    /// and port pairing already there, and rebuild the node's ports from
    /// the boundary markers found inside.
    ///
    /// Inner ports are exposed direction-inverted: an output-capable port
    /// on an [`is_graph_input`](NodeBehavior::is_graph_input) kind becomes
    /// an input-capable outer port, and an input-capable port on an
    /// [`is_graph_output`](NodeBehavior::is_graph_output) kind becomes an
    /// output-capable outer port. Ports the subgraph receives come first,
    /// then the ports it produces, alphabetically by inner port name within
    /// each group. This gives serializers and layout a deterministic order.
    ///
    /// Fails with [`GraphError::UnknownKind`] when `node` is not a subgraph
    /// node.
    pub fn set_graph(node: &mut Node, graph: &Graph) -> Result<(), GraphError> {
        let inner = graph.clone();

        // (receives-group, outer port, pair) triples, then sort
        let mut paired: Vec<(bool, Port, PortPair)> = Vec::new();
        for n in inner.nodes() {
            if n.behavior().is_graph_input() {
                for (index, port) in n.ports().iter().enumerate() {
                    if port.produces_output() {
                        paired.push((
                            true,
                            port.inverse(),
                            PortPair {
                                inner_node: n.id(),
                                inner_port: index,
                            },
                        ));
                    }
                }
            }
            if n.behavior().is_graph_output() {
                for (index, port) in n.ports().iter().enumerate() {
                    if port.receives_input() {
                        paired.push((
                            false,
                            port.inverse(),
                            PortPair {
                                inner_node: n.id(),
                                inner_port: index,
                            },
                        ));
                    }
                }
            }
        }
        paired.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name().cmp(b.1.name())));

        let node_kind = node.kind().to_string();
        let behavior = node
            .behavior_mut()
            .as_any_mut()
            .downcast_mut::<Subgraph>()
            .ok_or_else(|| GraphError::UnknownKind(node_kind))?;
        behavior.graph = inner;
        behavior.pairs = paired.iter().map(|(_, _, pair)| *pair).collect();

        let ports: Vec<Port> = paired.into_iter().map(|(_, port, _)| port).collect();
        tracing::debug!(ports = ports.len(), "installed nested graph");
        node.set_ports(ports);
        Ok(())
    }

    /// The nested graph of a subgraph node, if `node` is one. Gives a
    /// persistence collaborator structural access to the nested content.
    pub fn graph(node: &Node) -> Option<&Graph> {
        node.behavior()
            .as_any()
            .downcast_ref::<Subgraph>()
            .map(|s| &s.graph)
    }

    /// Mutable access to the nested graph of a subgraph node.
    pub fn graph_mut(node: &mut Node) -> Option<&mut Graph> {
        node.behavior_mut()
            .as_any_mut()
            .downcast_mut::<Subgraph>()
            .map(|s| &mut s.graph)
    }
}

impl NodeBehavior for Subgraph {
    fn kind(&self) -> &str {
        SUBGRAPH_KIND
    }

    fn update(&mut self, ports: &mut [Port]) -> Result<(), GraphError> {
        // push dirty outer inputs into their paired inner ports
        for (index, pair) in self.pairs.iter().enumerate() {
            let value = ports
                .get(index)
                .filter(|p| p.receives_input() && p.is_dirty())
                .and_then(|p| p.value().cloned());
            let Some(value) = value else {
                continue;
            };
            if let Some(node) = self.graph.node_mut(pair.inner_node) {
                if let Ok(port) = node.port_mut(pair.inner_port) {
                    port.set_value(value);
                }
            }
        }

        // pull dirty inner values out to their paired outer outputs
        for (index, pair) in self.pairs.iter().enumerate() {
            if !ports.get(index).is_some_and(Port::produces_output) {
                continue;
            }
            let value = self
                .graph
                .node(pair.inner_node)
                .and_then(|n| n.ports().get(pair.inner_port))
                .filter(|p| p.is_dirty())
                .and_then(|p| p.value().cloned());
            if let Some(value) = value {
                ports[index].set_value(value);
            }
        }

        self.graph.tick();
        clean_inputs(ports);
        Ok(())
    }

    fn create(&self) -> Node {
        Subgraph::node()
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
