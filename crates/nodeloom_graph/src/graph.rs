// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph arena: owns nodes and connections, drives the evaluation tick.

use crate::connection::{Connection, PortHit};
use crate::error::GraphError;
use crate::node::{Bounds, Node, NodeId};
use crate::port::PortDirection;
use indexmap::IndexMap;

/// A dataflow graph: an insertion-ordered arena of nodes plus the directed
/// connections between their ports.
///
/// Node insertion order is evaluation order. Cloning a graph is a deep
/// copy: every node and connection is recreated with fresh internal
/// structures but identical ids and values, so a clone shares no mutable
/// state with the original.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    connections: Vec<Connection>,
    next_id: u64,
}

impl Graph {
    /// Create an empty graph with a fresh id space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, assigning it the next id in this graph's id space.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        node.set_id(id);
        self.nodes.insert(id, node);
        id
    }

    /// Insert a node that already carries an id (the restore path). The id
    /// allocator is bumped past it so later additions cannot collide.
    pub fn restore_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.next_id = self.next_id.max(id.0);
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and every connection incident to it.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|c| !c.involves_node(node_id));
        // shift_remove keeps insertion order, which is evaluation order
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by id.
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by id.
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node ids, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove every node and connection. The id space is kept, so ids
    /// handed out before the clear are never reused.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
    }

    /// Connect an output-capable port to an input-capable port.
    ///
    /// Validates that both nodes exist, both port indices resolve, the
    /// directions are usable, and the port types are compatible. Duplicates
    /// are not rejected; use [`Graph::matching_connection`] to detect them.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: usize,
        to_node: NodeId,
        to_port: usize,
    ) -> Result<Connection, GraphError> {
        let source = self
            .nodes
            .get(&from_node)
            .ok_or(GraphError::NodeNotFound(from_node))?;
        let dest = self
            .nodes
            .get(&to_node)
            .ok_or(GraphError::NodeNotFound(to_node))?;

        let source_port = source.port(from_port)?;
        let dest_port = dest.port(to_port)?;

        if !source_port.produces_output() {
            return Err(GraphError::invalid_port(format!(
                "source port {:?} does not produce output",
                source_port.name()
            )));
        }
        if !dest_port.receives_input() {
            return Err(GraphError::invalid_port(format!(
                "destination port {:?} does not receive input",
                dest_port.name()
            )));
        }
        if !source_port.port_type().can_connect_to(dest_port.port_type()) {
            return Err(GraphError::invalid_port(format!(
                "port types {:?} and {:?} are incompatible",
                source_port.port_type(),
                dest_port.port_type()
            )));
        }

        let connection = Connection::new(from_node, from_port, to_node, to_port);
        self.connections.push(connection);
        Ok(connection)
    }

    /// Remove the first connection structurally equal to `connection`.
    /// Returns whether one was found.
    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        match self.connections.iter().position(|c| c == connection) {
            Some(index) => {
                self.connections.remove(index);
                true
            }
            None => false,
        }
    }

    /// All connections, in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// First stored connection structurally equal to `connection`.
    pub fn matching_connection(&self, connection: &Connection) -> Option<&Connection> {
        self.connections.iter().find(|c| *c == connection)
    }

    /// Connections with either endpoint on `node_id`.
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |c| c.involves_node(node_id))
    }

    /// Advance the whole graph by one evaluation step.
    ///
    /// Three passes over the full node/connection sets, in insertion order:
    /// dirty nodes update, dirty source ports propagate across connections
    /// (marking the destinations dirty for the *next* tick), and every
    /// output-capable port is cleaned. A value therefore crosses exactly
    /// one connection per tick; multi-hop chains need repeated calls, and
    /// cycles settle one step at a time instead of looping forever. No
    /// dependency ordering or cycle detection is performed.
    ///
    /// A node whose update fails is logged and skipped; per the
    /// [`NodeBehavior::update`](crate::NodeBehavior::update) contract it
    /// leaves nothing propagatable behind.
    pub fn tick(&mut self) {
        for node in self.nodes.values_mut() {
            if let Err(err) = node.update_if_dirty() {
                tracing::warn!(node = %node.unique_name(), %err, "node update failed");
            }
        }
        for i in 0..self.connections.len() {
            self.apply_if_dirty(self.connections[i]);
        }
        for node in self.nodes.values_mut() {
            node.clean_all_outputs();
        }
    }

    /// Copy the source port's value into the destination port and mark the
    /// destination dirty, but only when the source port is dirty. Dangling
    /// endpoints are skipped.
    fn apply_if_dirty(&mut self, connection: Connection) {
        let value = self
            .nodes
            .get(&connection.from_node)
            .and_then(|n| n.ports().get(connection.from_port))
            .filter(|p| p.is_dirty())
            .and_then(|p| p.value().cloned());
        let Some(value) = value else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&connection.to_node) {
            if let Ok(port) = node.port_mut(connection.to_port) {
                port.set_value(value);
            }
        }
    }

    /// Find a node by its `"{id}-{name}"` composite key.
    pub fn find_node_with_unique_name(&self, unique_name: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.unique_name() == unique_name)
    }

    /// Number of nodes of the given kind.
    pub fn count_of_kind(&self, kind: &str) -> usize {
        self.nodes.values().filter(|n| n.kind() == kind).count()
    }

    /// Smallest rectangle containing every node, or `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut nodes = self.nodes.values();
        let first = nodes.next()?.bounds();
        Some(nodes.fold(first, |acc, n| acc.union(n.bounds())))
    }

    /// First unconnected port whose connection point lies within `radius`
    /// of `point`. Input sides are checked before output sides on each
    /// node, and nodes in insertion order.
    pub fn first_port_near(&self, point: [f32; 2], radius: f32) -> Option<PortHit> {
        let rr = radius * radius;
        for node in self.nodes.values() {
            for (index, port) in node.ports().iter().enumerate() {
                if port.receives_input()
                    && !self.input_is_connected(node.id(), index)
                    && dist_sq(node.input_position(index), point) < rr
                {
                    return Some(PortHit {
                        node: node.id(),
                        port: index,
                        direction: PortDirection::Input,
                    });
                }
                if port.produces_output()
                    && !self.output_is_connected(node.id(), index)
                    && dist_sq(node.output_position(index), point) < rr
                {
                    return Some(PortHit {
                        node: node.id(),
                        port: index,
                        direction: PortDirection::Output,
                    });
                }
            }
        }
        None
    }

    fn input_is_connected(&self, node: NodeId, port: usize) -> bool {
        self.connections
            .iter()
            .any(|c| c.to_node == node && c.to_port == port)
    }

    fn output_is_connected(&self, node: NodeId, port: usize) -> bool {
        self.connections
            .iter()
            .any(|c| c.from_node == node && c.from_port == port)
    }

    /// Absorb another graph. The incoming nodes keep their insertion order
    /// but are renumbered contiguously above this graph's current maximum
    /// id; incoming connections are rewritten to the new ids, preserving
    /// their logical endpoints.
    pub fn merge(&mut self, other: Graph) {
        self.bump_next_id();
        let mut remap: IndexMap<NodeId, NodeId> = IndexMap::new();
        for (old_id, mut node) in other.nodes {
            self.next_id += 1;
            let id = NodeId(self.next_id);
            node.set_id(id);
            remap.insert(old_id, id);
            self.nodes.insert(id, node);
        }
        for mut connection in other.connections {
            let (Some(&from), Some(&to)) = (
                remap.get(&connection.from_node),
                remap.get(&connection.to_node),
            ) else {
                continue;
            };
            connection.from_node = from;
            connection.to_node = to;
            self.connections.push(connection);
        }
        tracing::debug!(nodes = remap.len(), "merged graph");
    }

    /// Raise the id allocator above every id currently in the graph, so the
    /// next allocation cannot collide. Needed after restoring from a
    /// document that carried its own ids.
    pub fn bump_next_id(&mut self) {
        let max = self.nodes.keys().map(|id| id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max);
    }
}

fn dist_sq(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}
