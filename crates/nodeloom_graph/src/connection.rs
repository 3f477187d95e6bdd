// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use crate::port::PortDirection;
use serde::{Deserialize, Serialize};

/// A directed edge from an output-capable port to an input-capable port.
///
/// Endpoints are (node id, port index) pairs resolved through the owning
/// graph's arena at evaluation time; a connection never owns its nodes, and
/// a connection whose endpoint node was removed is pruned by the graph.
/// Equality is structural (same two endpoints), used for duplicate
/// detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Source node.
    pub from_node: NodeId,
    /// Port index on the source node; must be output-capable.
    pub from_port: usize,
    /// Destination node.
    pub to_node: NodeId,
    /// Port index on the destination node; must be input-capable.
    pub to_port: usize,
}

impl Connection {
    /// Create a connection between the given endpoints. Direction and type
    /// checks happen in [`Graph::connect`](crate::Graph::connect), which
    /// can see the ports.
    pub fn new(from_node: NodeId, from_port: usize, to_node: NodeId, to_port: usize) -> Self {
        Self {
            from_node,
            from_port,
            to_node,
            to_port,
        }
    }

    /// Check if either endpoint is on `node_id`.
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }
}

/// A port located by a proximity query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortHit {
    /// Owning node.
    pub node: NodeId,
    /// Port index on that node.
    pub port: usize,
    /// Which side of the node was hit.
    pub direction: PortDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involves_node() {
        let connection = Connection::new(NodeId(1), 0, NodeId(2), 1);
        assert!(connection.involves_node(NodeId(1)));
        assert!(connection.involves_node(NodeId(2)));
        assert!(!connection.involves_node(NodeId(3)));
    }

    #[test]
    fn test_structural_equality() {
        let a = Connection::new(NodeId(1), 0, NodeId(2), 1);
        let b = Connection::new(NodeId(1), 0, NodeId(2), 1);
        let c = Connection::new(NodeId(1), 1, NodeId(2), 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
