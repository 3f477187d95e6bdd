// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions: an ordered port list plus a behavior.

use crate::error::GraphError;
use crate::port::{clean_outputs, Port};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Unique identifier for a node, allocated by the owning graph.
///
/// Ids are assigned monotonically from the graph's own counter, so
/// independent graphs have independent id spaces; merging rebases the
/// absorbed graph's ids explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Placeholder for nodes not yet added to a graph.
    pub const UNASSIGNED: NodeId = NodeId(0);
}

/// Height of the title row above the port rows.
pub const TITLE_HEIGHT: f32 = 25.0;

/// Height of one port row.
pub const ROW_HEIGHT: f32 = 20.0;

/// Default node width.
pub const DEFAULT_WIDTH: f32 = 150.0;

/// Axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Top-left corner.
    pub min: [f32; 2],
    /// Bottom-right corner.
    pub max: [f32; 2],
}

impl Bounds {
    /// Smallest rectangle containing both rectangles.
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }
}

/// The computation and identity of a concrete node kind.
///
/// A behavior reads from input-capable ports and writes to output-capable
/// ports; everything else about a node (identity, geometry, port storage)
/// lives on [`Node`].
pub trait NodeBehavior: fmt::Debug {
    /// Stable kind identifier, used by the registry and by serializers.
    fn kind(&self) -> &str;

    /// Compute output ports from input ports.
    ///
    /// Contract: implementations mark every input-capable port clean before
    /// returning `Ok`; that is the signal that the current inputs have been
    /// consumed. Output-capable ports are left dirty; the graph cleans them
    /// once connections have had a chance to propagate them. On `Err`, the
    /// implementation leaves its outputs clean and unchanged so the rest of
    /// the tick proceeds without picking up garbage.
    fn update(&mut self, ports: &mut [Port]) -> Result<(), GraphError>;

    /// A fresh default instance of the same kind: same port layout and
    /// default values, no state copied, id unassigned.
    fn create(&self) -> Node;

    /// State-preserving clone, used by [`Graph::clone`](crate::Graph).
    fn clone_box(&self) -> Box<dyn NodeBehavior>;

    /// True for kinds whose output-capable ports feed values into the graph
    /// from outside. [`Subgraph::set_graph`](crate::Subgraph::set_graph)
    /// exposes those ports, direction-inverted, on the subgraph node.
    fn is_graph_input(&self) -> bool {
        false
    }

    /// True for kinds whose input-capable ports surface values out to a
    /// containing graph.
    fn is_graph_output(&self) -> bool {
        false
    }

    /// Concrete access for stateful behaviors.
    fn as_any(&self) -> &dyn Any;

    /// Mutable concrete access for stateful behaviors.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A node instance: identity, geometry, an ordered port list, and the
/// behavior that computes over it.
///
/// Port order is semantically meaningful (connections address ports by
/// index), so ports may be appended or removed but are never reordered.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    position: [f32; 2],
    size: [f32; 2],
    ports: Vec<Port>,
    behavior: Box<dyn NodeBehavior>,
}

impl Clone for Node {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            size: self.size,
            ports: self.ports.clone(),
            behavior: self.behavior.clone_box(),
        }
    }
}

impl Node {
    /// Create a node with the given display name, ports, and behavior. The
    /// id stays [`NodeId::UNASSIGNED`] until the node is added to a graph.
    pub fn new(name: impl Into<String>, ports: Vec<Port>, behavior: Box<dyn NodeBehavior>) -> Self {
        let mut node = Self {
            id: NodeId::UNASSIGNED,
            name: name.into(),
            position: [0.0, 0.0],
            size: [DEFAULT_WIDTH, 0.0],
            ports,
            behavior,
        };
        node.update_size();
        node
    }

    /// Unique id within the owning graph.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Composite `"{id}-{name}"` key, stable across a save/restore.
    pub fn unique_name(&self) -> String {
        format!("{}-{}", self.id.0, self.name)
    }

    /// Kind id of the behavior.
    pub fn kind(&self) -> &str {
        self.behavior.kind()
    }

    /// The node's behavior.
    pub fn behavior(&self) -> &dyn NodeBehavior {
        self.behavior.as_ref()
    }

    /// Mutable access to the node's behavior.
    pub fn behavior_mut(&mut self) -> &mut dyn NodeBehavior {
        self.behavior.as_mut()
    }

    /// All ports, in index order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Port at `index`.
    pub fn port(&self, index: usize) -> Result<&Port, GraphError> {
        self.ports.get(index).ok_or(GraphError::IndexOutOfRange {
            index,
            len: self.ports.len(),
        })
    }

    /// Mutable port at `index`.
    pub fn port_mut(&mut self, index: usize) -> Result<&mut Port, GraphError> {
        let len = self.ports.len();
        self.ports
            .get_mut(index)
            .ok_or(GraphError::IndexOutOfRange { index, len })
    }

    /// Append a port.
    pub fn add_port(&mut self, port: Port) {
        self.ports.push(port);
        self.update_size();
    }

    /// Remove and return the port at `index`. Later ports shift down one
    /// index; connections addressing them are the caller's to fix up.
    pub fn remove_port(&mut self, index: usize) -> Result<Port, GraphError> {
        if index >= self.ports.len() {
            return Err(GraphError::IndexOutOfRange {
                index,
                len: self.ports.len(),
            });
        }
        let port = self.ports.remove(index);
        self.update_size();
        Ok(port)
    }

    pub(crate) fn set_ports(&mut self, ports: Vec<Port>) {
        self.ports = ports;
        self.update_size();
    }

    /// A node is dirty if any of its ports is dirty.
    pub fn is_dirty(&self) -> bool {
        self.ports.iter().any(Port::is_dirty)
    }

    /// Run the behavior unconditionally.
    pub fn update(&mut self) -> Result<(), GraphError> {
        self.behavior.update(&mut self.ports)
    }

    /// Run the behavior only if at least one port is dirty; a node with no
    /// dirty ports is skipped.
    pub fn update_if_dirty(&mut self) -> Result<(), GraphError> {
        if !self.is_dirty() {
            return Ok(());
        }
        self.update()
    }

    /// Mark every output-capable port clean. The graph calls this after the
    /// connection pass so outputs are not re-read as dirty next tick.
    pub fn clean_all_outputs(&mut self) {
        clean_outputs(&mut self.ports);
    }

    /// Top-left corner.
    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    /// Move the top-left corner.
    pub fn set_position(&mut self, position: [f32; 2]) {
        self.position = position;
    }

    /// Move by a delta.
    pub fn move_relative(&mut self, dx: f32, dy: f32) {
        self.position[0] += dx;
        self.position[1] += dy;
    }

    /// Width and height.
    pub fn size(&self) -> [f32; 2] {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: [f32; 2]) {
        self.size = size;
    }

    /// Bounding rectangle at the current position.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min: self.position,
            max: [
                self.position[0] + self.size[0],
                self.position[1] + self.size[1],
            ],
        }
    }

    /// Connection point of the port at `index`, on the left edge.
    pub fn input_position(&self, index: usize) -> [f32; 2] {
        [self.position[0], self.row_center(index)]
    }

    /// Connection point of the port at `index`, on the right edge.
    pub fn output_position(&self, index: usize) -> [f32; 2] {
        [self.position[0] + self.size[0], self.row_center(index)]
    }

    fn row_center(&self, index: usize) -> f32 {
        self.position[1] + TITLE_HEIGHT + (index as f32 + 0.5) * ROW_HEIGHT
    }

    fn update_size(&mut self) {
        self.size = [
            self.size[0].max(DEFAULT_WIDTH),
            TITLE_HEIGHT + self.ports.len() as f32 * ROW_HEIGHT,
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{clean_inputs, PortType, PortValue};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Default)]
    struct Probe {
        runs: Rc<Cell<usize>>,
    }

    impl Probe {
        fn node(runs: Rc<Cell<usize>>) -> Node {
            Node::new(
                "Probe",
                vec![Port::input("a", PortType::Float, None)],
                Box::new(Probe { runs }),
            )
        }
    }

    impl NodeBehavior for Probe {
        fn kind(&self) -> &str {
            "probe"
        }

        fn update(&mut self, ports: &mut [Port]) -> Result<(), GraphError> {
            self.runs.set(self.runs.get() + 1);
            clean_inputs(ports);
            Ok(())
        }

        fn create(&self) -> Node {
            Probe::node(Rc::default())
        }

        fn clone_box(&self) -> Box<dyn NodeBehavior> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_clean_node_is_skipped() {
        let runs = Rc::new(Cell::new(0));
        let mut node = Probe::node(runs.clone());

        node.update_if_dirty().unwrap();
        assert_eq!(runs.get(), 0);

        node.port_mut(0).unwrap().set_value(PortValue::Float(1.0));
        node.update_if_dirty().unwrap();
        assert_eq!(runs.get(), 1);

        // inputs were cleaned by the update, so the next call skips again
        node.update_if_dirty().unwrap();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_port_index_out_of_range() {
        let node = Probe::node(Rc::default());
        assert!(matches!(
            node.port(5),
            Err(GraphError::IndexOutOfRange { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_size_tracks_ports() {
        let mut node = Probe::node(Rc::default());
        let height = node.size()[1];
        node.add_port(Port::output("out", PortType::Float, None));
        assert_eq!(node.size()[1], height + ROW_HEIGHT);
    }

    #[test]
    fn test_port_positions() {
        let mut node = Probe::node(Rc::default());
        node.set_position([10.0, 20.0]);
        assert_eq!(
            node.input_position(0),
            [10.0, 20.0 + TITLE_HEIGHT + ROW_HEIGHT / 2.0]
        );
        assert_eq!(node.output_position(0)[0], 10.0 + node.size()[0]);
    }
}
