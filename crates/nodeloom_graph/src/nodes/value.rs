// SPDX-License-Identifier: MIT OR Apache-2.0
//! Source and sink nodes that carry values across a graph boundary.
//!
//! Inside a subgraph these are the boundary markers
//! [`Subgraph::set_graph`](crate::Subgraph::set_graph) scans for; used
//! standalone they are plain value sources and sinks for the embedding
//! application.

use crate::error::GraphError;
use crate::node::{Node, NodeBehavior};
use crate::port::{clean_inputs, Port, PortType};
use crate::registry::NodeRegistry;
use std::any::Any;

/// Kind id for [`GraphInput`].
pub const GRAPH_INPUT_KIND: &str = "graph_input";

/// Kind id for [`GraphOutput`].
pub const GRAPH_OUTPUT_KIND: &str = "graph_output";

/// A value source. The single output port is written externally, by the
/// embedding application or by a containing graph through subgraph
/// pairing, so `update` leaves it alone.
#[derive(Debug, Clone, Default)]
pub struct GraphInput;

impl GraphInput {
    /// A source node whose output port is named `port_name`.
    pub fn node(port_name: impl Into<String>) -> Node {
        Node::new(
            "Input",
            vec![Port::output(port_name, PortType::Any, None)],
            Box::new(Self),
        )
    }
}

impl NodeBehavior for GraphInput {
    fn kind(&self) -> &str {
        GRAPH_INPUT_KIND
    }

    fn update(&mut self, _ports: &mut [Port]) -> Result<(), GraphError> {
        Ok(())
    }

    fn create(&self) -> Node {
        Self::node("value")
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }

    fn is_graph_input(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A value sink. Keeps the last value delivered to its input port, where a
/// containing graph or the embedding application can read it.
#[derive(Debug, Clone, Default)]
pub struct GraphOutput;

impl GraphOutput {
    /// A sink node whose input port is named `port_name`.
    pub fn node(port_name: impl Into<String>) -> Node {
        Node::new(
            "Output",
            vec![Port::input(port_name, PortType::Any, None)],
            Box::new(Self),
        )
    }
}

impl NodeBehavior for GraphOutput {
    fn kind(&self) -> &str {
        GRAPH_OUTPUT_KIND
    }

    fn update(&mut self, ports: &mut [Port]) -> Result<(), GraphError> {
        if let Some(value) = ports.first().and_then(Port::value) {
            tracing::debug!(?value, "output observed");
        }
        clean_inputs(ports);
        Ok(())
    }

    fn create(&self) -> Node {
        Self::node("value")
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }

    fn is_graph_output(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Register the boundary kinds.
pub fn register(registry: &mut NodeRegistry) {
    registry.register(GRAPH_INPUT_KIND, || GraphInput::node("value"));
    registry.register(GRAPH_OUTPUT_KIND, || GraphOutput::node("value"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortValue;

    #[test]
    fn test_input_keeps_injected_value() {
        let mut node = GraphInput::node("value");
        node.port_mut(0).unwrap().set_value(PortValue::Float(4.0));
        node.update_if_dirty().unwrap();
        // the injected value survives the update and stays dirty until the
        // graph's connection pass has run
        assert_eq!(node.port(0).unwrap().value(), Some(&PortValue::Float(4.0)));
        assert!(node.port(0).unwrap().is_dirty());
    }

    #[test]
    fn test_output_consumes_its_input() {
        let mut node = GraphOutput::node("value");
        node.port_mut(0).unwrap().set_value(PortValue::Int(2));
        node.update_if_dirty().unwrap();
        assert_eq!(node.port(0).unwrap().value(), Some(&PortValue::Int(2)));
        assert!(!node.is_dirty());
    }

    #[test]
    fn test_markers() {
        assert!(GraphInput::node("x").behavior().is_graph_input());
        assert!(!GraphInput::node("x").behavior().is_graph_output());
        assert!(GraphOutput::node("y").behavior().is_graph_output());
    }
}
