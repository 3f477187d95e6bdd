// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic and trigonometric nodes.
//!
//! All math ports are `Float` with a default of zero; trigonometric kinds
//! operate in radians.

use crate::error::GraphError;
use crate::node::{Node, NodeBehavior};
use crate::port::{clean_inputs, Port, PortType, PortValue};
use crate::registry::NodeRegistry;
use std::any::Any;

const A: usize = 0;
const B: usize = 1;

/// Two-input arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `A + B`
    Add,
    /// `A - B`
    Subtract,
    /// `A * B`
    Multiply,
    /// `A / B`; division by zero is a compute failure
    Divide,
    /// Smaller of `A` and `B`
    Min,
    /// Larger of `A` and `B`
    Max,
    /// `atan2(A, B)`
    Atan2,
}

impl BinaryOp {
    /// Kind id for the registry.
    pub fn kind(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Min => "min",
            Self::Max => "max",
            Self::Atan2 => "atan2",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Atan2 => "Atan2",
        }
    }

    fn apply(self, a: f64, b: f64) -> Result<f64, GraphError> {
        Ok(match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => {
                if b == 0.0 {
                    return Err(GraphError::compute("division by zero"));
                }
                a / b
            }
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Atan2 => a.atan2(b),
        })
    }
}

/// Single-input trigonometric operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `sin(A)`
    Sin,
    /// `cos(A)`
    Cos,
    /// `tan(A)`
    Tan,
}

impl UnaryOp {
    /// Kind id for the registry.
    pub fn kind(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Self::Sin => "Sin",
            Self::Cos => "Cos",
            Self::Tan => "Tan",
        }
    }

    fn apply(self, a: f64) -> f64 {
        match self {
            Self::Sin => a.sin(),
            Self::Cos => a.cos(),
            Self::Tan => a.tan(),
        }
    }
}

/// A node computing `output = op(A, B)`.
#[derive(Debug, Clone)]
pub struct BinaryMath {
    op: BinaryOp,
}

impl BinaryMath {
    /// A fresh node for `op` with `A`/`B` inputs and one output, all zero.
    pub fn node(op: BinaryOp) -> Node {
        Node::new(
            op.display_name(),
            vec![
                Port::input("A", PortType::Float, Some(PortValue::Float(0.0))),
                Port::input("B", PortType::Float, Some(PortValue::Float(0.0))),
                Port::output("output", PortType::Float, Some(PortValue::Float(0.0))),
            ],
            Box::new(Self { op }),
        )
    }
}

impl NodeBehavior for BinaryMath {
    fn kind(&self) -> &str {
        self.op.kind()
    }

    fn update(&mut self, ports: &mut [Port]) -> Result<(), GraphError> {
        let a = read(ports, A)?;
        let b = read(ports, B)?;
        clean_inputs(ports);
        let result = self.op.apply(a, b)?;
        write(ports, 2, result)
    }

    fn create(&self) -> Node {
        BinaryMath::node(self.op)
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

/// A node computing `output = op(A)`.
#[derive(Debug, Clone)]
pub struct UnaryMath {
    op: UnaryOp,
}

impl UnaryMath {
    /// A fresh node for `op` with an `A` input and one output, both zero.
    pub fn node(op: UnaryOp) -> Node {
        Node::new(
            op.display_name(),
            vec![
                Port::input("A", PortType::Float, Some(PortValue::Float(0.0))),
                Port::output("output", PortType::Float, Some(PortValue::Float(0.0))),
            ],
            Box::new(Self { op }),
        )
    }
}

impl NodeBehavior for UnaryMath {
    fn kind(&self) -> &str {
        self.op.kind()
    }

    fn update(&mut self, ports: &mut [Port]) -> Result<(), GraphError> {
        let a = read(ports, A)?;
        clean_inputs(ports);
        write(ports, 1, self.op.apply(a))
    }

    fn create(&self) -> Node {
        UnaryMath::node(self.op)
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

fn read(ports: &[Port], index: usize) -> Result<f64, GraphError> {
    ports
        .get(index)
        .ok_or(GraphError::IndexOutOfRange {
            index,
            len: ports.len(),
        })?
        .as_number()
}

fn write(ports: &mut [Port], index: usize, value: f64) -> Result<(), GraphError> {
    let len = ports.len();
    let port = ports
        .get_mut(index)
        .ok_or(GraphError::IndexOutOfRange { index, len })?;
    port.set_value(PortValue::Float(value));
    Ok(())
}

/// Register every math kind.
pub fn register(registry: &mut NodeRegistry) {
    registry.register(BinaryOp::Add.kind(), || BinaryMath::node(BinaryOp::Add));
    registry.register(BinaryOp::Subtract.kind(), || {
        BinaryMath::node(BinaryOp::Subtract)
    });
    registry.register(BinaryOp::Multiply.kind(), || {
        BinaryMath::node(BinaryOp::Multiply)
    });
    registry.register(BinaryOp::Divide.kind(), || {
        BinaryMath::node(BinaryOp::Divide)
    });
    registry.register(BinaryOp::Min.kind(), || BinaryMath::node(BinaryOp::Min));
    registry.register(BinaryOp::Max.kind(), || BinaryMath::node(BinaryOp::Max));
    registry.register(BinaryOp::Atan2.kind(), || BinaryMath::node(BinaryOp::Atan2));
    registry.register(UnaryOp::Sin.kind(), || UnaryMath::node(UnaryOp::Sin));
    registry.register(UnaryOp::Cos.kind(), || UnaryMath::node(UnaryOp::Cos));
    registry.register(UnaryOp::Tan.kind(), || UnaryMath::node(UnaryOp::Tan));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_binary(op: BinaryOp, a: f64, b: f64) -> Node {
        let mut node = BinaryMath::node(op);
        node.port_mut(A).unwrap().set_value(PortValue::Float(a));
        node.port_mut(B).unwrap().set_value(PortValue::Float(b));
        node.update().unwrap();
        node
    }

    fn output_of(node: &Node, index: usize) -> f64 {
        node.port(index).unwrap().as_number().unwrap()
    }

    #[test]
    fn test_min() {
        let node = run_binary(BinaryOp::Min, 3.0, 7.0);
        assert_eq!(output_of(&node, 2), 3.0);
        // inputs consumed, output left dirty for the connection pass
        assert!(!node.port(A).unwrap().is_dirty());
        assert!(!node.port(B).unwrap().is_dirty());
        assert!(node.port(2).unwrap().is_dirty());

        let node = run_binary(BinaryOp::Min, -2.0, -2.0);
        assert_eq!(output_of(&node, 2), -2.0);
    }

    #[test]
    fn test_binary_ops() {
        assert_eq!(output_of(&run_binary(BinaryOp::Add, 3.0, 7.0), 2), 10.0);
        assert_eq!(output_of(&run_binary(BinaryOp::Subtract, 3.0, 7.0), 2), -4.0);
        assert_eq!(output_of(&run_binary(BinaryOp::Multiply, 3.0, 7.0), 2), 21.0);
        assert_eq!(output_of(&run_binary(BinaryOp::Divide, 7.0, 2.0), 2), 3.5);
        assert_eq!(output_of(&run_binary(BinaryOp::Max, 3.0, 7.0), 2), 7.0);
        let atan2 = output_of(&run_binary(BinaryOp::Atan2, 1.0, 1.0), 2);
        assert!((atan2 - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_divide_by_zero_fails_cleanly() {
        let mut node = BinaryMath::node(BinaryOp::Divide);
        node.port_mut(A).unwrap().set_value(PortValue::Float(1.0));
        node.port_mut(B).unwrap().set_value(PortValue::Float(0.0));

        assert!(matches!(node.update(), Err(GraphError::Compute(_))));
        // output untouched and clean, inputs consumed: nothing propagates
        assert_eq!(output_of(&node, 2), 0.0);
        assert!(!node.is_dirty());
    }

    #[test]
    fn test_sin_cos() {
        let mut node = UnaryMath::node(UnaryOp::Sin);
        node.port_mut(A).unwrap().set_value(PortValue::Float(0.0));
        node.update().unwrap();
        assert!(output_of(&node, 1).abs() < 1e-12);

        let mut node = UnaryMath::node(UnaryOp::Cos);
        node.port_mut(A).unwrap().set_value(PortValue::Float(0.0));
        node.update().unwrap();
        assert!((output_of(&node, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_create_returns_defaults() {
        let node = run_binary(BinaryOp::Min, 3.0, 7.0);
        let fresh = node.behavior().create();
        assert_eq!(fresh.kind(), "min");
        assert_eq!(fresh.port(A).unwrap().value(), Some(&PortValue::Float(0.0)));
        assert!(!fresh.is_dirty());
    }
}
