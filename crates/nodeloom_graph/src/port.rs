// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions: named, typed value slots with dirty tracking.

use crate::error::GraphError;
use serde::{Deserialize, Serialize};

/// Which side of a node a port sits on, as seen by a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// The port receives values.
    Input,
    /// The port produces values.
    Output,
}

/// Data type that can flow through a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortType {
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// String value
    String,
    /// Any type (for generic nodes)
    Any,
}

impl PortType {
    /// Check if a value of this type may flow into a port of `other`'s type.
    pub fn can_connect_to(&self, other: &PortType) -> bool {
        // Any type can connect to anything
        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }

        if self == other {
            return true;
        }

        // Numeric conversions
        matches!(
            (self, other),
            (Self::Int, Self::Float) | (Self::Float, Self::Int)
        )
    }
}

/// Value that can be stored in a port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
}

impl PortValue {
    /// Get the port type for this value
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Bool(_) => PortType::Bool,
            Self::Int(_) => PortType::Int,
            Self::Float(_) => PortType::Float,
            Self::String(_) => PortType::String,
        }
    }

    /// Numeric view; `Int` widens to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// A named, typed value slot on a node.
///
/// A port carries a direction capability pair: it may receive input, produce
/// output, or both. Writing a value marks the port dirty; clearing dirt is a
/// separate, explicit step so the graph tick controls when a value stops
/// propagating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    name: String,
    port_type: PortType,
    value: Option<PortValue>,
    dirty: bool,
    receives_input: bool,
    produces_output: bool,
}

impl Port {
    /// Create a port. A port with neither capability flag set is meaningless
    /// and is rejected with [`GraphError::InvalidPortDefinition`].
    pub fn new(
        name: impl Into<String>,
        port_type: PortType,
        value: Option<PortValue>,
        receives_input: bool,
        produces_output: bool,
    ) -> Result<Self, GraphError> {
        let name = name.into();
        if !receives_input && !produces_output {
            return Err(GraphError::invalid_port(format!(
                "port {name:?} must receive input, produce output, or both"
            )));
        }
        Ok(Self {
            name,
            port_type,
            value,
            dirty: false,
            receives_input,
            produces_output,
        })
    }

    /// Create an input-capable port.
    pub fn input(name: impl Into<String>, port_type: PortType, value: Option<PortValue>) -> Self {
        Self {
            name: name.into(),
            port_type,
            value,
            dirty: false,
            receives_input: true,
            produces_output: false,
        }
    }

    /// Create an output-capable port.
    pub fn output(name: impl Into<String>, port_type: PortType, value: Option<PortValue>) -> Self {
        Self {
            name: name.into(),
            port_type,
            value,
            dirty: false,
            receives_input: false,
            produces_output: true,
        }
    }

    /// Port name, unique within the owning node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value type.
    pub fn port_type(&self) -> &PortType {
        &self.port_type
    }

    /// Current value; empty until first set.
    pub fn value(&self) -> Option<&PortValue> {
        self.value.as_ref()
    }

    /// Store a value and mark the port dirty.
    pub fn set_value(&mut self, value: PortValue) {
        self.value = Some(value);
        self.dirty = true;
    }

    /// Whether the port holds a value that has not been consumed yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Set the dirty flag directly.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Whether the port may be written by connections and boundary pushes.
    pub fn receives_input(&self) -> bool {
        self.receives_input
    }

    /// Whether the port may feed connections.
    pub fn produces_output(&self) -> bool {
        self.produces_output
    }

    /// Numeric view of the current value. An empty port reads as zero; a
    /// non-numeric value is a compute failure.
    pub fn as_number(&self) -> Result<f64, GraphError> {
        match &self.value {
            None => Ok(0.0),
            Some(value) => value.as_f64().ok_or_else(|| {
                GraphError::compute(format!("port {:?} holds a non-numeric value", self.name))
            }),
        }
    }

    /// A port with the same name, type, and value but the capability flags
    /// swapped. Used by subgraph pairing to mirror an inner port onto the
    /// containing graph.
    pub fn inverse(&self) -> Port {
        Port {
            name: self.name.clone(),
            port_type: self.port_type.clone(),
            value: self.value.clone(),
            dirty: false,
            receives_input: self.produces_output,
            produces_output: self.receives_input,
        }
    }
}

/// Mark every input-capable port in the slice clean.
///
/// Node kinds call this at the end of `update` to signal that the current
/// inputs have been consumed.
pub fn clean_inputs(ports: &mut [Port]) {
    for port in ports.iter_mut().filter(|p| p.receives_input) {
        port.dirty = false;
    }
}

/// Mark every output-capable port in the slice clean.
pub fn clean_outputs(ports: &mut [Port]) {
    for port in ports.iter_mut().filter(|p| p.produces_output) {
        port.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_capability_less_port() {
        let result = Port::new("dead", PortType::Float, None, false, false);
        assert!(matches!(
            result,
            Err(GraphError::InvalidPortDefinition { .. })
        ));
    }

    #[test]
    fn test_set_value_marks_dirty() {
        let mut port = Port::input("a", PortType::Float, None);
        assert!(!port.is_dirty());
        port.set_value(PortValue::Float(1.5));
        assert!(port.is_dirty());
        assert_eq!(port.value(), Some(&PortValue::Float(1.5)));
    }

    #[test]
    fn test_inverse_swaps_capabilities() {
        let mut port = Port::output("value", PortType::Int, None);
        port.set_value(PortValue::Int(4));
        let inverse = port.inverse();
        assert_eq!(inverse.name(), "value");
        assert_eq!(inverse.value(), Some(&PortValue::Int(4)));
        assert!(inverse.receives_input());
        assert!(!inverse.produces_output());
        assert!(!inverse.is_dirty());
    }

    #[test]
    fn test_type_compatibility() {
        assert!(PortType::Float.can_connect_to(&PortType::Float));
        assert!(PortType::Int.can_connect_to(&PortType::Float));
        assert!(PortType::Any.can_connect_to(&PortType::String));
        assert!(!PortType::Bool.can_connect_to(&PortType::Float));
    }

    #[test]
    fn test_as_number() {
        let mut port = Port::input("a", PortType::Float, None);
        assert_eq!(port.as_number().unwrap(), 0.0);
        port.set_value(PortValue::Int(3));
        assert_eq!(port.as_number().unwrap(), 3.0);
        port.set_value(PortValue::String("no".into()));
        assert!(port.as_number().is_err());
    }
}
