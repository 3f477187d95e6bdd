// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for the graph engine.

use crate::node::NodeId;

/// Errors surfaced by graph construction, lookup, and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A port was declared without a usable direction, or a connection was
    /// attempted between ports whose directions or types are incompatible.
    #[error("invalid port definition: {reason}")]
    InvalidPortDefinition {
        /// What made the definition unusable.
        reason: String,
    },

    /// A port lookup used an index outside the node's port list.
    #[error("port index {index} out of range ({len} ports)")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of ports on the node.
        len: usize,
    },

    /// A node id did not resolve to a node in this graph.
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),

    /// A kind id had no registered factory.
    #[error("unknown node kind {0:?}")]
    UnknownKind(String),

    /// A saved document could not be serialized or parsed.
    #[error("malformed document: {0}")]
    Document(String),

    /// A node kind could not complete its computation.
    #[error("compute failed: {0}")]
    Compute(String),
}

impl GraphError {
    /// Shorthand for a compute failure with a formatted message.
    pub fn compute(msg: impl Into<String>) -> Self {
        Self::Compute(msg.into())
    }

    pub(crate) fn invalid_port(reason: impl Into<String>) -> Self {
        Self::InvalidPortDefinition {
            reason: reason.into(),
        }
    }
}
