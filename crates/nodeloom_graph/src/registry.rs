// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of node kinds.

use crate::error::GraphError;
use crate::node::Node;
use crate::nodes;
use crate::subgraph::{Subgraph, SUBGRAPH_KIND};
use indexmap::IndexMap;

/// Factory producing a fresh node of one kind.
pub type NodeFactory = fn() -> Node;

/// Maps kind ids to node factories.
///
/// Deserialization and "new instance of this kind" both resolve through
/// here, so node kinds stay an open set with no reflection involved.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    factories: IndexMap<String, NodeFactory>,
}

impl NodeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in node library and the
    /// subgraph kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        nodes::register_builtins(&mut registry);
        registry.register(SUBGRAPH_KIND, Subgraph::node);
        registry
    }

    /// Register a factory under `kind`. Re-registering replaces the
    /// previous factory.
    pub fn register(&mut self, kind: impl Into<String>, factory: NodeFactory) {
        self.factories.insert(kind.into(), factory);
    }

    /// Create a fresh node of the given kind.
    pub fn create(&self, kind: &str) -> Result<Node, GraphError> {
        self.factories
            .get(kind)
            .map(|factory| factory())
            .ok_or_else(|| GraphError::UnknownKind(kind.to_string()))
    }

    /// True if `kind` is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kind ids, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
