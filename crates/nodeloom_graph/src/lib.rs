// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dataflow node graph engine for Nodeloom.
//!
//! The model layer beneath a visual dataflow editor: nodes exchange typed
//! values through named ports, directed connections carry values between
//! them, and [`Graph::tick`] advances the whole network one dirty-flag
//! propagation step at a time.
//!
//! ## Architecture
//!
//! - Typed ports with per-port dirty tracking
//! - Nodes as an ordered port list plus a [`NodeBehavior`]
//! - An insertion-ordered node arena; connections reference ports by
//!   (node id, port index) and never own them
//! - One-step lagged evaluation: a value crosses exactly one connection
//!   per tick, so feedback loops settle across ticks instead of looping
//!   within one
//! - Subgraph composition with direction-inverted boundary ports
//!
//! Rendering, interactive editing, and the persistence wire format belong
//! to the embedding application; [`GraphDoc`] exposes the structure a
//! serializer needs.

pub mod error;
pub mod port;
pub mod node;
pub mod connection;
pub mod graph;
pub mod subgraph;
pub mod registry;
pub mod nodes;
pub mod doc;

pub use connection::{Connection, PortHit};
pub use doc::{load_ron, save_ron, GraphDoc, NodeDoc, PortDoc};
pub use error::GraphError;
pub use graph::Graph;
pub use node::{Bounds, Node, NodeBehavior, NodeId};
pub use port::{Port, PortDirection, PortType, PortValue};
pub use registry::{NodeFactory, NodeRegistry};
pub use subgraph::{Subgraph, SUBGRAPH_KIND};
