// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node library.

pub mod math;
pub mod value;

use crate::registry::NodeRegistry;

/// Register every built-in kind.
pub fn register_builtins(registry: &mut NodeRegistry) {
    math::register(registry);
    value::register(registry);
}
