//! Reusable view components.

pub mod controls;
pub mod network_graph;
