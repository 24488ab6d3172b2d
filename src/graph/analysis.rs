//! Degree-based heuristics standing in for centrality and causal analysis.
//!
//! These are placeholders over the snapshot's degree counts, not real graph
//! algorithms; the render layer only needs a stable classification.

use std::collections::HashMap;

use serde::Serialize;

use super::types::{Edge, GraphSnapshot};

/// Out/in degree ratio above which a node counts as a driver (or receiver).
const ROLE_RATIO: f64 = 1.5;

/// Coarse causal classification of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum CausalRole {
	/// Mostly outgoing edges.
	Driver,
	/// Balanced in and out.
	Mediator,
	/// Mostly incoming edges.
	Receiver,
	/// No edges in the current view.
	#[default]
	Isolated,
}

impl CausalRole {
	/// Human readable name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Driver => "driver",
			Self::Mediator => "mediator",
			Self::Receiver => "receiver",
			Self::Isolated => "isolated",
		}
	}

	fn classify(in_degree: usize, out_degree: usize) -> Self {
		let (i, o) = (in_degree as f64, out_degree as f64);
		match (in_degree, out_degree) {
			(0, 0) => Self::Isolated,
			_ if o > i * ROLE_RATIO => Self::Driver,
			_ if i > o * ROLE_RATIO => Self::Receiver,
			_ => Self::Mediator,
		}
	}
}

/// Per-node degree statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NodeMetrics {
	/// Number of incoming edges.
	pub in_degree: usize,
	/// Number of outgoing edges.
	pub out_degree: usize,
	/// Sum of incident edge weights.
	pub weighted_degree: f64,
	/// Degree divided by `n - 1`, in `[0, 1]` for simple graphs.
	pub centrality: f64,
	/// Heuristic causal role.
	pub role: CausalRole,
}

/// How an edge relates the roles of its endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeClass {
	/// Both endpoints share a role.
	Uniform(CausalRole),
	/// Endpoint roles differ; `from` is the source role.
	Crossing {
		/// Role of the source node.
		from: CausalRole,
		/// Role of the target node.
		to: CausalRole,
	},
}

/// Metrics for every node of one snapshot.
#[derive(Clone, Debug, Default)]
pub struct GraphMetrics {
	nodes: HashMap<String, NodeMetrics>,
}

impl GraphMetrics {
	/// Computes degree metrics for `graph`.
	pub fn compute(graph: &GraphSnapshot) -> Self {
		let mut nodes: HashMap<String, NodeMetrics> = graph
			.nodes()
			.iter()
			.map(|n| (n.id.clone(), NodeMetrics::default()))
			.collect();

		for edge in graph.edges() {
			if let Some(m) = nodes.get_mut(&edge.source) {
				m.out_degree += 1;
				m.weighted_degree += edge.weight;
			}
			if let Some(m) = nodes.get_mut(&edge.target) {
				m.in_degree += 1;
				m.weighted_degree += edge.weight;
			}
		}

		let denom = graph.nodes().len().saturating_sub(1).max(1) as f64;
		for m in nodes.values_mut() {
			m.centrality = (m.in_degree + m.out_degree) as f64 / denom;
			m.role = CausalRole::classify(m.in_degree, m.out_degree);
		}

		Self { nodes }
	}

	/// Metrics for `id`, if it belongs to the snapshot.
	pub fn get(&self, id: &str) -> Option<&NodeMetrics> {
		self.nodes.get(id)
	}

	/// Role of `id`, `Isolated` when unknown.
	pub fn role(&self, id: &str) -> CausalRole {
		self.get(id).map(|m| m.role).unwrap_or_default()
	}

	/// Classifies `edge` by the roles of its endpoints.
	pub fn classify_edge(&self, edge: &Edge) -> EdgeClass {
		let (from, to) = (self.role(&edge.source), self.role(&edge.target));
		if from == to {
			EdgeClass::Uniform(from)
		} else {
			EdgeClass::Crossing { from, to }
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::fixtures::{chain, edge, node};
	use crate::graph::types::NodeCategory;

	#[test]
	fn chain_roles_follow_direction() {
		let m = GraphMetrics::compute(&chain());
		assert_eq!(m.role("A"), CausalRole::Driver);
		assert_eq!(m.role("B"), CausalRole::Mediator);
		assert_eq!(m.role("C"), CausalRole::Receiver);
		assert_eq!(m.get("B").map(|b| b.centrality), Some(1.0));
		assert_eq!(m.get("A").map(|a| a.weighted_degree), Some(5.0));
	}

	#[test]
	fn lone_node_is_isolated() {
		let g = GraphSnapshot::new(vec![node("solo", NodeCategory::Topic, 1.0)], vec![]);
		let m = GraphMetrics::compute(&g);
		assert_eq!(m.role("solo"), CausalRole::Isolated);
		assert_eq!(m.get("solo").map(|s| s.centrality), Some(0.0));
		assert_eq!(m.role("missing"), CausalRole::Isolated);
	}

	#[test]
	fn edges_between_roles_cross() {
		let g = chain();
		let m = GraphMetrics::compute(&g);
		assert_eq!(
			m.classify_edge(&edge("A", "B", 1.0)),
			EdgeClass::Crossing {
				from: CausalRole::Driver,
				to: CausalRole::Mediator
			}
		);
		assert_eq!(
			m.classify_edge(&edge("A", "A", 1.0)),
			EdgeClass::Uniform(CausalRole::Driver)
		);
	}
}
