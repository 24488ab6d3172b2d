use std::collections::HashMap;

use super::{Bounds, LayoutStrategy, Point};
use crate::graph::{Edge, Node};

/// Row-major grid with `ceil(sqrt(n))` columns, in input order.
#[derive(Clone, Debug)]
pub struct GridLayout {
	/// Margin kept free around the grid.
	pub padding: f64,
}

impl Default for GridLayout {
	fn default() -> Self {
		Self { padding: 40.0 }
	}
}

impl LayoutStrategy for GridLayout {
	fn compute_positions(
		&mut self,
		nodes: &[Node],
		_edges: &[Edge],
		bounds: Bounds,
	) -> HashMap<String, Point> {
		if nodes.is_empty() {
			return HashMap::new();
		}
		let cols = (nodes.len() as f64).sqrt().ceil() as usize;
		let rows = nodes.len().div_ceil(cols);
		let pad = self.padding.min(bounds.width / 4.0).min(bounds.height / 4.0);
		let cell_w = (bounds.width - 2.0 * pad) / cols as f64;
		let cell_h = (bounds.height - 2.0 * pad) / rows as f64;

		nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let (row, col) = (i / cols, i % cols);
				(
					node.id.clone(),
					Point::new(
						pad + cell_w * (col as f64 + 0.5),
						pad + cell_h * (row as f64 + 0.5),
					),
				)
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::fixtures::node;
	use crate::graph::NodeCategory;

	#[test]
	fn five_nodes_use_three_columns() {
		let nodes: Vec<Node> = (0..5)
			.map(|i| node(&format!("n{i}"), NodeCategory::Topic, 1.0))
			.collect();
		let mut grid = GridLayout { padding: 0.0 };
		let p = grid.compute_positions(&nodes, &[], Bounds::new(300.0, 200.0));
		assert_eq!(p["n0"], Point::new(50.0, 50.0));
		assert_eq!(p["n2"], Point::new(250.0, 50.0));
		assert_eq!(p["n3"], Point::new(50.0, 150.0));
	}

	#[test]
	fn single_node_is_centered() {
		let nodes = [node("solo", NodeCategory::Topic, 1.0)];
		let p = GridLayout::default().compute_positions(&nodes, &[], Bounds::default());
		assert_eq!(p["solo"], Bounds::default().center());
	}
}
