use std::collections::HashMap;
use std::f64::consts::PI;

use super::{Bounds, LayoutStrategy, Point};
use crate::graph::{Edge, Node};

/// Nodes evenly spaced on one circle, grouped by category.
#[derive(Clone, Debug)]
pub struct CircularLayout {
	/// Radius as a fraction of the smaller canvas side.
	pub radius_ratio: f64,
}

impl Default for CircularLayout {
	fn default() -> Self {
		Self { radius_ratio: 0.4 }
	}
}

impl LayoutStrategy for CircularLayout {
	fn compute_positions(
		&mut self,
		nodes: &[Node],
		_edges: &[Edge],
		bounds: Bounds,
	) -> HashMap<String, Point> {
		let mut order: Vec<&Node> = nodes.iter().collect();
		order.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)));

		let center = bounds.center();
		let radius = bounds.width.min(bounds.height) * self.radius_ratio;
		let n = order.len().max(1) as f64;
		order
			.into_iter()
			.enumerate()
			.map(|(i, node)| {
				// Start at twelve o'clock.
				let angle = i as f64 * 2.0 * PI / n - PI / 2.0;
				(
					node.id.clone(),
					Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin()),
				)
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::fixtures::chain;

	#[test]
	fn nodes_sit_on_the_circle() {
		let g = chain();
		let bounds = Bounds::new(400.0, 200.0);
		let positions = CircularLayout::default().compute_positions(g.nodes(), g.edges(), bounds);
		assert_eq!(positions.len(), 3);
		for p in positions.values() {
			assert!((p.distance(bounds.center()) - 80.0).abs() < 1e-9);
		}
		// Person sorts first and lands at the top.
		assert!((positions["A"].y - 20.0).abs() < 1e-9);
	}
}
