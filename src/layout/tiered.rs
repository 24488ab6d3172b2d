use std::collections::HashMap;

use super::{Bounds, LayoutStrategy, Point};
use crate::graph::{Edge, Node};

/// Nodes bucketed into influence tiers, one row per tier, most influential
/// on top. Influence is read on a `0..=100` scale.
#[derive(Clone, Debug)]
pub struct TieredLayout {
	/// Number of tiers.
	pub levels: usize,
	/// Margin kept free around the rows.
	pub padding: f64,
}

impl Default for TieredLayout {
	fn default() -> Self {
		Self {
			levels: 6,
			padding: 40.0,
		}
	}
}

impl TieredLayout {
	/// Tier of `influence`, `0` being the lowest.
	pub fn level(&self, influence: f64) -> usize {
		let levels = self.levels.max(1);
		// NaN saturates to 0.
		let scaled = (influence.clamp(0.0, 100.0) / 100.0 * levels as f64) as usize;
		scaled.min(levels - 1)
	}
}

impl LayoutStrategy for TieredLayout {
	fn compute_positions(
		&mut self,
		nodes: &[Node],
		_edges: &[Edge],
		bounds: Bounds,
	) -> HashMap<String, Point> {
		let levels = self.levels.max(1);
		let mut tiers: Vec<Vec<&Node>> = vec![Vec::new(); levels];
		for node in nodes {
			tiers[self.level(node.influence)].push(node);
		}

		let pad = self.padding.min(bounds.width / 4.0).min(bounds.height / 4.0);
		let row_h = (bounds.height - 2.0 * pad) / levels as f64;
		let inner_w = bounds.width - 2.0 * pad;
		let mut out = HashMap::with_capacity(nodes.len());

		for (level, tier) in tiers.iter_mut().enumerate() {
			tier.sort_by(|a, b| b.influence.total_cmp(&a.influence).then_with(|| a.id.cmp(&b.id)));
			let y = pad + row_h * ((levels - 1 - level) as f64 + 0.5);
			let slots = tier.len() as f64 + 1.0;
			for (i, node) in tier.iter().enumerate() {
				let x = pad + inner_w * (i as f64 + 1.0) / slots;
				out.insert(node.id.clone(), Point::new(x, y));
			}
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::fixtures::{chain, node};
	use crate::graph::NodeCategory;

	#[test]
	fn levels_cover_the_scale() {
		let t = TieredLayout::default();
		assert_eq!(t.level(0.0), 0);
		assert_eq!(t.level(99.0), 5);
		assert_eq!(t.level(100.0), 5);
		assert_eq!(t.level(250.0), 5);
		assert_eq!(t.level(-3.0), 0);
		assert_eq!(t.level(f64::NAN), 0);
	}

	#[test]
	fn higher_influence_sits_higher() {
		let g = chain();
		let p = TieredLayout::default().compute_positions(g.nodes(), g.edges(), Bounds::default());
		assert!(p["A"].y < p["B"].y);
		assert!(p["B"].y < p["C"].y);
	}

	#[test]
	fn shared_tier_spreads_horizontally() {
		let nodes = [
			node("a", NodeCategory::Person, 50.0),
			node("b", NodeCategory::Person, 52.0),
		];
		let mut tiered = TieredLayout {
			levels: 6,
			padding: 0.0,
		};
		let p = tiered.compute_positions(&nodes, &[], Bounds::new(300.0, 600.0));
		assert_eq!(p["a"].y, p["b"].y);
		assert_eq!(p["b"].x, 100.0);
		assert_eq!(p["a"].x, 200.0);
	}
}
