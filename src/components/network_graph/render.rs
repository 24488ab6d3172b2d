//! Turns a positioned graph into a flat list of shapes. Nothing here touches
//! the canvas; see `canvas.rs` for the painter.

use std::collections::{HashMap, HashSet};

use super::color::{ColorMode, EdgeColorMode, Rgba, relation_color, role_color};
use super::interaction::Interaction;
use crate::graph::{EdgeClass, GraphMetrics, GraphSnapshot, Node};
use crate::layout::{Point, sanitize};

/// Visual parameters of the graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleConfig {
	/// Smallest node radius.
	pub min_radius: f64,
	/// Largest node radius.
	pub max_radius: f64,
	/// Characters shown before a label is cut with an ellipsis.
	pub label_budget: usize,
	/// Nodes below this influence are only labelled when emphasised.
	pub label_min_influence: f64,
	/// Node fill strategy.
	pub node_colors: ColorMode,
	/// Edge stroke strategy.
	pub edge_colors: EdgeColorMode,
	/// Canvas background.
	pub background: Rgba,
	/// Label text color.
	pub label_color: Rgba,
	/// Outline drawn behind labels.
	pub halo: Rgba,
}

impl Default for StyleConfig {
	fn default() -> Self {
		Self {
			min_radius: 4.0,
			max_radius: 24.0,
			label_budget: 18,
			label_min_influence: 45.0,
			node_colors: ColorMode::default(),
			edge_colors: EdgeColorMode::default(),
			background: Rgba::rgb(26, 26, 46),
			label_color: Rgba::rgb(255, 255, 255),
			halo: Rgba::rgb(26, 26, 46).with_alpha(0.85),
		}
	}
}

impl StyleConfig {
	/// Radius for a node of requested `size`.
	pub fn radius(&self, size: f64) -> f64 {
		if size.is_finite() {
			size.clamp(self.min_radius, self.max_radius)
		} else {
			self.min_radius
		}
	}
}

/// Outline around a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
	/// Stroke color.
	pub color: Rgba,
	/// Stroke width in graph units.
	pub width: f64,
}

/// Radial glow behind an emphasised node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
	/// Outer radius.
	pub radius: f64,
	/// Peak opacity.
	pub alpha: f64,
}

/// One drawing command in graph coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
	/// Straight edge ending in an arrowhead of size `arrow`.
	Line {
		/// Start, on the source circle.
		from: Point,
		/// Arrow tip, on the target circle.
		to: Point,
		/// Stroke color.
		color: Rgba,
		/// Stroke width.
		width: f64,
		/// Arrowhead length.
		arrow: f64,
	},
	/// Quadratic edge ending in an arrowhead.
	Curve {
		/// Start, on the source circle.
		from: Point,
		/// Bezier control point.
		control: Point,
		/// Arrow tip, on the target circle.
		to: Point,
		/// Stroke color.
		color: Rgba,
		/// Stroke width.
		width: f64,
		/// Arrowhead length.
		arrow: f64,
	},
	/// A node.
	Circle {
		/// Node id, for hit tests and debugging.
		id: String,
		/// Center.
		center: Point,
		/// Radius.
		radius: f64,
		/// Fill.
		fill: Rgba,
		/// Optional outline.
		ring: Option<Ring>,
		/// Optional glow.
		glow: Option<Glow>,
	},
	/// Text with a contrasting outline.
	Label {
		/// Text, already truncated.
		text: String,
		/// Baseline start.
		at: Point,
		/// Font size.
		size: f64,
		/// Fill color.
		color: Rgba,
		/// Outline color.
		halo: Rgba,
	},
}

/// Ordered drawing commands: edges, nodes, then labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
	/// Shapes in paint order.
	pub shapes: Vec<Shape>,
}

impl DrawList {
	/// Whether nothing would be drawn.
	pub fn is_empty(&self) -> bool {
		self.shapes.is_empty()
	}
}

/// Everything the render layer reads.
pub struct Scene<'a> {
	/// Filtered graph to draw.
	pub graph: &'a GraphSnapshot,
	/// Node positions.
	pub positions: &'a HashMap<String, Point>,
	/// Nodes held in place by the user.
	pub pinned: &'a HashSet<String>,
	/// Degree heuristics for role colors.
	pub metrics: &'a GraphMetrics,
	/// Hover and selection.
	pub interaction: &'a Interaction,
	/// Current zoom factor; strokes and text keep a constant screen size.
	pub zoom: f64,
	/// Used for missing or non-finite positions.
	pub fallback: Point,
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Cuts `label` to `budget` characters, ending in an ellipsis when cut.
pub fn truncate_label(label: &str, budget: usize) -> String {
	if label.chars().count() <= budget {
		return label.to_string();
	}
	let mut out: String = label.chars().take(budget.saturating_sub(1)).collect();
	out.push('…');
	out
}

/// Builds the display list for `scene`.
pub fn build(scene: &Scene<'_>, style: &StyleConfig) -> DrawList {
	let mut shapes = Vec::new();
	if scene.graph.is_empty() {
		return DrawList { shapes };
	}

	let k = if scene.zoom.is_finite() && scene.zoom > 0.0 {
		scene.zoom
	} else {
		1.0
	};
	let inter = scene.interaction;
	let has_highlight = inter.hovered().is_some();
	let t = ease_out_cubic(inter.highlight_t());
	let pos = |id: &str| {
		scene
			.positions
			.get(id)
			.map(|p| sanitize(id, *p, scene.fallback))
			.unwrap_or(scene.fallback)
	};
	let radii: HashMap<&str, f64> = scene
		.graph
		.nodes()
		.iter()
		.map(|n| (n.id.as_str(), style.radius(n.size)))
		.collect();

	let arrow = 7.0 / k;
	for edge in scene.graph.edges() {
		let (p1, p2) = (pos(&edge.source), pos(&edge.target));
		let (dx, dy) = (p2.x - p1.x, p2.y - p1.y);
		let dist = dx.hypot(dy);
		if dist < 0.001 {
			continue;
		}
		let r1 = radii.get(edge.source.as_str()).copied().unwrap_or(style.min_radius);
		let r2 = radii.get(edge.target.as_str()).copied().unwrap_or(style.min_radius);

		let emphasised = inter.hovered().is_some_and(|h| edge.touches(h));
		let base_width = (0.75 + 0.35 * edge.weight.max(0.0).sqrt()).min(4.0) / k;
		let (alpha, width) = if !has_highlight {
			(0.6, base_width)
		} else if emphasised {
			(0.6 + 0.3 * t, base_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, base_width * (1.0 - 0.3 * t))
		};

		let (color, curved) = match style.edge_colors {
			EdgeColorMode::Relation => (relation_color(edge.relation), false),
			EdgeColorMode::Causality => match scene.metrics.classify_edge(edge) {
				EdgeClass::Uniform(role) => (role_color(role), false),
				EdgeClass::Crossing { from, .. } => (role_color(from), true),
			},
		};
		let color = color.with_alpha(alpha);

		if curved {
			let mid = Point::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0);
			let control = Point::new(mid.x - dy * 0.2, mid.y + dx * 0.2);
			shapes.push(Shape::Curve {
				from: step_towards(p1, control, r1),
				control,
				to: step_towards(p2, control, r2),
				color,
				width,
				arrow,
			});
		} else {
			let (ux, uy) = (dx / dist, dy / dist);
			shapes.push(Shape::Line {
				from: Point::new(p1.x + ux * r1, p1.y + uy * r1),
				to: Point::new(p2.x - ux * r2, p2.y - uy * r2),
				color,
				width,
				arrow,
			});
		}
	}

	// Dimmed nodes first so the emphasised neighbourhood paints on top.
	let (dimmed, lit): (Vec<&Node>, Vec<&Node>) = scene
		.graph
		.nodes()
		.iter()
		.partition(|n| !(has_highlight && inter.is_highlighted(&n.id)));
	let mut labels = Vec::new();

	for node in dimmed.into_iter().chain(lit) {
		let id = node.id.as_str();
		let center = pos(id);
		let base = radii.get(id).copied().unwrap_or(style.min_radius);
		let fill = style.node_colors.node_fill(node, scene.metrics.role(id));
		let hovered = inter.hovered() == Some(id);
		let lit = has_highlight && inter.is_highlighted(id);

		let (radius, alpha, glow) = if !has_highlight {
			(base, 1.0, None)
		} else if hovered {
			let glow = (t > 0.01).then(|| Glow {
				radius: base * (1.8 + 1.2 * t),
				alpha: 0.35 * t,
			});
			(base * (1.0 + 0.35 * t), 1.0, glow)
		} else if lit {
			let glow = (t > 0.01).then(|| Glow {
				radius: base * (1.4 + 0.6 * t),
				alpha: 0.2 * t,
			});
			(base * (1.0 + 0.2 * t), 1.0, glow)
		} else {
			(base * (1.0 - 0.15 * t), 1.0 - 0.7 * t, None)
		};

		let ring = if inter.selected() == Some(id) {
			Some(Ring {
				color: Rgba::rgb(255, 255, 255),
				width: 2.5 / k,
			})
		} else if hovered && t > 0.01 {
			Some(Ring {
				color: Rgba::rgb(255, 255, 255).with_alpha(0.7 * t),
				width: 1.5 / k,
			})
		} else if scene.pinned.contains(id) {
			Some(Ring {
				color: Rgba::rgb(255, 255, 255).with_alpha(0.45),
				width: 1.0 / k,
			})
		} else {
			None
		};

		shapes.push(Shape::Circle {
			id: node.id.clone(),
			center,
			radius,
			fill: fill.with_alpha(alpha),
			ring,
			glow,
		});

		if lit || inter.selected() == Some(id) || node.influence >= style.label_min_influence {
			let label_alpha = if lit { 1.0 } else { alpha * 0.85 };
			labels.push(Shape::Label {
				text: truncate_label(&node.label, style.label_budget),
				at: Point::new(center.x + radius + 3.0 / k, center.y + 3.0 / k),
				size: 11.0 / k.max(0.5),
				color: style.label_color.with_alpha(label_alpha),
				halo: style.halo,
			});
		}
	}

	shapes.extend(labels);
	DrawList { shapes }
}

/// `from` moved `by` units towards `to`.
fn step_towards(from: Point, to: Point, by: f64) -> Point {
	let (dx, dy) = (to.x - from.x, to.y - from.y);
	let d = dx.hypot(dy);
	if d < 1e-9 {
		return from;
	}
	Point::new(from.x + dx / d * by, from.y + dy / d * by)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::fixtures::chain;

	struct Fixture {
		graph: GraphSnapshot,
		positions: HashMap<String, Point>,
		pinned: HashSet<String>,
		metrics: GraphMetrics,
	}

	impl Fixture {
		fn new(graph: GraphSnapshot) -> Self {
			let positions = graph
				.nodes()
				.iter()
				.enumerate()
				.map(|(i, n)| (n.id.clone(), Point::new(i as f64 * 100.0, 50.0)))
				.collect();
			let metrics = GraphMetrics::compute(&graph);
			Self {
				graph,
				positions,
				pinned: HashSet::new(),
				metrics,
			}
		}

		fn draw(&self, interaction: &Interaction, style: &StyleConfig) -> DrawList {
			build(
				&Scene {
					graph: &self.graph,
					positions: &self.positions,
					pinned: &self.pinned,
					metrics: &self.metrics,
					interaction,
					zoom: 1.0,
					fallback: Point::new(400.0, 300.0),
				},
				style,
			)
		}
	}

	fn circles(list: &DrawList) -> Vec<(&str, f64, f64)> {
		list.shapes
			.iter()
			.filter_map(|s| match s {
				Shape::Circle { id, radius, fill, .. } => Some((id.as_str(), *radius, fill.a)),
				_ => None,
			})
			.collect()
	}

	#[test]
	fn empty_graph_draws_nothing() {
		let f = Fixture::new(GraphSnapshot::default());
		assert!(f.draw(&Interaction::default(), &StyleConfig::default()).is_empty());
	}

	#[test]
	fn radius_is_clamped() {
		let style = StyleConfig::default();
		assert_eq!(style.radius(1.0), 4.0);
		assert_eq!(style.radius(10.0), 10.0);
		assert_eq!(style.radius(99.0), 24.0);
		assert_eq!(style.radius(f64::NAN), 4.0);
	}

	#[test]
	fn labels_are_truncated() {
		assert_eq!(truncate_label("short", 18), "short");
		assert_eq!(truncate_label("Operation Lantern Extended", 10), "Operation…");
		assert_eq!(truncate_label("ÄÖÜäöü", 3), "ÄÖ…");
	}

	#[test]
	fn hover_round_trip_restores_baseline() {
		let f = Fixture::new(chain());
		let style = StyleConfig::default();
		let mut inter = Interaction::default();
		let baseline = f.draw(&inter, &style);

		inter.hover_enter("B", f.graph.edges());
		for _ in 0..30 {
			inter.advance(0.016);
		}
		assert_ne!(f.draw(&inter, &style), baseline);
		inter.hover_leave();
		assert_eq!(f.draw(&inter, &style), baseline);
	}

	#[test]
	fn hover_dims_everything_outside_the_neighbourhood() {
		let f = Fixture::new(chain());
		let style = StyleConfig::default();
		let mut inter = Interaction::default();
		inter.hover_enter("A", f.graph.edges());
		for _ in 0..120 {
			inter.advance(0.016);
		}
		let list = f.draw(&inter, &style);
		let c = circles(&list);
		// C is dimmed and drawn first; A (hovered) is enlarged.
		assert_eq!(c[0].0, "C");
		assert!(c[0].2 < 1.0);
		let a = c.iter().find(|x| x.0 == "A").unwrap();
		assert!(a.1 > 8.0 && a.2 == 1.0);
	}

	#[test]
	fn causality_mode_curves_edges_between_roles() {
		let f = Fixture::new(chain());
		let mut style = StyleConfig::default();
		let lines = |list: &DrawList| {
			list.shapes
				.iter()
				.filter(|s| matches!(s, Shape::Line { .. }))
				.count()
		};
		let curves = |list: &DrawList| {
			list.shapes
				.iter()
				.filter(|s| matches!(s, Shape::Curve { .. }))
				.count()
		};

		let relation = f.draw(&Interaction::default(), &style);
		assert_eq!((lines(&relation), curves(&relation)), (2, 0));

		style.edge_colors = EdgeColorMode::Causality;
		let causal = f.draw(&Interaction::default(), &style);
		assert_eq!((lines(&causal), curves(&causal)), (0, 2));
	}

	#[test]
	fn non_finite_positions_use_fallback() {
		let mut f = Fixture::new(chain());
		f.positions.insert("A".into(), Point::new(f64::NAN, 0.0));
		f.positions.remove("C");
		let list = f.draw(&Interaction::default(), &StyleConfig::default());
		for shape in &list.shapes {
			if let Shape::Circle { id, center, .. } = shape {
				assert!(center.is_finite());
				if id == "A" || id == "C" {
					assert_eq!(*center, Point::new(400.0, 300.0));
				}
			}
		}
	}

	#[test]
	fn selection_and_pins_get_rings() {
		let mut f = Fixture::new(chain());
		f.pinned.insert("C".into());
		let mut inter = Interaction::default();
		inter.click_node("A");
		let list = f.draw(&inter, &StyleConfig::default());
		let rings: Vec<_> = list
			.shapes
			.iter()
			.filter_map(|s| match s {
				Shape::Circle { id, ring: Some(r), .. } => Some((id.as_str(), r.width)),
				_ => None,
			})
			.collect();
		assert_eq!(rings, [("A", 2.5), ("C", 1.0)]);
	}

	#[test]
	fn low_influence_nodes_are_unlabelled_until_selected() {
		let f = Fixture::new(chain());
		let style = StyleConfig::default();
		let count = |list: &DrawList| {
			list.shapes
				.iter()
				.filter(|s| matches!(s, Shape::Label { .. }))
				.count()
		};
		let mut inter = Interaction::default();
		assert_eq!(count(&f.draw(&inter, &style)), 1);
		inter.click_node("C");
		assert_eq!(count(&f.draw(&inter, &style)), 2);
	}
}
