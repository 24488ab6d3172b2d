//! Node placement: a live force simulation plus deterministic alternatives.

mod circular;
mod force;
mod grid;
mod tiered;

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, info};

use crate::error::GraphError;
use crate::graph::{Edge, Node};

pub use circular::CircularLayout;
pub use force::{ForceLayout, ForceSimulation, SimulationConfig};
pub use grid::GridLayout;
pub use tiered::TieredLayout;

/// A position in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Creates a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Whether both coordinates are finite.
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	/// Rejects non-finite coordinates for node `id`.
	pub fn validate(self, id: &str) -> Result<Self, GraphError> {
		if self.is_finite() {
			Ok(self)
		} else {
			Err(GraphError::InvalidGeometry { id: id.to_string() })
		}
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

/// Returns `p`, or `fallback` when `p` is not finite.
pub fn sanitize(id: &str, p: Point, fallback: Point) -> Point {
	p.validate(id).unwrap_or_else(|err| {
		debug!("{err}, falling back to canvas center");
		fallback
	})
}

/// Canvas extent the layouts place nodes into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Width in graph units.
	pub width: f64,
	/// Height in graph units.
	pub height: f64,
}

impl Default for Bounds {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
		}
	}
}

impl Bounds {
	/// Creates bounds, replacing degenerate sizes with the default.
	pub fn new(width: f64, height: f64) -> Self {
		let fallback = Self::default();
		Self {
			width: if width.is_finite() && width > 0.0 { width } else { fallback.width },
			height: if height.is_finite() && height > 0.0 { height } else { fallback.height },
		}
	}

	/// Center of the canvas.
	pub fn center(self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// Computes a static placement for a graph.
pub trait LayoutStrategy {
	/// Positions for every node in `nodes`.
	fn compute_positions(
		&mut self,
		nodes: &[Node],
		edges: &[Edge],
		bounds: Bounds,
	) -> HashMap<String, Point>;
}

/// The interchangeable layout modes offered to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutKind {
	/// Live physics simulation.
	#[default]
	Force,
	/// Evenly spaced on a circle.
	Circular,
	/// Row-major grid.
	Grid,
	/// One row per influence tier.
	Tiered,
}

impl LayoutKind {
	/// All modes in display order.
	pub const ALL: [LayoutKind; 4] = [Self::Force, Self::Circular, Self::Grid, Self::Tiered];

	/// Stable identifier used by the controls.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Force => "force",
			Self::Circular => "circular",
			Self::Grid => "grid",
			Self::Tiered => "tiered",
		}
	}

	/// Parses [`LayoutKind::as_str`] output.
	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|k| k.as_str() == s)
	}

	/// A one-shot strategy for this mode.
	pub fn strategy(self, config: &SimulationConfig) -> Box<dyn LayoutStrategy> {
		match self {
			Self::Force => Box::new(ForceLayout::new(config.clone())),
			Self::Circular => Box::new(CircularLayout::default()),
			Self::Grid => Box::new(GridLayout::default()),
			Self::Tiered => Box::new(TieredLayout::default()),
		}
	}
}

impl fmt::Display for LayoutKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Force => "Force-directed",
			Self::Circular => "Circular",
			Self::Grid => "Grid",
			Self::Tiered => "Tiered by influence",
		};
		f.write_str(label)
	}
}

enum Placement {
	Simulated(ForceSimulation),
	Fixed(HashMap<String, Point>),
}

/// Owns node positions for one rendering session.
///
/// Simulation state (velocities, temperature) is rebuilt on every
/// [`LayoutEngine::load`]; user pins survive for nodes that still exist.
pub struct LayoutEngine {
	kind: LayoutKind,
	bounds: Bounds,
	config: SimulationConfig,
	placement: Placement,
	pins: HashMap<String, Point>,
	dragging: Option<String>,
}

impl LayoutEngine {
	/// An engine with no nodes loaded.
	pub fn new(kind: LayoutKind, config: SimulationConfig, bounds: Bounds) -> Self {
		Self {
			kind,
			bounds,
			config,
			placement: Placement::Fixed(HashMap::new()),
			pins: HashMap::new(),
			dragging: None,
		}
	}

	/// Active layout mode.
	pub fn kind(&self) -> LayoutKind {
		self.kind
	}

	/// Canvas extent.
	pub fn bounds(&self) -> Bounds {
		self.bounds
	}

	/// Replaces the placed graph. Force layouts are warm-started from the
	/// previous positions of surviving nodes.
	pub fn load(&mut self, nodes: &[Node], edges: &[Edge]) {
		let previous = self.positions();
		self.pins.retain(|id, _| nodes.iter().any(|n| &n.id == id));
		if self.dragging.as_ref().is_some_and(|id| !self.pins.contains_key(id)) {
			self.dragging = None;
		}
		self.placement = match self.kind {
			LayoutKind::Force => {
				let mut sim =
					ForceSimulation::new(nodes, edges, &self.config, self.bounds, &previous);
				for (id, p) in &self.pins {
					sim.pin(id, *p);
				}
				if self.dragging.is_some() {
					sim.heat(true);
				}
				Placement::Simulated(sim)
			}
			kind => Placement::Fixed(
				kind.strategy(&self.config)
					.compute_positions(nodes, edges, self.bounds),
			),
		};
		debug!("{} layout loaded {} nodes", self.kind.as_str(), nodes.len());
	}

	/// Places the graph with a caller-supplied strategy. The result is static
	/// until the next load.
	pub fn load_with(
		&mut self,
		strategy: &mut dyn LayoutStrategy,
		nodes: &[Node],
		edges: &[Edge],
	) {
		self.pins.retain(|id, _| nodes.iter().any(|n| &n.id == id));
		self.dragging = None;
		self.placement = Placement::Fixed(strategy.compute_positions(nodes, edges, self.bounds));
	}

	/// Switches mode and re-places the graph. Manual pins are dropped.
	pub fn set_kind(&mut self, kind: LayoutKind, nodes: &[Node], edges: &[Edge]) {
		if kind == self.kind {
			return;
		}
		info!("switching layout {} -> {}", self.kind.as_str(), kind.as_str());
		self.kind = kind;
		self.pins.clear();
		self.dragging = None;
		self.load(nodes, edges);
	}

	/// Advances the simulation. Returns whether anything moved.
	pub fn tick(&mut self, dt: f32) -> bool {
		match &mut self.placement {
			Placement::Simulated(sim) => sim.tick(dt),
			Placement::Fixed(_) => false,
		}
	}

	/// Whether the force simulation is still hot.
	pub fn is_running(&self) -> bool {
		match &self.placement {
			Placement::Simulated(sim) => sim.is_running(),
			Placement::Fixed(_) => false,
		}
	}

	/// Finite position of `id`, or `None` if it is not placed.
	pub fn position(&self, id: &str) -> Option<Point> {
		let raw = match self.pins.get(id) {
			Some(p) => Some(*p),
			None => match &self.placement {
				Placement::Simulated(sim) => sim.position(id),
				Placement::Fixed(map) => map.get(id).copied(),
			},
		};
		raw.map(|p| sanitize(id, p, self.bounds.center()))
	}

	/// Finite positions of every placed node.
	pub fn positions(&self) -> HashMap<String, Point> {
		let mut out = match &self.placement {
			Placement::Simulated(sim) => sim.positions(),
			Placement::Fixed(map) => map.clone(),
		};
		out.extend(self.pins.iter().map(|(id, p)| (id.clone(), *p)));
		let center = self.bounds.center();
		for (id, p) in out.iter_mut() {
			*p = sanitize(id, *p, center);
		}
		out
	}

	/// Whether `id` is held in place by the user.
	pub fn is_pinned(&self, id: &str) -> bool {
		self.pins.contains_key(id)
	}

	/// Ids of every pinned node.
	pub fn pinned_ids(&self) -> HashSet<String> {
		self.pins.keys().cloned().collect()
	}

	/// Pins `id` at `at`, taking it out of the simulation's control.
	pub fn pin(&mut self, id: &str, at: Point) {
		let at = sanitize(id, at, self.bounds.center());
		self.pins.insert(id.to_string(), at);
		if let Placement::Simulated(sim) = &mut self.placement {
			sim.pin(id, at);
		}
	}

	/// Returns `id` to layout control.
	pub fn unpin(&mut self, id: &str) {
		self.pins.remove(id);
		if let Placement::Simulated(sim) = &mut self.placement {
			sim.unpin(id);
		}
	}

	/// Starts a drag: pins the node and keeps the simulation hot.
	pub fn begin_drag(&mut self, id: &str, at: Point) {
		self.pin(id, at);
		self.dragging = Some(id.to_string());
		if let Placement::Simulated(sim) = &mut self.placement {
			sim.heat(true);
		}
	}

	/// Node currently held by a drag.
	pub fn dragging(&self) -> Option<&str> {
		self.dragging.as_deref()
	}

	/// Ends a drag. Under the force layout the node is released back to the
	/// simulation; other layouts keep the manual pin.
	pub fn end_drag(&mut self, id: &str) {
		if self.dragging.as_deref() == Some(id) {
			self.dragging = None;
		}
		if let Placement::Simulated(sim) = &mut self.placement {
			sim.heat(false);
			self.unpin(id);
		}
	}

	/// Updates the canvas extent.
	pub fn resize(&mut self, bounds: Bounds) {
		self.bounds = bounds;
		if let Placement::Simulated(sim) = &mut self.placement {
			sim.recenter(bounds.center());
		}
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::graph::types::fixtures::{chain, edge, node};
	use crate::graph::{GraphSnapshot, NodeCategory};

	fn engine_for(kind: LayoutKind) -> LayoutEngine {
		LayoutEngine::new(kind, SimulationConfig::default(), Bounds::default())
	}

	/// Places every node at a fixed spot, or NaN for ids starting with `bad`.
	struct Preset;

	impl LayoutStrategy for Preset {
		fn compute_positions(
			&mut self,
			nodes: &[Node],
			_: &[Edge],
			_: Bounds,
		) -> HashMap<String, Point> {
			nodes
				.iter()
				.enumerate()
				.map(|(i, n)| {
					let p = if n.id.starts_with("bad") {
						Point::new(f64::NAN, f64::INFINITY)
					} else {
						Point::new(i as f64 * 10.0, 5.0)
					};
					(n.id.clone(), p)
				})
				.collect()
		}
	}

	#[test]
	fn non_finite_positions_fall_back_to_center() {
		let graph = GraphSnapshot::new(
			vec![node("ok", NodeCategory::Person, 1.0), node("bad", NodeCategory::Person, 1.0)],
			vec![],
		);
		let bounds = Bounds::new(200.0, 100.0);
		let mut engine = LayoutEngine::new(LayoutKind::Grid, SimulationConfig::default(), bounds);
		engine.load_with(&mut Preset, graph.nodes(), graph.edges());
		assert_eq!(engine.position("ok"), Some(Point::new(0.0, 5.0)));
		assert_eq!(engine.position("bad"), Some(Point::new(100.0, 50.0)));
		assert_eq!(engine.positions()["bad"], Point::new(100.0, 50.0));
		assert_eq!(engine.position("missing"), None);
	}

	#[test]
	fn drag_under_force_releases_pin() {
		let g = chain();
		let mut engine = engine_for(LayoutKind::Force);
		engine.load(g.nodes(), g.edges());
		engine.begin_drag("B", Point::new(10.0, 10.0));
		assert!(engine.is_pinned("B"));
		for _ in 0..5 {
			engine.tick(0.016);
		}
		assert_eq!(engine.position("B"), Some(Point::new(10.0, 10.0)));
		assert!(engine.is_running());
		engine.end_drag("B");
		assert!(!engine.is_pinned("B"));
	}

	#[test]
	fn reload_mid_drag_stays_hot() {
		let g = chain();
		let mut engine = engine_for(LayoutKind::Force);
		engine.load(g.nodes(), g.edges());
		engine.begin_drag("B", Point::new(10.0, 10.0));
		engine.load(g.nodes(), g.edges());
		for _ in 0..2000 {
			engine.tick(0.016);
		}
		assert!(engine.is_running());

		let without_b = GraphSnapshot::new(vec![g.nodes()[0].clone()], vec![]);
		engine.load(without_b.nodes(), without_b.edges());
		assert_eq!(engine.dragging(), None);
	}

	#[test]
	fn drag_under_static_layout_keeps_pin() {
		let g = chain();
		let mut engine = engine_for(LayoutKind::Circular);
		engine.load(g.nodes(), g.edges());
		engine.begin_drag("B", Point::new(10.0, 10.0));
		engine.end_drag("B");
		assert!(engine.is_pinned("B"));
		assert_eq!(engine.position("B"), Some(Point::new(10.0, 10.0)));
	}

	#[test]
	fn pins_survive_reload_but_not_mode_switch() {
		let g = chain();
		let mut engine = engine_for(LayoutKind::Grid);
		engine.load(g.nodes(), g.edges());
		engine.pin("A", Point::new(1.0, 2.0));
		engine.pin("C", Point::new(3.0, 4.0));

		let without_c = GraphSnapshot::new(g.nodes()[..2].to_vec(), g.edges().to_vec());
		engine.load(without_c.nodes(), without_c.edges());
		assert!(engine.is_pinned("A"));
		assert!(!engine.is_pinned("C"));

		engine.set_kind(LayoutKind::Tiered, g.nodes(), g.edges());
		assert!(!engine.is_pinned("A"));
		assert_eq!(engine.kind(), LayoutKind::Tiered);
	}

	#[test]
	fn force_layout_cools_down() {
		let g = chain();
		let mut engine = engine_for(LayoutKind::Force);
		engine.load(g.nodes(), g.edges());
		let mut ticks = 0;
		while engine.tick(0.016) {
			ticks += 1;
			assert!(ticks < 1_000, "simulation never converged");
		}
		assert!(!engine.is_running());
	}

	#[test]
	fn empty_graph_places_nothing() {
		for kind in LayoutKind::ALL {
			let mut engine = engine_for(kind);
			engine.load(&[], &[]);
			assert!(engine.positions().is_empty(), "{kind}");
		}
	}

	#[test]
	fn degenerate_bounds_use_default() {
		assert_eq!(Bounds::new(0.0, f64::NAN), Bounds::default());
	}

	#[test]
	fn kinds_round_trip_through_names() {
		for kind in LayoutKind::ALL {
			assert_eq!(LayoutKind::parse(kind.as_str()), Some(kind));
		}
		assert_eq!(LayoutKind::parse("spiral"), None);
	}

	fn arb_graph() -> impl Strategy<Value = (Vec<Node>, Vec<Edge>)> {
		(0usize..20).prop_flat_map(|n| {
			let nodes = prop::collection::vec((0.0f64..100.0, 0.0f64..40.0), n);
			let edges = prop::collection::vec((0..n.max(1), 0..n.max(1), 0.5f64..10.0), 0..=n * 2);
			(nodes, edges).prop_map(|(nodes, edges)| {
				let nodes: Vec<Node> = nodes
					.into_iter()
					.enumerate()
					.map(|(i, (inf, size))| {
						let mut n = node(&format!("n{i}"), NodeCategory::ALL[i % 5], inf);
						n.size = size;
						n
					})
					.collect();
				let edges = edges
					.into_iter()
					.map(|(s, t, w)| edge(&format!("n{s}"), &format!("n{t}"), w))
					.collect();
				let g = GraphSnapshot::new(nodes, edges);
				(g.nodes().to_vec(), g.edges().to_vec())
			})
		})
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(24))]

		#[test]
		fn every_strategy_yields_finite_positions((nodes, edges) in arb_graph()) {
			for kind in LayoutKind::ALL {
				let mut strategy = kind.strategy(&SimulationConfig::default());
				let positions = strategy.compute_positions(&nodes, &edges, Bounds::default());
				prop_assert_eq!(positions.len(), nodes.len());
				for (id, p) in &positions {
					prop_assert!(p.is_finite(), "{} placed {} at {:?}", kind, id, p);
				}
			}
		}
	}
}
