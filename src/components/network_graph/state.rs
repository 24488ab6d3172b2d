use log::debug;

use super::color::{ColorMode, EdgeColorMode};
use super::interaction::{Interaction, Pointer, Release};
use super::render::{self, DrawList, Scene, StyleConfig};
use crate::config::{GraphViewConfig, ZoomRange};
use crate::graph::{GraphMetrics, GraphSnapshot};
use crate::layout::{Bounds, LayoutEngine, LayoutKind, Point};

/// Screen transform: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal offset in pixels.
	pub x: f64,
	/// Vertical offset in pixels.
	pub y: f64,
	/// Scale.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	/// Graph coordinates of a screen point.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scales by `factor` around the screen point `(sx, sy)`, keeping the
	/// graph point under it fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, range: ZoomRange) {
		let new_k = range.clamp(self.k * factor);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

/// Everything one mounted graph view needs between frames.
pub struct NetworkViewState {
	graph: GraphSnapshot,
	metrics: GraphMetrics,
	layout: LayoutEngine,
	interaction: Interaction,
	transform: ViewTransform,
	style: StyleConfig,
	zoom: ZoomRange,
	hit_slack: f64,
	width: f64,
	height: f64,
	flow_time: f64,
}

impl NetworkViewState {
	pub fn new(graph: GraphSnapshot, config: &GraphViewConfig, width: f64, height: f64) -> Self {
		let config = config.clone().validated();
		let bounds = Bounds::new(width, height);
		let mut layout = LayoutEngine::new(config.layout, config.simulation, bounds);
		layout.load(graph.nodes(), graph.edges());
		Self {
			metrics: GraphMetrics::compute(&graph),
			graph,
			layout,
			interaction: Interaction::default(),
			transform: ViewTransform::default(),
			style: config.style,
			zoom: config.zoom,
			hit_slack: config.hit_slack,
			width,
			height,
			flow_time: 0.0,
		}
	}

	pub fn graph(&self) -> &GraphSnapshot {
		&self.graph
	}

	pub fn interaction(&self) -> &Interaction {
		&self.interaction
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn style(&self) -> &StyleConfig {
		&self.style
	}

	pub fn layout(&self) -> &LayoutEngine {
		&self.layout
	}

	pub fn flow_time(&self) -> f64 {
		self.flow_time
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Swaps in a new snapshot. Positions of surviving nodes carry over and
	/// interaction state pointing at vanished nodes is dropped.
	pub fn replace_graph(&mut self, graph: GraphSnapshot) {
		self.metrics = GraphMetrics::compute(&graph);
		self.graph = graph;
		self.layout.load(self.graph.nodes(), self.graph.edges());
		if let Some(id) = self.interaction.retain(&self.graph) {
			debug!("dragged node {id} left the graph");
			self.layout.end_drag(&id);
		}
	}

	pub fn set_layout(&mut self, kind: LayoutKind) {
		if kind == self.layout.kind() {
			return;
		}
		if let Some(id) = self.interaction.cancel() {
			self.layout.end_drag(&id);
		}
		self.layout.set_kind(kind, self.graph.nodes(), self.graph.edges());
	}

	pub fn set_node_colors(&mut self, mode: ColorMode) {
		self.style.node_colors = mode;
	}

	pub fn set_edge_colors(&mut self, mode: EdgeColorMode) {
		self.style.edge_colors = mode;
	}

	/// Topmost node under the screen point, nearest center first.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<String> {
		let at = self.transform.screen_to_graph(sx, sy);
		self.graph
			.nodes()
			.iter()
			.filter_map(|n| {
				let d = self.layout.position(&n.id)?.distance(at);
				(d <= self.style.radius(n.size) + self.hit_slack).then_some((d, n))
			})
			.min_by(|a, b| a.0.total_cmp(&b.0))
			.map(|(_, n)| n.id.clone())
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let at = Point::new(sx, sy);
		match self.node_at(sx, sy) {
			Some(id) => self.interaction.press_node(&id, at, self.graph.edges()),
			None => self
				.interaction
				.press_background(at, Point::new(self.transform.x, self.transform.y)),
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		let at = Point::new(sx, sy);
		match self.interaction.pointer().clone() {
			Pointer::Pressed { id, .. } => {
				let origin = self
					.layout
					.position(&id)
					.unwrap_or_else(|| self.layout.bounds().center());
				if let Some(id) = self.interaction.begin_drag(at, origin) {
					self.layout.begin_drag(&id, origin);
					self.drag_to(&id, at);
				}
			}
			Pointer::Dragging { id, .. } => self.drag_to(&id, at),
			Pointer::Panning { start, origin, .. } => {
				self.interaction.pan_moved(at);
				self.transform.x = origin.x + (sx - start.x);
				self.transform.y = origin.y + (sy - start.y);
			}
			Pointer::Idle | Pointer::Hovering(_) => match self.node_at(sx, sy) {
				Some(id) => self.interaction.hover_enter(&id, self.graph.edges()),
				None => self.interaction.hover_leave(),
			},
		}
	}

	fn drag_to(&mut self, id: &str, at: Point) {
		if let Pointer::Dragging { start, origin, .. } = *self.interaction.pointer() {
			let k = self.transform.k;
			let p = Point::new(origin.x + (at.x - start.x) / k, origin.y + (at.y - start.y) / k);
			self.layout.pin(id, p);
		}
	}

	pub fn pointer_up(&mut self) -> Release {
		let release = self.interaction.release();
		if let Release::Dropped(id) = &release {
			self.layout.end_drag(id);
		}
		release
	}

	pub fn pointer_leave(&mut self) {
		if let Some(id) = self.interaction.cancel() {
			self.layout.end_drag(&id);
		}
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.transform.zoom_at(sx, sy, factor, self.zoom);
	}

	/// Advances one frame of `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		self.layout.tick(dt as f32);
		self.interaction.advance(dt);
		self.flow_time += dt;
	}

	pub fn draw_list(&self) -> DrawList {
		let positions = self.layout.positions();
		let pinned = self.layout.pinned_ids();
		render::build(
			&Scene {
				graph: &self.graph,
				positions: &positions,
				pinned: &pinned,
				metrics: &self.metrics,
				interaction: &self.interaction,
				zoom: self.transform.k,
				fallback: self.layout.bounds().center(),
			},
			&self.style,
		)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.resize(Bounds::new(width, height));
		if self.layout.kind() != LayoutKind::Force {
			self.layout.load(self.graph.nodes(), self.graph.edges());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::fixtures::chain;

	fn state(kind: LayoutKind) -> NetworkViewState {
		let config = GraphViewConfig {
			layout: kind,
			..GraphViewConfig::default()
		};
		NetworkViewState::new(chain(), &config, 800.0, 600.0)
	}

	fn screen_pos(s: &NetworkViewState, id: &str) -> Point {
		let p = s.layout().position(id).unwrap();
		let t = s.transform();
		Point::new(p.x * t.k + t.x, p.y * t.k + t.y)
	}

	#[test]
	fn click_toggles_selection() {
		let mut s = state(LayoutKind::Circular);
		let a = screen_pos(&s, "A");
		s.pointer_down(a.x, a.y);
		assert_eq!(s.pointer_up(), Release::Clicked);
		assert_eq!(s.interaction().selected(), Some("A"));
		s.pointer_down(a.x, a.y);
		s.pointer_up();
		assert_eq!(s.interaction().selected(), None);
	}

	#[test]
	fn drag_under_force_releases_node() {
		let mut s = state(LayoutKind::Force);
		let b = screen_pos(&s, "B");
		s.pointer_down(b.x, b.y);
		s.pointer_move(b.x + 40.0, b.y);
		assert!(s.layout().is_pinned("B"));
		let moved = s.layout().position("B").unwrap();
		assert!((moved.x - (b.x + 40.0)).abs() < 1e-9);
		assert_eq!(s.pointer_up(), Release::Dropped("B".into()));
		assert!(!s.layout().is_pinned("B"));
		assert_eq!(s.interaction().selected(), None);
	}

	#[test]
	fn drag_under_circular_keeps_pin() {
		let mut s = state(LayoutKind::Circular);
		let b = screen_pos(&s, "B");
		s.pointer_down(b.x, b.y);
		s.pointer_move(b.x, b.y + 25.0);
		s.pointer_up();
		assert!(s.layout().is_pinned("B"));
		s.set_layout(LayoutKind::Grid);
		assert!(!s.layout().is_pinned("B"));
	}

	#[test]
	fn background_drag_pans() {
		let mut s = state(LayoutKind::Grid);
		s.pointer_down(1.0, 1.0);
		s.pointer_move(31.0, 21.0);
		assert_eq!(s.pointer_up(), Release::None);
		assert_eq!((s.transform().x, s.transform().y), (30.0, 20.0));
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = state(LayoutKind::Grid);
		for _ in 0..200 {
			s.wheel(400.0, 300.0, -1.0);
		}
		assert!((s.transform().k - 20.0).abs() < 1e-9);
		for _ in 0..400 {
			s.wheel(400.0, 300.0, 1.0);
		}
		assert!((s.transform().k - 0.1).abs() < 1e-9);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut t = ViewTransform::default();
		let before = t.screen_to_graph(200.0, 100.0);
		t.zoom_at(200.0, 100.0, 1.1, ZoomRange::default());
		let after = t.screen_to_graph(200.0, 100.0);
		assert!(before.distance(after) < 1e-9);
	}

	#[test]
	fn filtering_out_selection_clears_it() {
		let mut s = state(LayoutKind::Force);
		let c = screen_pos(&s, "C");
		s.pointer_down(c.x, c.y);
		s.pointer_up();
		assert_eq!(s.interaction().selected(), Some("C"));

		let g = chain();
		let without_c = GraphSnapshot::new(g.nodes()[..2].to_vec(), g.edges().to_vec());
		s.replace_graph(without_c);
		assert_eq!(s.interaction().selected(), None);
		assert_eq!(s.graph().edges().len(), 1);
	}

	#[test]
	fn refresh_mid_drag_keeps_simulation_hot() {
		let mut s = state(LayoutKind::Force);
		let b = screen_pos(&s, "B");
		s.pointer_down(b.x, b.y);
		s.pointer_move(b.x + 40.0, b.y);
		assert_eq!(s.interaction().dragged(), Some("B"));

		s.replace_graph(chain());
		for _ in 0..2000 {
			s.tick(0.016);
		}
		assert!(s.layout().is_running());
		assert_eq!(s.layout().dragging(), Some("B"));

		s.pointer_up();
		assert_eq!(s.layout().dragging(), None);
	}

	#[test]
	fn leaving_mid_drag_releases_node() {
		let mut s = state(LayoutKind::Force);
		let a = screen_pos(&s, "A");
		s.pointer_down(a.x, a.y);
		s.pointer_move(a.x + 10.0, a.y + 10.0);
		s.pointer_leave();
		assert!(!s.layout().is_pinned("A"));
		assert_eq!(s.interaction().hovered(), None);
	}

	#[test]
	fn empty_graph_draws_nothing() {
		let config = GraphViewConfig::default();
		let mut s = NetworkViewState::new(GraphSnapshot::default(), &config, 800.0, 600.0);
		s.tick(0.016);
		assert!(s.draw_list().is_empty());
		assert_eq!(s.node_at(400.0, 300.0), None);
	}
}
