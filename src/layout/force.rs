use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::{Bounds, LayoutStrategy, Point, sanitize};
use crate::graph::{Edge, Node};

/// Tuning for the force simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	/// Repulsion between node pairs, scaled by node mass.
	pub charge: f32,
	/// Spring constant along edges.
	pub spring: f32,
	/// Cap on the per-step force.
	pub max_force: f32,
	/// Integration speed.
	pub node_speed: f32,
	/// Velocity damping per step.
	pub damping: f32,
	/// Fraction of the gap to the target temperature closed per tick.
	pub alpha_decay: f64,
	/// Temperature below which the simulation stops.
	pub alpha_min: f64,
	/// Temperature held while a node is dragged.
	pub drag_alpha: f64,
	/// Extra pull per unit of edge weight above 1.
	pub weight_pull: f64,
	/// How strongly the centroid is drawn to the canvas center.
	pub center_strength: f64,
	/// Gap kept between node circles.
	pub collision_padding: f64,
	/// Node radius bounds used for collision.
	pub radius_range: (f64, f64),
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			charge: 150.0,
			spring: 0.05,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			alpha_decay: 0.0228,
			alpha_min: 0.001,
			drag_alpha: 0.3,
			weight_pull: 0.01,
			center_strength: 0.05,
			collision_padding: 2.0,
			radius_range: (4.0, 24.0),
		}
	}
}

#[derive(Clone, Debug, Default)]
struct SimNode {
	id: String,
	radius: f64,
}

/// A live force-directed layout on top of `force_graph`, with temperature,
/// weighted edges, centering and collision layered over its integrator.
pub struct ForceSimulation {
	graph: ForceGraph<SimNode, ()>,
	index: HashMap<String, DefaultNodeIdx>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx, f64)>,
	config: SimulationConfig,
	center: Point,
	alpha: f64,
	alpha_target: f64,
}

impl ForceSimulation {
	/// Builds a simulation. Nodes found in `seed` start there; the rest start
	/// on a ring around the center.
	pub fn new(
		nodes: &[Node],
		edges: &[Edge],
		config: &SimulationConfig,
		bounds: Bounds,
		seed: &HashMap<String, Point>,
	) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: config.charge,
			force_spring: config.spring,
			force_max: config.max_force,
			node_speed: config.node_speed,
			damping_factor: config.damping,
		});
		let center = bounds.center();
		let (min_r, max_r) = config.radius_range;
		let mut index = HashMap::with_capacity(nodes.len());
		let mut warm = 0;

		for (i, node) in nodes.iter().enumerate() {
			let start = match seed.get(&node.id) {
				Some(p) if p.is_finite() => {
					warm += 1;
					*p
				}
				_ => {
					let angle = (i as f64) * 2.0 * PI / nodes.len() as f64;
					Point::new(center.x + 100.0 * angle.cos(), center.y + 100.0 * angle.sin())
				}
			};
			let mass = if node.influence.is_finite() {
				5.0 + node.influence.clamp(0.0, 100.0) / 10.0
			} else {
				5.0
			};
			let radius = if node.size.is_finite() {
				node.size.clamp(min_r, max_r)
			} else {
				min_r
			};

			let idx = graph.add_node(NodeData {
				x: start.x as f32,
				y: start.y as f32,
				mass: mass as f32,
				is_anchor: false,
				user_data: SimNode {
					id: node.id.clone(),
					radius,
				},
			});
			index.insert(node.id.clone(), idx);
		}

		let mut links = Vec::with_capacity(edges.len());
		for edge in edges {
			if let (Some(&src), Some(&tgt)) = (index.get(&edge.source), index.get(&edge.target)) {
				if src != tgt {
					graph.add_edge(src, tgt, EdgeData::default());
					links.push((src, tgt, edge.weight.max(0.0)));
				}
			}
		}

		// A mostly familiar graph only needs a gentle reheat.
		let alpha = if !nodes.is_empty() && warm * 2 > nodes.len() {
			config.drag_alpha
		} else {
			1.0
		};

		Self {
			graph,
			index,
			edges: links,
			config: config.clone(),
			center,
			alpha,
			alpha_target: 0.0,
		}
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Whether ticking still moves nodes.
	pub fn is_running(&self) -> bool {
		!self.index.is_empty() && (self.alpha >= self.config.alpha_min || self.alpha_target > 0.0)
	}

	/// Holds the simulation at drag temperature while `hot`, otherwise lets
	/// it cool down.
	pub fn heat(&mut self, hot: bool) {
		if hot {
			self.alpha_target = self.config.drag_alpha;
			self.alpha = self.alpha.max(self.config.drag_alpha);
		} else {
			self.alpha_target = 0.0;
		}
	}

	/// Advances one step of `dt` seconds. Returns false once cooled.
	pub fn tick(&mut self, dt: f32) -> bool {
		if !self.is_running() {
			return false;
		}
		self.graph.update(dt * self.alpha as f32);
		self.relax();
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		true
	}

	/// Runs until cool or `max_ticks` steps have elapsed.
	pub fn settle(&mut self, max_ticks: usize) {
		for _ in 0..max_ticks {
			if !self.tick(0.016) {
				break;
			}
		}
	}

	/// Position of `id`.
	pub fn position(&self, id: &str) -> Option<Point> {
		let idx = *self.index.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(Point::new(node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	/// Positions of every node.
	pub fn positions(&self) -> HashMap<String, Point> {
		let mut out = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			out.insert(
				node.data.user_data.id.clone(),
				Point::new(node.x() as f64, node.y() as f64),
			);
		});
		out
	}

	/// Fixes `id` at `at`.
	pub fn pin(&mut self, id: &str, at: Point) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = at.x as f32;
				node.data.y = at.y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	/// Releases `id` back to the simulation.
	pub fn unpin(&mut self, id: &str) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = false;
			}
		});
	}

	/// Moves the centering target.
	pub fn recenter(&mut self, center: Point) {
		self.center = center;
	}

	/// Weighted pull, centering and collision on top of the integrator step;
	/// anchored nodes never move. Non-finite results snap to the center.
	fn relax(&mut self) {
		let center = self.center;
		let mut bodies: Vec<(DefaultNodeIdx, Point, f64, bool)> =
			Vec::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			let raw = Point::new(node.x() as f64, node.y() as f64);
			bodies.push((
				node.index(),
				sanitize(&node.data.user_data.id, raw, center),
				node.data.user_data.radius,
				node.data.is_anchor,
			));
		});
		if bodies.is_empty() {
			return;
		}
		let slot: HashMap<DefaultNodeIdx, usize> =
			bodies.iter().enumerate().map(|(i, b)| (b.0, i)).collect();
		let mut pos: Vec<Point> = bodies.iter().map(|b| b.1).collect();
		let free: Vec<bool> = bodies.iter().map(|b| !b.3).collect();

		for &(a, b, weight) in &self.edges {
			let (Some(&i), Some(&j)) = (slot.get(&a), slot.get(&b)) else {
				continue;
			};
			let extra = (weight - 1.0).max(0.0) * self.config.weight_pull * self.alpha;
			if extra <= 0.0 {
				continue;
			}
			let frac = extra.min(0.25);
			let (dx, dy) = (pos[j].x - pos[i].x, pos[j].y - pos[i].y);
			if free[i] {
				pos[i].x += dx * frac * 0.5;
				pos[i].y += dy * frac * 0.5;
			}
			if free[j] {
				pos[j].x -= dx * frac * 0.5;
				pos[j].y -= dy * frac * 0.5;
			}
		}

		let n = pos.len() as f64;
		let (sx, sy) = pos.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
		let shift = Point::new(
			(self.center.x - sx / n) * self.config.center_strength,
			(self.center.y - sy / n) * self.config.center_strength,
		);
		for (p, &free) in pos.iter_mut().zip(&free) {
			if free {
				p.x += shift.x;
				p.y += shift.y;
			}
		}

		for i in 0..pos.len() {
			for j in (i + 1)..pos.len() {
				let min = bodies[i].2 + bodies[j].2 + self.config.collision_padding;
				let (mut dx, mut dy) = (pos[j].x - pos[i].x, pos[j].y - pos[i].y);
				let mut dist = dx.hypot(dy);
				if dist >= min {
					continue;
				}
				if dist < 1e-6 {
					// Coincident: separate along a direction derived from the pair.
					let angle = (i * 31 + j * 17) as f64;
					(dx, dy, dist) = (angle.cos(), angle.sin(), 1.0);
				}
				let push = (min - dist) / dist;
				let (px, py) = (dx * push, dy * push);
				match (free[i], free[j]) {
					(true, true) => {
						pos[i].x -= px * 0.5;
						pos[i].y -= py * 0.5;
						pos[j].x += px * 0.5;
						pos[j].y += py * 0.5;
					}
					(true, false) => {
						pos[i].x -= px;
						pos[i].y -= py;
					}
					(false, true) => {
						pos[j].x += px;
						pos[j].y += py;
					}
					(false, false) => {}
				}
			}
		}

		let updated: HashMap<DefaultNodeIdx, Point> = bodies
			.iter()
			.zip(&pos)
			.filter(|((_, _, _, anchored), _)| !anchored)
			.map(|((idx, _, _, _), p)| (*idx, *p))
			.collect();
		self.graph.visit_nodes_mut(|node| {
			if let Some(p) = updated.get(&node.index()) {
				let p = sanitize(&node.data.user_data.id, *p, center);
				node.data.x = p.x as f32;
				node.data.y = p.y as f32;
			}
		});
	}
}

/// Runs a [`ForceSimulation`] to rest and reports the final positions.
#[derive(Clone, Debug, Default)]
pub struct ForceLayout {
	config: SimulationConfig,
}

impl ForceLayout {
	/// Upper bound on ticks per computation.
	pub const MAX_TICKS: usize = 400;

	/// Creates a one-shot force layout.
	pub fn new(config: SimulationConfig) -> Self {
		Self { config }
	}
}

impl LayoutStrategy for ForceLayout {
	fn compute_positions(
		&mut self,
		nodes: &[Node],
		edges: &[Edge],
		bounds: Bounds,
	) -> HashMap<String, Point> {
		let mut sim = ForceSimulation::new(nodes, edges, &self.config, bounds, &HashMap::new());
		sim.settle(Self::MAX_TICKS);
		let center = bounds.center();
		sim.positions()
			.into_iter()
			.map(|(id, p)| {
				let p = sanitize(&id, p, center);
				(id, p)
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::fixtures::{chain, node};
	use crate::graph::{GraphSnapshot, NodeCategory};

	#[test]
	fn isolated_node_stays_finite() {
		let g = GraphSnapshot::new(vec![node("solo", NodeCategory::Topic, 0.0)], vec![]);
		let positions =
			ForceLayout::default().compute_positions(g.nodes(), g.edges(), Bounds::default());
		assert!(positions["solo"].is_finite());
	}

	#[test]
	fn anchored_node_does_not_move() {
		let g = chain();
		let mut sim = ForceSimulation::new(
			g.nodes(),
			g.edges(),
			&SimulationConfig::default(),
			Bounds::default(),
			&HashMap::new(),
		);
		sim.pin("A", Point::new(5.0, 5.0));
		sim.settle(50);
		assert_eq!(sim.position("A"), Some(Point::new(5.0, 5.0)));
	}

	#[test]
	fn heat_keeps_simulation_running() {
		let g = chain();
		let mut sim = ForceSimulation::new(
			g.nodes(),
			g.edges(),
			&SimulationConfig::default(),
			Bounds::default(),
			&HashMap::new(),
		);
		sim.settle(2_000);
		assert!(!sim.is_running());
		sim.heat(true);
		assert!(sim.is_running());
		sim.settle(2_000);
		assert!(sim.is_running());
		assert!(sim.alpha() >= SimulationConfig::default().drag_alpha * 0.99);
		sim.heat(false);
		sim.settle(2_000);
		assert!(!sim.is_running());
	}

	#[test]
	fn warm_start_uses_seed_and_gentle_alpha() {
		let g = chain();
		let seed: HashMap<String, Point> = g
			.nodes()
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), Point::new(i as f64 * 50.0, 20.0)))
			.collect();
		let config = SimulationConfig::default();
		let sim = ForceSimulation::new(g.nodes(), g.edges(), &config, Bounds::default(), &seed);
		assert_eq!(sim.position("B"), Some(Point::new(50.0, 20.0)));
		assert_eq!(sim.alpha(), config.drag_alpha);
	}

	#[test]
	fn collision_separates_overlapping_nodes() {
		let g = GraphSnapshot::new(
			vec![node("a", NodeCategory::Person, 10.0), node("b", NodeCategory::Person, 10.0)],
			vec![],
		);
		let same: HashMap<String, Point> = [("a", 300.0), ("b", 301.0)]
			.into_iter()
			.map(|(id, x)| (id.to_string(), Point::new(x, 300.0)))
			.collect();
		let mut sim = ForceSimulation::new(
			g.nodes(),
			g.edges(),
			&SimulationConfig::default(),
			Bounds::default(),
			&same,
		);
		sim.tick(0.016);
		let (a, b) = (sim.position("a").unwrap(), sim.position("b").unwrap());
		assert!(a.is_finite() && b.is_finite());
		assert!(a.distance(b) > 1.0);
	}
}
