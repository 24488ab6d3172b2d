use std::cell::Cell;

use chrono::DateTime;
use log::debug;

use super::filter::GraphFilter;
use super::types::{
	Edge, EdgeMetadata, GraphSnapshot, Node, NodeCategory, NodeMetadata, RelationType,
};
use crate::error::GraphError;

/// Source of graph snapshots. Implementations must return normalized
/// snapshots (unique ids, no dangling edges) that already honour `filter`.
#[allow(async_fn_in_trait)]
pub trait GraphProvider {
	/// Fetches the network filtered by `filter`.
	async fn fetch_graph(&self, filter: &GraphFilter) -> Result<GraphSnapshot, GraphError>;

	/// Fetches one node, failing with [`GraphError::NotFound`] for unknown ids.
	async fn fetch_node(&self, id: &str) -> Result<Node, GraphError>;
}

const PEOPLE: &[&str] = &[
	"Mara Quinn",
	"Dev Castillo",
	"Ilya Sorensen",
	"Noor Haddad",
	"Jonah Pike",
	"Lena Varga",
	"Tomas Ribeiro",
	"Aiko Mori",
];
const ORGANIZATIONS: &[&str] = &[
	"Northwind Media",
	"Civic Pulse",
	"Harbor Institute",
	"Meridian Wire",
	"OpenLedger Watch",
];
const LOCATIONS: &[&str] = &["Port Avalon", "East District", "Capitol Hill", "Riverside"];
const TOPICS: &[&str] = &[
	"#waterrights",
	"#election2024",
	"#portstrike",
	"#energyprices",
	"#transitplan",
];
const SUBJECTS: &[&str] = &["Operation Lantern", "Campaign Echo"];

/// Base instant for generated timestamps (2024-01-01T00:00:00Z).
const EPOCH_SECS: i64 = 1_704_067_200;

/// Deterministic synthetic SENTINEL network.
///
/// Every fetch advances a generation counter so that refreshes drift
/// weights and influence a little, like a live feed would.
#[derive(Debug)]
pub struct MockGraphProvider {
	seed: u64,
	extra_edges: usize,
	generation: Cell<u64>,
}

impl Default for MockGraphProvider {
	fn default() -> Self {
		Self::new(7)
	}
}

impl MockGraphProvider {
	/// Creates a generator with the given seed.
	pub fn new(seed: u64) -> Self {
		Self {
			seed,
			extra_edges: 18,
			generation: Cell::new(0),
		}
	}

	/// Builds the unfiltered snapshot for `generation`.
	pub fn generate(&self, generation: u64) -> GraphSnapshot {
		let mut rng = Lcg::new(self.seed.wrapping_add(generation.wrapping_mul(0x9e37_79b9)));
		let mut nodes = Vec::new();
		let groups: [(NodeCategory, &[&str]); 5] = [
			(NodeCategory::Subject, SUBJECTS),
			(NodeCategory::Person, PEOPLE),
			(NodeCategory::Organization, ORGANIZATIONS),
			(NodeCategory::Location, LOCATIONS),
			(NodeCategory::Topic, TOPICS),
		];

		for (category, names) in groups {
			for name in names {
				let base = match category {
					NodeCategory::Subject => 85.0,
					NodeCategory::Organization => 55.0,
					NodeCategory::Person => 35.0,
					_ => 20.0,
				};
				let influence = (base + rng.next_f64() * 30.0 - 10.0).clamp(0.0, 100.0);
				nodes.push(Node {
					id: slug(name),
					label: (*name).to_string(),
					category,
					influence,
					size: 6.0 + influence / 6.0,
					color: None,
					metadata: NodeMetadata {
						verified: rng.next_f64() > 0.6,
						followers: (influence * 1_500.0 * (0.5 + rng.next_f64())) as u64,
						sentiment: rng.next_f64() * 2.0 - 1.0,
						credibility: 0.3 + rng.next_f64() * 0.7,
						description: Some(format!(
							"{category} tracked in {}",
							pick(&mut rng, TOPICS)
						)),
					},
				});
			}
		}

		let mut edges = Vec::new();
		// Spanning tree so every node starts connected, then random extras.
		for i in 1..nodes.len() {
			let j = (rng.next_f64() * i as f64) as usize;
			edges.push(self.edge(&mut rng, edges.len(), &nodes[i].id, &nodes[j].id));
		}
		for _ in 0..self.extra_edges {
			let a = (rng.next_f64() * nodes.len() as f64) as usize;
			let b = (rng.next_f64() * nodes.len() as f64) as usize;
			if a != b {
				edges.push(self.edge(&mut rng, edges.len(), &nodes[a].id, &nodes[b].id));
			}
		}

		GraphSnapshot::new(nodes, edges)
	}

	fn edge(&self, rng: &mut Lcg, n: usize, source: &str, target: &str) -> Edge {
		let relation = RelationType::ALL[(rng.next_f64() * 4.0) as usize % 4];
		let secs = EPOCH_SECS + (rng.next_f64() * 300.0 * 86_400.0) as i64;
		Edge {
			id: format!("e{n}"),
			source: source.to_string(),
			target: target.to_string(),
			weight: 1.0 + (rng.next_f64() * 9.0).round(),
			relation,
			timestamp: DateTime::from_timestamp(secs, 0).unwrap_or_default(),
			metadata: EdgeMetadata {
				frequency: 1 + (rng.next_f64() * 40.0) as u32,
				strength: rng.next_f64(),
				sentiment: rng.next_f64() * 2.0 - 1.0,
			},
		}
	}
}

impl GraphProvider for MockGraphProvider {
	async fn fetch_graph(&self, filter: &GraphFilter) -> Result<GraphSnapshot, GraphError> {
		let generation = self.generation.get();
		self.generation.set(generation + 1);
		let graph = self.generate(generation);
		debug!(
			"mock generation {generation}: {} nodes, {} edges",
			graph.nodes().len(),
			graph.edges().len()
		);
		Ok(filter.apply(&graph))
	}

	async fn fetch_node(&self, id: &str) -> Result<Node, GraphError> {
		let generation = self.generation.get().saturating_sub(1);
		self.generate(generation).node(id).cloned()
	}
}

fn slug(name: &str) -> String {
	name.trim_start_matches('#')
		.to_lowercase()
		.split_whitespace()
		.collect::<Vec<_>>()
		.join("-")
}

fn pick<'a>(rng: &mut Lcg, items: &[&'a str]) -> &'a str {
	items[(rng.next_f64() * items.len() as f64) as usize % items.len()]
}

/// Small linear congruential generator; deterministic across targets.
struct Lcg(u64);

impl Lcg {
	fn new(seed: u64) -> Self {
		Self(seed ^ 0x5851_f42d_4c95_7f2d)
	}

	fn next_f64(&mut self) -> f64 {
		self.0 = self
			.0
			.wrapping_mul(6_364_136_223_846_793_005)
			.wrapping_add(1_442_695_040_888_963_407);
		(self.0 >> 11) as f64 / (1u64 << 53) as f64
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use futures::executor::block_on;

	use super::*;

	#[test]
	fn same_generation_is_deterministic() {
		let p = MockGraphProvider::new(3);
		assert_eq!(p.generate(0), p.generate(0));
		assert_ne!(p.generate(0), p.generate(1));
	}

	#[test]
	fn generated_graph_is_normalized() {
		let g = MockGraphProvider::default().generate(0);
		let ids: HashSet<_> = g.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids.len(), g.nodes().len());
		assert!(g.edges().len() >= g.nodes().len() - 1);
		for e in g.edges() {
			assert!(ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()));
		}
		for n in g.nodes() {
			assert!((0.0..=100.0).contains(&n.influence));
			assert!((-1.0..=1.0).contains(&n.metadata.sentiment));
		}
	}

	#[test]
	fn fetch_applies_filter() {
		let p = MockGraphProvider::default();
		let filter = GraphFilter {
			min_influence: Some(60.0),
			..Default::default()
		};
		let g = block_on(p.fetch_graph(&filter)).unwrap();
		assert!(g.nodes().iter().all(|n| n.influence >= 60.0));
		assert!(g.nodes().iter().any(|n| n.category == NodeCategory::Subject));
	}

	#[test]
	fn unknown_node_is_not_found() {
		let p = MockGraphProvider::default();
		let _ = block_on(p.fetch_graph(&GraphFilter::default()));
		assert_eq!(
			block_on(p.fetch_node("operation-lantern")).map(|n| n.label),
			Ok("Operation Lantern".to_string())
		);
		assert_eq!(
			block_on(p.fetch_node("nobody")),
			Err(GraphError::NotFound("nobody".into()))
		);
	}

	#[test]
	fn slugs_strip_hash_and_spaces() {
		assert_eq!(slug("#portstrike"), "portstrike");
		assert_eq!(slug("Civic Pulse"), "civic-pulse");
	}
}
