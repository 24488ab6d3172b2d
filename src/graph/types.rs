use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Kind of entity a node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
	/// An individual account or public figure.
	Person,
	/// A company, outlet, party or agency.
	Organization,
	/// A place narratives are attached to.
	Location,
	/// A hashtag or topic tag.
	Topic,
	/// The monitored subject of the investigation.
	Subject,
}

impl NodeCategory {
	/// All categories in display order.
	pub const ALL: [NodeCategory; 5] = [
		Self::Person,
		Self::Organization,
		Self::Location,
		Self::Topic,
		Self::Subject,
	];

	/// Lowercase name, also used when matching free-text search.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Person => "person",
			Self::Organization => "organization",
			Self::Location => "location",
			Self::Topic => "topic",
			Self::Subject => "subject",
		}
	}

	/// Position in [`NodeCategory::ALL`].
	pub fn ordinal(self) -> usize {
		self as usize
	}
}

impl fmt::Display for NodeCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Relationship carried by an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
	/// Accounts amplifying each other.
	Collaboration,
	/// Accounts arguing against each other.
	Opposition,
	/// One-way reference.
	Mention,
	/// Declared social tie.
	Friendship,
}

impl RelationType {
	/// All relation types in display order.
	pub const ALL: [RelationType; 4] = [
		Self::Collaboration,
		Self::Opposition,
		Self::Mention,
		Self::Friendship,
	];

	/// Lowercase name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Collaboration => "collaboration",
			Self::Opposition => "opposition",
			Self::Mention => "mention",
			Self::Friendship => "friendship",
		}
	}
}

/// Open metadata attached to a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeMetadata {
	/// Platform verification badge.
	pub verified: bool,
	/// Follower count.
	pub followers: u64,
	/// Sentiment in `[-1, 1]`.
	pub sentiment: f64,
	/// Credibility score in `[0, 1]`.
	pub credibility: f64,
	/// Free-text description, searched by the filter layer.
	pub description: Option<String>,
}

/// A graph vertex. Positions are owned by the layout engine, not the node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	/// Unique within a snapshot.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Entity kind.
	pub category: NodeCategory,
	/// Influence score, nominally `0..=100`.
	pub influence: f64,
	/// Requested rendering size; clamped by the render layer.
	pub size: f64,
	/// Explicit fill, used by the palette color mode.
	#[serde(default)]
	pub color: Option<String>,
	/// Additional attributes.
	#[serde(default)]
	pub metadata: NodeMetadata,
}

/// Interaction statistics attached to an edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeMetadata {
	/// Number of interactions observed.
	pub frequency: u32,
	/// Normalized tie strength.
	pub strength: f64,
	/// Sentiment of the interactions in `[-1, 1]`.
	pub sentiment: f64,
}

/// A typed, weighted, directed relationship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	/// Edge identity.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Positive weight; scales attraction and stroke width.
	pub weight: f64,
	/// Relationship kind.
	pub relation: RelationType,
	/// When the relationship was last observed.
	pub timestamp: DateTime<Utc>,
	/// Additional attributes.
	#[serde(default)]
	pub metadata: EdgeMetadata,
}

impl Edge {
	/// Whether `id` is either endpoint.
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}

	/// The opposite endpoint when `id` is one of them.
	pub fn other(&self, id: &str) -> Option<&str> {
		if self.source == id {
			Some(&self.target)
		} else if self.target == id {
			Some(&self.source)
		} else {
			None
		}
	}
}

/// One consistent view of the network: unique node ids, no dangling edges.
///
/// Deserialization goes through [`GraphSnapshot::new`], so backend payloads
/// are normalized the same way as locally built snapshots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct GraphSnapshot {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct RawSnapshot {
	#[serde(default)]
	nodes: Vec<Node>,
	#[serde(default)]
	edges: Vec<Edge>,
}

impl From<RawSnapshot> for GraphSnapshot {
	fn from(raw: RawSnapshot) -> Self {
		Self::new(raw.nodes, raw.edges)
	}
}

impl GraphSnapshot {
	/// Normalizes raw data: later duplicates of a node id are dropped and
	/// edges whose endpoints are missing are discarded.
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		let mut seen = HashSet::with_capacity(nodes.len());
		let nodes: Vec<Node> = nodes
			.into_iter()
			.filter(|node| {
				let fresh = seen.insert(node.id.clone());
				if !fresh {
					warn!("dropping duplicate node id `{}`", node.id);
				}
				fresh
			})
			.collect();

		let before = edges.len();
		let edges: Vec<Edge> = edges
			.into_iter()
			.filter(|e| seen.contains(&e.source) && seen.contains(&e.target))
			.collect();
		if edges.len() != before {
			warn!("dropped {} dangling edges", before - edges.len());
		}

		Self { nodes, edges }
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in insertion order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Whether the snapshot holds no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Result<&Node, GraphError> {
		self.nodes
			.iter()
			.find(|n| n.id == id)
			.ok_or_else(|| GraphError::NotFound(id.to_string()))
	}

	/// Whether a node with `id` is present.
	pub fn contains(&self, id: &str) -> bool {
		self.nodes.iter().any(|n| n.id == id)
	}

	/// Ids of nodes directly connected to `id`.
	pub fn neighbors(&self, id: &str) -> HashSet<String> {
		self.edges
			.iter()
			.filter_map(|e| e.other(id))
			.map(str::to_string)
			.collect()
	}
}

#[cfg(test)]
pub(crate) mod fixtures {
	use chrono::TimeZone;

	use super::*;

	pub fn node(id: &str, category: NodeCategory, influence: f64) -> Node {
		Node {
			id: id.into(),
			label: id.into(),
			category,
			influence,
			size: 8.0,
			color: None,
			metadata: NodeMetadata::default(),
		}
	}

	pub fn edge(source: &str, target: &str, weight: f64) -> Edge {
		Edge {
			id: format!("{source}-{target}"),
			source: source.into(),
			target: target.into(),
			weight,
			relation: RelationType::Mention,
			timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
			metadata: EdgeMetadata::default(),
		}
	}

	/// `A (90) -> B (40) -> C (10)`.
	pub fn chain() -> GraphSnapshot {
		GraphSnapshot::new(
			vec![
				node("A", NodeCategory::Person, 90.0),
				node("B", NodeCategory::Organization, 40.0),
				node("C", NodeCategory::Topic, 10.0),
			],
			vec![edge("A", "B", 5.0), edge("B", "C", 2.0)],
		)
	}
}

#[cfg(test)]
mod tests {
	use super::fixtures::*;
	use super::*;

	#[test]
	fn duplicate_ids_keep_first() {
		let mut second = node("A", NodeCategory::Topic, 1.0);
		second.label = "later".into();
		let g = GraphSnapshot::new(vec![node("A", NodeCategory::Person, 50.0), second], vec![]);
		assert_eq!(g.nodes().len(), 1);
		assert_eq!(g.nodes()[0].category, NodeCategory::Person);
	}

	#[test]
	fn dangling_edges_are_dropped() {
		let g = GraphSnapshot::new(
			vec![node("A", NodeCategory::Person, 50.0)],
			vec![edge("A", "ghost", 1.0)],
		);
		assert!(g.edges().is_empty());
	}

	#[test]
	fn missing_node_is_not_found() {
		let g = chain();
		assert_eq!(g.node("B").map(|n| n.influence), Ok(40.0));
		assert_eq!(g.node("Z"), Err(GraphError::NotFound("Z".into())));
	}

	#[test]
	fn neighbors_ignore_direction() {
		let g = chain();
		let n = g.neighbors("B");
		assert!(n.contains("A") && n.contains("C"));
		assert_eq!(n.len(), 2);
	}

	#[test]
	fn deserializing_normalizes() {
		let json = r#"{
			"nodes": [
				{"id": "a", "label": "A", "category": "person", "influence": 5, "size": 6},
				{"id": "a", "label": "A again", "category": "topic", "influence": 1, "size": 6}
			],
			"edges": [
				{"id": "e", "source": "a", "target": "b", "weight": 1,
				 "relation": "mention", "timestamp": "2024-03-01T00:00:00Z"}
			]
		}"#;
		let g: GraphSnapshot = serde_json::from_str(json).unwrap();
		assert_eq!(g.nodes().len(), 1);
		assert!(g.edges().is_empty());
	}

	#[test]
	fn snapshot_json_uses_camel_case() {
		let json = serde_json::to_value(chain()).unwrap();
		assert_eq!(json["nodes"][0]["category"], "person");
		assert_eq!(json["edges"][0]["relation"], "mention");
		let back: GraphSnapshot = serde_json::from_value(json).unwrap();
		assert_eq!(back, chain());
	}
}
