use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Edge, GraphSnapshot, Node, NodeCategory, RelationType};

/// Inclusive time window applied to edge timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
	/// Earliest accepted timestamp.
	pub start: DateTime<Utc>,
	/// Latest accepted timestamp.
	pub end: DateTime<Utc>,
}

impl TimeWindow {
	/// A window accepting every timestamp from the epoch onward.
	pub fn open() -> Self {
		Self {
			start: DateTime::<Utc>::UNIX_EPOCH,
			end: open_end(),
		}
	}

	/// Whether `at` falls inside the window.
	pub fn contains(&self, at: DateTime<Utc>) -> bool {
		self.start <= at && at <= self.end
	}
}

fn open_end() -> DateTime<Utc> {
	NaiveDate::from_ymd_opt(9999, 12, 31)
		.and_then(|d| d.and_hms_opt(23, 59, 59))
		.map(|t| t.and_utc())
		.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Which side of the time window a date input controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowBound {
	/// Earliest day, from midnight.
	Start,
	/// Latest day, through its last second.
	End,
}

/// Search and filter state. `None` allow-lists accept everything.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphFilter {
	/// Case-insensitive text matched against label, category and description.
	pub query: String,
	/// Node categories to keep.
	pub categories: Option<BTreeSet<NodeCategory>>,
	/// Edge relation types to keep.
	pub relations: Option<BTreeSet<RelationType>>,
	/// Minimum node influence.
	pub min_influence: Option<f64>,
	/// Minimum edge weight.
	pub min_weight: Option<f64>,
	/// Edge timestamp window.
	pub window: Option<TimeWindow>,
}

impl GraphFilter {
	/// Derives the filtered view. Nodes are filtered first, then every edge
	/// with an endpoint outside the kept set is dropped.
	pub fn apply(&self, graph: &GraphSnapshot) -> GraphSnapshot {
		let needle = self.query.trim().to_lowercase();
		let nodes: Vec<Node> = graph
			.nodes()
			.iter()
			.filter(|n| self.keeps_node(n, &needle))
			.cloned()
			.collect();

		let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let edges: Vec<Edge> = graph
			.edges()
			.iter()
			.filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
			.filter(|e| self.keeps_edge(e))
			.cloned()
			.collect();

		GraphSnapshot::new(nodes, edges)
	}

	/// Whether any criterion is set.
	pub fn is_active(&self) -> bool {
		*self != Self::default()
	}

	/// Adds or removes `category` from the allow-list. Removing from an unset
	/// list starts from every category.
	pub fn toggle_category(&mut self, category: NodeCategory) {
		let set = self
			.categories
			.get_or_insert_with(|| NodeCategory::ALL.into_iter().collect());
		if !set.remove(&category) {
			set.insert(category);
		}
		if set.len() == NodeCategory::ALL.len() {
			self.categories = None;
		}
	}

	/// Same as [`GraphFilter::toggle_category`] for relation types.
	pub fn toggle_relation(&mut self, relation: RelationType) {
		let set = self
			.relations
			.get_or_insert_with(|| RelationType::ALL.into_iter().collect());
		if !set.remove(&relation) {
			set.insert(relation);
		}
		if set.len() == RelationType::ALL.len() {
			self.relations = None;
		}
	}

	/// Sets one side of the edge time window from a `YYYY-MM-DD` date.
	/// An empty or malformed value opens that side; a window open on both
	/// sides is removed.
	pub fn set_window_bound(&mut self, bound: WindowBound, date: &str) {
		let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok();
		let open = TimeWindow::open();
		let mut window = self.window.unwrap_or(open);
		match bound {
			WindowBound::Start => {
				window.start = day
					.and_then(|d| d.and_hms_opt(0, 0, 0))
					.map_or(open.start, |t| t.and_utc());
			}
			WindowBound::End => {
				window.end = day
					.and_then(|d| d.and_hms_opt(23, 59, 59))
					.map_or(open.end, |t| t.and_utc());
			}
		}
		self.window = (window != open).then_some(window);
	}

	/// The `YYYY-MM-DD` date of one side of the window, empty when open.
	pub fn window_bound(&self, bound: WindowBound) -> String {
		let Some(window) = self.window else {
			return String::new();
		};
		let open = TimeWindow::open();
		let (at, unset) = match bound {
			WindowBound::Start => (window.start, open.start),
			WindowBound::End => (window.end, open.end),
		};
		if at == unset {
			String::new()
		} else {
			at.format("%Y-%m-%d").to_string()
		}
	}

	/// Whether `category` passes the allow-list.
	pub fn allows_category(&self, category: NodeCategory) -> bool {
		self.categories.as_ref().is_none_or(|set| set.contains(&category))
	}

	/// Whether `relation` passes the allow-list.
	pub fn allows_relation(&self, relation: RelationType) -> bool {
		self.relations.as_ref().is_none_or(|set| set.contains(&relation))
	}

	fn keeps_node(&self, node: &Node, needle: &str) -> bool {
		self.allows_category(node.category)
			&& self.min_influence.is_none_or(|min| node.influence >= min)
			&& matches_query(node, needle)
	}

	fn keeps_edge(&self, edge: &Edge) -> bool {
		self.allows_relation(edge.relation)
			&& self.min_weight.is_none_or(|min| edge.weight >= min)
			&& self.window.is_none_or(|w| w.contains(edge.timestamp))
	}
}

fn matches_query(node: &Node, needle: &str) -> bool {
	needle.is_empty()
		|| node.label.to_lowercase().contains(needle)
		|| node.category.as_str().contains(needle)
		|| node
			.metadata
			.description
			.as_deref()
			.is_some_and(|d| d.to_lowercase().contains(needle))
}
