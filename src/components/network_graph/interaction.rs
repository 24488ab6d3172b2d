use std::collections::HashSet;

use crate::graph::{Edge, GraphSnapshot};
use crate::layout::Point;

/// Screen distance a press must travel before it becomes a drag or pan.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// What the pointer is currently doing. Selection lives outside this enum
/// because it persists across pointer gestures.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Pointer {
	/// Nothing under or held by the pointer.
	#[default]
	Idle,
	/// Over a node.
	Hovering(String),
	/// Button down on a node, not yet moved past the threshold.
	Pressed {
		/// Node under the press.
		id: String,
		/// Screen position of the press.
		start: Point,
	},
	/// Moving a node.
	Dragging {
		/// Node being dragged.
		id: String,
		/// Screen position where the press started.
		start: Point,
		/// Graph position of the node when the drag started.
		origin: Point,
	},
	/// Moving the viewport.
	Panning {
		/// Screen position of the press.
		start: Point,
		/// Transform offset when the pan started.
		origin: Point,
		/// Whether the pointer left the threshold.
		moved: bool,
	},
}

/// Hover, drag and selection state for one graph view.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
	pointer: Pointer,
	selected: Option<String>,
	neighbors: HashSet<String>,
	/// Eased 0..1 strength of the hover emphasis.
	highlight_t: f64,
	delay_t: f64,
}

impl Interaction {
	/// Current pointer state.
	pub fn pointer(&self) -> &Pointer {
		&self.pointer
	}

	/// The node whose neighbourhood is emphasised, if any.
	pub fn hovered(&self) -> Option<&str> {
		match &self.pointer {
			Pointer::Hovering(id) | Pointer::Pressed { id, .. } | Pointer::Dragging { id, .. } => {
				Some(id)
			}
			_ => None,
		}
	}

	/// The node being dragged, if any.
	pub fn dragged(&self) -> Option<&str> {
		match &self.pointer {
			Pointer::Dragging { id, .. } => Some(id),
			_ => None,
		}
	}

	/// The selected node, if any.
	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	/// Neighbours of the hovered node.
	pub fn neighbors(&self) -> &HashSet<String> {
		&self.neighbors
	}

	/// Whether `id` is the hovered node or one of its neighbours.
	pub fn is_highlighted(&self, id: &str) -> bool {
		self.hovered() == Some(id) || self.neighbors.contains(id)
	}

	/// Eased emphasis strength.
	pub fn highlight_t(&self) -> f64 {
		self.highlight_t
	}

	/// Pointer entered `id`. Ignored mid-gesture.
	pub fn hover_enter(&mut self, id: &str, edges: &[Edge]) {
		let was_hovering = match &self.pointer {
			Pointer::Idle => false,
			Pointer::Hovering(current) if current == id => return,
			Pointer::Hovering(_) => true,
			_ => return,
		};
		if !was_hovering {
			self.delay_t = 0.0;
		}
		self.pointer = Pointer::Hovering(id.to_string());
		self.neighbors = neighbors_of(id, edges);
	}

	/// Pointer left the hovered node.
	pub fn hover_leave(&mut self) {
		if matches!(self.pointer, Pointer::Hovering(_)) {
			self.pointer = Pointer::Idle;
			self.neighbors.clear();
			self.highlight_t = 0.0;
			self.delay_t = 0.0;
		}
	}

	/// Toggles selection of `id`.
	pub fn click_node(&mut self, id: &str) {
		if self.selected.as_deref() == Some(id) {
			self.selected = None;
		} else {
			self.selected = Some(id.to_string());
		}
	}

	/// A click on empty canvas clears the selection.
	pub fn click_background(&mut self) {
		self.selected = None;
	}

	/// Button down on `id`.
	pub fn press_node(&mut self, id: &str, at: Point, edges: &[Edge]) {
		self.hover_enter(id, edges);
		self.pointer = Pointer::Pressed {
			id: id.to_string(),
			start: at,
		};
	}

	/// Button down on the background with the current pan offset.
	pub fn press_background(&mut self, at: Point, offset: Point) {
		self.neighbors.clear();
		self.highlight_t = 0.0;
		self.pointer = Pointer::Panning {
			start: at,
			origin: offset,
			moved: false,
		};
	}

	/// Promotes a press into a drag once the pointer passes the threshold.
	/// Returns the node id when the drag starts.
	pub fn begin_drag(&mut self, at: Point, node_origin: Point) -> Option<String> {
		let Pointer::Pressed { id, start } = &self.pointer else {
			return None;
		};
		if start.distance(at) < DRAG_THRESHOLD {
			return None;
		}
		let id = id.clone();
		self.pointer = Pointer::Dragging {
			id: id.clone(),
			start: *start,
			origin: node_origin,
		};
		Some(id)
	}

	/// Marks an active pan as moved once it passes the threshold.
	pub fn pan_moved(&mut self, at: Point) {
		if let Pointer::Panning { start, moved, .. } = &mut self.pointer {
			*moved |= start.distance(at) >= DRAG_THRESHOLD;
		}
	}

	/// Button released.
	pub fn release(&mut self) -> Release {
		let outcome = match std::mem::take(&mut self.pointer) {
			Pointer::Pressed { id, .. } => {
				self.click_node(&id);
				self.pointer = Pointer::Hovering(id);
				Release::Clicked
			}
			Pointer::Dragging { id, .. } => {
				self.pointer = Pointer::Hovering(id.clone());
				Release::Dropped(id)
			}
			Pointer::Panning { moved, .. } => {
				if moved {
					Release::None
				} else {
					self.click_background();
					Release::Clicked
				}
			}
			other => {
				self.pointer = other;
				Release::None
			}
		};
		if self.pointer == Pointer::Idle {
			self.neighbors.clear();
		}
		outcome
	}

	/// Pointer left the canvas: abandon any gesture without clicking.
	pub fn cancel(&mut self) -> Option<String> {
		let dropped = self.dragged().map(str::to_string);
		self.pointer = Pointer::Idle;
		self.neighbors.clear();
		self.highlight_t = 0.0;
		dropped
	}

	/// Forgets every reference to nodes for which `present` is false.
	/// Returns the dragged node if it was dropped this way. A hovered node
	/// that survives gets its neighbourhood recomputed from the new edges.
	pub fn retain(&mut self, graph: &GraphSnapshot) -> Option<String> {
		if self.selected.as_deref().is_some_and(|id| !graph.contains(id)) {
			self.selected = None;
		}
		match self.hovered().map(str::to_string) {
			Some(id) if graph.contains(&id) => {
				self.neighbors = neighbors_of(&id, graph.edges());
				None
			}
			Some(_) => self.cancel(),
			None => {
				self.neighbors.clear();
				None
			}
		}
	}

	/// Eases the hover emphasis: after a short delay it fades in.
	pub fn advance(&mut self, dt: f64) {
		const DELAY: f64 = 0.08;
		const SPEED: f64 = 1.8;
		if self.hovered().is_none() {
			self.highlight_t = 0.0;
			return;
		}
		self.delay_t = (self.delay_t + dt).min(DELAY);
		if self.delay_t >= DELAY {
			self.highlight_t += (1.0 - self.highlight_t) * (SPEED * dt).min(1.0);
		}
	}
}

fn neighbors_of(id: &str, edges: &[Edge]) -> HashSet<String> {
	edges
		.iter()
		.filter_map(|e| e.other(id))
		.filter(|other| *other != id)
		.map(str::to_string)
		.collect()
}

/// Result of releasing the pointer.
#[derive(Clone, Debug, PartialEq)]
pub enum Release {
	/// Nothing happened.
	None,
	/// A click changed (or cleared) the selection.
	Clicked,
	/// A drag of the given node ended.
	Dropped(String),
}
