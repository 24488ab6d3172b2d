use std::fmt;

use crate::graph::{CausalRole, Node, NodeCategory, RelationType};

/// The category10 palette.
const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Influence scale stops, low to high.
const INFLUENCE_STOPS: [Rgba; 3] = [
	Rgba::rgb(49, 130, 189),
	Rgba::rgb(253, 174, 97),
	Rgba::rgb(215, 48, 39),
];

/// An sRGB color with alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Opacity.
	pub a: f64,
}

impl Rgba {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Parses `#rrggbb`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let hex = hex.strip_prefix('#')?;
		if hex.len() != 6 {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}

	/// Same color with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}

	/// Linear blend towards `other` by `t`.
	pub fn lerp(self, other: Rgba, t: f64) -> Self {
		let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
		let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a + (other.a - self.a) * t,
		}
	}
}

impl fmt::Display for Rgba {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// How node fills are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
	/// Fixed semantic color per category.
	#[default]
	Category,
	/// Continuous scale over influence.
	Influence,
	/// Heuristic causal role.
	Role,
	/// The node's own color, else category10 by category.
	Palette,
}

impl ColorMode {
	/// All modes in display order.
	pub const ALL: [ColorMode; 4] = [Self::Category, Self::Influence, Self::Role, Self::Palette];

	/// Stable identifier used by the controls.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Category => "category",
			Self::Influence => "influence",
			Self::Role => "role",
			Self::Palette => "palette",
		}
	}

	/// Parses [`ColorMode::as_str`] output.
	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|m| m.as_str() == s)
	}

	/// Fill for `node` with causal `role`.
	pub fn node_fill(self, node: &Node, role: CausalRole) -> Rgba {
		match self {
			Self::Category => category_color(node.category),
			Self::Influence => influence_color(node.influence),
			Self::Role => role_color(role),
			Self::Palette => node
				.color
				.as_deref()
				.and_then(Rgba::from_hex)
				.unwrap_or_else(|| palette_color(node.category.ordinal())),
		}
	}
}

/// How edge strokes are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeColorMode {
	/// By relationship type, straight lines.
	#[default]
	Relation,
	/// By source role; edges joining different roles curve.
	Causality,
}

impl EdgeColorMode {
	/// All modes in display order.
	pub const ALL: [EdgeColorMode; 2] = [Self::Relation, Self::Causality];

	/// Stable identifier used by the controls.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Relation => "relation",
			Self::Causality => "causality",
		}
	}

	/// Parses [`EdgeColorMode::as_str`] output.
	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|m| m.as_str() == s)
	}
}

/// Semantic category colors.
pub fn category_color(category: NodeCategory) -> Rgba {
	match category {
		NodeCategory::Person => Rgba::rgb(66, 153, 225),
		NodeCategory::Organization => Rgba::rgb(237, 137, 54),
		NodeCategory::Location => Rgba::rgb(72, 187, 120),
		NodeCategory::Topic => Rgba::rgb(159, 122, 234),
		NodeCategory::Subject => Rgba::rgb(245, 101, 101),
	}
}

/// Three-stop scale over `0..=100`.
pub fn influence_color(influence: f64) -> Rgba {
	let t = if influence.is_finite() {
		(influence / 100.0).clamp(0.0, 1.0)
	} else {
		0.0
	};
	if t < 0.5 {
		INFLUENCE_STOPS[0].lerp(INFLUENCE_STOPS[1], t * 2.0)
	} else {
		INFLUENCE_STOPS[1].lerp(INFLUENCE_STOPS[2], (t - 0.5) * 2.0)
	}
}

/// Causal role colors.
pub fn role_color(role: CausalRole) -> Rgba {
	match role {
		CausalRole::Driver => Rgba::rgb(229, 62, 62),
		CausalRole::Mediator => Rgba::rgb(236, 201, 75),
		CausalRole::Receiver => Rgba::rgb(56, 161, 105),
		CausalRole::Isolated => Rgba::rgb(160, 174, 192),
	}
}

/// Relationship stroke colors.
pub fn relation_color(relation: RelationType) -> Rgba {
	match relation {
		RelationType::Collaboration => Rgba::rgb(72, 187, 120),
		RelationType::Opposition => Rgba::rgb(245, 101, 101),
		RelationType::Mention => Rgba::rgb(100, 180, 255),
		RelationType::Friendship => Rgba::rgb(183, 148, 244),
	}
}

/// Entry `i` of category10, wrapping.
pub fn palette_color(i: usize) -> Rgba {
	Rgba::from_hex(COLORS[i % COLORS.len()]).unwrap_or(Rgba::rgb(127, 127, 127))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::fixtures::node;

	#[test]
	fn hex_parsing() {
		assert_eq!(Rgba::from_hex("#1f77b4"), Some(Rgba::rgb(0x1f, 0x77, 0xb4)));
		assert_eq!(Rgba::from_hex("1f77b4"), None);
		assert_eq!(Rgba::from_hex("#zzzzzz"), None);
		assert_eq!(Rgba::from_hex("#ab"), None);
	}

	#[test]
	fn influence_scale_hits_its_stops() {
		assert_eq!(influence_color(0.0), INFLUENCE_STOPS[0]);
		assert_eq!(influence_color(50.0), INFLUENCE_STOPS[1]);
		assert_eq!(influence_color(100.0), INFLUENCE_STOPS[2]);
		assert_eq!(influence_color(f64::NAN), INFLUENCE_STOPS[0]);
	}

	#[test]
	fn palette_prefers_node_color() {
		let mut n = node("a", NodeCategory::Location, 1.0);
		assert_eq!(ColorMode::Palette.node_fill(&n, CausalRole::Driver), palette_color(2));
		n.color = Some("#000000".into());
		assert_eq!(
			ColorMode::Palette.node_fill(&n, CausalRole::Driver),
			Rgba::rgb(0, 0, 0)
		);
	}

	#[test]
	fn css_output() {
		assert_eq!(Rgba::rgb(1, 2, 3).with_alpha(0.5).to_string(), "rgba(1, 2, 3, 0.5)");
	}

	#[test]
	fn modes_round_trip_through_names() {
		for m in ColorMode::ALL {
			assert_eq!(ColorMode::parse(m.as_str()), Some(m));
		}
		for m in EdgeColorMode::ALL {
			assert_eq!(EdgeColorMode::parse(m.as_str()), Some(m));
		}
	}
}
