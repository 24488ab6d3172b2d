//! Settings for one network view.

use std::time::Duration;

use crate::components::network_graph::StyleConfig;
use crate::layout::{LayoutKind, SimulationConfig};

/// Bounds on the zoom factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomRange {
	/// Smallest scale.
	pub min: f64,
	/// Largest scale.
	pub max: f64,
}

impl Default for ZoomRange {
	fn default() -> Self {
		Self { min: 0.1, max: 20.0 }
	}
}

impl ZoomRange {
	/// Clamps `k` into the range.
	pub fn clamp(self, k: f64) -> f64 {
		if k.is_finite() {
			k.clamp(self.min, self.max)
		} else {
			1.0_f64.clamp(self.min, self.max)
		}
	}
}

/// Everything a graph view can be tuned with.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphViewConfig {
	/// Initial layout mode.
	pub layout: LayoutKind,
	/// Colors, radii and labels.
	pub style: StyleConfig,
	/// Force simulation tuning.
	pub simulation: SimulationConfig,
	/// Zoom bounds.
	pub zoom: ZoomRange,
	/// Extra hit-test radius around nodes, in graph units.
	pub hit_slack: f64,
	/// Period of snapshot refreshes; `None` fetches once per mount.
	pub refresh_interval: Option<Duration>,
	/// Deadline after which a pending fetch resolves to "no result".
	pub fetch_timeout: Duration,
	/// Backend base URL; the synthetic provider is used when unset.
	pub backend_url: Option<String>,
}

impl Default for GraphViewConfig {
	fn default() -> Self {
		Self {
			layout: LayoutKind::default(),
			style: StyleConfig::default(),
			simulation: SimulationConfig::default(),
			zoom: ZoomRange::default(),
			hit_slack: 4.0,
			refresh_interval: Some(Duration::from_secs(30)),
			fetch_timeout: Duration::from_millis(600_000),
			backend_url: option_env!("SENTINEL_GRAPH_URL").map(str::to_string),
		}
	}
}

impl GraphViewConfig {
	/// Repairs inconsistent values: ordered radius and zoom bounds, positive
	/// intervals, and collision radii that match the drawn radii.
	pub fn validated(mut self) -> Self {
		let style = &mut self.style;
		if !(style.min_radius.is_finite() && style.min_radius > 0.0) {
			style.min_radius = StyleConfig::default().min_radius;
		}
		if !style.max_radius.is_finite() || style.max_radius < style.min_radius {
			style.max_radius = style.min_radius;
		}
		self.simulation.radius_range = (style.min_radius, style.max_radius);

		let defaults = ZoomRange::default();
		if !(self.zoom.min.is_finite() && self.zoom.min > 0.0) {
			self.zoom.min = defaults.min;
		}
		if !self.zoom.max.is_finite() || self.zoom.max < self.zoom.min {
			self.zoom.max = self.zoom.min.max(defaults.max);
		}

		if self.refresh_interval.is_some_and(|d| d.is_zero()) {
			self.refresh_interval = None;
		}
		if self.fetch_timeout.is_zero() {
			self.fetch_timeout = Self::default().fetch_timeout;
		}
		self.hit_slack = self.hit_slack.max(0.0);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_the_view() {
		let c = GraphViewConfig::default();
		assert_eq!(c.fetch_timeout, Duration::from_millis(600_000));
		assert_eq!(c.zoom, ZoomRange { min: 0.1, max: 20.0 });
		assert_eq!(c.layout, LayoutKind::Force);
	}

	#[test]
	fn validated_repairs_bad_values() {
		let mut c = GraphViewConfig::default();
		c.style.min_radius = -1.0;
		c.style.max_radius = 2.0;
		c.zoom = ZoomRange { min: 0.0, max: 0.01 };
		c.refresh_interval = Some(Duration::ZERO);
		c.fetch_timeout = Duration::ZERO;
		let c = c.validated();
		assert_eq!(c.style.min_radius, 4.0);
		assert_eq!(c.style.max_radius, 4.0);
		assert_eq!(c.simulation.radius_range, (4.0, 4.0));
		assert_eq!(c.zoom, ZoomRange { min: 0.1, max: 20.0 });
		assert_eq!(c.refresh_interval, None);
		assert_eq!(c.fetch_timeout, Duration::from_millis(600_000));
	}

	#[test]
	fn zoom_clamp_handles_nan() {
		let z = ZoomRange::default();
		assert_eq!(z.clamp(50.0), 20.0);
		assert_eq!(z.clamp(0.0), 0.1);
		assert_eq!(z.clamp(f64::NAN), 1.0);
	}
}
