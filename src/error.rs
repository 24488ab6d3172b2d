//! Error taxonomy shared by the provider, layout and lifecycle code.

use std::time::Duration;

/// Failures that can occur while loading or laying out a graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
	/// A requested node id is absent from the snapshot or backend.
	#[error("node `{0}` not found")]
	NotFound(String),
	/// The backend could not be reached or answered with a failure status.
	#[error("upstream unavailable: {0}")]
	UpstreamUnavailable(String),
	/// A pending operation did not resolve before its deadline.
	#[error("no result after {0:?}")]
	Timeout(Duration),
	/// A layout step produced a non-finite coordinate.
	#[error("non-finite position for node `{id}`")]
	InvalidGeometry {
		/// Node whose position was rejected.
		id: String,
	},
}

impl GraphError {
	/// Whether the view should show this as an inline error (as opposed to
	/// an empty "no result" state).
	pub fn is_user_visible(&self) -> bool {
		matches!(self, Self::NotFound(_) | Self::UpstreamUnavailable(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timeout_and_geometry_stay_silent() {
		assert!(GraphError::NotFound("a".into()).is_user_visible());
		assert!(GraphError::UpstreamUnavailable("502".into()).is_user_visible());
		assert!(!GraphError::Timeout(Duration::from_secs(1)).is_user_visible());
		assert!(!GraphError::InvalidGeometry { id: "a".into() }.is_user_visible());
	}

	#[test]
	fn messages_name_the_node() {
		assert_eq!(
			GraphError::NotFound("acme".into()).to_string(),
			"node `acme` not found"
		);
	}
}
