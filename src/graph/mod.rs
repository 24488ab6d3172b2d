//! Graph data model, filtering, heuristics and data providers.

pub mod analysis;
pub mod fetch;
pub mod filter;
pub mod provider;
pub mod types;

pub use analysis::{CausalRole, EdgeClass, GraphMetrics, NodeMetrics};
pub use fetch::HttpGraphProvider;
pub use filter::{GraphFilter, TimeWindow, WindowBound};
pub use provider::{GraphProvider, MockGraphProvider};
pub use types::{
	Edge, EdgeMetadata, GraphSnapshot, Node, NodeCategory, NodeMetadata, RelationType,
};
