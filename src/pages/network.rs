use std::rc::Rc;
use std::time::Duration;

use gloo_timers::future::sleep;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::components::controls::GraphControls;
use crate::components::network_graph::NetworkGraphCanvas;
use crate::config::GraphViewConfig;
use crate::error::GraphError;
use crate::graph::{
	GraphFilter, GraphProvider, GraphSnapshot, HttpGraphProvider, MockGraphProvider, Node,
};
use crate::lifecycle::{CancelScope, RequestSlot, Trigger, settle, with_timeout};

/// Where the most recent snapshot request stands.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
	/// First request still pending.
	Loading,
	/// A snapshot is shown.
	Ready,
	/// The request timed out; the previous snapshot (if any) stays.
	NoResult,
	/// The request failed with a user-visible error.
	Failed(String),
}

impl LoadState {
	/// Maps a finished fetch to the state it leaves the view in, plus the
	/// snapshot to show if it changed.
	pub fn from_outcome(
		outcome: Result<GraphSnapshot, GraphError>,
	) -> (Self, Option<GraphSnapshot>) {
		match outcome {
			Ok(graph) => (Self::Ready, Some(graph)),
			Err(err) if err.is_user_visible() => (Self::Failed(err.to_string()), None),
			Err(_) => (Self::NoResult, None),
		}
	}
}

/// Network screen backed by the configured provider: the HTTP backend when
/// a base URL was set at build time, synthetic data otherwise.
#[component]
pub fn NetworkPage() -> impl IntoView {
	let config = GraphViewConfig::default().validated();
	match config.backend_url.clone() {
		Some(url) => {
			info!("using graph backend at {url}");
			let provider = HttpGraphProvider::new(&url);
			view! { <NetworkScreen provider=provider config=config /> }.into_any()
		}
		None => {
			info!("no graph backend configured, using synthetic data");
			let provider = MockGraphProvider::default();
			view! { <NetworkScreen provider=provider config=config /> }.into_any()
		}
	}
}

async fn fetch_snapshot<P: GraphProvider>(
	provider: Rc<P>,
	filter: GraphFilter,
	limit: Duration,
) -> Result<Result<GraphSnapshot, GraphError>, GraphError> {
	with_timeout(provider.fetch_graph(&filter), sleep(limit), limit).await
}

async fn fetch_detail<P: GraphProvider>(
	provider: Rc<P>,
	id: String,
	limit: Duration,
) -> Result<Result<Node, GraphError>, GraphError> {
	with_timeout(provider.fetch_node(&id), sleep(limit), limit).await
}

/// Controls, canvas, status line and detail panel for one provider.
#[component]
pub fn NetworkScreen<P>(provider: P, config: GraphViewConfig) -> impl IntoView
where
	P: GraphProvider + 'static,
{
	let provider = Rc::new(provider);
	let scope = StoredValue::new_local(CancelScope::new());
	let requests = StoredValue::new_local(RequestSlot::default());
	let timeout = config.fetch_timeout;

	let filter = RwSignal::new(GraphFilter::default());
	let snapshot = RwSignal::new(GraphSnapshot::default());
	let status = RwSignal::new(LoadState::Loading);
	let layout = RwSignal::new(config.layout);
	let node_colors = RwSignal::new(config.style.node_colors);
	let edge_colors = RwSignal::new(config.style.edge_colors);
	let selected = RwSignal::new(None::<String>);
	let detail = RwSignal::new(None::<Result<Node, GraphError>>);

	let load = {
		let provider = provider.clone();
		move |trigger: Trigger| {
			let fut = fetch_snapshot(provider.clone(), filter.get_untracked(), timeout);
			let Some(Some((ticket, fut))) = requests.try_update_value(|r| r.start(trigger, fut))
			else {
				return;
			};
			let Some(guarded) = scope.try_with_value(|s| s.guard(fut)) else {
				return;
			};
			spawn_local(async move {
				let Some(outcome) = settle(guarded.await.and_then(|r| r)) else {
					return;
				};
				if requests.try_update_value(|r| r.finish(ticket)) != Some(true) {
					return;
				}
				if let Err(err) = &outcome {
					warn!("snapshot request failed: {err}");
				}
				let (state, graph) = LoadState::from_outcome(outcome);
				if let Some(graph) = graph {
					snapshot.set(graph);
				}
				status.set(state);
			});
		}
	};

	let load_on_filter = load.clone();
	Effect::new(move |_| {
		filter.track();
		load_on_filter(Trigger::Replace);
	});

	if let Some(every) = config.refresh_interval {
		match set_interval_with_handle(move || load(Trigger::Refresh), every) {
			Ok(handle) => on_cleanup(move || handle.clear()),
			Err(err) => warn!("refresh disabled: {err:?}"),
		}
	}

	let detail_provider = provider;
	Effect::new(move |_| {
		let Some(id) = selected.get() else {
			detail.set(None);
			return;
		};
		let fut = fetch_detail(detail_provider.clone(), id.clone(), timeout);
		let Some(guarded) = scope.try_with_value(|s| s.guard(fut)) else {
			return;
		};
		spawn_local(async move {
			let Some(outcome) = settle(guarded.await) else {
				return;
			};
			if selected.get_untracked().as_deref() == Some(id.as_str()) {
				detail.set(Some(outcome));
			}
		});
	});

	on_cleanup(move || {
		scope.try_with_value(CancelScope::dispose);
	});

	let on_select = Callback::new(move |id: Option<String>| selected.set(id));

	let banner = move || {
		let message = match status.get() {
			LoadState::Loading => Some("Loading network…".to_string()),
			LoadState::NoResult => Some("No result from the network service.".to_string()),
			LoadState::Failed(msg) => Some(msg),
			LoadState::Ready => snapshot
				.with(GraphSnapshot::is_empty)
				.then(|| "No nodes match the current filters.".to_string()),
		};
		let class = if matches!(status.get(), LoadState::Failed(_)) {
			"banner error"
		} else {
			"banner"
		};
		message.map(|m| view! { <p class=class>{m}</p> })
	};

	let stats = move || {
		snapshot.with(|g| format!("{} nodes · {} edges", g.nodes().len(), g.edges().len()))
	};

	view! {
		<div class="network-screen">
			<GraphControls
				filter=filter
				layout=layout
				node_colors=node_colors
				edge_colors=edge_colors
			/>
			<p class="stats">{stats}</p>
			{banner}
			<div class="graph-area">
				<NetworkGraphCanvas
					data=snapshot
					layout=layout
					node_colors=node_colors
					edge_colors=edge_colors
					config=config
					on_select=on_select
				/>
			</div>
			<NodeDetail detail=detail />
		</div>
	}
}

/// Side panel for the selected node.
#[component]
fn NodeDetail(detail: RwSignal<Option<Result<Node, GraphError>>>) -> impl IntoView {
	move || {
		detail.get().map(|result| match result {
			Ok(node) => {
				let description = node.metadata.description.clone().unwrap_or_default();
				view! {
					<aside class="node-detail">
						<h2>{node.label.clone()}</h2>
						<dl>
							<dt>"Category"</dt>
							<dd>{node.category.to_string()}</dd>
							<dt>"Influence"</dt>
							<dd>{format!("{:.1}", node.influence)}</dd>
							<dt>"Followers"</dt>
							<dd>{node.metadata.followers}</dd>
							<dt>"Credibility"</dt>
							<dd>{format!("{:.2}", node.metadata.credibility)}</dd>
							<dt>"Sentiment"</dt>
							<dd>{format!("{:+.2}", node.metadata.sentiment)}</dd>
							<dt>"Verified"</dt>
							<dd>{if node.metadata.verified { "yes" } else { "no" }}</dd>
						</dl>
						<p>{description}</p>
					</aside>
				}
				.into_any()
			}
			Err(GraphError::Timeout(_)) => {
				view! { <aside class="node-detail">"No result."</aside> }.into_any()
			}
			Err(err) => {
				view! { <aside class="node-detail error">{err.to_string()}</aside> }.into_any()
			}
		})
	}
}
