use leptos::prelude::*;

use super::network_graph::{ColorMode, EdgeColorMode};
use crate::graph::{GraphFilter, NodeCategory, RelationType, WindowBound};
use crate::layout::LayoutKind;

/// Search box, filter toggles and view mode selects.
#[component]
pub fn GraphControls(
	filter: RwSignal<GraphFilter>,
	layout: RwSignal<LayoutKind>,
	node_colors: RwSignal<ColorMode>,
	edge_colors: RwSignal<EdgeColorMode>,
) -> impl IntoView {
	let categories = NodeCategory::ALL
		.into_iter()
		.map(|c| {
			view! {
				<label class="toggle">
					<input
						type="checkbox"
						prop:checked=move || filter.with(|f| f.allows_category(c))
						on:change=move |_| filter.update(|f| f.toggle_category(c))
					/>
					{c.as_str()}
				</label>
			}
		})
		.collect_view();

	let relations = RelationType::ALL
		.into_iter()
		.map(|r| {
			view! {
				<label class="toggle">
					<input
						type="checkbox"
						prop:checked=move || filter.with(|f| f.allows_relation(r))
						on:change=move |_| filter.update(|f| f.toggle_relation(r))
					/>
					{r.as_str()}
				</label>
			}
		})
		.collect_view();

	view! {
		<div class="graph-controls">
			<input
				type="search"
				placeholder="Search nodes"
				prop:value=move || filter.with(|f| f.query.clone())
				on:input=move |ev| {
					let query = event_target_value(&ev);
					filter.update(|f| f.query = query);
				}
			/>
			<fieldset>
				<legend>"Categories"</legend>
				{categories}
			</fieldset>
			<fieldset>
				<legend>"Relations"</legend>
				{relations}
			</fieldset>
			<label>
				"Min influence "
				{move || filter.with(|f| f.min_influence.unwrap_or(0.0))}
				<input
					type="range"
					min="0"
					max="100"
					step="5"
					prop:value=move || filter.with(|f| f.min_influence.unwrap_or(0.0)).to_string()
					on:input=move |ev| {
						let min = event_target_value(&ev).parse::<f64>().ok().filter(|v| *v > 0.0);
						filter.update(|f| f.min_influence = min);
					}
				/>
			</label>
			<label>
				"Min weight "
				{move || filter.with(|f| f.min_weight.unwrap_or(0.0))}
				<input
					type="range"
					min="0"
					max="10"
					step="1"
					prop:value=move || filter.with(|f| f.min_weight.unwrap_or(0.0)).to_string()
					on:input=move |ev| {
						let min = event_target_value(&ev).parse::<f64>().ok().filter(|v| *v > 0.0);
						filter.update(|f| f.min_weight = min);
					}
				/>
			</label>
			<fieldset class="window">
				<legend>"Activity window"</legend>
				<input
					type="date"
					prop:value=move || filter.with(|f| f.window_bound(WindowBound::Start))
					on:change=move |ev| {
						let date = event_target_value(&ev);
						filter.update(|f| f.set_window_bound(WindowBound::Start, &date));
					}
				/>
				" to "
				<input
					type="date"
					prop:value=move || filter.with(|f| f.window_bound(WindowBound::End))
					on:change=move |ev| {
						let date = event_target_value(&ev);
						filter.update(|f| f.set_window_bound(WindowBound::End, &date));
					}
				/>
			</fieldset>
			<select
				prop:value=move || layout.get().as_str()
				on:change=move |ev| {
					if let Some(kind) = LayoutKind::parse(&event_target_value(&ev)) {
						layout.set(kind);
					}
				}
			>
				{LayoutKind::ALL
					.into_iter()
					.map(|k| view! { <option value=k.as_str()>{k.to_string()}</option> })
					.collect_view()}
			</select>
			<select
				prop:value=move || node_colors.get().as_str()
				on:change=move |ev| {
					if let Some(mode) = ColorMode::parse(&event_target_value(&ev)) {
						node_colors.set(mode);
					}
				}
			>
				{ColorMode::ALL
					.into_iter()
					.map(|m| view! { <option value=m.as_str()>"Nodes by " {m.as_str()}</option> })
					.collect_view()}
			</select>
			<select
				prop:value=move || edge_colors.get().as_str()
				on:change=move |ev| {
					if let Some(mode) = EdgeColorMode::parse(&event_target_value(&ev)) {
						edge_colors.set(mode);
					}
				}
			>
				{EdgeColorMode::ALL
					.into_iter()
					.map(|m| view! { <option value=m.as_str()>"Edges by " {m.as_str()}</option> })
					.collect_view()}
			</select>
			<button
				disabled=move || !filter.with(GraphFilter::is_active)
				on:click=move |_| filter.set(GraphFilter::default())
			>
				"Reset filters"
			</button>
		</div>
	}
}
