use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use web_sys::{MouseEvent, WheelEvent};

use super::color::{ColorMode, EdgeColorMode};
use super::interaction::Release;
use super::mount::{CanvasSize, GraphMount, SharedState, mount};
use super::state::NetworkViewState;
use crate::config::GraphViewConfig;
use crate::graph::GraphSnapshot;
use crate::layout::LayoutKind;

/// Interactive canvas rendering of a narrative network.
///
/// `on_select` fires with the new selection whenever a click changes it, or
/// when a refresh removes the selected node.
#[component]
pub fn NetworkGraphCanvas(
	#[prop(into)] data: Signal<GraphSnapshot>,
	#[prop(into)] layout: Signal<LayoutKind>,
	#[prop(into)] node_colors: Signal<ColorMode>,
	#[prop(into)] edge_colors: Signal<EdgeColorMode>,
	#[prop(optional)] config: GraphViewConfig,
	#[prop(optional)] on_select: Option<Callback<Option<String>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let handle = StoredValue::new_local(None::<GraphMount>);
	let size = CanvasSize {
		fullscreen,
		width,
		height,
	};

	let state_init = state.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if handle.with_value(|h| h.is_some()) {
			return;
		}
		let config = GraphViewConfig {
			layout: layout.get_untracked(),
			..config.clone()
		};
		let mut view = NetworkViewState::new(data.get_untracked(), &config, 800.0, 600.0);
		view.set_node_colors(node_colors.get_untracked());
		view.set_edge_colors(edge_colors.get_untracked());
		*state_init.borrow_mut() = Some(view);

		match mount(canvas.into(), state_init.clone(), size) {
			Ok(m) => handle.set_value(Some(m)),
			Err(err) => error!("failed to mount graph canvas: {err:?}"),
		}
	});

	let state_data = state.clone();
	Effect::new(move |_| {
		let snapshot = data.get();
		let change = state_data.borrow_mut().as_mut().and_then(|s| {
			let before = s.interaction().selected().map(str::to_string);
			s.replace_graph(snapshot);
			let after = s.interaction().selected().map(str::to_string);
			(before != after).then_some(after)
		});
		if let (Some(selection), Some(cb)) = (change, on_select) {
			cb.run(selection);
		}
	});

	let state_opts = state.clone();
	Effect::new(move |_| {
		let (kind, nodes, edges) = (layout.get(), node_colors.get(), edge_colors.get());
		if let Some(s) = state_opts.borrow_mut().as_mut() {
			s.set_layout(kind);
			s.set_node_colors(nodes);
			s.set_edge_colors(edges);
		}
	});

	on_cleanup(move || {
		handle.try_update_value(|h| {
			if let Some(mut m) = h.take() {
				m.dispose();
			}
		});
	});

	let local = move |ev: &MouseEvent| {
		let canvas = canvas_ref.get()?;
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local(&ev) else {
			return;
		};
		if let Some(s) = state_md.borrow_mut().as_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local(&ev) else {
			return;
		};
		if let Some(s) = state_mm.borrow_mut().as_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked = state_mu.borrow_mut().as_mut().and_then(|s| {
			(s.pointer_up() == Release::Clicked)
				.then(|| s.interaction().selected().map(str::to_string))
		});
		// The state borrow is released before handing control to the parent.
		if let (Some(selection), Some(cb)) = (clicked, on_select) {
			cb.run(selection);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = state_ml.borrow_mut().as_mut() {
			s.pointer_leave();
		}
	};

	let state_wh = state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = local(mouse) else {
			return;
		};
		if let Some(s) = state_wh.borrow_mut().as_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
