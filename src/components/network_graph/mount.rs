use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::canvas;
use super::state::NetworkViewState;

/// Shared slot for the view state; empty until the canvas is mounted.
pub type SharedState = Rc<RefCell<Option<NetworkViewState>>>;

type Callback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Seconds advanced per animation frame.
const FRAME_DT: f64 = 0.016;

/// Requested canvas size; `None` fills the parent element.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanvasSize {
	/// Track the window size instead of the parent.
	pub fullscreen: bool,
	/// Fixed width in pixels.
	pub width: Option<f64>,
	/// Fixed height in pixels.
	pub height: Option<f64>,
}

impl CanvasSize {
	/// Pixel size for `canvas` right now.
	pub fn measure(self, window: &Window, canvas: &HtmlCanvasElement) -> (f64, f64) {
		let px = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
		if self.fullscreen {
			return (
				px(window.inner_width()).unwrap_or(800.0),
				px(window.inner_height()).unwrap_or(600.0),
			);
		}
		let parent = canvas.parent_element();
		let parent_dim = |f: fn(&web_sys::Element) -> i32, fallback: f64| {
			parent
				.as_ref()
				.map(|p| f(p) as f64)
				.filter(|v| *v > 0.0)
				.unwrap_or(fallback)
		};
		(
			self.width.unwrap_or_else(|| parent_dim(web_sys::Element::client_width, 800.0)),
			self.height.unwrap_or_else(|| parent_dim(web_sys::Element::client_height, 600.0)),
		)
	}
}

/// A running render loop bound to one canvas. Dropping or disposing it stops
/// the loop, detaches listeners and releases the closures.
pub struct GraphMount {
	alive: Rc<Cell<bool>>,
	frame: Rc<Cell<Option<i32>>>,
	animate: Callback,
	resize: Option<Closure<dyn FnMut()>>,
}

/// Starts the animation loop for `canvas`, drawing whatever `state` holds.
pub fn mount(
	canvas: HtmlCanvasElement,
	state: SharedState,
	size: CanvasSize,
) -> Result<GraphMount, JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")?
		.ok_or_else(|| JsValue::from_str("2d context unavailable"))?
		.dyn_into()?;

	let (w, h) = size.measure(&window, &canvas);
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	if let Some(s) = state.borrow_mut().as_mut() {
		s.resize(w, h);
	}

	let alive = Rc::new(Cell::new(true));
	let frame = Rc::new(Cell::new(None));

	let resize = if size.fullscreen {
		let (state, canvas) = (state.clone(), canvas.clone());
		let cb = Closure::<dyn FnMut()>::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = size.measure(&win, &canvas);
			canvas.set_width(nw as u32);
			canvas.set_height(nh as u32);
			if let Some(s) = state.borrow_mut().as_mut() {
				s.resize(nw, nh);
			}
		});
		window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())?;
		Some(cb)
	} else {
		None
	};

	let animate: Callback = Rc::new(RefCell::new(None));
	let (alive_anim, frame_anim, animate_inner) = (alive.clone(), frame.clone(), animate.clone());
	*animate.borrow_mut() = Some(Closure::new(move || {
		if !alive_anim.get() {
			return;
		}
		if let Some(s) = state.borrow_mut().as_mut() {
			s.tick(FRAME_DT);
			canvas::paint(s, &ctx);
		}
		let next = match (web_sys::window(), animate_inner.borrow().as_ref()) {
			(Some(win), Some(cb)) => win.request_animation_frame(cb.as_ref().unchecked_ref()).ok(),
			_ => None,
		};
		frame_anim.set(next);
	}));
	if let Some(cb) = animate.borrow().as_ref() {
		frame.set(Some(window.request_animation_frame(cb.as_ref().unchecked_ref())?));
	}

	info!("graph canvas mounted at {w}x{h}");
	Ok(GraphMount {
		alive,
		frame,
		animate,
		resize,
	})
}

impl GraphMount {
	/// Whether the loop is still scheduled.
	pub fn is_alive(&self) -> bool {
		self.alive.get()
	}

	/// Stops the loop. Safe to call more than once.
	pub fn dispose(&mut self) {
		if !self.alive.replace(false) {
			return;
		}
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = self.resize.take() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		// Breaks the closure's reference to itself.
		self.animate.borrow_mut().take();
		debug!("graph canvas disposed");
	}
}

impl Drop for GraphMount {
	fn drop(&mut self) {
		self.dispose();
	}
}
