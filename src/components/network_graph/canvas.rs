use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::color::Rgba;
use super::render::{DrawList, Glow, Shape};
use super::state::NetworkViewState;
use crate::layout::Point;

/// Paints one frame of `state` onto `ctx`.
pub fn paint(state: &NetworkViewState, ctx: &CanvasRenderingContext2d) {
	let (width, height) = state.size();
	let t = state.transform();
	ctx.set_fill_style_str(&state.style().background.to_string());
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(t.x, t.y);
	let _ = ctx.scale(t.k, t.k);
	draw(&state.draw_list(), ctx, t.k, state.flow_time());
	ctx.restore();
}

fn draw(list: &DrawList, ctx: &CanvasRenderingContext2d, k: f64, flow_time: f64) {
	let (dash, gap) = (8.0 / k, 4.0 / k);
	let dash_offset = -(flow_time * 30.0) % (dash + gap);

	for shape in &list.shapes {
		match shape {
			Shape::Line { from, to, color, width, arrow } => {
				let (dx, dy) = (to.x - from.x, to.y - from.y);
				let dist = dx.hypot(dy);
				if dist < *arrow {
					continue;
				}
				let (ux, uy) = (dx / dist, dy / dist);
				set_dash(ctx, dash, gap, dash_offset);
				ctx.set_stroke_style_str(&color.to_string());
				ctx.set_line_width(*width);
				ctx.begin_path();
				ctx.move_to(from.x, from.y);
				ctx.line_to(to.x - ux * arrow, to.y - uy * arrow);
				ctx.stroke();
				arrowhead(ctx, *to, (ux, uy), *arrow, *color);
			}
			Shape::Curve { from, control, to, color, width, arrow } => {
				let (dx, dy) = (to.x - control.x, to.y - control.y);
				let dist = dx.hypot(dy).max(1e-9);
				let (ux, uy) = (dx / dist, dy / dist);
				set_dash(ctx, dash, gap, dash_offset);
				ctx.set_stroke_style_str(&color.to_string());
				ctx.set_line_width(*width);
				ctx.begin_path();
				ctx.move_to(from.x, from.y);
				ctx.quadratic_curve_to(control.x, control.y, to.x - ux * arrow, to.y - uy * arrow);
				ctx.stroke();
				arrowhead(ctx, *to, (ux, uy), *arrow, *color);
			}
			Shape::Circle { center, radius, fill, ring, glow, .. } => {
				if let Some(glow) = glow {
					draw_glow(ctx, *center, *radius, glow);
				}
				ctx.begin_path();
				let _ = ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(&fill.to_string());
				ctx.fill();
				if let Some(ring) = ring {
					ctx.begin_path();
					let _ = ctx.arc(center.x, center.y, radius + ring.width, 0.0, 2.0 * PI);
					ctx.set_stroke_style_str(&ring.color.to_string());
					ctx.set_line_width(ring.width);
					ctx.stroke();
				}
			}
			Shape::Label { text, at, size, color, halo } => {
				ctx.set_font(&format!("{size}px sans-serif"));
				ctx.set_line_width(size / 3.0);
				ctx.set_stroke_style_str(&halo.to_string());
				let _ = ctx.stroke_text(text, at.x, at.y);
				ctx.set_fill_style_str(&color.to_string());
				let _ = ctx.fill_text(text, at.x, at.y);
			}
		}
	}
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64, gap: f64, offset: f64) {
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(dash),
		&JsValue::from_f64(gap),
	));
	ctx.set_line_dash_offset(offset);
}

fn arrowhead(
	ctx: &CanvasRenderingContext2d,
	tip: Point,
	(ux, uy): (f64, f64),
	size: f64,
	color: Rgba,
) {
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_fill_style_str(&color.with_alpha((color.a + 0.2).min(1.0)).to_string());
	let (back_x, back_y) = (tip.x - ux * size, tip.y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_glow(ctx: &CanvasRenderingContext2d, c: Point, radius: f64, glow: &Glow) {
	let inner = radius * 0.3;
	let Ok(gradient) = ctx.create_radial_gradient(c.x, c.y, inner, c.x, c.y, glow.radius) else {
		return;
	};
	let stops = [
		(0.0, Rgba::rgb(255, 255, 255).with_alpha(glow.alpha)),
		(0.6, Rgba::rgb(200, 220, 255).with_alpha(glow.alpha * 0.3)),
		(1.0, Rgba::rgb(255, 255, 255).with_alpha(0.0)),
	];
	for (offset, color) in stops {
		if gradient.add_color_stop(offset, &color.to_string()).is_err() {
			return;
		}
	}
	ctx.begin_path();
	let _ = ctx.arc(c.x, c.y, glow.radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}
