//! Canvas rendering for the bubble chart.
//!
//! Each node is drawn as one rounded rectangle whose corner radius shrinks as
//! it opens, so a collapsed bubble (square footprint, full corner radius) and
//! an expanded card share a single path. Passes, back to front:
//! 1. Background gradient and vignette (screen space)
//! 2. Nodes ordered by how far open they are, so the active card lands on top

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::registry::NodeRegistry;
use super::sizing::SizeResolver;
use super::theme::{Color, Theme};
use super::transition::{Frame, NodeTransitions};
use super::types::Node;

/// Everything a frame needs besides the canvas.
pub struct Scene<'a> {
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// Nodes in draw order.
	pub registry: &'a NodeRegistry,
	/// Base sizes for glyph scaling.
	pub sizing: &'a SizeResolver,
	/// Animated node frames to draw.
	pub transitions: &'a NodeTransitions,
	/// Colors and fonts.
	pub theme: &'a Theme,
}

/// Renders the complete chart to the canvas.
pub fn render(ctx: &CanvasRenderingContext2d, scene: &Scene<'_>) {
	draw_background(ctx, scene);

	let mut frames: Vec<(usize, Frame)> = (0..scene.registry.len())
		.filter_map(|index| scene.transitions.frame(index).map(|frame| (index, frame)))
		.collect();
	frames.sort_by(|(_, a), (_, b)| a.card_mix.total_cmp(&b.card_mix));

	for (index, frame) in frames {
		if let Some(node) = scene.registry.get(index) {
			draw_node(ctx, scene, index, node, &frame);
		}
	}

	if scene.theme.background.vignette > 0.0 {
		draw_vignette(ctx, scene);
	}
}

fn draw_background(ctx: &CanvasRenderingContext2d, scene: &Scene<'_>) {
	let (w, h) = (scene.width, scene.height);
	let background = &scene.theme.background;
	ctx.clear_rect(0.0, 0.0, w, h);

	match ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&background.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn draw_vignette(ctx: &CanvasRenderingContext2d, scene: &Scene<'_>) {
	let (w, h) = (scene.width, scene.height);
	let Ok(gradient) = ctx.create_radial_gradient(
		w / 2.0,
		h / 2.0,
		w.min(h) * 0.3,
		w / 2.0,
		h / 2.0,
		w.max(h) * 0.7,
	) else {
		return;
	};

	let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
	let _ = gradient.add_color_stop(
		1.0,
		&format!("rgba(0, 0, 0, {})", scene.theme.background.vignette),
	);

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	scene: &Scene<'_>,
	index: usize,
	node: &Node,
	frame: &Frame,
) {
	let theme = scene.theme;
	let base = theme.node_color(index, node.color());
	let mix = frame.card_mix;
	let half_min = frame.width.min(frame.height) / 2.0;
	let corner = half_min + (theme.card.corner_radius.min(half_min) - half_min) * mix;

	rounded_rect(ctx, frame, corner);
	if mix < 1.0 {
		if let Ok(gradient) = ctx.create_radial_gradient(
			frame.x - half_min * 0.3,
			frame.y - half_min * 0.3,
			0.0,
			frame.x,
			frame.y,
			half_min.max(1.0),
		) {
			let card_fill = theme.card.fill.lerp(base, theme.card.tint);
			let _ = gradient.add_color_stop(
				0.0,
				&base.lighten(theme.bubble.highlight).lerp(card_fill, mix).to_css(),
			);
			let _ = gradient.add_color_stop(0.7, &base.lerp(card_fill, mix).to_css());
			let _ = gradient.add_color_stop(
				1.0,
				&base.darken(theme.bubble.shadow).lerp(card_fill, mix).to_css(),
			);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
	} else {
		ctx.set_fill_style_str(&theme.card.fill.lerp(base, theme.card.tint).to_css());
	}
	ctx.fill();

	if mix > 0.0 {
		ctx.set_stroke_style_str(&base.with_alpha(mix).to_css());
		ctx.set_line_width(theme.card.border_width);
		ctx.stroke();
	}

	let glyph_alpha = (1.0 - mix * 2.0).max(0.0);
	if glyph_alpha > 0.0 {
		draw_glyph(ctx, scene, node, frame, base, half_min, glyph_alpha);
	}

	let text_alpha = (mix * 2.0 - 1.0).max(0.0);
	if text_alpha > 0.0 {
		draw_card_text(ctx, scene, node, frame, text_alpha);
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, frame: &Frame, radius: f64) {
	let (left, top) = (frame.x - frame.width / 2.0, frame.y - frame.height / 2.0);
	let (right, bottom) = (left + frame.width, top + frame.height);

	ctx.begin_path();
	if frame.width == frame.height && radius >= frame.width / 2.0 {
		let _ = ctx.arc(frame.x, frame.y, radius, 0.0, 2.0 * PI);
		return;
	}
	ctx.move_to(left + radius, top);
	let _ = ctx.arc_to(right, top, right, bottom, radius);
	let _ = ctx.arc_to(right, bottom, left, bottom, radius);
	let _ = ctx.arc_to(left, bottom, left, top, radius);
	let _ = ctx.arc_to(left, top, right, top, radius);
	ctx.close_path();
}

fn draw_glyph(
	ctx: &CanvasRenderingContext2d,
	scene: &Scene<'_>,
	node: &Node,
	frame: &Frame,
	fill: Color,
	radius: f64,
	alpha: f64,
) {
	let glyph = node.glyph().as_str();
	let chars = glyph.chars().count().max(2) as f64;
	let font_size = scene.sizing.glyph_size(radius) * 1.6 / chars;
	if font_size < 4.0 {
		return;
	}

	ctx.set_global_alpha(alpha);
	ctx.set_font(&scene.theme.glyph_font(font_size));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(&scene.theme.glyph_color(fill).to_css());
	let _ = ctx.fill_text(glyph, frame.x, frame.y);
	ctx.set_global_alpha(1.0);
}

fn draw_card_text(
	ctx: &CanvasRenderingContext2d,
	scene: &Scene<'_>,
	node: &Node,
	frame: &Frame,
	alpha: f64,
) {
	let card = &scene.theme.card;
	let left = frame.x - frame.width / 2.0 + card.padding;
	let max_width = (frame.width - card.padding * 2.0).max(0.0);
	let mut y = frame.y - frame.height / 2.0 + card.padding;
	let bottom = frame.y + frame.height / 2.0 - card.padding;

	ctx.set_global_alpha(alpha);
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");

	ctx.set_font(card.title_font);
	ctx.set_fill_style_str(&card.title_color.to_css());
	let _ = ctx.fill_text_with_max_width(node.label(), left, y, max_width);
	y += card.line_height + 4.0;

	ctx.set_font(card.body_font);
	ctx.set_fill_style_str(&card.muted_color.to_css());
	let _ = ctx.fill_text(&format!("Usage: {:.0}%", node.weight()), left, y);
	y += card.line_height + 4.0;

	let max_lines = ((bottom - y) / card.line_height).floor().max(0.0) as usize;
	let measure = |text: &str| ctx.measure_text(text).map_or(0.0, |m| m.width());
	ctx.set_fill_style_str(&card.text_color.to_css());
	for line in wrap_text(node.description(), max_width, max_lines, measure) {
		let _ = ctx.fill_text(&line, left, y);
		y += card.line_height;
	}
	ctx.set_global_alpha(1.0);
}

/// Greedy word wrap. At most `max_lines` lines are returned; when text is cut,
/// the last line ends in an ellipsis. A single word wider than `max_width`
/// gets a line to itself.
pub fn wrap_text(
	text: &str,
	max_width: f64,
	max_lines: usize,
	measure: impl Fn(&str) -> f64,
) -> Vec<String> {
	let mut lines: Vec<String> = Vec::new();
	let mut current = String::new();

	for word in text.split_whitespace() {
		let candidate = if current.is_empty() {
			word.to_owned()
		} else {
			format!("{current} {word}")
		};
		if current.is_empty() || measure(&candidate) <= max_width {
			current = candidate;
		} else {
			lines.push(std::mem::replace(&mut current, word.to_owned()));
		}
	}
	if !current.is_empty() {
		lines.push(current);
	}

	if lines.len() > max_lines {
		lines.truncate(max_lines);
		if let Some(last) = lines.last_mut() {
			while !last.is_empty() && measure(&format!("{last}…")) > max_width {
				last.pop();
			}
			let trimmed = last.trim_end().len();
			last.truncate(trimmed);
			last.push('…');
		}
	}
	lines
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chars(text: &str) -> f64 {
		text.chars().count() as f64
	}

	#[test]
	fn wraps_on_word_boundaries() {
		let lines = wrap_text("the quick brown fox jumps", 10.0, 10, chars);
		assert_eq!(lines, ["the quick", "brown fox", "jumps"]);
	}

	#[test]
	fn long_word_gets_its_own_line() {
		let lines = wrap_text("a extraordinarily b", 5.0, 10, chars);
		assert_eq!(lines, ["a", "extraordinarily", "b"]);
	}

	#[test]
	fn overflow_ends_in_ellipsis() {
		let lines = wrap_text("one two three four five six", 9.0, 2, chars);
		assert_eq!(lines, ["one two", "three…"]);
	}

	#[test]
	fn no_room_means_no_lines() {
		assert!(wrap_text("anything at all", 100.0, 0, chars).is_empty());
		assert!(wrap_text("   ", 100.0, 3, chars).is_empty());
	}
}
