//! Per-node animation between settled layouts.
//!
//! The simulation jumps straight to its settled positions; the renderer eases
//! toward them instead. Position follows a damped spring so interrupted
//! transitions keep their momentum. Size follows a fixed-length tween so a card
//! always finishes opening in the same time.

use super::state::NodeLayout;

/// Spring stiffness for position (1/s²).
const STIFFNESS: f64 = 100.0;
/// Spring damping for position (1/s).
const DAMPING: f64 = 15.0;
/// Length of a size change (seconds).
const SIZE_DURATION: f64 = 0.5;
/// Largest integration step; longer frames are split.
const MAX_STEP: f64 = 1.0 / 120.0;
/// Frames longer than this (a backgrounded tab) are clamped.
const MAX_FRAME: f64 = 0.1;
/// Distance and speed under which the spring snaps to rest.
const REST_EPSILON: f64 = 0.05;

fn ease_in_out(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

/// Interpolated drawing state of one node for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
	/// Drawn centre.
	pub x: f64,
	/// Drawn centre.
	pub y: f64,
	/// Current width.
	pub width: f64,
	/// Current height.
	pub height: f64,
	/// 0.0 for a circle, 1.0 for a fully opened card.
	pub card_mix: f64,
}

impl Frame {
	/// Whether `(x, y)` lies on the drawn shape. Past the halfway point of a
	/// morph the node counts as a card.
	pub fn contains(&self, x: f64, y: f64) -> bool {
		let (dx, dy) = ((x - self.x).abs(), (y - self.y).abs());
		if self.card_mix >= 0.5 {
			dx <= self.width / 2.0 && dy <= self.height / 2.0
		} else {
			let radius = self.width.min(self.height) / 2.0;
			dx * dx + dy * dy <= radius * radius
		}
	}
}

#[derive(Clone, Debug)]
struct Animated {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
	target_x: f64,
	target_y: f64,
	from: (f64, f64, f64),
	to: (f64, f64, f64),
	elapsed: f64,
}

impl Animated {
	fn at_rest(layout: &NodeLayout) -> Self {
		let size = size_of(layout);
		Self {
			x: layout.x,
			y: layout.y,
			vx: 0.0,
			vy: 0.0,
			target_x: layout.x,
			target_y: layout.y,
			from: size,
			to: size,
			elapsed: SIZE_DURATION,
		}
	}

	fn size(&self) -> (f64, f64, f64) {
		let t = ease_in_out(self.elapsed / SIZE_DURATION);
		let lerp = |a: f64, b: f64| a + (b - a) * t;
		(
			lerp(self.from.0, self.to.0),
			lerp(self.from.1, self.to.1),
			lerp(self.from.2, self.to.2),
		)
	}

	fn retarget(&mut self, layout: &NodeLayout) {
		self.target_x = layout.x;
		self.target_y = layout.y;
		let next = size_of(layout);
		if next != self.to {
			self.from = self.size();
			self.to = next;
			self.elapsed = 0.0;
		}
	}

	fn step(&mut self, dt: f64) {
		let ax = STIFFNESS * (self.target_x - self.x) - DAMPING * self.vx;
		let ay = STIFFNESS * (self.target_y - self.y) - DAMPING * self.vy;
		self.vx += ax * dt;
		self.vy += ay * dt;
		self.x += self.vx * dt;
		self.y += self.vy * dt;

		let offset = (self.target_x - self.x).hypot(self.target_y - self.y);
		if offset < REST_EPSILON && self.vx.hypot(self.vy) < REST_EPSILON {
			self.x = self.target_x;
			self.y = self.target_y;
			self.vx = 0.0;
			self.vy = 0.0;
		}
	}

	fn is_moving(&self) -> bool {
		self.x != self.target_x
			|| self.y != self.target_y
			|| self.vx != 0.0
			|| self.vy != 0.0
			|| self.elapsed < SIZE_DURATION
	}
}

fn size_of(layout: &NodeLayout) -> (f64, f64, f64) {
	let mix = if layout.is_active { 1.0 } else { 0.0 };
	(layout.visual_width, layout.visual_height, mix)
}

/// Animated state for every node in the current layout.
#[derive(Clone, Debug, Default)]
pub struct NodeTransitions {
	nodes: Vec<Animated>,
}

impl NodeTransitions {
	/// Empty set; the first [`retarget`](Self::retarget) snaps.
	pub fn new() -> Self {
		Self::default()
	}

	/// Aim every node at a new settled layout. The first layout, or one with a
	/// different node count, is adopted without animation.
	pub fn retarget(&mut self, layout: &[NodeLayout]) {
		if self.nodes.len() != layout.len() {
			self.nodes = layout.iter().map(Animated::at_rest).collect();
			return;
		}
		for (node, target) in self.nodes.iter_mut().zip(layout) {
			node.retarget(target);
		}
	}

	/// Advance all animations by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		let dt = dt.clamp(0.0, MAX_FRAME);
		if dt == 0.0 {
			return;
		}
		let steps = (dt / MAX_STEP).ceil().max(1.0);
		let step = dt / steps;

		for node in &mut self.nodes {
			node.elapsed = (node.elapsed + dt).min(SIZE_DURATION);
			for _ in 0..steps as usize {
				node.step(step);
			}
		}
	}

	/// Whether any node is still in motion.
	pub fn is_animating(&self) -> bool {
		self.nodes.iter().any(Animated::is_moving)
	}

	/// Drawing state of node `index`, if it exists.
	pub fn frame(&self, index: usize) -> Option<Frame> {
		self.nodes.get(index).map(|node| {
			let (width, height, card_mix) = node.size();
			Frame {
				x: node.x,
				y: node.y,
				width,
				height,
				card_mix,
			}
		})
	}

	/// Index of the topmost drawn node under `(x, y)`. Nodes further into
	/// their card morph are drawn later, so they win.
	pub fn node_at(&self, x: f64, y: f64) -> Option<usize> {
		(0..self.nodes.len())
			.filter_map(|index| self.frame(index).map(|frame| (index, frame)))
			.filter(|(_, frame)| frame.contains(x, y))
			.max_by(|(_, a), (_, b)| a.card_mix.total_cmp(&b.card_mix))
			.map(|(index, _)| index)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn layout(x: f64, width: f64, is_active: bool) -> NodeLayout {
		NodeLayout {
			id: "n".into(),
			index: 0,
			x,
			y: 100.0,
			visual_width: width,
			visual_height: if is_active { width / 2.0 } else { width },
			base_radius: 20.0,
			collision_radius: width / 2.0 * 1.1,
			is_active,
		}
	}

	fn run(transitions: &mut NodeTransitions, seconds: f64) {
		let frames = (seconds * 60.0).round() as usize;
		for _ in 0..frames {
			transitions.tick(1.0 / 60.0);
		}
	}

	/// Advance in 50 ms frames, under the long-frame clamp.
	fn run_coarse(transitions: &mut NodeTransitions, frames: usize) {
		for _ in 0..frames {
			transitions.tick(0.05);
		}
	}

	#[test]
	fn first_layout_snaps() {
		let mut t = NodeTransitions::new();
		t.retarget(&[layout(50.0, 40.0, false)]);
		let frame = t.frame(0).unwrap();
		assert_eq!((frame.x, frame.y, frame.width, frame.card_mix), (50.0, 100.0, 40.0, 0.0));
		assert!(!t.is_animating());
		assert!(t.frame(1).is_none());
	}

	#[test]
	fn position_springs_to_target() {
		let mut t = NodeTransitions::new();
		t.retarget(&[layout(0.0, 40.0, false)]);
		t.retarget(&[layout(300.0, 40.0, false)]);
		assert!(t.is_animating());

		t.tick(1.0 / 60.0);
		let x = t.frame(0).unwrap().x;
		assert!(x > 0.0 && x < 300.0);

		run(&mut t, 3.0);
		assert_eq!(t.frame(0).unwrap().x, 300.0);
		assert!(!t.is_animating());
	}

	#[test]
	fn size_tweens_over_half_a_second() {
		let mut t = NodeTransitions::new();
		t.retarget(&[layout(0.0, 40.0, false)]);
		t.retarget(&[layout(0.0, 200.0, true)]);

		run_coarse(&mut t, 5);
		let mid = t.frame(0).unwrap();
		assert!((mid.width - 120.0).abs() < 1e-6);
		assert!((mid.card_mix - 0.5).abs() < 1e-6);

		run_coarse(&mut t, 6);
		let done = t.frame(0).unwrap();
		assert_eq!((done.width, done.height, done.card_mix), (200.0, 100.0, 1.0));
	}

	#[test]
	fn interrupted_tween_starts_from_current_size() {
		let mut t = NodeTransitions::new();
		t.retarget(&[layout(0.0, 40.0, false)]);
		t.retarget(&[layout(0.0, 200.0, true)]);
		run_coarse(&mut t, 5);
		t.retarget(&[layout(0.0, 40.0, false)]);

		let resumed = t.frame(0).unwrap();
		assert!((resumed.width - 120.0).abs() < 1e-6);
		run_coarse(&mut t, 11);
		assert_eq!(t.frame(0).unwrap().width, 40.0);
	}

	#[test]
	fn node_count_change_snaps() {
		let mut t = NodeTransitions::new();
		t.retarget(&[layout(0.0, 40.0, false)]);
		t.retarget(&[layout(10.0, 40.0, false), layout(90.0, 40.0, false)]);
		assert_eq!(t.frame(1).unwrap().x, 90.0);
		assert!(!t.is_animating());
	}

	#[test]
	fn long_frames_are_clamped() {
		let mut t = NodeTransitions::new();
		t.retarget(&[layout(0.0, 40.0, false)]);
		t.retarget(&[layout(300.0, 40.0, false)]);
		t.tick(10.0);
		let x = t.frame(0).unwrap().x;
		assert!(x.is_finite() && x < 300.0);
	}

	#[test]
	fn single_long_frame_advances_tween_by_the_clamp_only() {
		let mut t = NodeTransitions::new();
		t.retarget(&[layout(0.0, 40.0, false)]);
		t.retarget(&[layout(0.0, 200.0, true)]);
		t.tick(0.25);
		let width = t.frame(0).unwrap().width;
		let expected = 40.0 + 160.0 * ease_in_out(MAX_FRAME / SIZE_DURATION);
		assert!((width - expected).abs() < 1e-9);
	}

	#[test]
	fn hit_testing_follows_the_drawn_position() {
		let mut t = NodeTransitions::new();
		t.retarget(&[layout(0.0, 40.0, false)]);
		t.retarget(&[layout(300.0, 40.0, false)]);
		t.tick(1.0 / 60.0);

		let drawn = t.frame(0).unwrap();
		assert_eq!(t.node_at(drawn.x, drawn.y), Some(0));
		assert_eq!(t.node_at(300.0, 100.0), None);

		run(&mut t, 3.0);
		assert_eq!(t.node_at(300.0, 100.0), Some(0));
	}

	#[test]
	fn opening_card_is_hit_before_the_bubble_under_it() {
		let mut t = NodeTransitions::new();
		let mut card = layout(0.0, 40.0, false);
		let bubble = NodeLayout {
			index: 1,
			..layout(10.0, 40.0, false)
		};
		t.retarget(&[card.clone(), bubble.clone()]);
		card.visual_width = 200.0;
		card.visual_height = 100.0;
		card.is_active = true;
		t.retarget(&[card, bubble]);
		run(&mut t, 1.0);

		assert_eq!(t.node_at(10.0, 100.0), Some(0));
		assert_eq!(t.node_at(95.0, 140.0), Some(0));
		assert_eq!(t.node_at(500.0, 500.0), None);
	}
}
