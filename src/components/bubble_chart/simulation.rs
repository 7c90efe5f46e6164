//! Force simulation for bubble placement.
//!
//! A small, self-contained n-body solver in the style of d3-force: pairwise
//! charge repulsion, a weak per-axis pull toward the viewport centre, and
//! radius-based collision. The engine does not run per frame. Every input
//! change re-heats it (`alpha = 1`) and runs a fixed number of ticks
//! synchronously, so a given seed and input always settle to the same layout.
//!
//! Repulsion and collision visit every pair, O(n²) per tick. That is fine for
//! the dozen-or-so nodes a chart holds; larger sets would need a quadtree.

use std::f64::consts::{PI, TAU};

use log::debug;

use super::config::SimulationConfig;
use super::viewport::ViewportState;

/// Distance of the first seeded node from the centre.
const INITIAL_RADIUS: f64 = 10.0;
/// Squared distance below which repulsion is softened.
const MIN_DISTANCE_SQ: f64 = 1.0;
/// Magnitude of the deterministic nudge applied to coincident points.
const JIGGLE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Body {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
}

/// Owns position and velocity for every node, addressed by registry index.
#[derive(Clone, Debug)]
pub struct ForceSimulationEngine {
	bodies: Vec<Body>,
	radii: Vec<f64>,
	viewport: ViewportState,
	config: SimulationConfig,
	alpha: f64,
	ticked: bool,
}

impl ForceSimulationEngine {
	/// Build an engine for `node_count` bodies seeded around the viewport centre.
	pub fn new(node_count: usize, viewport: ViewportState, config: SimulationConfig) -> Self {
		let alpha = config.alpha_start;
		Self {
			bodies: seed_bodies(node_count, &viewport),
			radii: vec![0.0; node_count],
			viewport,
			config,
			alpha,
			ticked: false,
		}
	}

	/// Number of bodies.
	pub fn len(&self) -> usize {
		self.bodies.len()
	}

	/// Whether there are no bodies.
	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}

	/// Bounds the engine centres on.
	pub fn viewport(&self) -> &ViewportState {
		&self.viewport
	}

	/// Force parameters.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Current simulation temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Charge strength for the viewport's device class.
	pub fn repulsion_strength(&self) -> f64 {
		if self.viewport.is_mobile {
			self.config.mobile_repulsion
		} else {
			self.config.desktop_repulsion
		}
	}

	/// Settled position of body `index`; `None` before the first tick or for an
	/// unknown index.
	pub fn position(&self, index: usize) -> Option<(f64, f64)> {
		if !self.ticked {
			return None;
		}
		self.bodies.get(index).map(|b| (b.x, b.y))
	}

	/// All positions in registry order. Empty before the first tick.
	pub fn positions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
		let count = if self.ticked { self.bodies.len() } else { 0 };
		self.bodies[..count].iter().map(|b| (b.x, b.y))
	}

	/// Re-heat and run the configured number of ticks, evaluating
	/// `collision_radius` for every node on every tick. Returns the tick count.
	pub fn settle(&mut self, mut collision_radius: impl FnMut(usize) -> f64) -> usize {
		self.alpha = self.config.alpha_start;
		let ticks = self.config.ticks;
		for _ in 0..ticks {
			self.tick(&mut collision_radius);
		}
		debug!(
			"simulation: settled {} nodes in {} ticks (alpha {:.3})",
			self.bodies.len(),
			ticks,
			self.alpha
		);
		ticks
	}

	/// Advance one integration step.
	pub fn tick(&mut self, mut collision_radius: impl FnMut(usize) -> f64) {
		for (index, radius) in self.radii.iter_mut().enumerate() {
			*radius = collision_radius(index).max(0.0);
		}

		self.alpha += (self.config.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;

		self.apply_repulsion(alpha);
		self.apply_centering(alpha);
		self.apply_collision();

		let retain = 1.0 - self.config.velocity_decay;
		for body in &mut self.bodies {
			body.vx *= retain;
			body.vy *= retain;
			body.x += body.vx;
			body.y += body.vy;
		}
		self.ticked = true;
	}

	fn apply_repulsion(&mut self, alpha: f64) {
		let strength = self.repulsion_strength() * alpha;
		if strength == 0.0 {
			return;
		}

		let count = self.bodies.len();
		for i in 0..count {
			let (xi, yi) = (self.bodies[i].x, self.bodies[i].y);
			let (mut fx, mut fy) = (0.0, 0.0);
			for j in 0..count {
				if i == j {
					continue;
				}
				let (mut dx, mut dy) = (self.bodies[j].x - xi, self.bodies[j].y - yi);
				if dx == 0.0 && dy == 0.0 {
					(dx, dy) = jiggle(i, j);
				}
				let mut distance_sq = dx * dx + dy * dy;
				if distance_sq < MIN_DISTANCE_SQ {
					distance_sq = (MIN_DISTANCE_SQ * distance_sq).sqrt();
				}
				let weight = strength / distance_sq;
				fx -= dx * weight;
				fy -= dy * weight;
			}
			self.bodies[i].vx += fx;
			self.bodies[i].vy += fy;
		}
	}

	fn apply_centering(&mut self, alpha: f64) {
		let (cx, cy) = self.viewport.center();
		let pull = self.config.center_strength * alpha;
		for body in &mut self.bodies {
			body.vx += (cx - body.x) * pull;
			body.vy += (cy - body.y) * pull;
		}
	}

	/// Separates overlapping pairs using positions predicted from the current
	/// velocity. The correction is split by squared radius, so a small bubble
	/// moves more than a large card.
	fn apply_collision(&mut self) {
		let strength = self.config.collision_strength;
		let count = self.bodies.len();

		for i in 0..count {
			let ri = self.radii[i];
			let ri_sq = ri * ri;
			let xi = self.bodies[i].x + self.bodies[i].vx;
			let yi = self.bodies[i].y + self.bodies[i].vy;

			for j in (i + 1)..count {
				let rj = self.radii[j];
				let min_distance = ri + rj;
				let other = self.bodies[j];
				let mut dx = xi - other.x - other.vx;
				let mut dy = yi - other.y - other.vy;
				let mut distance_sq = dx * dx + dy * dy;
				if distance_sq >= min_distance * min_distance {
					continue;
				}

				if distance_sq == 0.0 {
					(dx, dy) = jiggle(i, j);
					distance_sq = dx * dx + dy * dy;
				}
				let distance = distance_sq.sqrt();
				let push = (min_distance - distance) / distance * strength;
				dx *= push;
				dy *= push;

				let rj_sq = rj * rj;
				let share = rj_sq / (ri_sq + rj_sq);
				self.bodies[i].vx += dx * share;
				self.bodies[i].vy += dy * share;
				self.bodies[j].vx -= dx * (1.0 - share);
				self.bodies[j].vy -= dy * (1.0 - share);
			}
		}
	}
}

/// Phyllotaxis spiral around the viewport centre: evenly spread, no overlap of
/// seeds, and identical for identical inputs.
fn seed_bodies(count: usize, viewport: &ViewportState) -> Vec<Body> {
	let (cx, cy) = viewport.center();
	let golden_angle = PI * (3.0 - 5f64.sqrt());
	(0..count)
		.map(|i| {
			let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
			let angle = i as f64 * golden_angle;
			Body {
				x: cx + radius * angle.cos(),
				y: cy + radius * angle.sin(),
				..Body::default()
			}
		})
		.collect()
}

/// Tiny pair-specific offset for coincident points.
fn jiggle(i: usize, j: usize) -> (f64, f64) {
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * TAU;
	(angle.cos() * JIGGLE, angle.sin() * JIGGLE)
}

#[cfg(test)]
mod tests {
	use super::*;

	const WEIGHTS: [f64; 15] = [
		90.0, 80.0, 85.0, 95.0, 60.0, 65.0, 75.0, 72.0, 55.0, 98.0, 62.0, 50.0, 70.0, 70.0, 70.0,
	];

	fn viewport(width: f64, height: f64, is_mobile: bool) -> ViewportState {
		ViewportState {
			width,
			height,
			is_mobile,
		}
	}

	/// Collision radii mirroring the default footprint rules.
	fn radii(vp: &ViewportState, active: Option<usize>) -> Vec<f64> {
		let scale = if vp.is_mobile { 0.5 } else { 0.9 };
		WEIGHTS
			.iter()
			.enumerate()
			.map(|(i, w)| {
				let (width, height) = if Some(i) == active {
					if vp.is_mobile {
						(260f64.min(vp.width * 0.75), 180f64.min(vp.height * 0.55))
					} else {
						(220f64.min(vp.width * 0.8), 150f64.min(vp.height * 0.8))
					}
				} else {
					(w * scale * 2.0, w * scale * 2.0)
				};
				width.max(height) / 2.0 * 1.1
			})
			.collect()
	}

	fn worst_overlap(engine: &ForceSimulationEngine, radii: &[f64]) -> f64 {
		let points: Vec<_> = engine.positions().collect();
		let mut worst = f64::INFINITY;
		for a in 0..points.len() {
			for b in (a + 1)..points.len() {
				let (dx, dy) = (points[a].0 - points[b].0, points[a].1 - points[b].1);
				let gap = (dx * dx + dy * dy).sqrt() - (radii[a] + radii[b]);
				worst = worst.min(gap / (radii[a] + radii[b]));
			}
		}
		worst
	}

	#[test]
	fn positions_undefined_until_first_tick() {
		let mut engine =
			ForceSimulationEngine::new(3, viewport(900.0, 640.0, false), SimulationConfig::default());
		assert_eq!(engine.position(0), None);
		assert_eq!(engine.positions().count(), 0);

		engine.settle(|_| 10.0);
		assert!(engine.position(2).is_some());
		assert_eq!(engine.position(3), None);
		assert_eq!(engine.positions().count(), 3);
	}

	#[test]
	fn settle_runs_fixed_ticks_from_full_heat() {
		let mut engine =
			ForceSimulationEngine::new(4, viewport(900.0, 640.0, false), SimulationConfig::default());
		let mut evaluations = 0;
		let ticks = engine.settle(|_| {
			evaluations += 1;
			20.0
		});
		assert_eq!(ticks, 150);
		assert_eq!(evaluations, 150 * 4);
		let expected_alpha = 0.98f64.powi(150);
		assert!((engine.alpha() - expected_alpha).abs() < 1e-9);

		engine.settle(|_| 20.0);
		assert!((engine.alpha() - expected_alpha).abs() < 1e-9);
	}

	#[test]
	fn identical_inputs_settle_identically() {
		let vp = viewport(900.0, 640.0, false);
		let r = radii(&vp, Some(3));
		let mut a = ForceSimulationEngine::new(WEIGHTS.len(), vp, SimulationConfig::default());
		let mut b = a.clone();

		a.settle(|i| r[i]);
		b.settle(|i| r[i]);
		assert_eq!(a.positions().collect::<Vec<_>>(), b.positions().collect::<Vec<_>>());

		let mut c = a.clone();
		a.settle(|i| r[i]);
		c.settle(|i| r[i]);
		assert_eq!(a.positions().collect::<Vec<_>>(), c.positions().collect::<Vec<_>>());
	}

	#[test]
	fn settled_layout_does_not_overlap() {
		for vp in [
			viewport(900.0, 640.0, false),
			viewport(450.0, 560.0, true),
			viewport(1728.0, 864.0, false),
		] {
			for active in [None, Some(0), Some(9), Some(11)] {
				let r = radii(&vp, active);
				let mut engine =
					ForceSimulationEngine::new(WEIGHTS.len(), vp, SimulationConfig::default());
				engine.settle(|i| r[i]);
				let worst = worst_overlap(&engine, &r);
				assert!(
					worst >= -0.03,
					"overlap {worst:.4} for {vp:?} with active {active:?}"
				);
			}
		}
	}

	#[test]
	fn resettling_after_toggles_keeps_separation() {
		let vp = viewport(900.0, 640.0, false);
		let mut engine = ForceSimulationEngine::new(WEIGHTS.len(), vp, SimulationConfig::default());
		for active in [None, Some(4), Some(9), None, Some(0)] {
			let r = radii(&vp, active);
			engine.settle(|i| r[i]);
			assert!(worst_overlap(&engine, &r) >= -0.03);
		}
	}

	#[test]
	fn cluster_stays_near_viewport_centre() {
		for vp in [viewport(900.0, 640.0, false), viewport(450.0, 560.0, true)] {
			let r = radii(&vp, None);
			let mut engine = ForceSimulationEngine::new(WEIGHTS.len(), vp, SimulationConfig::default());
			engine.settle(|i| r[i]);
			let n = engine.len() as f64;
			let (sx, sy) = engine
				.positions()
				.fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
			let (cx, cy) = vp.center();
			assert!((sx / n - cx).abs() < vp.width * 0.15);
			assert!((sy / n - cy).abs() < vp.height * 0.15);
		}
	}

	#[test]
	fn repulsion_is_weaker_on_mobile() {
		let spread = |is_mobile: bool| {
			let mut engine = ForceSimulationEngine::new(
				2,
				viewport(900.0, 640.0, is_mobile),
				SimulationConfig::default(),
			);
			engine.settle(|_| 0.0);
			let (a, b) = (engine.position(0).unwrap(), engine.position(1).unwrap());
			((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
		};
		let seed_distance = {
			let seeds = seed_bodies(2, &viewport(900.0, 640.0, false));
			((seeds[0].x - seeds[1].x).powi(2) + (seeds[0].y - seeds[1].y).powi(2)).sqrt()
		};

		let (mobile, desktop) = (spread(true), spread(false));
		assert!(mobile > seed_distance, "{mobile} vs seed {seed_distance}");
		assert!(desktop > mobile, "{desktop} vs {mobile}");
	}

	#[test]
	fn coincident_bodies_are_separated() {
		let mut engine =
			ForceSimulationEngine::new(2, viewport(400.0, 400.0, false), SimulationConfig::default());
		for body in &mut engine.bodies {
			body.x = 200.0;
			body.y = 200.0;
		}
		engine.settle(|_| 30.0);
		let (a, b) = (engine.position(0).unwrap(), engine.position(1).unwrap());
		let distance = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
		assert!(distance.is_finite());
		assert!(distance > 60.0 * 0.97, "distance {distance}");
	}

	#[test]
	fn empty_engine_settles() {
		let mut engine =
			ForceSimulationEngine::new(0, viewport(100.0, 100.0, true), SimulationConfig::default());
		assert!(engine.is_empty());
		engine.settle(|_| unreachable!());
		assert_eq!(engine.positions().count(), 0);
	}
}
