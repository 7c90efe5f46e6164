//! Visual footprint and collision radius for a node.
//!
//! Collapsed nodes are circles whose radius scales with weight; the active node
//! becomes a card capped both absolutely and relative to the viewport. The
//! collision radius wraps the larger footprint dimension with a small buffer,
//! so a collapsed circle never touches an adjacent card.

use super::config::SizingConfig;
use super::types::Node;
use super::viewport::ViewportState;

/// Resolved on-screen size of a node in one state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
	/// Drawn width; the diameter when collapsed.
	pub visual_width: f64,
	/// Drawn height; the diameter when collapsed.
	pub visual_height: f64,
	/// Radius of the collapsed circle, whatever the current state.
	pub base_radius: f64,
	/// Separation radius used by the simulation's collision force.
	pub collision_radius: f64,
}

/// Pure mapping from (node, active state, viewport) to a [`Footprint`].
#[derive(Clone, Debug, Default)]
pub struct SizeResolver {
	config: SizingConfig,
}

impl SizeResolver {
	/// Resolver over `config`.
	pub fn new(config: SizingConfig) -> Self {
		Self { config }
	}

	/// Sizing parameters.
	pub fn config(&self) -> &SizingConfig {
		&self.config
	}

	/// Footprint of `node` as a bubble or, when `is_active`, as a card.
	pub fn resolve(&self, node: &Node, is_active: bool, viewport: &ViewportState) -> Footprint {
		self.resolve_weight(node.weight(), is_active, viewport)
	}

	/// [`resolve`](Self::resolve) for a bare weight.
	pub fn resolve_weight(&self, weight: f64, is_active: bool, viewport: &ViewportState) -> Footprint {
		let device_scale = if viewport.is_mobile {
			self.config.mobile_scale
		} else {
			self.config.desktop_scale
		};
		let base_radius = weight * device_scale;

		let (visual_width, visual_height) = if is_active {
			let card = if viewport.is_mobile {
				&self.config.mobile_card
			} else {
				&self.config.desktop_card
			};
			(
				card.max_width.min(viewport.width * card.width_fraction),
				card.max_height.min(viewport.height * card.height_fraction),
			)
		} else {
			(base_radius * 2.0, base_radius * 2.0)
		};

		Footprint {
			visual_width,
			visual_height,
			base_radius,
			collision_radius: visual_width.max(visual_height) / 2.0 * self.config.collision_buffer,
		}
	}

	/// Shorthand for `resolve(..).collision_radius`.
	pub fn collision_radius(&self, node: &Node, is_active: bool, viewport: &ViewportState) -> f64 {
		self.resolve(node, is_active, viewport).collision_radius
	}

	/// Glyph edge length for a collapsed bubble of `base_radius`.
	pub fn glyph_size(&self, base_radius: f64) -> f64 {
		base_radius * self.config.glyph_scale
	}
}
