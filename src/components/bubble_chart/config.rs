//! Tunable constants for viewport sizing, footprints and the force simulation.
//!
//! Every struct deserializes with `#[serde(default)]`, so a page can override a
//! single value (e.g. `{"simulation": {"ticks": 200}}`) and keep the rest. Card
//! limits differ per device class, so a partial card object is filled from that
//! device's defaults rather than from one shared `Default`.

use serde::{Deserialize, Deserializer};

/// Complete chart configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
	/// Window-to-bounds mapping.
	pub viewport: ViewportConfig,
	/// Bubble and card footprints.
	pub sizing: SizingConfig,
	/// Force strengths and settle schedule.
	pub simulation: SimulationConfig,
}

/// How the chart bounds derive from the host window.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
	/// Window widths strictly below this are classified as mobile.
	pub mobile_breakpoint: f64,
	/// Fraction of the window width used by the chart.
	pub width_fraction: f64,
	/// Fraction of the window height used on mobile.
	pub mobile_height_fraction: f64,
	/// Fraction of the window height used on desktop.
	pub desktop_height_fraction: f64,
	/// Width used when no host window exists (pre-render).
	pub fallback_width: f64,
	/// Height used when no host window exists.
	pub fallback_height: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			mobile_breakpoint: 768.0,
			width_fraction: 0.9,
			mobile_height_fraction: 0.7,
			desktop_height_fraction: 0.8,
			fallback_width: 750.0,
			fallback_height: 650.0,
		}
	}
}

/// Card caps for one device class.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CardLimits {
	/// Absolute maximum card width in pixels.
	pub max_width: f64,
	/// Absolute maximum card height in pixels.
	pub max_height: f64,
	/// Maximum card width as a fraction of the viewport width.
	pub width_fraction: f64,
	/// Maximum card height as a fraction of the viewport height.
	pub height_fraction: f64,
}

impl CardLimits {
	/// Card caps on phones and narrow windows.
	pub const MOBILE: Self = Self {
		max_width: 260.0,
		max_height: 180.0,
		width_fraction: 0.75,
		height_fraction: 0.55,
	};

	/// Card caps on desktop windows.
	pub const DESKTOP: Self = Self {
		max_width: 220.0,
		max_height: 150.0,
		width_fraction: 0.8,
		height_fraction: 0.8,
	};
}

/// A card object from the page, any field of which may be absent.
#[derive(Default, Deserialize)]
#[serde(default)]
struct CardOverride {
	max_width: Option<f64>,
	max_height: Option<f64>,
	width_fraction: Option<f64>,
	height_fraction: Option<f64>,
}

impl CardOverride {
	fn over(self, base: CardLimits) -> CardLimits {
		CardLimits {
			max_width: self.max_width.unwrap_or(base.max_width),
			max_height: self.max_height.unwrap_or(base.max_height),
			width_fraction: self.width_fraction.unwrap_or(base.width_fraction),
			height_fraction: self.height_fraction.unwrap_or(base.height_fraction),
		}
	}
}

fn mobile_card<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CardLimits, D::Error> {
	Ok(CardOverride::deserialize(deserializer)?.over(CardLimits::MOBILE))
}

fn desktop_card<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CardLimits, D::Error> {
	Ok(CardOverride::deserialize(deserializer)?.over(CardLimits::DESKTOP))
}

/// Footprint sizing for collapsed bubbles and expanded cards.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SizingConfig {
	/// Weight-to-radius scale on mobile.
	pub mobile_scale: f64,
	/// Weight-to-radius scale on desktop.
	pub desktop_scale: f64,
	/// Card caps on mobile; missing fields keep [`CardLimits::MOBILE`].
	#[serde(deserialize_with = "mobile_card")]
	pub mobile_card: CardLimits,
	/// Card caps on desktop; missing fields keep [`CardLimits::DESKTOP`].
	#[serde(deserialize_with = "desktop_card")]
	pub desktop_card: CardLimits,
	/// Multiplier on half the largest footprint dimension; keeps a visible gap.
	pub collision_buffer: f64,
	/// Glyph size relative to the collapsed radius.
	pub glyph_scale: f64,
}

impl Default for SizingConfig {
	fn default() -> Self {
		Self {
			mobile_scale: 0.5,
			desktop_scale: 0.9,
			mobile_card: CardLimits::MOBILE,
			desktop_card: CardLimits::DESKTOP,
			collision_buffer: 1.1,
			glyph_scale: 0.9,
		}
	}
}

/// Force strengths and the re-settle schedule.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
	/// Pairwise repulsion strength on mobile.
	pub mobile_repulsion: f64,
	/// Pairwise repulsion strength on desktop.
	pub desktop_repulsion: f64,
	/// Pull of each node toward the viewport centre, per axis.
	pub center_strength: f64,
	/// Collision correction strength in `[0, 1]`.
	pub collision_strength: f64,
	/// Integration steps per settle.
	pub ticks: usize,
	/// Alpha value each settle starts from.
	pub alpha_start: f64,
	/// Fraction of the remaining distance to `alpha_target` covered per tick.
	pub alpha_decay: f64,
	/// Alpha value the decay approaches.
	pub alpha_target: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			mobile_repulsion: 8.0,
			desktop_repulsion: 15.0,
			center_strength: 0.03,
			collision_strength: 1.0,
			ticks: 150,
			alpha_start: 1.0,
			alpha_decay: 0.02,
			alpha_target: 0.0,
			velocity_decay: 0.4,
		}
	}
}
