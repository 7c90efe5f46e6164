//! Colors and visual style for the bubble chart.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in 0.0..=1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with opacity `a` in 0.0..=1.0.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses `#RRGGBB`, `#RGB`, `rgb()` or `rgba()` notation.
	pub fn parse(css: &str) -> Option<Self> {
		let css = css.trim();
		if let Some(hex) = css.strip_prefix('#') {
			let channel = |s: &str| u8::from_str_radix(s, 16).ok();
			return match hex.len() {
				6 => Some(Self::rgb(
					channel(hex.get(0..2)?)?,
					channel(hex.get(2..4)?)?,
					channel(hex.get(4..6)?)?,
				)),
				3 => {
					let short = |i: usize| channel(hex.get(i..i + 1)?).map(|v| v * 17);
					Some(Self::rgb(short(0)?, short(1)?, short(2)?))
				}
				_ => None,
			};
		}

		let args = css
			.strip_prefix("rgba(")
			.or_else(|| css.strip_prefix("rgb("))?
			.strip_suffix(')')?;
		let mut parts = args.split(',').map(str::trim);
		let r = parts.next()?.parse().ok()?;
		let g = parts.next()?.parse().ok()?;
		let b = parts.next()?.parse().ok()?;
		let a = match parts.next() {
			Some(a) => a.parse().ok()?,
			None => 1.0,
		};
		Some(Self::rgba(r, g, b, a))
	}

	/// Same color at opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Apply `f` to each of the red, green and blue channels. Results are
	/// rounded and clamped back into a byte.
	fn map_channels(self, mut f: impl FnMut(f64) -> f64) -> Self {
		let mut channel = |c: u8| f(f64::from(c)).round().clamp(0.0, 255.0) as u8;
		Self {
			r: channel(self.r),
			g: channel(self.g),
			b: channel(self.b),
			a: self.a,
		}
	}

	/// Move toward white; `amount` 1.0 reaches it.
	pub fn lighten(self, amount: f64) -> Self {
		let amount = amount.clamp(0.0, 1.0);
		self.map_channels(|c| c + (255.0 - c) * amount)
	}

	/// Move toward black; `amount` 1.0 reaches it.
	pub fn darken(self, amount: f64) -> Self {
		let keep = 1.0 - amount.clamp(0.0, 1.0);
		self.map_channels(|c| c * keep)
	}

	/// Blend toward `other`, alpha included.
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |from: f64, to: f64| from + (to - from) * t;
		let channel = |from: u8, to: u8| mix(f64::from(from), f64::from(to)).round() as u8;
		Self {
			r: channel(self.r, other.r),
			g: channel(self.g, other.g),
			b: channel(self.b, other.b),
			a: mix(self.a, other.a),
		}
	}

	/// Perceived brightness in 0.0..=1.0, used to pick glyph contrast.
	pub fn luminance(self) -> f64 {
		let [r, g, b] = [self.r, self.g, self.b].map(f64::from);
		(0.299 * r + 0.587 * g + 0.114 * b) / 255.0
	}

	/// Canvas style string. Opaque colors use hex.
	pub fn to_css(self) -> String {
		let Self { r, g, b, a } = self;
		if a >= 0.999 {
			format!("#{r:02x}{g:02x}{b:02x}")
		} else {
			format!("rgba({r}, {g}, {b}, {a})")
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Centre color of the radial gradient
	pub color_secondary: Color,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Collapsed bubble style.
#[derive(Clone, Debug)]
pub struct BubbleStyle {
	/// Inner highlight strength of the radial gradient
	pub highlight: f64,
	/// Rim shadow strength of the radial gradient
	pub shadow: f64,
	/// Glyph color on dark fills
	pub glyph_light: Color,
	/// Glyph color on light fills
	pub glyph_dark: Color,
	/// Font template; `{size}` is replaced with the pixel size
	pub glyph_font: &'static str,
}

/// Expanded card style.
#[derive(Clone, Debug)]
pub struct CardStyle {
	/// Base card fill
	pub fill: Color,
	/// How much of the node color tints the card fill
	pub tint: f64,
	/// Border stroke in the node color
	pub border_width: f64,
	/// Corner radius of a fully open card
	pub corner_radius: f64,
	/// Inset of the text block from the card edge
	pub padding: f64,
	/// Label color
	pub title_color: Color,
	/// Description text
	pub text_color: Color,
	/// Usage line
	pub muted_color: Color,
	/// Label font
	pub title_font: &'static str,
	/// Description and usage font
	pub body_font: &'static str,
	/// Body text line spacing
	pub line_height: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas backdrop
	pub background: BackgroundStyle,
	/// Collapsed nodes
	pub bubble: BubbleStyle,
	/// The expanded node
	pub card: CardStyle,
	/// Used for nodes without a color of their own, by registry index
	pub palette: Vec<Color>,
}

impl Theme {
	/// Dark slate theme
	pub fn slate() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				vignette: 0.15,
			},
			bubble: BubbleStyle {
				highlight: 0.35,
				shadow: 0.25,
				glyph_light: Color::rgb(255, 255, 255),
				glyph_dark: Color::rgb(22, 27, 34),
				glyph_font: "600 {size}px system-ui, -apple-system, sans-serif",
			},
			card: CardStyle {
				fill: Color::rgb(33, 39, 48),
				tint: 0.12,
				border_width: 2.0,
				corner_radius: 14.0,
				padding: 14.0,
				title_color: Color::rgb(240, 244, 248),
				text_color: Color::rgba(220, 226, 232, 0.9),
				muted_color: Color::rgba(160, 172, 186, 0.9),
				title_font: "600 16px system-ui, -apple-system, sans-serif",
				body_font: "13px system-ui, -apple-system, sans-serif",
				line_height: 18.0,
			},
			palette: vec![
				Color::rgb(94, 129, 172),
				Color::rgb(129, 161, 193),
				Color::rgb(136, 192, 208),
				Color::rgb(143, 188, 187),
				Color::rgb(163, 190, 140),
				Color::rgb(180, 142, 173),
			],
		}
	}

	/// Fill color for a node: its own color when it parses, else the palette.
	pub fn node_color(&self, index: usize, color: Option<&str>) -> Color {
		color.and_then(Color::parse).unwrap_or_else(|| {
			self.palette
				.get(index % self.palette.len().max(1))
				.copied()
				.unwrap_or(Color::rgb(128, 128, 128))
		})
	}

	/// Glyph font at `size` pixels.
	pub fn glyph_font(&self, size: f64) -> String {
		self.bubble.glyph_font.replace("{size}", &format!("{size:.0}"))
	}

	/// Glyph color with enough contrast against `fill`.
	pub fn glyph_color(&self, fill: Color) -> Color {
		if fill.luminance() > 0.6 {
			self.bubble.glyph_dark
		} else {
			self.bubble.glyph_light
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::slate()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_and_functional_notation() {
		assert_eq!(Color::parse("#3776AB"), Some(Color::rgb(0x37, 0x76, 0xab)));
		assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
		assert_eq!(Color::parse("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
		assert_eq!(Color::parse("rgba(1,2,3,0.5)"), Some(Color::rgba(1, 2, 3, 0.5)));
	}

	#[test]
	fn rejects_unknown_notation() {
		assert_eq!(Color::parse("tomato"), None);
		assert_eq!(Color::parse("#12345"), None);
		assert_eq!(Color::parse("#zzzzzz"), None);
		assert_eq!(Color::parse("rgb(1, 2)"), None);
	}

	#[test]
	fn node_color_falls_back_to_palette() {
		let theme = Theme::default();
		assert_eq!(theme.node_color(0, Some("#000000")), Color::rgb(0, 0, 0));
		assert_eq!(theme.node_color(1, None), theme.palette[1]);
		assert_eq!(theme.node_color(7, Some("nope")), theme.palette[1]);
	}

	#[test]
	fn glyph_contrast() {
		let theme = Theme::default();
		assert_eq!(theme.glyph_color(Color::parse("#F7DF1E").unwrap()), theme.bubble.glyph_dark);
		assert_eq!(theme.glyph_color(Color::parse("#00599C").unwrap()), theme.bubble.glyph_light);
		assert_eq!(theme.glyph_font(40.4), "600 40px system-ui, -apple-system, sans-serif");
	}

	#[test]
	fn shading_moves_toward_white_and_black() {
		let base = Color::rgba(100, 150, 200, 0.4);
		assert_eq!(base.lighten(1.0), Color::rgba(255, 255, 255, 0.4));
		assert_eq!(base.darken(1.0), Color::rgba(0, 0, 0, 0.4));
		assert_eq!(base.lighten(0.0), base);
		assert_eq!(base.darken(0.5), Color::rgba(50, 75, 100, 0.4));
		assert_eq!(base.lighten(2.0), base.lighten(1.0));
	}

	#[test]
	fn lerp_blends_channels_and_alpha() {
		let from = Color::rgba(0, 100, 200, 0.0);
		let to = Color::rgb(100, 200, 0);
		assert_eq!(from.lerp(to, 0.5), Color::rgba(50, 150, 100, 0.5));
		assert_eq!(from.lerp(to, 1.5), to);
		assert_eq!(from.lerp(to, -1.0), from);
	}

	#[test]
	fn to_css_switches_on_alpha() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgb(0, 0, 0).with_alpha(0.5).to_css(), "rgba(0, 0, 0, 0.5)");
	}
}
