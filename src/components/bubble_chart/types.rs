//! Node data structures for input to the bubble chart component.

use std::fmt;

use serde::Deserialize;

/// Opaque handle to a node's icon or image.
///
/// The layout core stores and forwards glyphs but never inspects them; only the
/// renderer resolves a glyph into something drawable.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Glyph(String);

impl Glyph {
	/// Wrap a renderer-specific glyph reference.
	pub fn new(reference: impl Into<String>) -> Self {
		Self(reference.into())
	}

	/// The raw reference, for the renderer.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for Glyph {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Glyph(..)")
	}
}

/// A node as described by configuration, before validation.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeSpec {
	/// Unique identifier for this node.
	pub id: String,
	/// Display label shown on the expanded card.
	pub label: String,
	/// Importance in `[0, 100]`; drives the collapsed bubble size.
	pub weight: f64,
	/// Detail text shown only while the node is active.
	#[serde(default)]
	pub description: String,
	/// Renderer-specific icon reference.
	pub glyph: Glyph,
	/// Optional CSS fill color (e.g., "#3776AB").
	#[serde(default)]
	pub color: Option<String>,
}

/// A validated, immutable node owned by a [`NodeRegistry`](super::NodeRegistry).
#[derive(Clone, Debug)]
pub struct Node {
	id: String,
	label: String,
	weight: f64,
	description: String,
	glyph: Glyph,
	color: Option<String>,
}

impl Node {
	pub(super) fn from_spec(spec: NodeSpec) -> Self {
		Self {
			id: spec.id,
			label: spec.label,
			weight: spec.weight,
			description: spec.description,
			glyph: spec.glyph,
			color: spec.color,
		}
	}

	/// Unique identifier.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Display label.
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Importance in `[0, 100]`.
	pub fn weight(&self) -> f64 {
		self.weight
	}

	/// Detail text for the expanded card.
	pub fn description(&self) -> &str {
		&self.description
	}

	/// Opaque icon handle.
	pub fn glyph(&self) -> &Glyph {
		&self.glyph
	}

	/// Optional CSS fill color override.
	pub fn color(&self) -> Option<&str> {
		self.color.as_deref()
	}
}
