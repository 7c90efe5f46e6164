//! Immutable catalog of chart nodes.
//!
//! The registry is the simulation's input set: an ordered list of validated
//! nodes built once at mount. Node order is significant, since the engine
//! addresses bodies by registry index.

use std::collections::HashSet;

use super::types::{Glyph, Node, NodeSpec};

/// Inclusive bounds for [`Node::weight`].
pub const WEIGHT_RANGE: (f64, f64) = (0.0, 100.0);

/// Errors raised while building a [`NodeRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
	/// A node was declared with an empty id.
	#[error("node at position {index} has an empty id")]
	EmptyId {
		/// Position of the offending node in the input list.
		index: usize,
	},

	/// Two nodes share the same id.
	#[error("duplicate node id {id:?}")]
	DuplicateId {
		/// The repeated id.
		id: String,
	},

	/// A weight fell outside `[0, 100]` or was not a finite number.
	#[error("node {id:?} has weight {weight}, expected a value in [0, 100]")]
	WeightOutOfRange {
		/// Id of the offending node.
		id: String,
		/// The rejected weight.
		weight: f64,
	},

	/// The JSON node list could not be parsed.
	#[error("invalid node list: {0}")]
	Json(#[from] serde_json::Error),
}

/// Ordered, immutable set of nodes with unique ids.
#[derive(Clone, Debug)]
pub struct NodeRegistry {
	nodes: Vec<Node>,
}

impl NodeRegistry {
	/// Validate and freeze a node list.
	pub fn new(specs: Vec<NodeSpec>) -> Result<Self, RegistryError> {
		let mut seen = HashSet::with_capacity(specs.len());
		let mut nodes = Vec::with_capacity(specs.len());

		for (index, spec) in specs.into_iter().enumerate() {
			if spec.id.is_empty() {
				return Err(RegistryError::EmptyId { index });
			}
			let (min, max) = WEIGHT_RANGE;
			if !spec.weight.is_finite() || spec.weight < min || spec.weight > max {
				return Err(RegistryError::WeightOutOfRange {
					id: spec.id,
					weight: spec.weight,
				});
			}
			if !seen.insert(spec.id.clone()) {
				return Err(RegistryError::DuplicateId { id: spec.id });
			}
			nodes.push(Node::from_spec(spec));
		}

		Ok(Self { nodes })
	}

	/// Parse a JSON array of node specs and validate it.
	pub fn from_json(json: &str) -> Result<Self, RegistryError> {
		let specs: Vec<NodeSpec> = serde_json::from_str(json)?;
		Self::new(specs)
	}

	/// The built-in skills catalog.
	pub fn builtin() -> Self {
		Self {
			nodes: builtin_specs().into_iter().map(Node::from_spec).collect(),
		}
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the registry has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Node at registry `index`.
	pub fn get(&self, index: usize) -> Option<&Node> {
		self.nodes.get(index)
	}

	/// Registry index of the node with `id`.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|node| node.id() == id)
	}

	/// Nodes in registry order.
	pub fn iter(&self) -> impl ExactSizeIterator<Item = &Node> {
		self.nodes.iter()
	}
}

impl Default for NodeRegistry {
	fn default() -> Self {
		Self::builtin()
	}
}

fn spec(
	id: &str,
	label: &str,
	glyph: &str,
	color: &str,
	weight: f64,
	description: &str,
) -> NodeSpec {
	NodeSpec {
		id: id.into(),
		label: label.into(),
		weight,
		description: description.into(),
		glyph: Glyph::new(glyph),
		color: Some(color.into()),
	}
}

#[rustfmt::skip]
fn builtin_specs() -> Vec<NodeSpec> {
	vec![
		spec("python", "Python", "Py", "#3776AB", 90.0,
			"I use Python for scripting, automation, and solving algorithmic problems."),
		spec("typescript", "TypeScript", "TS", "#3178C6", 80.0,
			"I use TypeScript daily to build scalable, type-safe frontends at work."),
		spec("react", "React", "⚛", "#61DAFB", 85.0,
			"My go-to library for building interactive, production-grade UIs."),
		spec("javascript", "JavaScript", "JS", "#F7DF1E", 95.0,
			"The foundation of everything I build on the web, used daily."),
		spec("swift", "Swift", "Sw", "#FA7343", 60.0,
			"I've used Swift for developing native iOS and macOS apps."),
		spec("cpp", "C++", "C++", "#00599C", 65.0,
			"I use C++ for DSA practice, performance-focused code, and learning HFT concepts."),
		spec("html", "HTML5", "H5", "#E34F26", 75.0,
			"I use HTML to craft accessible and semantic web layouts."),
		spec("css", "CSS3", "C3", "#1572B6", 72.0,
			"I design responsive layouts and micro-interactions using modern CSS."),
		spec("swiftui", "SwiftUI", "SUI", "#FF7736", 55.0,
			"I've built multiple personal iOS and macOS apps using SwiftUI."),
		spec("vscode", "VSCode", "VS", "#007ACC", 98.0,
			"My primary editor for development and custom extension building."),
		spec("xcode", "Xcode", "Xc", "#1575F9", 62.0,
			"I use Xcode to build and debug Swift-based iOS and macOS projects."),
		spec("go", "Go", "Go", "#00ADD8", 50.0,
			"I used Go for backend and WebSocket development in my Sudoku app."),
		spec("shell", "Shell/Bash", "$_", "#4EAA25", 70.0,
			"I use Shell scripts for automation and developer tooling tasks."),
		spec("tailwind", "Tailwind", "Tw", "#3B82F6", 70.0,
			"I style modern, responsive UIs quickly with Tailwind CSS."),
		spec("webgl", "WebGL", "GL", "#990000", 70.0,
			"I use WebGL for interactive visuals like the cursor animation on this site."),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, weight: f64) -> NodeSpec {
		NodeSpec {
			id: id.into(),
			label: id.to_uppercase(),
			weight,
			description: String::new(),
			glyph: Glyph::new("?"),
			color: None,
		}
	}

	#[test]
	fn builtin_catalog_passes_validation() {
		let specs = builtin_specs();
		let count = specs.len();
		let registry = NodeRegistry::new(specs).expect("builtin catalog is valid");
		assert_eq!(registry.len(), count);
		assert_eq!(NodeRegistry::builtin().len(), count);
	}

	#[test]
	fn preserves_declaration_order() {
		let registry = NodeRegistry::new(vec![node("b", 10.0), node("a", 20.0)]).unwrap();
		let ids: Vec<_> = registry.iter().map(Node::id).collect();
		assert_eq!(ids, ["b", "a"]);
		assert_eq!(registry.index_of("a"), Some(1));
		assert_eq!(registry.index_of("missing"), None);
	}

	#[test]
	fn rejects_duplicate_ids() {
		let err = NodeRegistry::new(vec![node("tailwind", 70.0), node("tailwind", 70.0)])
			.unwrap_err();
		assert!(matches!(err, RegistryError::DuplicateId { ref id } if id == "tailwind"));
	}

	#[test]
	fn rejects_weights_outside_range() {
		for weight in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
			let err = NodeRegistry::new(vec![node("x", weight)]).unwrap_err();
			assert!(matches!(err, RegistryError::WeightOutOfRange { .. }));
		}
		assert!(NodeRegistry::new(vec![node("lo", 0.0), node("hi", 100.0)]).is_ok());
	}

	#[test]
	fn rejects_empty_id() {
		let err = NodeRegistry::new(vec![node("ok", 1.0), node("", 1.0)]).unwrap_err();
		assert!(matches!(err, RegistryError::EmptyId { index: 1 }));
	}

	#[test]
	fn parses_json_node_list() {
		let json = r##"[
			{"id": "rust", "label": "Rust", "weight": 88, "glyph": "Rs", "color": "#dea584"},
			{"id": "zig", "label": "Zig", "weight": 40, "description": "Tinkering.", "glyph": "Zg"}
		]"##;
		let registry = NodeRegistry::from_json(json).unwrap();
		let zig = registry.get(1).unwrap();
		assert_eq!(zig.label(), "Zig");
		assert_eq!(zig.description(), "Tinkering.");
		assert_eq!(zig.color(), None);
		assert_eq!(registry.get(0).unwrap().glyph().as_str(), "Rs");
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(matches!(
			NodeRegistry::from_json("{\"id\": 1}"),
			Err(RegistryError::Json(_))
		));
	}
}
