//! Skill bubble chart.
//!
//! Renders a fixed catalog of skills as bubbles sized by usage weight, laid out
//! by a small force simulation so they never overlap:
//! - Bubbles repel each other, drift toward the centre, and collide on a
//!   radius slightly larger than what is drawn
//! - Hovering (desktop) or tapping a bubble expands it into a card with its
//!   description; at most one card is open at a time
//! - Every expand, collapse or resize re-settles the layout in 150 ticks and
//!   the canvas eases toward the result
//!
//! # Example
//!
//! ```ignore
//! use skill_bubbles::{ChartConfig, NodeRegistry, SkillBubbleChart};
//!
//! let registry = NodeRegistry::from_json(r#"[
//!     { "id": "rust", "label": "Rust", "weight": 80, "glyph": "Rs" }
//! ]"#)?;
//!
//! view! { <SkillBubbleChart registry=registry config=ChartConfig::default() /> }
//! ```

mod component;
pub mod config;
pub mod observer;
pub mod registry;
mod render;
pub mod selection;
pub mod simulation;
pub mod sizing;
pub mod state;
pub mod theme;
mod transition;
pub mod types;
pub mod viewport;

pub use component::SkillBubbleChart;
pub use config::ChartConfig;
pub use registry::{NodeRegistry, RegistryError};
pub use selection::{PointerEvent, Selection, SelectionController, Target};
pub use simulation::ForceSimulationEngine;
pub use sizing::{Footprint, SizeResolver};
pub use state::{BubbleChartState, NodeLayout};
pub use theme::Theme;
pub use types::{Glyph, Node, NodeSpec};
pub use viewport::{DeviceClass, HostWindow, ViewportSizer, ViewportState, WebWindow};
