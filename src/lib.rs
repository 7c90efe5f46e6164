//! skill-bubbles: Interactive skill bubble chart.
//!
//! This crate provides a WASM-based canvas component that lays out a catalog of
//! skills as non-overlapping bubbles sized by usage, and expands one bubble at
//! a time into a detail card.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::bubble_chart::{
	BubbleChartState, ChartConfig, NodeLayout, NodeRegistry, NodeSpec, PointerEvent,
	RegistryError, SkillBubbleChart, Target, ViewportState,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("skill-bubbles: logging initialized");
}

/// Page-embedded chart data. Both keys are optional; each is decoded on its
/// own so a failure names the part that was wrong.
#[derive(Debug, Default, Deserialize)]
struct RawChartData {
	#[serde(default)]
	nodes: Option<serde_json::Value>,
	#[serde(default)]
	config: Option<serde_json::Value>,
}

/// Errors raised while reading page-embedded chart data.
#[derive(Debug, thiserror::Error)]
pub enum ChartDataError {
	/// The document is not a JSON object of the expected shape.
	#[error("malformed chart data: {0}")]
	Malformed(serde_json::Error),

	/// The `nodes` list failed to parse or validate.
	#[error(transparent)]
	Nodes(#[from] RegistryError),

	/// The `config` object failed to parse.
	#[error("invalid chart config: {0}")]
	Config(serde_json::Error),
}

/// Parse `{ "nodes": [...], "config": {...} }`. A missing node list means the
/// built-in catalog; a missing or partial config is filled from defaults.
pub fn parse_chart_data(json: &str) -> Result<(NodeRegistry, ChartConfig), ChartDataError> {
	let raw: RawChartData = serde_json::from_str(json).map_err(ChartDataError::Malformed)?;
	let registry = match raw.nodes {
		Some(nodes) => {
			let specs: Vec<NodeSpec> = serde_json::from_value(nodes).map_err(RegistryError::from)?;
			NodeRegistry::new(specs)?
		}
		None => NodeRegistry::builtin(),
	};
	let config = match raw.config {
		Some(config) => serde_json::from_value(config).map_err(ChartDataError::Config)?,
		None => ChartConfig::default(),
	};
	Ok((registry, config))
}

/// Load chart data from a script element with id="skill-data".
fn load_chart_data() -> Option<(NodeRegistry, ChartConfig)> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("skill-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match parse_chart_data(&json_text) {
		Ok((registry, config)) => {
			info!("skill-bubbles: loaded {} nodes", registry.len());
			Some((registry, config))
		}
		Err(e) => {
			warn!("skill-bubbles: failed to load chart data: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads chart data from the DOM, falling back to the built-in catalog.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let (registry, config) = load_chart_data().unwrap_or_default();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Skills" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<section class="skills">
			<h1>"Skills"</h1>
			<p class="subtitle">"Hover or tap a bubble for details."</p>
			<SkillBubbleChart registry=registry config=config />
		</section>
	}
}
