//! Chart state: registry, viewport, selection and the live simulation.
//!
//! [`BubbleChartState`] is what the component holds between events. It never
//! animates: each viewport or selection change re-settles the engine once and
//! publishes a fresh [`NodeLayout`] snapshot for the renderer to ease toward.

use log::{debug, info};

use super::config::ChartConfig;
use super::observer::{Publisher, SubscriptionId};
use super::registry::NodeRegistry;
use super::selection::{PointerEvent, Selection, SelectionController};
use super::simulation::ForceSimulationEngine;
use super::sizing::SizeResolver;
use super::viewport::ViewportState;

/// Settled placement and footprint of one node, as handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeLayout {
	/// Node id.
	pub id: String,
	/// Registry index.
	pub index: usize,
	/// Centre of the footprint.
	pub x: f64,
	/// Centre of the footprint.
	pub y: f64,
	/// Drawn width.
	pub visual_width: f64,
	/// Drawn height.
	pub visual_height: f64,
	/// Collapsed radius.
	pub base_radius: f64,
	/// Radius the collision force keeps clear.
	pub collision_radius: f64,
	/// Drawn as a card.
	pub is_active: bool,
}

impl NodeLayout {
	/// Whether `(x, y)` falls inside this node's footprint.
	pub fn contains(&self, x: f64, y: f64) -> bool {
		let (dx, dy) = (x - self.x, y - self.y);
		if self.is_active {
			dx.abs() <= self.visual_width / 2.0 && dy.abs() <= self.visual_height / 2.0
		} else {
			let radius = self.visual_width / 2.0;
			dx * dx + dy * dy <= radius * radius
		}
	}
}

/// Owns the current simulation and the state slices that drive it.
pub struct BubbleChartState {
	registry: NodeRegistry,
	viewport: ViewportState,
	selection: SelectionController,
	sizing: SizeResolver,
	config: ChartConfig,
	engine: ForceSimulationEngine,
	layout: Vec<NodeLayout>,
	layout_publisher: Publisher<Vec<NodeLayout>>,
	settle_count: usize,
}

impl BubbleChartState {
	/// Build the engine and run the first settle with nothing active.
	pub fn new(registry: NodeRegistry, viewport: ViewportState, config: ChartConfig) -> Self {
		let engine =
			ForceSimulationEngine::new(registry.len(), viewport, config.simulation.clone());
		info!(
			"bubble chart: {} nodes in {:.0}x{:.0}",
			registry.len(),
			viewport.width,
			viewport.height
		);
		let mut state = Self {
			sizing: SizeResolver::new(config.sizing.clone()),
			registry,
			viewport,
			selection: SelectionController::new(),
			config,
			engine,
			layout: Vec::new(),
			layout_publisher: Publisher::new(),
			settle_count: 0,
		};
		state.resettle();
		state
	}

	/// Catalog being laid out.
	pub fn registry(&self) -> &NodeRegistry {
		&self.registry
	}

	/// Current bounds.
	pub fn viewport(&self) -> &ViewportState {
		&self.viewport
	}

	/// Current selection.
	pub fn selection(&self) -> &Selection {
		self.selection.selection()
	}

	/// Footprint resolver for the current config.
	pub fn sizing(&self) -> &SizeResolver {
		&self.sizing
	}

	/// Underlying simulation, mostly for inspection.
	pub fn engine(&self) -> &ForceSimulationEngine {
		&self.engine
	}

	/// Number of completed settles since construction.
	pub fn settle_count(&self) -> usize {
		self.settle_count
	}

	/// Latest published snapshot, in registry order.
	pub fn snapshot(&self) -> &[NodeLayout] {
		&self.layout
	}

	/// Subscribe to every new snapshot. Callbacks must not call back into this
	/// state.
	pub fn subscribe_layout(
		&mut self,
		callback: impl FnMut(&Vec<NodeLayout>) + 'static,
	) -> SubscriptionId {
		self.layout_publisher.subscribe(callback)
	}

	/// Remove a layout subscription.
	pub fn unsubscribe_layout(&mut self, id: SubscriptionId) -> bool {
		self.layout_publisher.unsubscribe(id)
	}

	/// Subscribe to selection changes.
	pub fn subscribe_selection(
		&mut self,
		callback: impl FnMut(&Selection) + 'static,
	) -> SubscriptionId {
		self.selection.subscribe(callback)
	}

	/// Adopt new bounds. The engine is rebuilt from scratch, discarding all
	/// positions, only when width, height or device class actually changed.
	/// Returns whether a rebuild happened.
	pub fn apply_viewport(&mut self, viewport: ViewportState) -> bool {
		if viewport == self.viewport {
			return false;
		}
		debug!(
			"bubble chart: rebuilding simulation for {:.0}x{:.0}",
			viewport.width, viewport.height
		);
		self.viewport = viewport;
		self.engine = ForceSimulationEngine::new(
			self.registry.len(),
			viewport,
			self.config.simulation.clone(),
		);
		self.resettle();
		true
	}

	/// Route an input event to the selection controller and re-settle if the
	/// active node changed.
	pub fn handle_input(&mut self, event: &PointerEvent) -> bool {
		let changed = self
			.selection
			.handle(event, self.viewport.device_class());
		if changed {
			self.resettle();
		}
		changed
	}

	/// Topmost node under `(x, y)`. The active card is drawn last, so it wins.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<&NodeLayout> {
		self.layout
			.iter()
			.find(|layout| layout.is_active && layout.contains(x, y))
			.or_else(|| self.layout.iter().rev().find(|layout| layout.contains(x, y)))
	}

	fn resettle(&mut self) {
		let registry = &self.registry;
		let sizing = &self.sizing;
		let viewport = &self.viewport;
		let selection = self.selection.selection();

		self.engine.settle(|index| {
			registry.get(index).map_or(0.0, |node| {
				sizing.collision_radius(node, selection.is_active(node.id()), viewport)
			})
		});
		self.settle_count += 1;

		self.layout = registry
			.iter()
			.enumerate()
			.zip(self.engine.positions())
			.map(|((index, node), (x, y))| {
				let is_active = selection.is_active(node.id());
				let footprint = sizing.resolve(node, is_active, viewport);
				NodeLayout {
					id: node.id().to_owned(),
					index,
					x,
					y,
					visual_width: footprint.visual_width,
					visual_height: footprint.visual_height,
					base_radius: footprint.base_radius,
					collision_radius: footprint.collision_radius,
					is_active,
				}
			})
			.collect();
		self.layout_publisher.publish(&self.layout);
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::components::bubble_chart::selection::Target;

	const DESKTOP: ViewportState = ViewportState {
		width: 900.0,
		height: 640.0,
		is_mobile: false,
	};
	const MOBILE: ViewportState = ViewportState {
		width: 450.0,
		height: 560.0,
		is_mobile: true,
	};

	fn chart(viewport: ViewportState) -> BubbleChartState {
		BubbleChartState::new(NodeRegistry::builtin(), viewport, ChartConfig::default())
	}

	fn click(id: &str) -> PointerEvent {
		PointerEvent::Click(Target::Node(id.into()))
	}

	#[test]
	fn initial_snapshot_is_settled_and_collapsed() {
		let state = chart(DESKTOP);
		assert_eq!(state.settle_count(), 1);
		assert_eq!(state.snapshot().len(), state.registry().len());
		assert!(state.snapshot().iter().all(|n| !n.is_active));
		assert!(state.snapshot().iter().all(|n| n.visual_width == n.visual_height));
	}

	#[test]
	fn click_expands_one_card_and_resettles() {
		let mut state = chart(DESKTOP);
		assert!(state.handle_input(&click("python")));
		assert_eq!(state.settle_count(), 2);

		let active: Vec<_> = state.snapshot().iter().filter(|n| n.is_active).collect();
		assert_eq!(active.len(), 1);
		assert_eq!(active[0].id, "python");
		assert_eq!((active[0].visual_width, active[0].visual_height), (220.0, 150.0));

		assert!(state.handle_input(&click("go")));
		let active: Vec<_> = state.snapshot().iter().filter(|n| n.is_active).map(|n| n.id.as_str()).collect();
		assert_eq!(active, ["go"]);
	}

	#[test]
	fn no_op_input_does_not_resettle() {
		let mut state = chart(DESKTOP);
		assert!(!state.handle_input(&PointerEvent::Click(Target::Background)));
		assert!(!state.handle_input(&PointerEvent::HoverEnd(Target::Node("go".into()))));
		assert_eq!(state.settle_count(), 1);
	}

	#[test]
	fn viewport_change_rebuilds_only_when_bounds_differ() {
		let mut state = chart(DESKTOP);
		assert!(!state.apply_viewport(DESKTOP));
		assert_eq!(state.settle_count(), 1);

		assert!(state.apply_viewport(MOBILE));
		assert_eq!(state.settle_count(), 2);
		assert_eq!(state.engine().viewport(), &MOBILE);
		let js = &state.snapshot()[state.registry().index_of("javascript").unwrap()];
		assert!((js.base_radius - 47.5).abs() < 1e-9);
	}

	#[test]
	fn selection_survives_viewport_rebuild() {
		let mut state = chart(DESKTOP);
		state.handle_input(&click("react"));
		state.apply_viewport(MOBILE);
		let react = &state.snapshot()[state.registry().index_of("react").unwrap()];
		assert!(react.is_active);
		assert_eq!((react.visual_width, react.visual_height), (260.0, 180.0));
	}

	#[test]
	fn snapshot_respects_collision_radii() {
		let mut state = chart(DESKTOP);
		state.handle_input(&click("vscode"));
		let layout = state.snapshot();
		for (i, a) in layout.iter().enumerate() {
			for b in &layout[i + 1..] {
				let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
				let min = a.collision_radius + b.collision_radius;
				assert!(distance >= min * 0.97, "{} / {}: {distance} < {min}", a.id, b.id);
			}
		}
	}

	#[test]
	fn hit_testing_prefers_active_card() {
		let mut state = chart(DESKTOP);
		let target = state.snapshot()[0].clone();
		let hit = state.node_at_position(target.x, target.y).map(|n| n.id.clone());
		assert_eq!(hit.as_deref(), Some(target.id.as_str()));
		assert!(state.node_at_position(-10_000.0, -10_000.0).is_none());

		state.handle_input(&click("cpp"));
		let card = state
			.snapshot()
			.iter()
			.find(|n| n.is_active)
			.cloned()
			.unwrap();
		let corner = (card.x + card.visual_width / 2.0 - 1.0, card.y + card.visual_height / 2.0 - 1.0);
		assert_eq!(
			state.node_at_position(corner.0, corner.1).map(|n| n.id.as_str()),
			Some("cpp")
		);
	}

	#[test]
	fn layout_subscribers_see_every_settle() {
		let mut state = chart(DESKTOP);
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = seen.clone();
		state.subscribe_layout(move |layout: &Vec<NodeLayout>| {
			sink.borrow_mut()
				.push(layout.iter().filter(|n| n.is_active).count())
		});

		state.handle_input(&click("go"));
		state.handle_input(&click("go"));
		state.apply_viewport(MOBILE);

		assert_eq!(*seen.borrow(), [1, 0, 0]);
	}
}
