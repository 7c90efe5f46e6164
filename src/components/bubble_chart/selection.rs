//! Exclusive expand/collapse selection.
//!
//! Each node is either collapsed or active, and at most one node is active at
//! a time. [`Selection`] holds a single optional id, so activating one node
//! replaces the previous one in the same assignment.

use log::debug;

use super::observer::{Publisher, SubscriptionId};
use super::viewport::DeviceClass;

/// The single active node, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection(Option<String>);

impl Selection {
	/// Id of the active node.
	pub fn active(&self) -> Option<&str> {
		self.0.as_deref()
	}

	/// Whether `id` is the active node.
	pub fn is_active(&self, id: &str) -> bool {
		self.0.as_deref() == Some(id)
	}

	/// Make `id` the active node, collapsing whatever was active before.
	pub fn set(&mut self, id: impl Into<String>) {
		self.0 = Some(id.into());
	}

	/// Collapse the active node, if any.
	pub fn clear(&mut self) {
		self.0 = None;
	}
}

/// What a pointer or touch event landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
	/// A node, by id.
	Node(String),
	/// Empty space outside every node.
	Background,
}

/// Discrete input delivered to the [`SelectionController`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerEvent {
	/// Pointer entered a target.
	HoverStart(Target),
	/// Pointer left a target.
	HoverEnd(Target),
	/// Primary button click.
	Click(Target),
	/// First finger down on a target.
	TouchStart(Target),
}

/// Sole writer of the [`Selection`].
#[derive(Debug, Default)]
pub struct SelectionController {
	selection: Selection,
	publisher: Publisher<Selection>,
}

impl SelectionController {
	/// Controller with nothing active.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current selection.
	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	/// Subscribe to selection changes. Only changes are published.
	pub fn subscribe(&mut self, callback: impl FnMut(&Selection) + 'static) -> SubscriptionId {
		self.publisher.subscribe(callback)
	}

	/// Remove a subscription.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.publisher.unsubscribe(id)
	}

	/// Apply one input event. Returns `true` when the selection changed, which
	/// means collision radii changed and the layout must be re-settled.
	///
	/// - Hover (desktop only): entering a collapsed node activates it, leaving
	///   the active node collapses it.
	/// - Click or touch on a node toggles it.
	/// - Click or touch on the background collapses the active node, on mobile
	///   only.
	pub fn handle(&mut self, event: &PointerEvent, device: DeviceClass) -> bool {
		let mut next = self.selection.clone();

		match event {
			PointerEvent::HoverStart(Target::Node(id)) if !device.is_mobile() => {
				if !next.is_active(id) {
					next.set(id.as_str());
				}
			}
			PointerEvent::HoverEnd(Target::Node(id)) if !device.is_mobile() => {
				if next.is_active(id) {
					next.clear();
				}
			}
			PointerEvent::Click(Target::Node(id)) | PointerEvent::TouchStart(Target::Node(id)) => {
				if next.is_active(id) {
					next.clear();
				} else {
					next.set(id.as_str());
				}
			}
			PointerEvent::Click(Target::Background)
			| PointerEvent::TouchStart(Target::Background)
				if device.is_mobile() =>
			{
				next.clear();
			}
			_ => {}
		}

		if next == self.selection {
			return false;
		}

		debug!(
			"selection: {:?} -> {:?}",
			self.selection.active(),
			next.active()
		);
		self.selection = next;
		self.publisher.publish(&self.selection);
		true
	}
}
