//! Minimal single-threaded publish/subscribe.
//!
//! Each state owner (viewport sizer, selection controller, chart state) keeps a
//! [`Publisher`] for the slice it writes. Readers subscribe instead of polling,
//! which keeps one writer per slice without tying the core to a UI framework.

/// Handle returned by [`Publisher::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of callbacks notified on every published value.
///
/// Callbacks run synchronously in subscription order. A callback must not call
/// back into the object that owns this publisher.
pub struct Publisher<T> {
	next_id: u64,
	subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&T)>)>,
}

impl<T> Publisher<T> {
	/// Publisher with no subscribers.
	pub fn new() -> Self {
		Self {
			next_id: 0,
			subscribers: Vec::new(),
		}
	}

	/// Register `callback`; it receives every value published from now on.
	pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;
		self.subscribers.push((id, Box::new(callback)));
		id
	}

	/// Remove a subscription. Returns `false` if it was already gone.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.subscribers.len();
		self.subscribers.retain(|(sub, _)| *sub != id);
		self.subscribers.len() != before
	}

	/// Call every subscriber with `value`, in subscription order.
	pub fn publish(&mut self, value: &T) {
		for (_, callback) in &mut self.subscribers {
			callback(value);
		}
	}

	/// Number of live subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.subscribers.len()
	}
}

impl<T> Default for Publisher<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> std::fmt::Debug for Publisher<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Publisher")
			.field("subscribers", &self.subscribers.len())
			.finish()
	}
}
