//! Viewport sizing and device classification.
//!
//! [`ViewportSizer`] owns the current [`ViewportState`]. It recomputes the state
//! wholesale on mount and on every resize signal from its [`HostWindow`], with
//! no debouncing: rapid resizes each produce a full update.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::Window;

use super::config::ViewportConfig;
use super::observer::{Publisher, SubscriptionId};

/// Coarse device classification driving footprint scale and force strengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
	/// Below the breakpoint.
	Mobile,
	/// At or above the breakpoint.
	Desktop,
}

impl DeviceClass {
	/// Classify a window width; widths strictly below `breakpoint` are mobile.
	pub fn from_window_width(width: f64, breakpoint: f64) -> Self {
		if width < breakpoint {
			DeviceClass::Mobile
		} else {
			DeviceClass::Desktop
		}
	}

	/// Whether this is [`DeviceClass::Mobile`].
	pub fn is_mobile(self) -> bool {
		self == DeviceClass::Mobile
	}
}

/// Simulation bounds in device pixels plus the device class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
	/// Simulation width in pixels.
	pub width: f64,
	/// Simulation height in pixels.
	pub height: f64,
	/// Window was narrower than the mobile breakpoint.
	pub is_mobile: bool,
}

impl ViewportState {
	/// Derive bounds from the host window's inner size, or the fallback bounds
	/// when there is no window.
	pub fn from_window(window: Option<(f64, f64)>, config: &ViewportConfig) -> Self {
		let Some((window_width, window_height)) = window else {
			return Self {
				width: config.fallback_width,
				height: config.fallback_height,
				is_mobile: false,
			};
		};

		let is_mobile = DeviceClass::from_window_width(window_width, config.mobile_breakpoint)
			.is_mobile();
		let height_fraction = if is_mobile {
			config.mobile_height_fraction
		} else {
			config.desktop_height_fraction
		};

		Self {
			width: window_width * config.width_fraction,
			height: window_height * height_fraction,
			is_mobile,
		}
	}

	/// Device class the bounds were computed for.
	pub fn device_class(&self) -> DeviceClass {
		if self.is_mobile {
			DeviceClass::Mobile
		} else {
			DeviceClass::Desktop
		}
	}

	/// Centre point the forces pull toward.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

/// Source of window size and resize notifications.
pub trait HostWindow {
	/// Token keeping a registered listener alive until it is removed.
	type Listener;

	/// Current inner size, or `None` when no window exists.
	fn inner_size(&self) -> Option<(f64, f64)>;

	/// Attach `callback` to the resize event.
	fn add_resize_listener(&self, callback: Box<dyn FnMut()>) -> Option<Self::Listener>;

	/// Detach a listener previously returned by
	/// [`add_resize_listener`](Self::add_resize_listener).
	fn remove_resize_listener(&self, listener: Self::Listener);
}

struct SizerShared {
	config: ViewportConfig,
	current: ViewportState,
	publisher: Publisher<ViewportState>,
}

impl SizerShared {
	fn refresh(&mut self, window: Option<(f64, f64)>) -> ViewportState {
		let state = ViewportState::from_window(window, &self.config);
		debug!(
			"viewport: {:.0}x{:.0} ({})",
			state.width,
			state.height,
			if state.is_mobile { "mobile" } else { "desktop" }
		);
		self.current = state;
		self.publisher.publish(&state);
		state
	}
}

/// Owns the [`ViewportState`] and the resize listener that keeps it current.
///
/// Dropping the sizer detaches the listener.
pub struct ViewportSizer<H: HostWindow> {
	host: Rc<H>,
	shared: Rc<RefCell<SizerShared>>,
	listener: Option<H::Listener>,
}

impl<H: HostWindow + 'static> ViewportSizer<H> {
	/// Create an unmounted sizer. The initial state is computed but not
	/// published until [`mount`](Self::mount).
	pub fn new(host: H, config: ViewportConfig) -> Self {
		let current = ViewportState::from_window(host.inner_size(), &config);
		Self {
			host: Rc::new(host),
			shared: Rc::new(RefCell::new(SizerShared {
				config,
				current,
				publisher: Publisher::new(),
			})),
			listener: None,
		}
	}

	/// Most recently computed state.
	pub fn current(&self) -> ViewportState {
		self.shared.borrow().current
	}

	/// Subscribe to every recomputed state. Callbacks must not call back into
	/// this sizer.
	pub fn subscribe(&self, callback: impl FnMut(&ViewportState) + 'static) -> SubscriptionId {
		self.shared.borrow_mut().publisher.subscribe(callback)
	}

	/// Remove a subscription.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.shared.borrow_mut().publisher.unsubscribe(id)
	}

	/// Compute and publish the initial state, then start listening for resizes.
	/// Mounting twice keeps a single listener.
	pub fn mount(&mut self) -> ViewportState {
		let state = self.refresh();
		if self.listener.is_none() {
			let host = Rc::downgrade(&self.host);
			let shared = Rc::downgrade(&self.shared);
			self.listener = self
				.host
				.add_resize_listener(Box::new(move || on_resize(&host, &shared)));
		}
		state
	}

	/// Process one resize signal immediately.
	pub fn refresh(&self) -> ViewportState {
		let window = self.host.inner_size();
		self.shared.borrow_mut().refresh(window)
	}

	/// Whether a resize listener is attached.
	pub fn is_mounted(&self) -> bool {
		self.listener.is_some()
	}

	/// Detach the resize listener. Safe to call more than once.
	pub fn unmount(&mut self) {
		if let Some(listener) = self.listener.take() {
			self.host.remove_resize_listener(listener);
			debug!("viewport: resize listener detached");
		}
	}
}

impl<H: HostWindow> Drop for ViewportSizer<H> {
	fn drop(&mut self) {
		if let Some(listener) = self.listener.take() {
			self.host.remove_resize_listener(listener);
		}
	}
}

fn on_resize<H: HostWindow>(host: &Weak<H>, shared: &Weak<RefCell<SizerShared>>) {
	let (Some(host), Some(shared)) = (host.upgrade(), shared.upgrade()) else {
		return;
	};
	let window = host.inner_size();
	shared.borrow_mut().refresh(window);
}

/// The browser window as a [`HostWindow`].
///
/// Holds `None` outside a browsing context, in which case the sizer falls back
/// to its default bounds and never registers a listener.
pub struct WebWindow {
	window: Option<Window>,
}

impl WebWindow {
	/// Wrap the current browser window.
	pub fn new() -> Self {
		Self {
			window: web_sys::window(),
		}
	}
}

impl Default for WebWindow {
	fn default() -> Self {
		Self::new()
	}
}

impl HostWindow for WebWindow {
	type Listener = Closure<dyn FnMut()>;

	fn inner_size(&self) -> Option<(f64, f64)> {
		let window = self.window.as_ref()?;
		let width = window.inner_width().ok()?.as_f64()?;
		let height = window.inner_height().ok()?.as_f64()?;
		Some((width, height))
	}

	fn add_resize_listener(&self, callback: Box<dyn FnMut()>) -> Option<Self::Listener> {
		let window = self.window.as_ref()?;
		let closure = Closure::wrap(callback);
		window
			.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
			.ok()?;
		Some(closure)
	}

	fn remove_resize_listener(&self, listener: Self::Listener) {
		if let Some(window) = self.window.as_ref() {
			let _ = window
				.remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref());
		}
	}
}
