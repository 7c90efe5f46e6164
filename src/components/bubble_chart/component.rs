//! Leptos component wrapping the bubble chart canvas.
//!
//! The component sizes a canvas to the viewport, feeds mouse and touch input
//! to [`BubbleChartState`], and runs a `requestAnimationFrame` loop that eases
//! the drawn nodes toward each settled layout. The loop idles once every node
//! is at rest and is re-armed by the next layout or resize. Unmounting detaches
//! the resize listener and cancels the pending frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

use super::config::ChartConfig;
use super::registry::NodeRegistry;
use super::render::{self, Scene};
use super::selection::{PointerEvent, Target};
use super::state::BubbleChartState;
use super::theme::Theme;
use super::transition::NodeTransitions;
use super::viewport::{ViewportSizer, WebWindow};

type Shared<T> = Rc<RefCell<Option<T>>>;

/// Handles the animation loop needs to stop itself.
struct FrameLoop {
	alive: Cell<bool>,
	handle: Cell<Option<i32>>,
	callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl FrameLoop {
	/// Request a frame unless one is already pending.
	fn schedule(&self) {
		if !self.alive.get() || self.handle.get().is_some() {
			return;
		}
		let callback = self.callback.borrow().as_ref().map(|cb| cb.as_ref().clone());
		let (Some(window), Some(callback)) = (web_sys::window(), callback) else {
			return;
		};
		let callback: &js_sys::Function = callback.unchecked_ref();
		self.handle.set(window.request_animation_frame(callback).ok());
	}

	fn stop(&self) {
		self.alive.set(false);
		if let (Some(window), Some(handle)) = (web_sys::window(), self.handle.take()) {
			let _ = window.cancel_animation_frame(handle);
		}
		self.callback.borrow_mut().take();
	}
}

/// Canvas-local coordinates of a client-space point.
fn local_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

/// Hit test against what is on screen, not the settled layout.
fn target_at(
	chart: &Shared<BubbleChartState>,
	transitions: &RefCell<NodeTransitions>,
	x: f64,
	y: f64,
) -> Target {
	let Some(index) = transitions.borrow().node_at(x, y) else {
		return Target::Background;
	};
	chart
		.borrow()
		.as_ref()
		.and_then(|state| state.registry().get(index))
		.map_or(Target::Background, |node| Target::Node(node.id().to_owned()))
}

fn dispatch(chart: &Shared<BubbleChartState>, event: PointerEvent) {
	if let Some(state) = chart.borrow_mut().as_mut() {
		state.handle_input(&event);
	}
}

/// Renders the interactive skill bubble chart on a canvas element.
///
/// With no props the built-in catalog and default configuration are used.
/// Hovering (desktop) or tapping a bubble expands it into a card; the other
/// bubbles re-settle around it.
#[component]
pub fn SkillBubbleChart(
	#[prop(optional)] registry: NodeRegistry,
	#[prop(optional)] config: ChartConfig,
	#[prop(optional)] theme: Option<Theme>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let chart: Shared<BubbleChartState> = Rc::new(RefCell::new(None));
	let sizer: Shared<ViewportSizer<WebWindow>> = Rc::new(RefCell::new(None));
	let transitions = Rc::new(RefCell::new(NodeTransitions::new()));
	let frames = Rc::new(FrameLoop {
		alive: Cell::new(true),
		handle: Cell::new(None),
		callback: RefCell::new(None),
	});
	let hovered: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
	let active_label = RwSignal::new(None::<String>);
	let theme = Rc::new(theme.unwrap_or_default());

	let (chart_init, sizer_init, transitions_init, frames_init) = (
		chart.clone(),
		sizer.clone(),
		transitions.clone(),
		frames.clone(),
	);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if chart_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into::<web_sys::CanvasRenderingContext2d>() {
				Ok(ctx) => ctx,
				Err(_) => {
					warn!("skill-bubbles: canvas context has an unexpected type");
					return;
				}
			},
			_ => {
				warn!("skill-bubbles: 2d canvas context unavailable");
				return;
			}
		};

		let mut viewport_sizer = ViewportSizer::new(WebWindow::new(), config.viewport.clone());
		let initial = viewport_sizer.current();
		canvas.set_width(initial.width as u32);
		canvas.set_height(initial.height as u32);

		let mut state = BubbleChartState::new(registry.clone(), initial, config.clone());
		transitions_init.borrow_mut().retarget(state.snapshot());

		let (transitions_sub, frames_sub) = (transitions_init.clone(), Rc::downgrade(&frames_init));
		state.subscribe_layout(move |layout| {
			transitions_sub.borrow_mut().retarget(layout);
			if let Some(frames) = frames_sub.upgrade() {
				frames.schedule();
			}
		});

		let labels = registry.clone();
		state.subscribe_selection(move |selection| {
			let label = selection
				.active()
				.and_then(|id| labels.index_of(id))
				.and_then(|index| labels.get(index))
				.map(|node| node.label().to_owned());
			active_label.set(label);
		});
		*chart_init.borrow_mut() = Some(state);

		let (chart_resize, canvas_resize, frames_resize) =
			(chart_init.clone(), canvas.clone(), Rc::downgrade(&frames_init));
		viewport_sizer.subscribe(move |viewport| {
			// Resizing the canvas clears it, so a redraw is needed even when
			// the layout is unchanged.
			canvas_resize.set_width(viewport.width as u32);
			canvas_resize.set_height(viewport.height as u32);
			if let Some(state) = chart_resize.borrow_mut().as_mut() {
				state.apply_viewport(*viewport);
			}
			if let Some(frames) = frames_resize.upgrade() {
				frames.schedule();
			}
		});
		viewport_sizer.mount();
		*sizer_init.borrow_mut() = Some(viewport_sizer);

		let (chart_anim, transitions_anim, frames_anim, theme_anim) = (
			chart_init.clone(),
			transitions_init.clone(),
			Rc::downgrade(&frames_init),
			theme.clone(),
		);
		let mut last_time: Option<f64> = None;
		*frames_init.callback.borrow_mut() = Some(Closure::new(move |now: f64| {
			let dt = last_time.map_or(0.0, |last| (now - last) / 1000.0);
			last_time = Some(now);

			let mut animating = false;
			if let Some(state) = chart_anim.borrow().as_ref() {
				transitions_anim.borrow_mut().tick(dt);
				let transitions = transitions_anim.borrow();
				animating = transitions.is_animating();
				let viewport = state.viewport();
				render::render(
					&ctx,
					&Scene {
						width: viewport.width,
						height: viewport.height,
						registry: state.registry(),
						sizing: state.sizing(),
						transitions: &transitions,
						theme: &theme_anim,
					},
				);
			}
			let Some(frames) = frames_anim.upgrade() else {
				return;
			};
			frames.handle.set(None);
			if animating {
				frames.schedule();
			} else {
				// Idle; the next frame starts a fresh clock.
				last_time = None;
			}
		}));
		frames_init.schedule();
		debug!("skill-bubbles: mounted");
	});

	let teardown = SendWrapper::new((sizer.clone(), frames.clone()));
	on_cleanup(move || {
		let (sizer, frames) = &*teardown;
		frames.stop();
		if let Some(mut sizer) = sizer.borrow_mut().take() {
			sizer.unmount();
		}
		debug!("skill-bubbles: unmounted");
	});

	let (chart_mm, transitions_mm, hovered_mm) = (chart.clone(), transitions.clone(), hovered.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		let next = match target_at(&chart_mm, &transitions_mm, x, y) {
			Target::Node(id) => Some(id),
			Target::Background => None,
		};
		let cursor = if next.is_some() { "pointer" } else { "default" };
		if let Err(err) = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor) {
			warn!("skill-bubbles: failed to set cursor: {err:?}");
		}

		let previous = hovered_mm.replace(next.clone());
		if previous == next {
			return;
		}
		if let Some(id) = previous {
			dispatch(&chart_mm, PointerEvent::HoverEnd(Target::Node(id)));
		}
		if let Some(id) = next {
			dispatch(&chart_mm, PointerEvent::HoverStart(Target::Node(id)));
		}
	};

	let (chart_ml, hovered_ml) = (chart.clone(), hovered.clone());
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(id) = hovered_ml.take() {
			dispatch(&chart_ml, PointerEvent::HoverEnd(Target::Node(id)));
		}
	};

	let (chart_click, transitions_click) = (chart.clone(), transitions.clone());
	let on_click = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, ev.client_x(), ev.client_y());
		let target = target_at(&chart_click, &transitions_click, x, y);
		dispatch(&chart_click, PointerEvent::Click(target));
	};

	let (chart_touch, transitions_touch) = (chart.clone(), transitions);
	let on_touchstart = move |ev: TouchEvent| {
		// Suppresses the synthetic click that would toggle the node back.
		ev.prevent_default();
		let (Some(canvas), Some(touch)) = (canvas_ref.get(), ev.touches().get(0)) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, touch.client_x(), touch.client_y());
		let target = target_at(&chart_touch, &transitions_touch, x, y);
		dispatch(&chart_touch, PointerEvent::TouchStart(target));
	};

	view! {
		<div class="skill-bubble-chart">
			<canvas
				node_ref=canvas_ref
				class="skill-bubble-canvas"
				role="img"
				aria-label="Skill usage bubble chart"
				on:mousemove=on_mousemove
				on:mouseleave=on_mouseleave
				on:click=on_click
				on:touchstart=on_touchstart
				style="display: block; margin: 0 auto; touch-action: manipulation;"
			/>
			<p class="sr-only" aria-live="polite">
				{move || active_label.get().map(|label| format!("{label} expanded")).unwrap_or_default()}
			</p>
		</div>
	}
}
