//! Browser bindings for a [`FieldEngine`].
//!
//! [`FieldHandle::start`] appends a full-viewport canvas to a container and
//! wires the animation loop, window listeners and the section observer.
//! [`FieldHandle::stop`] (also run on drop) unwinds all of it synchronously:
//! the pending frame is cancelled and every listener detached before the
//! engine releases its buffers.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, ImageData, IntersectionObserver,
	IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, MouseEvent, Window,
};

use super::config::FieldConfig;
use super::engine::FieldEngine;

/// Attribute naming the shape a page section maps to.
pub const SECTION_ATTRIBUTE: &str = "data-particle-shape";

/// A section counts as visible while it crosses the middle tenth of the viewport.
const CENTRE_BAND: &str = "-45% 0px -45% 0px";

/// Reasons the field could not be mounted. Never surfaced to the page.
#[derive(Debug, Error)]
pub enum MountError {
	#[error("no container element to mount into")]
	MissingContainer,
	#[error("browser window is unavailable")]
	NoWindow,
	#[error("document is unavailable")]
	NoDocument,
	#[error("2d canvas context is unavailable")]
	NoContext,
	#[error("DOM call failed: {0}")]
	Dom(String),
}

impl From<JsValue> for MountError {
	fn from(value: JsValue) -> Self {
		MountError::Dom(format!("{:?}", value))
	}
}

type Shared<T> = Rc<RefCell<T>>;

/// Live field attached to the DOM. Dropping it tears everything down.
pub struct FieldHandle {
	engine: Shared<FieldEngine>,
	window: Window,
	canvas: HtmlCanvasElement,
	frame_id: Shared<Option<i32>>,
	animate: Shared<Option<Closure<dyn FnMut(f64)>>>,
	on_resize: Closure<dyn FnMut()>,
	on_pointer: Closure<dyn FnMut(MouseEvent)>,
	on_key: Closure<dyn FnMut(KeyboardEvent)>,
	observer: Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)>,
	stopped: bool,
}

impl FieldHandle {
	/// Mount into `container`. Any failure is logged and yields `None`; the page
	/// keeps working without the visualization.
	pub fn start(container: Option<Element>, config: &FieldConfig) -> Option<Self> {
		match Self::try_start(container, config) {
			Ok(handle) => Some(handle),
			Err(e) => {
				warn!("particle-field: not started: {}", e);
				None
			}
		}
	}

	fn try_start(container: Option<Element>, config: &FieldConfig) -> Result<Self, MountError> {
		let container = container.ok_or(MountError::MissingContainer)?;
		let window = web_sys::window().ok_or(MountError::NoWindow)?;
		let document = window.document().ok_or(MountError::NoDocument)?;

		let canvas: HtmlCanvasElement = document
			.create_element("canvas")?
			.dyn_into()
			.map_err(|_| MountError::Dom("created element is not a canvas".into()))?;
		let style = canvas.style();
		for (name, value) in [
			("position", "fixed"),
			("inset", "0"),
			("z-index", "-1"),
			("pointer-events", "none"),
			("display", "block"),
		] {
			style.set_property(name, value)?;
		}

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or(MountError::NoContext)?
			.dyn_into()
			.map_err(|_| MountError::NoContext)?;

		let (w, h) = viewport_size(&window);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		container.append_child(&canvas)?;

		let engine = Rc::new(RefCell::new(FieldEngine::new(
			config,
			w as f32,
			h as f32,
			SmallRng::seed_from_u64(browser_seed()),
		)));

		let (engine_resize, canvas_resize) = (engine.clone(), canvas.clone());
		let on_resize = Closure::<dyn FnMut()>::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = viewport_size(&win);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Ok(mut engine) = engine_resize.try_borrow_mut() {
				engine.on_viewport_resize(nw as f32, nh as f32);
			}
		});
		let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());

		let engine_pointer = engine.clone();
		let on_pointer = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (vw, vh) = viewport_size(&win);
			let x = ev.client_x() as f64 / vw * 2.0 - 1.0;
			let y = -(ev.client_y() as f64 / vh * 2.0 - 1.0);
			if let Ok(mut engine) = engine_pointer.try_borrow_mut() {
				engine.on_pointer_move(x as f32, y as f32);
			}
		});
		let _ =
			window.add_event_listener_with_callback("mousemove", on_pointer.as_ref().unchecked_ref());

		let engine_key = engine.clone();
		let on_key = Closure::<dyn FnMut(KeyboardEvent)>::new(move |ev: KeyboardEvent| {
			let direction = match ev.key().as_str() {
				"ArrowLeft" => -1,
				"ArrowRight" => 1,
				_ => return,
			};
			if let Ok(mut engine) = engine_key.try_borrow_mut() {
				engine.request_cycle(direction);
			}
		});
		let _ = window.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());

		let observer = match observe_sections(&document, engine.clone()) {
			Ok(observer) => Some(observer),
			Err(e) => {
				warn!("particle-field: section observer unavailable: {}", e);
				None
			}
		};

		let frame_id: Shared<Option<i32>> = Rc::new(RefCell::new(None));
		let animate: Shared<Option<Closure<dyn FnMut(f64)>>> = Rc::new(RefCell::new(None));
		let (engine_anim, animate_inner, frame_id_anim) =
			(engine.clone(), animate.clone(), frame_id.clone());
		let mut last: Option<f64> = None;
		*animate.borrow_mut() = Some(Closure::new(move |now: f64| {
			let dt = last.map(|prev| ((now - prev) / 1000.0) as f32).unwrap_or(0.0);
			last = Some(now);

			if let Ok(mut engine) = engine_anim.try_borrow_mut() {
				if !engine.is_mounted() {
					return;
				}
				if let Some((fw, fh)) = engine.frame_size() {
					if let Some(pixels) = engine.frame(dt) {
						if let Err(e) = present(&ctx, pixels, fw, fh) {
							warn!("particle-field: present failed: {:?}", e);
						}
					}
				}
			}

			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
						*frame_id_anim.borrow_mut() = Some(id);
					}
				}
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				Ok(id) => *frame_id.borrow_mut() = Some(id),
				Err(e) => warn!("particle-field: animation frame refused: {:?}", e),
			}
		}

		info!("particle-field: started at {}x{}", w, h);
		Ok(Self {
			engine,
			window,
			canvas,
			frame_id,
			animate,
			on_resize,
			on_pointer,
			on_key,
			observer,
			stopped: false,
		})
	}

	/// Cancel the loop, detach every listener and observer, then release the
	/// engine. Idempotent.
	pub fn stop(&mut self) {
		if self.stopped {
			return;
		}
		self.stopped = true;

		if let Some(id) = self.frame_id.borrow_mut().take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		// Dropping the frame closure also breaks its self-reference.
		self.animate.borrow_mut().take();

		let window = &self.window;
		let _ = window
			.remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref());
		let _ = window.remove_event_listener_with_callback(
			"mousemove",
			self.on_pointer.as_ref().unchecked_ref(),
		);
		let _ =
			window.remove_event_listener_with_callback("keydown", self.on_key.as_ref().unchecked_ref());
		if let Some((ref observer, _)) = self.observer {
			observer.disconnect();
		}

		if let Ok(mut engine) = self.engine.try_borrow_mut() {
			engine.stop();
		}
		self.canvas.remove();
	}
}

impl Drop for FieldHandle {
	fn drop(&mut self) {
		self.stop();
	}
}

/// Watch every `[data-particle-shape]` element and forward the one that
/// enters the centre band.
fn observe_sections(
	document: &web_sys::Document,
	engine: Shared<FieldEngine>,
) -> Result<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>), MountError> {
	let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
		for entry in entries.iter() {
			let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
				continue;
			};
			if !entry.is_intersecting() {
				continue;
			}
			let Some(section) = parse_section(entry.target().get_attribute(SECTION_ATTRIBUTE)) else {
				continue;
			};
			if let Ok(mut engine) = engine.try_borrow_mut() {
				engine.on_section_visible(section);
			}
		}
	});

	let options = IntersectionObserverInit::new();
	options.set_root_margin(CENTRE_BAND);
	let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;

	let nodes = document.query_selector_all(&format!("[{}]", SECTION_ATTRIBUTE))?;
	let mut observed = 0;
	for i in 0..nodes.length() {
		if let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
			observer.observe(&element);
			observed += 1;
		}
	}
	info!("particle-field: observing {} sections", observed);
	Ok((observer, callback))
}

/// Section attribute value to shape index.
pub fn parse_section(value: Option<String>) -> Option<i32> {
	value?.trim().parse().ok()
}

fn present(
	ctx: &CanvasRenderingContext2d,
	pixels: &[u8],
	width: usize,
	height: usize,
) -> Result<(), JsValue> {
	let image =
		ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels), width as u32, height as u32)?;
	ctx.put_image_data(&image, 0.0, 0.0)
}

fn viewport_size(window: &Window) -> (f64, f64) {
	let read = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok()
			.and_then(|v| v.as_f64())
			.filter(|v| *v >= 1.0)
			.unwrap_or(fallback)
	};
	(
		read(window.inner_width(), 800.0),
		read(window.inner_height(), 600.0),
	)
}

fn browser_seed() -> u64 {
	let noise = (js_sys::Math::random() * u32::MAX as f64) as u64;
	(noise << 32) ^ js_sys::Date::now() as u64
}
