//! Platform-independent owner of one running particle field.
//!
//! [`FieldEngine`] bundles the transition controller, camera rig and
//! framebuffer. It is created on mount and stopped on unmount; once stopped
//! every buffer is released and all inputs become silent no-ops, so callbacks
//! that fire late can never touch freed state.

use log::info;
use rand::rngs::SmallRng;

use super::buffers::IndexOrder;
use super::camera::CameraRig;
use super::config::FieldConfig;
use super::raster::Frame;
use super::render::render_field;
use super::shading::Uniforms;
use super::transition::TransitionController;

/// Everything that only exists while mounted.
struct Mounted {
	controller: TransitionController<SmallRng>,
	camera: CameraRig,
	frame: Frame,
	elapsed: f32,
}

/// A particle field bound to a viewport.
pub struct FieldEngine {
	config: FieldConfig,
	mounted: Option<Mounted>,
}

impl FieldEngine {
	pub fn new(config: &FieldConfig, width: f32, height: f32, rng: SmallRng) -> Self {
		Self::with_order(config, width, height, rng, IndexOrder::Shuffled)
	}

	/// Like [`FieldEngine::new`] with an explicit permutation policy.
	pub fn with_order(
		config: &FieldConfig,
		width: f32,
		height: f32,
		rng: SmallRng,
		order: IndexOrder,
	) -> Self {
		let config = config.sanitized();
		let controller = TransitionController::with_order(&config, rng, order);
		let camera = CameraRig::new(width, height, &config);
		let (w, h) = camera.size();
		info!(
			"particle-field: mounted {} particles at {}x{}",
			config.count, w, h
		);
		Self {
			mounted: Some(Mounted {
				controller,
				camera,
				frame: Frame::new(w as usize, h as usize),
				elapsed: 0.0,
			}),
			config,
		}
	}

	pub fn is_mounted(&self) -> bool {
		self.mounted.is_some()
	}

	/// Seconds of simulated time since mount.
	pub fn elapsed(&self) -> Option<f32> {
		self.mounted.as_ref().map(|m| m.elapsed)
	}

	pub fn controller(&self) -> Option<&TransitionController<SmallRng>> {
		self.mounted.as_ref().map(|m| &m.controller)
	}

	pub fn camera(&self) -> Option<&CameraRig> {
		self.mounted.as_ref().map(|m| &m.camera)
	}

	/// Framebuffer dimensions in pixels.
	pub fn frame_size(&self) -> Option<(usize, usize)> {
		self.mounted
			.as_ref()
			.map(|m| (m.frame.width(), m.frame.height()))
	}

	/// Advance simulation time by a frame delta, capped at `max_frame_delta`.
	pub fn advance(&mut self, dt: f32) {
		let max = self.config.max_frame_delta;
		let Some(m) = self.mounted.as_mut() else {
			return;
		};
		let dt = if dt.is_finite() { dt.clamp(0.0, max) } else { 0.0 };
		m.elapsed += dt;
		m.controller.tick(dt);
		m.camera.tick(dt, &self.config);
	}

	/// Draw the current state and return the resolved RGBA pixels.
	pub fn render(&mut self) -> Option<&[u8]> {
		let m = self.mounted.as_mut()?;
		let uniforms = Uniforms {
			time: m.elapsed,
			progress: m.controller.progress(),
		};
		render_field(
			&mut m.frame,
			m.controller.buffers(),
			uniforms,
			&m.camera,
			&self.config,
		);
		Some(m.frame.resolve())
	}

	/// One display refresh: advance, then render.
	pub fn frame(&mut self, dt: f32) -> Option<&[u8]> {
		self.advance(dt);
		self.render()
	}

	/// Normalised pointer position, `[-1, 1]` on each axis.
	pub fn on_pointer_move(&mut self, x: f32, y: f32) {
		if let Some(m) = self.mounted.as_mut() {
			m.camera.set_pointer(x, y);
		}
	}

	/// Viewport size changed. Particle state is untouched.
	pub fn on_viewport_resize(&mut self, width: f32, height: f32) {
		let Some(m) = self.mounted.as_mut() else {
			return;
		};
		m.camera.resize(width, height, &self.config);
		let (w, h) = m.camera.size();
		if (w as usize, h as usize) != (m.frame.width(), m.frame.height()) {
			m.frame.resize(w as usize, h as usize);
		}
	}

	/// A tagged page section became centred in the viewport.
	pub fn on_section_visible(&mut self, section: i32) -> bool {
		let Some(m) = self.mounted.as_mut() else {
			return false;
		};
		match usize::try_from(section) {
			Ok(index) => m.controller.request_direct(index),
			Err(_) => false,
		}
	}

	/// Step to the previous (`-1`) or next (`+1`) shape.
	pub fn request_cycle(&mut self, direction: i32) -> bool {
		match self.mounted.as_mut() {
			Some(m) => m.controller.request_cycle(direction),
			None => false,
		}
	}

	/// Release every buffer. Safe to call more than once.
	pub fn stop(&mut self) {
		if self.mounted.take().is_some() {
			info!("particle-field: stopped");
		}
	}
}
