//! Shape transition state machine.
//!
//! At most one morph runs at a time. Requests that arrive while a morph is in
//! flight are dropped silently. The one exception is the intro morph out of
//! the initial random scatter, which a request may retarget.

use log::debug;
use rand::Rng;

use super::buffers::{IndexOrder, ParticleBuffers};
use super::config::FieldConfig;
use super::shading::ease_in_out_cubic;
use super::shapes::{self, Shape};

/// Whether a morph is currently running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionState {
	Idle,
	Transitioning,
}

/// Owns the particle buffers and drives morphs between shapes.
pub struct TransitionController<R: Rng> {
	buffers: ParticleBuffers,
	rng: R,
	config: FieldConfig,
	order: IndexOrder,
	current: Shape,
	state: TransitionState,
	progress: f32,
	/// True while the intro morph from the random scatter is still running.
	intro: bool,
}

impl<R: Rng> TransitionController<R> {
	/// Allocate the field and immediately start morphing into the first shape.
	pub fn new(config: &FieldConfig, rng: R) -> Self {
		Self::with_order(config, rng, IndexOrder::Shuffled)
	}

	/// Like [`TransitionController::new`] with an explicit permutation policy.
	pub fn with_order(config: &FieldConfig, mut rng: R, order: IndexOrder) -> Self {
		let config = config.sanitized();
		let buffers = ParticleBuffers::new(config.count, &mut rng, &config);
		let mut controller = Self {
			buffers,
			rng,
			config,
			order,
			current: Shape::Processor,
			state: TransitionState::Transitioning,
			progress: 0.0,
			intro: true,
		};
		controller.fill_targets(Shape::Processor);
		controller
	}

	pub fn state(&self) -> TransitionState {
		self.state
	}

	pub fn is_transitioning(&self) -> bool {
		self.state == TransitionState::Transitioning
	}

	/// Linear progress of the current (or last) morph, in `[0, 1]`.
	pub fn progress(&self) -> f32 {
		self.progress
	}

	/// The shape being morphed into, or the resting shape when idle.
	pub fn current_shape(&self) -> Shape {
		self.current
	}

	pub fn current_index(&self) -> usize {
		self.current.index()
	}

	pub fn buffers(&self) -> &ParticleBuffers {
		&self.buffers
	}

	/// Step to the neighbouring shape. Only the sign of `direction` matters.
	pub fn request_cycle(&mut self, direction: i32) -> bool {
		let step = direction.signum();
		if step == 0 || !self.accepts_requests() {
			return false;
		}
		let count = Shape::COUNT as i32;
		let next = (self.current.index() as i32 + step + count).rem_euclid(count) as usize;
		match Shape::from_index(next) {
			Some(shape) => self.begin(shape),
			None => false,
		}
	}

	/// Jump straight to `index`. Repeating the current shape is a no-op.
	pub fn request_direct(&mut self, index: usize) -> bool {
		let Some(shape) = Shape::from_index(index) else {
			debug!("particle-field: ignoring unknown shape index {}", index);
			return false;
		};
		if shape == self.current || !self.accepts_requests() {
			return false;
		}
		self.begin(shape)
	}

	/// Advance progress by `dt` seconds. Returns `true` on the tick that
	/// completes the morph.
	pub fn tick(&mut self, dt: f32) -> bool {
		if self.state != TransitionState::Transitioning {
			return false;
		}
		let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
		self.progress = (self.progress + dt * self.config.transition_rate).clamp(0.0, 1.0);
		if self.progress < 1.0 {
			return false;
		}
		self.state = TransitionState::Idle;
		self.intro = false;
		debug!("particle-field: settled on {}", self.current.name());
		true
	}

	fn accepts_requests(&self) -> bool {
		self.state == TransitionState::Idle || self.intro
	}

	fn begin(&mut self, shape: Shape) -> bool {
		let retarget = self.intro && self.state == TransitionState::Transitioning;
		self.intro = false;
		if retarget {
			let t = ease_in_out_cubic(self.progress);
			self.buffers.settle_at(t, self.config.explosion_strength);
		} else {
			self.buffers.promote_targets();
		}
		debug!(
			"particle-field: morphing {} -> {}",
			self.current.name(),
			shape.name()
		);
		self.current = shape;
		self.fill_targets(shape);
		self.progress = 0.0;
		self.state = TransitionState::Transitioning;
		true
	}

	fn fill_targets(&mut self, shape: Shape) {
		self.buffers.reorder(&mut self.rng, self.order);
		let (positions, colors, order) = self.buffers.targets_mut();
		let placement = shapes::generate(shape, positions, colors, order, &mut self.rng, &self.config);
		debug!(
			"particle-field: {} placed {} on silhouette, {} ambient",
			shape.name(),
			placement.shaped,
			placement.ambient
		);
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use glam::Vec3;
	use rand::rngs::SmallRng;

	use super::super::shading::{Uniforms, shade_vertex};
	use super::*;

	fn small(count: usize) -> TransitionController<SmallRng> {
		let config = FieldConfig {
			count,
			..FieldConfig::default()
		};
		TransitionController::with_order(&config, SmallRng::seed_from_u64(42), IndexOrder::Identity)
	}

	fn settle(controller: &mut TransitionController<SmallRng>) {
		while controller.is_transitioning() {
			controller.tick(0.25);
		}
	}

	#[test]
	fn starts_morphing_into_first_shape() {
		let controller = small(100);
		assert_eq!(controller.state(), TransitionState::Transitioning);
		assert_eq!(controller.progress(), 0.0);
		assert_eq!(controller.current_shape(), Shape::Processor);
		assert!(controller.buffers().target_position.iter().all(|v| v.is_finite()));
	}

	#[test]
	fn direct_request_from_initial_state_reaches_atom() {
		let mut controller = small(6);
		assert!(controller.request_direct(1));

		let mut completions = 0;
		for dt in [0.5, 0.5, 0.5, 0.5] {
			if controller.tick(dt) {
				completions += 1;
			}
		}
		assert_eq!(completions, 1);
		assert_eq!(controller.state(), TransitionState::Idle);
		assert_eq!(controller.progress(), 1.0);
		assert_eq!(controller.current_index(), 1);
	}

	#[test]
	fn progress_is_monotonic_and_completes_once() {
		let mut controller = small(50);
		let deltas = [0.1, 0.3, 0.05, 0.4, 0.2, 0.6, 0.1, 0.3, 0.2];
		let mut prev = controller.progress();
		let mut completions = 0;
		for dt in deltas {
			if controller.tick(dt) {
				completions += 1;
			}
			assert!(controller.progress() >= prev);
			assert!(controller.progress() <= 1.0);
			prev = controller.progress();
		}
		assert_eq!(completions, 1);
		assert_eq!(controller.progress(), 1.0);
		assert_eq!(controller.state(), TransitionState::Idle);
	}

	#[test]
	fn requests_during_a_morph_are_dropped() {
		let mut controller = small(40);
		settle(&mut controller);
		assert!(controller.request_cycle(1));
		controller.tick(0.5);

		let index = controller.current_index();
		let targets = controller.buffers().target_position.clone();
		let progress = controller.progress();

		assert!(!controller.request_cycle(1));
		assert!(!controller.request_cycle(-1));
		assert!(!controller.request_direct(4));

		assert_eq!(controller.current_index(), index);
		assert_eq!(controller.buffers().target_position, targets);
		assert_eq!(controller.progress(), progress);
	}

	#[test]
	fn cycling_wraps_in_both_directions() {
		let mut controller = small(20);
		settle(&mut controller);
		assert!(controller.request_cycle(-1));
		assert_eq!(controller.current_shape(), Shape::InfiniteLoop);
		settle(&mut controller);
		assert!(controller.request_cycle(1));
		assert_eq!(controller.current_shape(), Shape::Processor);
		settle(&mut controller);
		assert!(!controller.request_cycle(0));
		assert!(controller.request_cycle(7));
		assert_eq!(controller.current_shape(), Shape::Atom);
	}

	#[test]
	fn repeated_direct_request_is_a_no_op() {
		let mut controller = small(20);
		settle(&mut controller);
		let targets = controller.buffers().target_position.clone();
		assert!(!controller.request_direct(0));
		assert_eq!(controller.state(), TransitionState::Idle);
		assert_eq!(controller.buffers().target_position, targets);
		assert!(!controller.request_direct(Shape::COUNT));
	}

	#[test]
	fn new_morph_starts_from_previous_target() {
		let mut controller = small(30);
		settle(&mut controller);
		let settled = controller.buffers().target_position.clone();
		let settled_colors = controller.buffers().target_color.clone();
		assert!(controller.request_direct(3));
		assert_eq!(controller.buffers().position, settled);
		assert_eq!(controller.buffers().start_color, settled_colors);
		assert_eq!(controller.progress(), 0.0);
	}

	fn on_screen(controller: &TransitionController<SmallRng>) -> Vec<Vec3> {
		let uniforms = Uniforms {
			time: 0.0,
			progress: controller.progress(),
		};
		let buffers = controller.buffers();
		(0..buffers.count())
			.filter_map(|i| buffers.particle(i))
			.map(|p| shade_vertex(&p, uniforms, &controller.config).position)
			.collect()
	}

	#[test]
	fn retargeting_the_intro_does_not_jump() {
		let config = FieldConfig {
			count: 200,
			noise_amplitude: 0.0,
			..FieldConfig::default()
		};
		let mut controller =
			TransitionController::with_order(&config, SmallRng::seed_from_u64(7), IndexOrder::Identity);
		controller.tick(0.8);
		let before = on_screen(&controller);
		assert!(controller.request_direct(2));
		let after = on_screen(&controller);

		let jump = before
			.iter()
			.zip(&after)
			.map(|(a, b)| a.distance(*b))
			.fold(0.0f32, f32::max);
		assert!(jump < 1e-3, "particles jumped {} units", jump);
	}

	#[test]
	fn morph_that_interrupted_the_intro_is_exclusive() {
		let mut controller = small(20);
		controller.tick(0.2);
		assert!(controller.request_direct(1));
		controller.tick(0.5);

		let index = controller.current_index();
		let targets = controller.buffers().target_position.clone();
		let progress = controller.progress();

		assert!(!controller.request_cycle(1));
		assert!(!controller.request_direct(4));

		assert_eq!(controller.current_index(), index);
		assert_eq!(controller.buffers().target_position, targets);
		assert_eq!(controller.progress(), progress);
	}

	#[test]
	fn bad_deltas_do_not_move_progress() {
		let mut controller = small(10);
		controller.tick(f32::NAN);
		controller.tick(-5.0);
		assert_eq!(controller.progress(), 0.0);
		assert!(controller.is_transitioning());
	}

	#[test]
	fn idle_tick_is_inert() {
		let mut controller = small(10);
		settle(&mut controller);
		assert!(!controller.tick(1.0));
		assert_eq!(controller.progress(), 1.0);
	}
}
