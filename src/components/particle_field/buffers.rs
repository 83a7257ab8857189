//! Structure-of-arrays particle storage.
//!
//! Five parallel per-particle arrays plus the disposable index permutation that
//! decides which particles carry the silhouette for the next transition.

use glam::Vec3;
use rand::Rng;
use rand::seq::SliceRandom;

use super::config::FieldConfig;
use super::shading::morph_position;

/// How the index permutation is recomputed before a transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexOrder {
	/// Fresh uniform Fisher-Yates permutation every transition.
	#[default]
	Shuffled,
	/// Always `0..count`; keeps tests and fallback paths deterministic.
	Identity,
}

/// Owns every per-particle buffer for one field.
///
/// `random` is assigned once in [`ParticleBuffers::new`] and never rewritten,
/// so a particle's noise phase, size and brightness variance survive every
/// shape change.
pub struct ParticleBuffers {
	count: usize,
	pub position: Vec<f32>,
	pub target_position: Vec<f32>,
	pub start_color: Vec<f32>,
	pub target_color: Vec<f32>,
	random: Vec<f32>,
	order: Vec<usize>,
}

impl ParticleBuffers {
	/// Allocate `count` particles as a random scatter in the configured cube,
	/// tinted with the scatter grey.
	pub fn new<R: Rng>(count: usize, rng: &mut R, config: &FieldConfig) -> Self {
		let count = count.max(1);
		let extent = config.scatter_extent;
		let position = (0..count * 3)
			.map(|_| (rng.r#gen::<f32>() - 0.5) * extent)
			.collect();
		let scatter = config.theme.scatter;
		let start_color = (0..count)
			.flat_map(|_| [scatter.r, scatter.g, scatter.b])
			.collect();
		let random = (0..count).map(|_| rng.r#gen::<f32>()).collect();

		Self {
			count,
			position,
			target_position: vec![0.0; count * 3],
			start_color,
			target_color: vec![0.0; count * 3],
			random,
			order: (0..count).collect(),
		}
	}

	pub fn count(&self) -> usize {
		self.count
	}

	/// Per-particle scalar in `[0, 1)`.
	pub fn random(&self) -> &[f32] {
		&self.random
	}

	/// Permutation used by the most recent generator call.
	pub fn order(&self) -> &[usize] {
		&self.order
	}

	/// Recompute the index permutation.
	pub fn reorder<R: Rng>(&mut self, rng: &mut R, mode: IndexOrder) {
		match mode {
			IndexOrder::Shuffled => shuffle(&mut self.order, rng),
			IndexOrder::Identity => {
				for (i, slot) in self.order.iter_mut().enumerate() {
					*slot = i;
				}
			}
		}
	}

	/// Make the last target the new starting point.
	pub fn promote_targets(&mut self) {
		self.position.copy_from_slice(&self.target_position);
		self.start_color.copy_from_slice(&self.target_color);
	}

	/// Bake an in-flight morph at eased parameter `t` into the start buffers,
	/// explosion offset included, so a retargeted morph starting at progress
	/// zero continues from what is on screen.
	pub fn settle_at(&mut self, t: f32, explosion_strength: f32) {
		let t = t.clamp(0.0, 1.0);
		for ((from, to), &random) in self
			.position
			.chunks_exact_mut(3)
			.zip(self.target_position.chunks_exact(3))
			.zip(&self.random)
		{
			let settled = morph_position(
				Vec3::from_slice(from),
				Vec3::from_slice(to),
				random,
				t,
				explosion_strength,
			);
			settled.write_to_slice(from);
		}
		for (from, to) in self.start_color.iter_mut().zip(&self.target_color) {
			*from += (to - *from) * t;
		}
	}

	/// Target buffers and permutation, borrowed together for a generator call.
	pub fn targets_mut(&mut self) -> (&mut [f32], &mut [f32], &[usize]) {
		(&mut self.target_position, &mut self.target_color, &self.order)
	}

	/// Position, target, start colour, target colour and random scalar of one particle.
	pub fn particle(&self, i: usize) -> Option<ParticleView> {
		if i >= self.count {
			return None;
		}
		let at = |buf: &[f32]| [buf[i * 3], buf[i * 3 + 1], buf[i * 3 + 2]];
		Some(ParticleView {
			position: at(&self.position),
			target: at(&self.target_position),
			start_color: at(&self.start_color),
			target_color: at(&self.target_color),
			random: self.random[i],
		})
	}
}

/// Read-only copy of one particle's attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleView {
	pub position: [f32; 3],
	pub target: [f32; 3],
	pub start_color: [f32; 3],
	pub target_color: [f32; 3],
	pub random: f32,
}

/// Uniform in-place permutation (Fisher-Yates).
pub fn shuffle<R: Rng>(indices: &mut [usize], rng: &mut R) {
	indices.shuffle(rng);
}
