//! Per-particle interpolation and shading.
//!
//! Pure functions of particle state plus two uniforms (elapsed time and
//! transition progress). The renderer runs them on the CPU for every particle
//! each frame; nothing here holds state.

use std::f32::consts::PI;

use glam::Vec3;

use super::buffers::ParticleView;
use super::config::FieldConfig;

/// Smooth S-curve on `[0, 1]`.
pub fn ease_in_out_cubic(x: f32) -> f32 {
	let x = x.clamp(0.0, 1.0);
	if x < 0.5 {
		4.0 * x * x * x
	} else {
		1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
	}
}

/// Values shared by every particle in a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Uniforms {
	/// Elapsed seconds since mount.
	pub time: f32,
	/// Linear transition progress in `[0, 1]`.
	pub progress: f32,
}

/// Output of the vertex stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedVertex {
	/// World-space position before the camera transform.
	pub position: Vec3,
	pub color: Vec3,
	/// Mean colour intensity, drives size and alpha.
	pub brightness: f32,
	pub alpha: f32,
	pub random: f32,
}

/// Interpolate one particle between its start and target state.
pub fn shade_vertex(particle: &ParticleView, uniforms: Uniforms, config: &FieldConfig) -> ShadedVertex {
	let t = ease_in_out_cubic(uniforms.progress);
	let random = particle.random;

	let start_color = Vec3::from_array(particle.start_color);
	let target_color = Vec3::from_array(particle.target_color);
	let color = start_color.lerp(target_color, t);

	let from = Vec3::from_array(particle.position);
	let to = Vec3::from_array(particle.target);
	let position = morph_position(from, to, random, t, config.explosion_strength)
		+ drift(random, uniforms.time, config.noise_amplitude);

	let brightness = ((color.x + color.y + color.z) / 3.0).clamp(0.0, 1.0);
	ShadedVertex {
		position,
		color,
		brightness,
		alpha: 0.35 + 0.65 * brightness,
		random,
	}
}

/// Interpolated position at eased parameter `t`, pushed outward by the
/// explosion term that peaks mid-morph. Drift is not included.
pub fn morph_position(from: Vec3, to: Vec3, random: f32, t: f32, strength: f32) -> Vec3 {
	let position = from.lerp(to, t);
	let explosion = (t * PI).sin();
	if explosion <= 0.0 {
		return position;
	}
	let skew = Vec3::new(random - 0.5, 0.5 - random, (random - 0.5) * 0.5) * 0.6;
	let direction = (to - from + skew).normalize_or_zero();
	position + direction * explosion * random * strength
}

/// Always-on sinusoidal jitter, phase-offset by the particle's random scalar.
pub fn drift(random: f32, time: f32, amplitude: f32) -> Vec3 {
	let phase = random * 10.0;
	Vec3::new(
		(time * 1.5 + phase).sin(),
		(time * 1.2 + phase).cos(),
		(time * 1.8 + phase).sin(),
	) * amplitude
}

/// Perspective point size in framebuffer pixels. `depth` is the positive
/// distance in front of the camera.
pub fn point_size(random: f32, brightness: f32, depth: f32, config: &FieldConfig) -> f32 {
	if depth <= 0.0 {
		return 0.0;
	}
	let base = 8.0 * random + 6.0 + brightness.max(0.0).powf(2.5) * 45.0;
	base / depth * config.point_scale
}

/// Fragment stage for a point sprite.
///
/// `distance` is measured from the sprite centre in sprite units (the sprite
/// spans `[-0.5, 0.5]`). Returns `None` outside the disc, otherwise the lit
/// colour and alpha.
pub fn fragment(distance: f32, color: Vec3, brightness: f32, alpha: f32) -> Option<(Vec3, f32)> {
	if !(0.0..=0.5).contains(&distance) {
		return None;
	}
	let falloff = (1.0 - distance * 2.0).powf(1.5);
	let core = (-distance * distance * 60.0).exp() * brightness;
	let lit = color + Vec3::splat(core * 0.8);
	Some((lit, falloff * alpha))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn particle(from: [f32; 3], to: [f32; 3], random: f32) -> ParticleView {
		ParticleView {
			position: from,
			target: to,
			start_color: [0.1, 0.1, 0.1],
			target_color: [0.9, 0.1, 0.1],
			random,
		}
	}

	#[test]
	fn ease_boundaries() {
		assert_eq!(ease_in_out_cubic(0.0), 0.0);
		assert_eq!(ease_in_out_cubic(1.0), 1.0);
		assert_eq!(ease_in_out_cubic(0.5), 0.5);
		assert_eq!(ease_in_out_cubic(-3.0), 0.0);
		assert_eq!(ease_in_out_cubic(7.0), 1.0);
	}

	#[test]
	fn ease_is_monotonic() {
		let mut prev = ease_in_out_cubic(0.0);
		for i in 1..=1000 {
			let value = ease_in_out_cubic(i as f32 / 1000.0);
			assert!(value >= prev, "ease decreased at step {}: {} < {}", i, value, prev);
			prev = value;
		}
	}

	#[test]
	fn ease_is_symmetric() {
		for i in 0..=10 {
			let x = i as f32 / 20.0;
			let sum = ease_in_out_cubic(0.5 - x) + ease_in_out_cubic(0.5 + x);
			assert!((sum - 1.0).abs() < 1e-5);
		}
	}

	#[test]
	fn endpoints_have_no_explosion() {
		let config = FieldConfig {
			noise_amplitude: 0.0,
			..FieldConfig::default()
		};
		let p = particle([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 0.9);

		let start = shade_vertex(&p, Uniforms { time: 0.0, progress: 0.0 }, &config);
		assert_eq!(start.position, Vec3::ZERO);
		assert_eq!(start.color, Vec3::splat(0.1));

		let end = shade_vertex(&p, Uniforms { time: 0.0, progress: 1.0 }, &config);
		assert!((end.position - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
		assert!((end.color - Vec3::new(0.9, 0.1, 0.1)).length() < 1e-6);
	}

	#[test]
	fn explosion_peaks_mid_transition() {
		let config = FieldConfig {
			noise_amplitude: 0.0,
			..FieldConfig::default()
		};
		let p = particle([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 0.5);
		let mid = shade_vertex(&p, Uniforms { time: 0.0, progress: 0.5 }, &config);
		// random 0.5 means zero skew: straight along travel, 5 + 0.5 * 12.
		assert!((mid.position - Vec3::new(11.0, 0.0, 0.0)).length() < 1e-4);
	}

	#[test]
	fn drift_is_bounded_and_alive() {
		let a = drift(0.3, 0.0, 0.15);
		let b = drift(0.3, 1.0, 0.15);
		assert!(a.abs().max_element() <= 0.15 + 1e-6);
		assert!(b.abs().max_element() <= 0.15 + 1e-6);
		assert_ne!(a, b);
	}

	#[test]
	fn brighter_and_closer_points_are_larger() {
		let config = FieldConfig::default();
		let dim = point_size(0.5, 0.1, 30.0, &config);
		let bright = point_size(0.5, 1.0, 30.0, &config);
		let near = point_size(0.5, 0.1, 10.0, &config);
		assert!(bright > dim);
		assert!(near > dim);
		assert_eq!(point_size(0.5, 1.0, 0.0, &config), 0.0);
		assert!(((8.0 * 0.5 + 6.0 + 45.0) / 30.0 * config.point_scale - bright).abs() < 1e-4);
	}

	#[test]
	fn fragment_discards_outside_disc() {
		assert!(fragment(0.51, Vec3::ONE, 1.0, 1.0).is_none());
		let (center, center_alpha) = fragment(0.0, Vec3::splat(0.2), 1.0, 1.0).unwrap();
		let (_, edge_alpha) = fragment(0.45, Vec3::splat(0.2), 1.0, 1.0).unwrap();
		assert_eq!(center_alpha, 1.0);
		assert!(edge_alpha < center_alpha);
		assert!(center.x > 0.2);
		let (edge, zero_alpha) = fragment(0.5, Vec3::splat(0.2), 0.0, 1.0).unwrap();
		assert_eq!(zero_alpha, 0.0);
		assert_eq!(edge, Vec3::splat(0.2));
	}
}
