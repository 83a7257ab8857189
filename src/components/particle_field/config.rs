//! Tunable constants for the particle field.
//!
//! Every value here was tuned by eye. The defaults reproduce the festival site;
//! a page may override any subset through a JSON `<script id="particle-config">`
//! element (see [`crate::load_field_config`]).

use serde::Deserialize;

use super::theme::Theme;

/// Complete configuration for one particle field instance.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
	/// Number of particles. Fixed for the lifetime of the field.
	pub count: usize,
	/// Fraction of particles placed on the active shape's silhouette.
	/// The rest form the ambient background.
	pub shape_fraction: f32,
	/// Fraction of silhouette particles rendered as bright accents.
	pub accent_fraction: f32,
	/// Progress gained per second while transitioning (1 / duration).
	pub transition_rate: f32,
	/// Upper bound on a single frame delta, in seconds.
	pub max_frame_delta: f32,
	/// Idle spin around the vertical axis, radians per second.
	pub idle_spin: f32,
	/// Yaw offset per unit of normalised pointer x.
	pub pointer_yaw: f32,
	/// Pitch offset per unit of normalised pointer y.
	pub pointer_pitch: f32,
	/// Exponential smoothing speed for the camera orientation.
	pub rotation_smoothing: f32,
	/// Peak outward displacement during a morph.
	pub explosion_strength: f32,
	/// Amplitude of the always-on per-particle drift.
	pub noise_amplitude: f32,
	/// Size of the ambient scatter box (x, y, z).
	pub ambient_extent: [f32; 3],
	/// Depth offset of the ambient box centre.
	pub ambient_depth_offset: f32,
	/// Size of the initial random scatter cube.
	pub scatter_extent: f32,
	/// Distance from the camera to the field origin.
	pub camera_distance: f32,
	/// Vertical field of view in degrees.
	pub fov_degrees: f32,
	/// Particles closer than this to the camera are culled.
	pub near_plane: f32,
	/// Multiplier from shader point size to framebuffer pixels.
	pub point_scale: f32,
	/// Colour palette for silhouettes, background and clear colour.
	pub theme: Theme,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			count: 30_000,
			shape_fraction: 0.55,
			accent_fraction: 0.05,
			transition_rate: 0.6,
			max_frame_delta: 0.1,
			idle_spin: 0.05,
			pointer_yaw: 0.5,
			pointer_pitch: 0.3,
			rotation_smoothing: 2.5,
			explosion_strength: 12.0,
			noise_amplitude: 0.15,
			ambient_extent: [80.0, 80.0, 60.0],
			ambient_depth_offset: -15.0,
			scatter_extent: 100.0,
			camera_distance: 35.0,
			fov_degrees: 60.0,
			near_plane: 0.5,
			point_scale: 6.0,
			theme: Theme::default(),
		}
	}
}

impl FieldConfig {
	/// Return a copy with every value forced into its valid range.
	///
	/// Non-finite numbers fall back to the default for that field.
	pub fn sanitized(&self) -> Self {
		let defaults = Self::default();
		let finite_or = |v: f32, d: f32| if v.is_finite() { v } else { d };
		let positive_or = |v: f32, d: f32| if v.is_finite() && v > 0.0 { v } else { d };

		Self {
			count: self.count.max(1),
			shape_fraction: finite_or(self.shape_fraction, defaults.shape_fraction).clamp(0.0, 1.0),
			accent_fraction: finite_or(self.accent_fraction, defaults.accent_fraction)
				.clamp(0.0, 1.0),
			transition_rate: positive_or(self.transition_rate, defaults.transition_rate),
			max_frame_delta: positive_or(self.max_frame_delta, defaults.max_frame_delta),
			idle_spin: finite_or(self.idle_spin, defaults.idle_spin),
			pointer_yaw: finite_or(self.pointer_yaw, defaults.pointer_yaw),
			pointer_pitch: finite_or(self.pointer_pitch, defaults.pointer_pitch),
			rotation_smoothing: positive_or(self.rotation_smoothing, defaults.rotation_smoothing),
			explosion_strength: finite_or(self.explosion_strength, defaults.explosion_strength),
			noise_amplitude: finite_or(self.noise_amplitude, defaults.noise_amplitude),
			ambient_extent: [
				positive_or(self.ambient_extent[0], defaults.ambient_extent[0]),
				positive_or(self.ambient_extent[1], defaults.ambient_extent[1]),
				positive_or(self.ambient_extent[2], defaults.ambient_extent[2]),
			],
			ambient_depth_offset: finite_or(self.ambient_depth_offset, defaults.ambient_depth_offset),
			scatter_extent: positive_or(self.scatter_extent, defaults.scatter_extent),
			camera_distance: positive_or(self.camera_distance, defaults.camera_distance),
			fov_degrees: positive_or(self.fov_degrees, defaults.fov_degrees).min(170.0),
			near_plane: positive_or(self.near_plane, defaults.near_plane),
			point_scale: positive_or(self.point_scale, defaults.point_scale),
			theme: self.theme.clone(),
		}
	}

	/// Number of particles that receive silhouette placement.
	pub fn shape_limit(&self) -> usize {
		shape_limit(self.count, self.shape_fraction)
	}
}

/// `floor(count * fraction)`, never exceeding `count`.
pub fn shape_limit(count: usize, fraction: f32) -> usize {
	let limit = (count as f64 * f64::from(fraction.clamp(0.0, 1.0))).floor() as usize;
	limit.min(count)
}
