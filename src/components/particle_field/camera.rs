//! Field orientation and perspective projection.
//!
//! The field spins slowly on its own and leans toward the pointer. Orientation
//! follows its target with exponential smoothing:
//! `value += (target - value) * (1 - e^(-speed * dt))`, which eases out
//! naturally and never snaps.

use glam::{Quat, Vec3};

use super::config::FieldConfig;

/// Screen-space result of projecting one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	pub x: f32,
	pub y: f32,
	/// Positive distance in front of the camera.
	pub depth: f32,
}

/// Orientation state plus viewport parameters.
#[derive(Clone, Debug)]
pub struct CameraRig {
	/// Idle spin accumulated independently of pointer input.
	pub base_rotation: f32,
	pub yaw: f32,
	pub pitch: f32,
	pointer: (f32, f32),
	width: f32,
	height: f32,
	distance: f32,
	focal: f32,
	near: f32,
}

impl CameraRig {
	pub fn new(width: f32, height: f32, config: &FieldConfig) -> Self {
		let mut rig = Self {
			base_rotation: 0.0,
			yaw: 0.0,
			pitch: 0.0,
			pointer: (0.0, 0.0),
			width: 1.0,
			height: 1.0,
			distance: config.camera_distance,
			focal: 1.0,
			near: config.near_plane,
		};
		rig.resize(width, height, config);
		rig
	}

	/// Latest pointer position, each axis clamped to `[-1, 1]`.
	pub fn set_pointer(&mut self, x: f32, y: f32) {
		let clamp = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
		self.pointer = (clamp(x), clamp(y));
	}

	pub fn pointer(&self) -> (f32, f32) {
		self.pointer
	}

	/// Update the projection for a new viewport. Degenerate sizes are ignored.
	pub fn resize(&mut self, width: f32, height: f32, config: &FieldConfig) {
		if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
			return;
		}
		self.width = width;
		self.height = height;
		let half_fov = config.fov_degrees.to_radians() * 0.5;
		self.focal = (height * 0.5) / half_fov.tan();
	}

	pub fn size(&self) -> (f32, f32) {
		(self.width, self.height)
	}

	/// Advance the idle spin and ease orientation toward the pointer target.
	pub fn tick(&mut self, dt: f32, config: &FieldConfig) {
		self.base_rotation += config.idle_spin * dt;
		let target_yaw = self.base_rotation + self.pointer.0 * config.pointer_yaw;
		let target_pitch = self.pointer.1 * config.pointer_pitch;
		let factor = 1.0 - (-config.rotation_smoothing * dt).exp();
		self.yaw += (target_yaw - self.yaw) * factor;
		self.pitch += (target_pitch - self.pitch) * factor;
	}

	pub fn rotation(&self) -> Quat {
		Quat::from_rotation_x(self.pitch) * Quat::from_rotation_y(self.yaw)
	}

	/// Project a world-space point with a precomputed rotation.
	/// Points behind the near plane return `None`.
	pub fn project(&self, rotation: Quat, world: Vec3) -> Option<Projected> {
		let view = rotation * world;
		let depth = self.distance - view.z;
		if depth < self.near {
			return None;
		}
		let scale = self.focal / depth;
		Some(Projected {
			x: self.width * 0.5 + view.x * scale,
			y: self.height * 0.5 - view.y * scale,
			depth,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn origin_projects_to_centre() {
		let config = FieldConfig::default();
		let rig = CameraRig::new(800.0, 600.0, &config);
		let p = rig.project(rig.rotation(), Vec3::ZERO).unwrap();
		assert_eq!((p.x, p.y), (400.0, 300.0));
		assert_eq!(p.depth, config.camera_distance);
	}

	#[test]
	fn points_behind_camera_are_culled() {
		let config = FieldConfig::default();
		let rig = CameraRig::new(800.0, 600.0, &config);
		assert!(rig.project(Quat::IDENTITY, Vec3::new(0.0, 0.0, 40.0)).is_none());
		let up = rig.project(Quat::IDENTITY, Vec3::new(0.0, 5.0, 0.0)).unwrap();
		assert!(up.y < 300.0);
	}

	#[test]
	fn idle_spin_advances_without_pointer() {
		let config = FieldConfig::default();
		let mut rig = CameraRig::new(800.0, 600.0, &config);
		for _ in 0..600 {
			rig.tick(1.0 / 60.0, &config);
		}
		assert!((rig.base_rotation - config.idle_spin * 10.0).abs() < 1e-3);
		assert!(rig.yaw > 0.0 && rig.yaw <= rig.base_rotation);
		assert_eq!(rig.pitch, 0.0);
	}

	#[test]
	fn orientation_approaches_pointer_without_overshoot() {
		let config = FieldConfig {
			idle_spin: 0.0,
			..FieldConfig::default()
		};
		let mut rig = CameraRig::new(800.0, 600.0, &config);
		rig.set_pointer(1.0, -1.0);
		let mut prev = rig.yaw;
		for _ in 0..300 {
			rig.tick(1.0 / 60.0, &config);
			assert!(rig.yaw >= prev && rig.yaw <= config.pointer_yaw);
			prev = rig.yaw;
		}
		assert!((rig.yaw - config.pointer_yaw).abs() < 1e-3);
		assert!((rig.pitch + config.pointer_pitch).abs() < 1e-3);
	}

	#[test]
	fn pointer_is_clamped() {
		let config = FieldConfig::default();
		let mut rig = CameraRig::new(800.0, 600.0, &config);
		rig.set_pointer(4.0, f32::NAN);
		assert_eq!(rig.pointer(), (1.0, 0.0));
	}

	#[test]
	fn resize_ignores_degenerate_sizes() {
		let config = FieldConfig::default();
		let mut rig = CameraRig::new(800.0, 600.0, &config);
		rig.resize(0.0, 600.0, &config);
		assert_eq!(rig.size(), (800.0, 600.0));
		rig.resize(1200.0, 400.0, &config);
		assert_eq!(rig.size(), (1200.0, 400.0));
	}
}
