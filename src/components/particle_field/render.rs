//! Draws the whole field into a [`Frame`].
//!
//! One pass over every particle: vertex shading, camera projection, point-size
//! attenuation, then sprite rasterization. Particles behind the near plane are
//! skipped.

use super::buffers::ParticleBuffers;
use super::camera::CameraRig;
use super::config::FieldConfig;
use super::raster::Frame;
use super::shading::{Uniforms, point_size, shade_vertex};

/// Renders all particles and returns how many reached the framebuffer.
pub fn render_field(
	frame: &mut Frame,
	buffers: &ParticleBuffers,
	uniforms: Uniforms,
	camera: &CameraRig,
	config: &FieldConfig,
) -> usize {
	frame.clear(config.theme.background);

	let rotation = camera.rotation();
	let mut drawn = 0;
	for i in 0..buffers.count() {
		let Some(particle) = buffers.particle(i) else {
			continue;
		};
		let vertex = shade_vertex(&particle, uniforms, config);
		let Some(projected) = camera.project(rotation, vertex.position) else {
			continue;
		};
		let size = point_size(vertex.random, vertex.brightness, projected.depth, config);
		frame.splat(
			projected.x,
			projected.y,
			size,
			vertex.color,
			vertex.brightness,
			vertex.alpha,
		);
		drawn += 1;
	}
	drawn
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;

	#[test]
	fn renders_visible_particles() {
		let config = FieldConfig {
			count: 200,
			..FieldConfig::default()
		};
		let mut rng = SmallRng::seed_from_u64(6);
		let mut buffers = ParticleBuffers::new(config.count, &mut rng, &config);
		buffers.target_position.fill(0.0);
		buffers.target_color.fill(0.8);

		let camera = CameraRig::new(64.0, 48.0, &config);
		let mut frame = Frame::new(64, 48);
		let drawn = render_field(
			&mut frame,
			&buffers,
			Uniforms { time: 0.0, progress: 1.0 },
			&camera,
			&config,
		);
		assert_eq!(drawn, 200);
		// Everything converged on the origin, which projects to the centre.
		let centre = frame.sample(32, 24).unwrap();
		assert!(centre.x > config.theme.background.r);
	}

	#[test]
	fn culls_particles_behind_the_camera() {
		let config = FieldConfig {
			count: 10,
			noise_amplitude: 0.0,
			..FieldConfig::default()
		};
		let mut rng = SmallRng::seed_from_u64(6);
		let mut buffers = ParticleBuffers::new(config.count, &mut rng, &config);
		for p in buffers.target_position.chunks_exact_mut(3) {
			p.copy_from_slice(&[0.0, 0.0, config.camera_distance + 5.0]);
		}
		let camera = CameraRig::new(32.0, 32.0, &config);
		let mut frame = Frame::new(32, 32);
		let drawn = render_field(
			&mut frame,
			&buffers,
			Uniforms { time: 0.0, progress: 1.0 },
			&camera,
			&config,
		);
		assert_eq!(drawn, 0);
	}
}
