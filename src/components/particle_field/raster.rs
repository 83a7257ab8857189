//! Software point-sprite rasterizer.
//!
//! Sprites are blended additively into an `f32` RGB accumulation buffer, then
//! resolved into the RGBA bytes handed to the canvas.

use glam::Vec3;

use super::shading::fragment;
use super::theme::Rgb;

/// Largest sprite diameter drawn, in pixels.
const MAX_SPRITE: f32 = 48.0;

/// CPU framebuffer for one canvas.
pub struct Frame {
	width: usize,
	height: usize,
	accum: Vec<f32>,
	pixels: Vec<u8>,
}

impl Frame {
	pub fn new(width: usize, height: usize) -> Self {
		let (width, height) = (width.max(1), height.max(1));
		Self {
			width,
			height,
			accum: vec![0.0; width * height * 3],
			pixels: vec![0; width * height * 4],
		}
	}

	pub fn width(&self) -> usize {
		self.width
	}

	pub fn height(&self) -> usize {
		self.height
	}

	/// Reallocate for a new size. Contents are cleared.
	pub fn resize(&mut self, width: usize, height: usize) {
		*self = Self::new(width, height);
	}

	pub fn clear(&mut self, background: Rgb) {
		for px in self.accum.chunks_exact_mut(3) {
			px[0] = background.r;
			px[1] = background.g;
			px[2] = background.b;
		}
	}

	/// Draw one round sprite centred at `(cx, cy)` with diameter `size`.
	pub fn splat(&mut self, cx: f32, cy: f32, size: f32, color: Vec3, brightness: f32, alpha: f32) {
		if !(cx.is_finite() && cy.is_finite() && size.is_finite()) || size <= 0.0 {
			return;
		}

		if size < 1.0 {
			// Sub-pixel sprite: deposit its coverage into a single pixel.
			if let Some((lit, a)) = fragment(0.0, color, brightness, alpha) {
				self.add(cx.floor(), cy.floor(), lit * a * size * size);
			}
			return;
		}

		let size = size.min(MAX_SPRITE);
		let radius = size * 0.5;
		let (x0, x1) = ((cx - radius).floor(), (cx + radius).ceil());
		let (y0, y1) = ((cy - radius).floor(), (cy + radius).ceil());
		let mut y = y0;
		while y < y1 {
			let mut x = x0;
			while x < x1 {
				let (dx, dy) = (x + 0.5 - cx, y + 0.5 - cy);
				let distance = (dx * dx + dy * dy).sqrt() / size;
				if let Some((lit, a)) = fragment(distance, color, brightness, alpha) {
					self.add(x, y, lit * a);
				}
				x += 1.0;
			}
			y += 1.0;
		}
	}

	fn add(&mut self, x: f32, y: f32, rgb: Vec3) {
		if x < 0.0 || y < 0.0 {
			return;
		}
		let (x, y) = (x as usize, y as usize);
		if x >= self.width || y >= self.height {
			return;
		}
		let i = (y * self.width + x) * 3;
		self.accum[i] += rgb.x;
		self.accum[i + 1] += rgb.y;
		self.accum[i + 2] += rgb.z;
	}

	/// Accumulated colour at a pixel, for inspection.
	pub fn sample(&self, x: usize, y: usize) -> Option<Vec3> {
		if x >= self.width || y >= self.height {
			return None;
		}
		let i = (y * self.width + x) * 3;
		Some(Vec3::new(self.accum[i], self.accum[i + 1], self.accum[i + 2]))
	}

	/// Convert the accumulation buffer into opaque RGBA bytes.
	pub fn resolve(&mut self) -> &[u8] {
		for (src, dst) in self.accum.chunks_exact(3).zip(self.pixels.chunks_exact_mut(4)) {
			dst[0] = to_byte(src[0]);
			dst[1] = to_byte(src[1]);
			dst[2] = to_byte(src[2]);
			dst[3] = 255;
		}
		&self.pixels
	}
}

fn to_byte(v: f32) -> u8 {
	(v.clamp(0.0, 1.0) * 255.0).round() as u8
}
