//! Visual theming for the particle field.
//!
//! Colours are stored as linear `f32` channels in `0.0..=1.0` because they feed
//! straight into the per-particle colour buffers.

use serde::Deserialize;

/// RGB colour with unit-range channels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Rgb {
	pub r: f32,
	pub g: f32,
	pub b: f32,
}

impl Rgb {
	pub const fn new(r: f32, g: f32, b: f32) -> Self {
		Self { r, g, b }
	}

	/// Uniform grey.
	pub const fn grey(v: f32) -> Self {
		Self { r: v, g: v, b: v }
	}

	/// Multiply every channel by `factor`.
	pub fn scale(self, factor: f32) -> Self {
		Self {
			r: self.r * factor,
			g: self.g * factor,
			b: self.b * factor,
		}
	}

	/// Linear interpolation between two colours
	pub fn lerp(self, other: Rgb, t: f32) -> Self {
		let t = t.clamp(0.0, 1.0);
		Self {
			r: self.r + (other.r - self.r) * t,
			g: self.g + (other.g - self.g) * t,
			b: self.b + (other.b - self.b) * t,
		}
	}

}

/// Colour palette used by the shape generators and the renderer.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Theme {
	/// Canvas clear colour.
	pub background: Rgb,
	/// Dominant silhouette colour.
	pub signal: Rgb,
	/// Secondary silhouette colour mixed into the signal colour.
	pub highlight: Rgb,
	/// Colour of the bright accent particles.
	pub accent: Rgb,
	/// Base colour of the diffuse background field.
	pub ambient: Rgb,
	/// Colour of the initial random scatter before the first shape forms.
	pub scatter: Rgb,
}

impl Theme {
	/// Festival red on near-black (default)
	pub fn crimson() -> Self {
		Self {
			background: Rgb::new(0.02, 0.015, 0.025),
			signal: Rgb::new(0.92, 0.08, 0.12),
			highlight: Rgb::new(1.0, 0.86, 0.86),
			accent: Rgb::new(1.0, 0.96, 0.94),
			ambient: Rgb::new(0.32, 0.04, 0.06),
			scatter: Rgb::grey(0.1),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::crimson()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lerp_clamps_parameter() {
		let a = Rgb::grey(0.0);
		let b = Rgb::grey(1.0);
		assert_eq!(a.lerp(b, 2.0), b);
		assert_eq!(a.lerp(b, -1.0), a);
		assert_eq!(a.lerp(b, 0.5), Rgb::grey(0.5));
	}
}
