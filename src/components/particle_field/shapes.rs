//! Procedural point clouds for the six named shapes.
//!
//! A generator fills flat `[x, y, z, ...]` / `[r, g, b, ...]` buffers in place.
//! Placement is decided by position in the shuffled `order` array, not by raw
//! particle index: the first `shape_limit` entries land on the silhouette, the
//! remainder join the ambient background field.

use std::f32::consts::{FRAC_1_SQRT_2, PI, TAU};

use glam::{Quat, Vec3};
use rand::Rng;

use super::config::{FieldConfig, shape_limit};
use super::theme::{Rgb, Theme};

/// The named silhouettes, in page-section order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
	/// CPU die with pins and routed traces.
	Processor,
	/// Nucleus inside three tilted electron orbits.
	Atom,
	/// Broadcast mast radiating concentric rings.
	SignalWave,
	/// Sphere traced along latitude and longitude lines.
	CyberGlobe,
	/// Clustered nodes joined by their nearest neighbours.
	DataNetwork,
	/// Lemniscate tube.
	InfiniteLoop,
}

impl Shape {
	pub const ALL: [Shape; 6] = [
		Shape::Processor,
		Shape::Atom,
		Shape::SignalWave,
		Shape::CyberGlobe,
		Shape::DataNetwork,
		Shape::InfiniteLoop,
	];

	pub const COUNT: usize = Self::ALL.len();

	pub fn from_index(index: usize) -> Option<Shape> {
		Self::ALL.get(index).copied()
	}

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn name(self) -> &'static str {
		match self {
			Shape::Processor => "processor",
			Shape::Atom => "atom",
			Shape::SignalWave => "signal-wave",
			Shape::CyberGlobe => "cyber-globe",
			Shape::DataNetwork => "data-network",
			Shape::InfiniteLoop => "infinite-loop",
		}
	}
}

/// How many particles each branch received in one generator call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
	/// Particles placed on the silhouette.
	pub shaped: usize,
	/// Particles sent to the ambient background.
	pub ambient: usize,
}

/// Colour role of a silhouette point.
#[derive(Clone, Copy, Debug)]
enum Tone {
	/// Regular body particle; the value is how far to mix toward the highlight colour.
	Body(f32),
	/// Always rendered as a bright accent.
	Node,
}

/// Fill `positions`/`colors` with `shape`, using `order` to choose which
/// particles form the silhouette.
///
/// Both buffers are zeroed first so a short write never leaves stale data.
/// Entries of `order` that point outside the buffers are skipped.
pub fn generate<R: Rng>(
	shape: Shape,
	positions: &mut [f32],
	colors: &mut [f32],
	order: &[usize],
	rng: &mut R,
	config: &FieldConfig,
) -> Placement {
	positions.fill(0.0);
	colors.fill(0.0);

	let capacity = (positions.len() / 3).min(colors.len() / 3);
	let count = order.len().min(capacity);
	let limit = shape_limit(count, config.shape_fraction);
	let sampler = Sampler::new(shape, rng);
	let mut placement = Placement::default();

	for (slot, &idx) in order.iter().take(count).enumerate() {
		if idx >= capacity {
			continue;
		}
		let (position, color) = if slot < limit {
			placement.shaped += 1;
			let (position, tone) = sampler.sample(slot, limit, rng);
			(position, tone_color(tone, rng, config))
		} else {
			placement.ambient += 1;
			ambient(rng, config)
		};
		write3(positions, idx, position.to_array());
		write3(colors, idx, [color.r, color.g, color.b]);
	}

	placement
}

/// Uniform scatter in the ambient box with a dim red-biased colour.
pub fn ambient<R: Rng>(rng: &mut R, config: &FieldConfig) -> (Vec3, Rgb) {
	let [ex, ey, ez] = config.ambient_extent;
	let position = Vec3::new(
		(rng.r#gen::<f32>() - 0.5) * ex,
		(rng.r#gen::<f32>() - 0.5) * ey,
		(rng.r#gen::<f32>() - 0.5) * ez + config.ambient_depth_offset,
	);
	let color = config.theme.ambient.scale(0.5 + rng.r#gen::<f32>() * 0.5);
	(position, color)
}

fn tone_color<R: Rng>(tone: Tone, rng: &mut R, config: &FieldConfig) -> Rgb {
	let theme: &Theme = &config.theme;
	let accent = matches!(tone, Tone::Node) || rng.r#gen::<f32>() < config.accent_fraction;
	if accent {
		return theme.accent.scale(0.9 + rng.r#gen::<f32>() * 0.1);
	}
	let mix = match tone {
		Tone::Body(mix) => mix,
		Tone::Node => 1.0,
	};
	theme
		.signal
		.lerp(theme.highlight, mix)
		.scale(0.55 + rng.r#gen::<f32>() * 0.45)
}

fn write3(buffer: &mut [f32], idx: usize, value: [f32; 3]) {
	buffer[idx * 3..idx * 3 + 3].copy_from_slice(&value);
}

fn jitter<R: Rng>(rng: &mut R, amount: f32) -> Vec3 {
	Vec3::new(
		rng.gen_range(-amount..=amount),
		rng.gen_range(-amount..=amount),
		rng.gen_range(-amount..=amount),
	)
}

/// Uniform direction on the unit sphere.
fn unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
	let theta = rng.r#gen::<f32>() * TAU;
	let z = rng.r#gen::<f32>() * 2.0 - 1.0;
	let ring = (1.0 - z * z).max(0.0).sqrt();
	Vec3::new(ring * theta.cos(), ring * theta.sin(), z)
}

/// Rotate a point in the xy plane by `side` quarter turns.
fn quarter_turn(x: f32, y: f32, side: u32) -> (f32, f32) {
	match side % 4 {
		0 => (x, y),
		1 => (-y, x),
		2 => (-x, -y),
		_ => (y, -x),
	}
}

const CHIP_HALF: f32 = 5.0;
const ATOM_ORBITS: u32 = 3;
const SIGNAL_RINGS: u32 = 6;
const GLOBE_RADIUS: f32 = 11.0;
const NETWORK_NODES: usize = 26;
const LOOP_SCALE: f32 = 14.0;

/// Per-call sampling state for one shape.
enum Sampler {
	Processor,
	Atom,
	SignalWave,
	CyberGlobe,
	DataNetwork {
		nodes: Vec<Vec3>,
		edges: Vec<(usize, usize)>,
	},
	InfiniteLoop,
}

impl Sampler {
	fn new<R: Rng>(shape: Shape, rng: &mut R) -> Self {
		match shape {
			Shape::Processor => Sampler::Processor,
			Shape::Atom => Sampler::Atom,
			Shape::SignalWave => Sampler::SignalWave,
			Shape::CyberGlobe => Sampler::CyberGlobe,
			Shape::DataNetwork => {
				let nodes: Vec<Vec3> = (0..NETWORK_NODES)
					.map(|_| unit_vector(rng) * 13.0 * rng.r#gen::<f32>().cbrt())
					.collect();
				let edges = nearest_edges(&nodes, 2);
				Sampler::DataNetwork { nodes, edges }
			}
			Shape::InfiniteLoop => Sampler::InfiniteLoop,
		}
	}

	fn sample<R: Rng>(&self, slot: usize, limit: usize, rng: &mut R) -> (Vec3, Tone) {
		match self {
			Sampler::Processor => processor(rng),
			Sampler::Atom => atom(rng),
			Sampler::SignalWave => signal_wave(rng),
			Sampler::CyberGlobe => cyber_globe(rng),
			Sampler::DataNetwork { nodes, edges } => data_network(nodes, edges, rng),
			Sampler::InfiniteLoop => infinite_loop(slot, limit, rng),
		}
	}
}

/// Circuit board: a gridded die, pins on all four edges, and bent traces.
fn processor<R: Rng>(rng: &mut R) -> (Vec3, Tone) {
	let pick = rng.r#gen::<f32>();
	let depth = rng.gen_range(-0.3..=0.3);

	if pick < 0.3 {
		let grid = -CHIP_HALF + rng.gen_range(0..=5) as f32 * 2.0;
		let along = rng.gen_range(-CHIP_HALF..=CHIP_HALF);
		let (x, y) = if rng.gen_bool(0.5) { (grid, along) } else { (along, grid) };
		(Vec3::new(x, y, depth), Tone::Body(0.5))
	} else if pick < 0.5 {
		let side = rng.gen_range(0..4);
		let pin = rng.gen_range(0..8) as f32;
		let offset = -4.375 + pin * 1.25 + rng.gen_range(-0.15..=0.15);
		let reach = rng.gen_range(CHIP_HALF + 0.3..=CHIP_HALF + 2.0);
		let (x, y) = quarter_turn(offset, reach, side);
		(Vec3::new(x, y, depth), Tone::Body(0.3))
	} else {
		let side = rng.gen_range(0..4);
		let lane = -5.5 + rng.gen_range(0..12) as f32;
		let straight = rng.gen_range(2.0..=6.0);
		let bent = rng.gen_range(0.0..=5.0);
		let d = rng.r#gen::<f32>() * (straight + bent);
		let start = CHIP_HALF + 2.0;
		let (u, v) = if d < straight {
			(lane, start + d)
		} else {
			let diag = (d - straight) * FRAC_1_SQRT_2;
			(lane + diag * lane.signum(), start + straight + diag)
		};
		let (x, y) = quarter_turn(u, v, side);
		(Vec3::new(x, y, depth * 0.5), Tone::Body(0.1))
	}
}

/// Nucleus ball with three electron orbits at 60 degree plane rotations.
fn atom<R: Rng>(rng: &mut R) -> (Vec3, Tone) {
	if rng.r#gen::<f32>() < 0.22 {
		let position = unit_vector(rng) * 2.6 * rng.r#gen::<f32>().cbrt();
		return (position, Tone::Body(0.6));
	}

	let orbit = rng.gen_range(0..ATOM_ORBITS);
	let electron = rng.r#gen::<f32>() < 0.06;
	let angle = if electron {
		orbit as f32 * 2.1 + rng.gen_range(0.0..=0.12)
	} else {
		rng.r#gen::<f32>() * TAU
	};
	let local = Vec3::new(angle.cos() * 11.0, angle.sin() * 4.2, 0.0) + jitter(rng, 0.2);
	let plane = Quat::from_rotation_x(0.35) * Quat::from_rotation_z(orbit as f32 * PI / 3.0);
	let tone = if electron { Tone::Node } else { Tone::Body(0.2) };
	(plane * local, tone)
}

/// Broadcast mast with concentric rings at stepped radii.
fn signal_wave<R: Rng>(rng: &mut R) -> (Vec3, Tone) {
	if rng.r#gen::<f32>() < 0.1 {
		let position = Vec3::new(0.0, rng.gen_range(-12.0..=-1.0), 0.0) + jitter(rng, 0.15);
		return (position, Tone::Body(0.4));
	}

	let ring = rng.gen_range(0..SIGNAL_RINGS);
	let radius = 2.5 + ring as f32 * 2.6 + rng.gen_range(-0.25..=0.25);
	let angle = rng.r#gen::<f32>() * TAU;
	let position = Vec3::new(
		radius * angle.cos(),
		radius * angle.sin(),
		(angle * 4.0 + ring as f32).sin() * 0.6,
	);
	(position, Tone::Body(0.6 - ring as f32 * 0.1))
}

/// Wireframe sphere: points snap to latitude or longitude lines.
fn cyber_globe<R: Rng>(rng: &mut R) -> (Vec3, Tone) {
	const LAT_STEP: f32 = PI / 9.0;
	const LON_STEP: f32 = PI / 6.0;

	let pick = rng.r#gen::<f32>();
	let mut lon = rng.r#gen::<f32>() * TAU;
	let mut lat = (rng.r#gen::<f32>() * 2.0 - 1.0).asin();
	let tone = if pick < 0.45 {
		lat = ((lat / LAT_STEP).round() * LAT_STEP).clamp(-3.0 * LAT_STEP, 3.0 * LAT_STEP);
		Tone::Body(0.35)
	} else if pick < 0.9 {
		lon = (lon / LON_STEP).round() * LON_STEP;
		Tone::Body(0.25)
	} else {
		Tone::Body(0.05)
	};

	let position = Vec3::new(
		GLOBE_RADIUS * lat.cos() * lon.cos(),
		GLOBE_RADIUS * lat.sin(),
		GLOBE_RADIUS * lat.cos() * lon.sin(),
	);
	(position, tone)
}

/// Node clusters joined by sampled edges.
fn data_network<R: Rng>(nodes: &[Vec3], edges: &[(usize, usize)], rng: &mut R) -> (Vec3, Tone) {
	if edges.is_empty() || rng.r#gen::<f32>() < 0.25 {
		let node = nodes[rng.gen_range(0..nodes.len())];
		let offset = unit_vector(rng) * 0.7 * rng.r#gen::<f32>();
		return (node + offset, Tone::Node);
	}

	let (a, b) = edges[rng.gen_range(0..edges.len())];
	let position = nodes[a].lerp(nodes[b], rng.r#gen::<f32>()) + jitter(rng, 0.08);
	(position, Tone::Body(0.25))
}

/// Lemniscate tube, stratified along the curve so it never has gaps.
fn infinite_loop<R: Rng>(slot: usize, limit: usize, rng: &mut R) -> (Vec3, Tone) {
	let t = (slot as f32 + rng.r#gen::<f32>()) / limit.max(1) as f32 * TAU;
	let (sin, cos) = t.sin_cos();
	let denom = 1.0 + sin * sin;
	let center = Vec3::new(
		LOOP_SCALE * cos / denom,
		LOOP_SCALE * sin * cos / denom,
		(2.0 * t).sin() * 2.0,
	);
	let tube = unit_vector(rng) * 0.9 * rng.r#gen::<f32>().sqrt();
	(center + tube, Tone::Body(0.2 + 0.3 * cos * cos))
}

/// Connect every node to its `k` nearest neighbours, without duplicates.
fn nearest_edges(nodes: &[Vec3], k: usize) -> Vec<(usize, usize)> {
	let mut edges = Vec::new();
	for (i, a) in nodes.iter().enumerate() {
		let mut others: Vec<(usize, f32)> = nodes
			.iter()
			.enumerate()
			.filter(|&(j, _)| j != i)
			.map(|(j, b)| (j, a.distance_squared(*b)))
			.collect();
		others.sort_by(|x, y| x.1.total_cmp(&y.1));
		for &(j, _) in others.iter().take(k) {
			let edge = (i.min(j), i.max(j));
			if !edges.contains(&edge) {
				edges.push(edge);
			}
		}
	}
	edges
}
