//! Morphing particle field rendered behind the festival page.
//!
//! Thirty thousand particles morph between six procedurally generated
//! silhouettes as the visitor scrolls:
//! - Shape generators place ~55% of particles on the silhouette, the rest in a
//!   diffuse ambient field
//! - A transition controller serialises morphs and reshuffles which particles
//!   carry the silhouette each time
//! - A CPU shading stage eases, explodes and jitters every particle, then a
//!   software rasterizer draws glowing point sprites onto a 2D canvas
//!
//! # Example
//!
//! ```ignore
//! use refresko_particles::ParticleFieldCanvas;
//!
//! view! {
//!     <ParticleFieldCanvas />
//!     <section data-particle-shape="0">"Hero"</section>
//!     <section data-particle-shape="1">"About"</section>
//! }
//! ```

pub mod buffers;
pub mod camera;
mod component;
pub mod config;
pub mod engine;
mod mount;
pub mod raster;
mod render;
pub mod shading;
pub mod shapes;
pub mod theme;
pub mod transition;

pub use component::ParticleFieldCanvas;
pub use config::FieldConfig;
pub use engine::FieldEngine;
pub use mount::{FieldHandle, MountError, SECTION_ATTRIBUTE};
pub use shapes::Shape;
pub use theme::Theme;
pub use transition::{TransitionController, TransitionState};
