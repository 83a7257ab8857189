//! refresko-particles: the animated particle backdrop of the Refresko 2026 site.
//!
//! This crate provides a WASM particle field that morphs between six
//! festival-themed silhouettes as page sections scroll into view, plus the
//! minimal page shell that hosts it.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::particle_field::{FieldConfig, FieldEngine, ParticleFieldCanvas, Shape};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("refresko-particles: logging initialized");
}

/// Load field overrides from a script element with id="particle-config".
/// Any subset of [`FieldConfig`] fields may be given; missing fields keep
/// their defaults.
pub fn load_field_config() -> Option<FieldConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("particle-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match parse_field_config(&json_text) {
		Ok(config) => {
			info!("refresko-particles: loaded config for {} particles", config.count);
			Some(config)
		}
		Err(e) => {
			warn!("refresko-particles: failed to parse particle config: {}", e);
			None
		}
	}
}

/// Parse and sanitize a JSON field configuration.
pub fn parse_field_config(json: &str) -> Result<FieldConfig, serde_json::Error> {
	serde_json::from_str::<FieldConfig>(json).map(|config| config.sanitized())
}

/// One page section and the shape it summons.
struct Section {
	id: &'static str,
	title: &'static str,
	blurb: &'static str,
	shape: Shape,
}

static SECTIONS: [Section; 6] = [
	Section {
		id: "hero",
		title: "Refresko 2026",
		blurb: "The annual technical and cultural festival.",
		shape: Shape::Processor,
	},
	Section {
		id: "about",
		title: "About",
		blurb: "Three days of code, circuits, music and stagecraft.",
		shape: Shape::Atom,
	},
	Section {
		id: "events",
		title: "Events",
		blurb: "Hackathons, robotics, quizzes and design sprints.",
		shape: Shape::SignalWave,
	},
	Section {
		id: "performers",
		title: "Performers",
		blurb: "Headline acts from across the country.",
		shape: Shape::CyberGlobe,
	},
	Section {
		id: "faq",
		title: "FAQ",
		blurb: "Registration, payments and passes, answered.",
		shape: Shape::DataNetwork,
	},
	Section {
		id: "register",
		title: "Register",
		blurb: "Sign up and secure your pass.",
		shape: Shape::InfiniteLoop,
	},
];

/// Main application component.
/// Loads the field configuration from the DOM and renders the page sections
/// over the particle backdrop.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_field_config().unwrap_or_default();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Refresko 2026" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<ParticleFieldCanvas config=config />
		<main class="festival">
			{SECTIONS
				.iter()
				.map(|section| {
					view! {
						<section
							id=section.id
							class="festival-section"
							data-particle-shape=section.shape.index().to_string()
						>
							<h1>{section.title}</h1>
							<p class="subtitle">{section.blurb}</p>
						</section>
					}
				})
				.collect_view()}
		</main>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sections_cover_every_shape_in_order() {
		for (i, section) in SECTIONS.iter().enumerate() {
			assert_eq!(section.shape.index(), i);
		}
	}

	#[test]
	fn config_json_is_sanitized() {
		let config = parse_field_config(r#"{ "count": 0, "shape_fraction": 1.5 }"#).unwrap();
		assert_eq!(config.count, 1);
		assert_eq!(config.shape_fraction, 1.0);
		assert!(parse_field_config("not json").is_err());
	}
}
