//! Leptos component hosting the particle field.
//!
//! Renders an empty container, starts a [`FieldHandle`] inside it once the
//! node exists, and stops the handle when the component is cleaned up.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;

use super::config::FieldConfig;
use super::mount::FieldHandle;

/// Full-viewport animated background that morphs with the visible section.
///
/// Tag page sections with `data-particle-shape="<0..6>"` to drive the shape.
/// Without a usable canvas the component renders an empty container and the
/// rest of the page is unaffected.
#[component]
pub fn ParticleFieldCanvas(#[prop(optional)] config: Option<FieldConfig>) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let handle: Rc<RefCell<Option<FieldHandle>>> = Rc::new(RefCell::new(None));
	let handle_init = handle.clone();
	let config = config.unwrap_or_default();

	Effect::new(move |_| {
		let Some(container) = container_ref.get() else {
			return;
		};
		if handle_init.borrow().is_some() {
			return;
		}
		let started = FieldHandle::start(Some(container.into()), &config);
		*handle_init.borrow_mut() = started;
	});

	let handle_cleanup = SendWrapper::new(handle);
	on_cleanup(move || {
		let handle = handle_cleanup.take();
		if let Some(mut field) = handle.borrow_mut().take() {
			field.stop();
		}
	});

	view! { <div node_ref=container_ref class="particle-field" aria-hidden="true" /> }
}
