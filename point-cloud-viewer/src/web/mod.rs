//! Browser implementations of the platform seams, plus the JS-facing API.

mod bindings;
pub mod dom_resources;
pub mod fullscreen;
pub mod potree;
pub mod spawner;

pub use bindings::PointCloudViewer;

use wasm_bindgen::{JsCast, JsValue};

/// Best-effort readable text for a thrown JS value.
pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}
