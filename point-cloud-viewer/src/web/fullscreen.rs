use crate::error::FullscreenError;
use crate::viewer::fullscreen::{FullscreenApi, FullscreenFuture};
use crate::web::describe_js;
use futures::FutureExt;
use futures::future;
use js_sys::{Function, Promise, Reflect};
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Event, HtmlElement};

const CHANGE_EVENT: &str = "fullscreenchange";

/// The document's Fullscreen API.
pub struct DomFullscreen {
    document: Document,
}

impl DomFullscreen {
    pub fn new() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("document unavailable"))?;
        Ok(Self { document })
    }
}

/// Removes its `fullscreenchange` listener when dropped.
pub struct FullscreenListener {
    document: Document,
    closure: Closure<dyn Fn(Event)>,
}

impl Drop for FullscreenListener {
    fn drop(&mut self) {
        let listener = self.closure.as_ref().unchecked_ref();
        if let Err(e) = self
            .document
            .remove_event_listener_with_callback(CHANGE_EVENT, listener)
        {
            warn!("Could not remove {} listener: {}", CHANGE_EVENT, describe_js(&e));
        }
    }
}

/// Call `method` on `target` and await the promise it returns, if any.
fn call_and_await(target: &JsValue, method: &str) -> FullscreenFuture {
    let Some(function) = Reflect::get(target, &JsValue::from_str(method))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
    else {
        return future::ready(Err(FullscreenError::Unavailable)).boxed_local();
    };

    let returned = match function.call0(target) {
        Ok(returned) => returned,
        Err(e) => {
            return future::ready(Err(FullscreenError::Rejected(describe_js(&e)))).boxed_local();
        }
    };

    match returned.dyn_into::<Promise>() {
        Ok(promise) => async move {
            JsFuture::from(promise)
                .await
                .map(drop)
                .map_err(|e| FullscreenError::Rejected(describe_js(&e)))
        }
        .boxed_local(),
        Err(_) => future::ready(Ok(())).boxed_local(),
    }
}

impl FullscreenApi for DomFullscreen {
    type Container = HtmlElement;
    type Subscription = FullscreenListener;

    fn has_fullscreen_element(&self) -> bool {
        self.document.fullscreen_element().is_some()
    }

    fn is_fullscreen_element(&self, container: &HtmlElement) -> bool {
        self.document
            .fullscreen_element()
            .is_some_and(|element| element == **container)
    }

    fn request_fullscreen(&self, container: &HtmlElement) -> FullscreenFuture {
        call_and_await(container, "requestFullscreen")
    }

    fn exit_fullscreen(&self) -> FullscreenFuture {
        call_and_await(&self.document, "exitFullscreen")
    }

    fn subscribe(&self, on_change: Box<dyn Fn()>) -> FullscreenListener {
        let closure = Closure::<dyn Fn(Event)>::new(move |_event: Event| on_change());
        if let Err(e) = self
            .document
            .add_event_listener_with_callback(CHANGE_EVENT, closure.as_ref().unchecked_ref())
        {
            warn!("Could not listen for {}: {}", CHANGE_EVENT, describe_js(&e));
        }
        FullscreenListener {
            document: self.document.clone(),
            closure,
        }
    }
}
