use crate::error::ResourceLoadError;
use crate::loading::completion::completion;
use crate::loading::resource::{ResourceDescriptor, ResourceKind};
use crate::loading::resource_loader::{InjectFuture, ResourceInjector};
use crate::web::describe_js;
use futures::FutureExt;
use futures::future;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlLinkElement, HtmlScriptElement};

/// Marks elements this injector created; `pending` until the load fires.
const STATE_ATTRIBUTE: &str = "data-viewer-resource";
const PENDING: &str = "pending";
const LOADED: &str = "loaded";

type ElementListener = Closure<dyn FnMut(Event)>;

/// Unregister both listeners; the closures must outlive their registration.
fn remove_listeners(element: &Element, on_load: &ElementListener, on_error: &ElementListener) {
    for (event, listener) in [("load", on_load), ("error", on_error)] {
        if let Err(e) =
            element.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
        {
            debug!("Could not remove {} listener: {}", event, describe_js(&e));
        }
    }
}

/// Appends `<link>` and `<script>` elements to the document head, keyed by
/// element id.
pub struct DomResourceInjector {
    document: Document,
}

impl DomResourceInjector {
    pub fn new() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("document unavailable"))?;
        Ok(Self { document })
    }

    fn create_element(&self, descriptor: &ResourceDescriptor) -> Result<Element, JsValue> {
        let element: Element = match descriptor.kind() {
            ResourceKind::Style => {
                let link: HtmlLinkElement = self.document.create_element("link")?.dyn_into()?;
                link.set_rel("stylesheet");
                link.set_href(descriptor.url());
                link.into()
            }
            ResourceKind::Script => {
                let script: HtmlScriptElement =
                    self.document.create_element("script")?.dyn_into()?;
                // Dynamically inserted scripts default to async; keep insertion order.
                script.set_async(false);
                script.set_src(descriptor.url());
                script.into()
            }
        };

        element.set_id(descriptor.identity());
        element.set_attribute(STATE_ATTRIBUTE, PENDING)?;
        Ok(element)
    }
}

impl ResourceInjector for DomResourceInjector {
    fn is_present(&self, identity: &str) -> bool {
        self.document
            .get_element_by_id(identity)
            .is_some_and(|element| {
                element.get_attribute(STATE_ATTRIBUTE).as_deref() != Some(PENDING)
            })
    }

    fn inject(&self, descriptor: &ResourceDescriptor) -> InjectFuture {
        let load_error = ResourceLoadError {
            identity: descriptor.identity().to_string(),
            url: descriptor.url().to_string(),
        };

        let Some(head) = self.document.head() else {
            warn!(
                "Document has no <head>, cannot inject {}",
                descriptor.identity()
            );
            return future::ready(Err(load_error)).boxed_local();
        };

        let element = match self.create_element(descriptor) {
            Ok(element) => element,
            Err(e) => {
                warn!(
                    "Could not create element for {}: {}",
                    descriptor.identity(),
                    describe_js(&e)
                );
                return future::ready(Err(load_error)).boxed_local();
            }
        };

        let (resolver, settled) = completion::<bool>();
        let loaded = resolver.clone();
        let on_load = ElementListener::new(move |_event: Event| {
            loaded.resolve(true);
        });
        let on_error = ElementListener::new(move |_event: Event| {
            resolver.resolve(false);
        });

        let attached = element
            .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
            .and_then(|()| {
                element.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            })
            .and_then(|()| head.append_child(&element).map(drop));
        if let Err(e) = attached {
            warn!("Could not attach {}: {}", descriptor.identity(), describe_js(&e));
            remove_listeners(&element, &on_load, &on_error);
            return future::ready(Err(load_error)).boxed_local();
        }

        async move {
            let outcome = settled.await;
            remove_listeners(&element, &on_load, &on_error);
            drop((on_load, on_error));

            if outcome == Ok(true) {
                if let Err(e) = element.set_attribute(STATE_ATTRIBUTE, LOADED) {
                    debug!(
                        "Could not mark {} loaded: {}",
                        load_error.identity,
                        describe_js(&e)
                    );
                }
                Ok(())
            } else {
                // Remove the dead element so a later mount can inject again.
                element.remove();
                Err(load_error)
            }
        }
        .boxed_local()
    }
}
