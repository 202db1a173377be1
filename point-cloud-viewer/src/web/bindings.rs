use crate::config::ViewerConfig;
use crate::engine::registry::EngineRegistry;
use crate::error::ERROR_HINT;
use crate::rpc::web_rpc::{ParentWindowSink, RpcBridge, setup_message_listener};
use crate::runtime::ViewerRuntime;
use crate::viewer::mount::ViewerMount;
use crate::web::dom_resources::DomResourceInjector;
use crate::web::fullscreen::DomFullscreen;
use crate::web::potree::PotreeRuntime;
use crate::web::spawner::WasmSpawner;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

type DomMount = ViewerMount<PotreeRuntime, DomFullscreen>;

thread_local! {
    static RUNTIME: RefCell<Option<ViewerRuntime<PotreeRuntime>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

/// The page-wide runtime, created on first use.
fn shared_runtime() -> Result<ViewerRuntime<PotreeRuntime>, JsValue> {
    RUNTIME.with(|slot| {
        if let Some(runtime) = slot.borrow().as_ref() {
            return Ok(runtime.clone());
        }

        let injector = Rc::new(DomResourceInjector::new()?);
        let runtime = ViewerRuntime::new(injector, EngineRegistry::new(PotreeRuntime::resolve));
        *slot.borrow_mut() = Some(runtime.clone());
        info!("Viewer runtime initialised");
        Ok(runtime)
    })
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

/// One point-cloud viewer bound to a host element.
#[wasm_bindgen]
pub struct PointCloudViewer {
    mount: Rc<DomMount>,
    rpc_listening: Cell<bool>,
}

#[wasm_bindgen]
impl PointCloudViewer {
    /// `config_json` overrides the built-in viewer configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<PointCloudViewer, JsValue> {
        let config = match config_json {
            Some(json) => {
                ViewerConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => ViewerConfig::default(),
        };

        let mount = ViewerMount::new(
            shared_runtime()?,
            config,
            Rc::new(DomFullscreen::new()?),
            Rc::new(WasmSpawner),
        );

        Ok(Self {
            mount: Rc::new(mount),
            rpc_listening: Cell::new(false),
        })
    }

    pub fn mount(&self, container: Option<HtmlElement>, data_path: &str) {
        self.mount.mount(container, data_path);
    }

    #[wasm_bindgen(js_name = setDataPath)]
    pub fn set_data_path(&self, data_path: &str) {
        self.mount.set_data_path(data_path);
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&self) -> bool {
        self.mount.controls().zoom_in()
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&self) -> bool {
        self.mount.controls().zoom_out()
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&self) -> bool {
        self.mount.controls().reset_view()
    }

    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self) {
        self.mount.controls().toggle_fullscreen();
    }

    /// `callback({ loading, error, isFullscreen })` on every change.
    #[wasm_bindgen(js_name = onSignals)]
    pub fn on_signals(&self, callback: js_sys::Function) {
        self.mount.signals().subscribe(move |signals| {
            let delivered = to_js(signals).and_then(|value| callback.call1(&JsValue::NULL, &value));
            if let Err(e) = delivered {
                warn!("Signal callback failed: {:?}", e);
            }
        });
    }

    pub fn signals(&self) -> Result<JsValue, JsValue> {
        to_js(&self.mount.signals().current())
    }

    pub fn state(&self) -> String {
        self.mount.lifecycle().state().as_str().to_string()
    }

    /// Guidance to show under the error message, while there is one.
    #[wasm_bindgen(js_name = errorHint)]
    pub fn error_hint(&self) -> Option<String> {
        self.mount
            .signals()
            .current()
            .error
            .map(|_| ERROR_HINT.to_string())
    }

    /// Accept JSON-RPC commands from the parent window. Idempotent.
    #[wasm_bindgen(js_name = listenForRpc)]
    pub fn listen_for_rpc(&self) -> Result<(), JsValue> {
        if self.rpc_listening.get() {
            return Ok(());
        }

        let bridge = Rc::new(RpcBridge::new(Rc::clone(&self.mount), Rc::new(ParentWindowSink)));
        bridge.forward_signals();
        setup_message_listener(bridge)?;
        self.rpc_listening.set(true);
        Ok(())
    }
}
