//! Potree, reached through `window.Potree` with reflection.

use crate::engine::api::{
    Background, CameraPlacement, EngineRuntime, EngineViewer, GuiSettings, HelperTool,
    LoadCallback, NavigationMode,
};
use crate::error::EngineError;
use crate::web::describe_js;
use js_sys::{Array, Function, Promise, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

const ENTRY_POINT: &str = "Potree";

fn get(target: &JsValue, key: &str) -> Result<JsValue, EngineError> {
    Reflect::get(target, &JsValue::from_str(key))
        .map_err(|e| EngineError::call(key, describe_js(&e)))
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), EngineError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(drop)
        .map_err(|e| EngineError::call(key, describe_js(&e)))
}

fn function(target: &JsValue, name: &str) -> Option<Function> {
    get(target, name).ok()?.dyn_into::<Function>().ok()
}

fn call_method(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, EngineError> {
    let function = function(target, method).ok_or_else(|| EngineError::missing(method))?;
    let args: Array = args.iter().collect();
    function
        .apply(target, &args)
        .map_err(|e| EngineError::call(method, describe_js(&e)))
}

fn construct(class: &Function, arg: &JsValue, name: &str) -> Result<JsValue, EngineError> {
    Reflect::construct(class, &Array::of1(arg))
        .map_err(|e| EngineError::call(name, describe_js(&e)))
}

fn deliver<C>(slot: &RefCell<LoadCallback<C>>, result: Result<C, EngineError>) {
    let mut callback = slot.borrow_mut();
    (*callback)(result);
}

/// The global `Potree` namespace.
pub struct PotreeRuntime {
    namespace: JsValue,
}

impl PotreeRuntime {
    /// Look up `window.Potree`; `None` until the engine script has executed.
    pub fn resolve() -> Option<Self> {
        let window = web_sys::window()?;
        let namespace = Reflect::get(&window, &JsValue::from_str(ENTRY_POINT)).ok()?;
        if namespace.is_undefined() || namespace.is_null() {
            trace!("window.{} not defined yet", ENTRY_POINT);
            return None;
        }
        Some(Self { namespace })
    }
}

impl EngineRuntime for PotreeRuntime {
    type Container = HtmlElement;
    type Viewer = PotreeViewer;

    fn create_viewer(&self, container: &HtmlElement) -> Result<PotreeViewer, EngineError> {
        let class = function(&self.namespace, "Viewer")
            .ok_or_else(|| EngineError::missing("Potree.Viewer"))?;
        let viewer = construct(&class, container, "Potree.Viewer")?;
        debug!("Potree viewer constructed");
        Ok(PotreeViewer {
            namespace: self.namespace.clone(),
            viewer,
        })
    }
}

/// A `Potree.Viewer` instance.
pub struct PotreeViewer {
    namespace: JsValue,
    viewer: JsValue,
}

/// Loaded `pointcloud` object from the engine's load event.
pub struct PotreeCloud(JsValue);

impl PotreeViewer {
    fn call(&self, method: &str, args: &[JsValue]) -> Result<(), EngineError> {
        call_method(&self.viewer, method, args).map(drop)
    }

    fn view(&self) -> Result<JsValue, EngineError> {
        let scene = get(&self.viewer, "scene")?;
        get(&scene, "view")
    }
}

impl EngineViewer for PotreeViewer {
    type Cloud = PotreeCloud;

    fn set_edl_enabled(&self, enabled: bool) -> Result<(), EngineError> {
        self.call("setEDLEnabled", &[JsValue::from_bool(enabled)])
    }

    fn set_fov(&self, degrees: f64) -> Result<(), EngineError> {
        self.call("setFOV", &[JsValue::from_f64(degrees)])
    }

    fn set_point_budget(&self, budget: u32) -> Result<(), EngineError> {
        self.call("setPointBudget", &[JsValue::from_f64(f64::from(budget))])
    }

    fn set_background(&self, background: Background) -> Result<(), EngineError> {
        self.call("setBackground", &[JsValue::from_str(background.engine_name())])
    }

    fn load_settings_from_url(&self) -> Result<(), EngineError> {
        self.call("loadSettingsFromURL", &[])
    }

    fn load_point_cloud(&self, path: &str, name: &str, on_loaded: LoadCallback<PotreeCloud>) {
        let slot = Rc::new(RefCell::new(on_loaded));

        let loaded = Rc::clone(&slot);
        let loaded_path = path.to_string();
        let on_event = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let result = get(&event, "pointcloud").and_then(|cloud| {
                if cloud.is_undefined() || cloud.is_null() {
                    Err(EngineError::DataLoad {
                        path: loaded_path.clone(),
                        message: "load event carried no point cloud".to_string(),
                    })
                } else {
                    Ok(PotreeCloud(cloud))
                }
            });
            deliver(&loaded, result);
        });

        let args = [
            JsValue::from_str(path),
            JsValue::from_str(name),
            on_event.as_ref().clone(),
        ];
        match call_method(&self.namespace, "loadPointCloud", &args) {
            Ok(returned) => {
                // Newer engine builds also return a promise; a rejection there
                // is the only failure signal they give.
                if let Ok(promise) = returned.dyn_into::<Promise>() {
                    let rejected = Rc::clone(&slot);
                    let rejected_path = path.to_string();
                    let on_reject = Closure::<dyn FnMut(JsValue)>::new(move |reason: JsValue| {
                        deliver(
                            &rejected,
                            Err(EngineError::DataLoad {
                                path: rejected_path.clone(),
                                message: describe_js(&reason),
                            }),
                        );
                    });
                    let _ = promise.catch(&on_reject);
                    on_reject.forget();
                }
            }
            Err(e) => deliver(&slot, Err(e)),
        }

        // The engine keeps the callback for as long as it likes.
        on_event.forget();
    }

    fn add_to_scene(&self, cloud: PotreeCloud) -> Result<(), EngineError> {
        let scene = get(&self.viewer, "scene")?;
        call_method(&scene, "addPointCloud", &[cloud.0]).map(drop)
    }

    fn place_camera(&self, placement: &CameraPlacement) -> Result<(), EngineError> {
        let view = self.view()?;
        let [x, y, z] = placement.position.map(JsValue::from_f64);
        call_method(&get(&view, "position")?, "set", &[x, y, z])?;
        let [x, y, z] = placement.target.map(JsValue::from_f64);
        call_method(&view, "lookAt", &[x, y, z]).map(drop)
    }

    fn set_navigation_mode(&self, mode: NavigationMode) -> Result<(), EngineError> {
        let controls = get(&self.namespace, mode.engine_controls())?;
        if controls.is_undefined() {
            return Err(EngineError::missing(mode.engine_controls()));
        }
        self.call("setNavigationMode", &[controls])
    }

    fn install_tool(&self, tool: HelperTool) -> Result<bool, EngineError> {
        let Some(class) = function(&self.namespace, tool.engine_class()) else {
            return Ok(false);
        };
        let instance = construct(&class, &self.viewer, tool.engine_class())?;
        set(&self.viewer, tool.viewer_property(), &instance)?;
        Ok(true)
    }

    fn load_gui(&self, gui: &GuiSettings) -> Result<bool, EngineError> {
        if function(&self.viewer, "loadGUI").is_none() {
            return Ok(false);
        }

        let viewer = self.viewer.clone();
        let language = gui.language.clone();
        let show_sidebar = gui.show_sidebar;
        let on_ready = Closure::once_into_js(move || {
            if let Err(e) = call_method(&viewer, "setLanguage", &[JsValue::from_str(&language)]) {
                debug!("Panel language not applied: {}", e);
            }
            if show_sidebar {
                if let Err(e) = call_method(&viewer, "toggleSidebar", &[]) {
                    debug!("Sidebar not toggled: {}", e);
                }
            }
        });

        self.call("loadGUI", &[on_ready])?;
        Ok(true)
    }

    fn fit_to_screen(&self) -> Result<(), EngineError> {
        self.call("fitToScreen", &[])
    }

    fn camera_distance(&self) -> Option<f64> {
        get(&self.view().ok()?, "radius").ok()?.as_f64()
    }

    fn set_camera_distance(&self, distance: f64) -> Result<(), EngineError> {
        set(&self.view()?, "radius", &JsValue::from_f64(distance))
    }
}
