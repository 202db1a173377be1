//! In-memory stand-ins for the document, the engine, and the fullscreen API.

use crate::config::ViewerConfig;
use crate::engine::api::{
    Background, CameraPlacement, EngineRuntime, EngineViewer, GuiSettings, HelperTool,
    LoadCallback, NavigationMode,
};
use crate::engine::registry::EngineRegistry;
use crate::error::{EngineError, FullscreenError, ResourceLoadError};
use crate::loading::completion::{Resolver, completion};
use crate::loading::resource::ResourceDescriptor;
use crate::loading::resource_loader::{InjectFuture, ResourceInjector};
use crate::runtime::ViewerRuntime;
use crate::viewer::fullscreen::{FullscreenApi, FullscreenFuture};
use crate::viewer::lifecycle::ViewerLifecycleController;
use crate::viewer::mount::ViewerMount;
use crate::viewer::signals::SignalHub;
use futures::FutureExt;
use futures::executor::LocalPool;
use futures::future::{self, poll_fn};
use futures::task::LocalSpawn;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::task::Poll;

async fn yield_once() {
    let mut yielded = false;
    poll_fn(move |cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

/// Records injections. Manual mode waits for [`MockInjector::complete`];
/// auto mode completes every injection one scheduler turn later.
#[derive(Default)]
pub struct MockInjector {
    auto_complete: bool,
    injected: RefCell<Vec<String>>,
    present: RefCell<HashSet<String>>,
    failing: RefCell<HashSet<String>>,
    pending: RefCell<HashMap<String, Resolver<bool>>>,
}

impl MockInjector {
    pub fn auto_completing() -> Self {
        Self {
            auto_complete: true,
            ..Self::default()
        }
    }

    pub fn injected(&self) -> Vec<String> {
        self.injected.borrow().clone()
    }

    pub fn mark_present(&self, identity: &str) {
        self.present.borrow_mut().insert(identity.to_string());
    }

    pub fn fail_on(&self, identity: &str) {
        self.failing.borrow_mut().insert(identity.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.borrow_mut().clear();
    }

    pub fn complete(&self, identity: &str, succeeded: bool) {
        let resolver = self.pending.borrow_mut().remove(identity);
        if let Some(resolver) = resolver {
            resolver.resolve(succeeded);
        }
    }

    pub fn abandon(&self, identity: &str) {
        self.pending.borrow_mut().remove(identity);
    }
}

impl ResourceInjector for MockInjector {
    fn is_present(&self, identity: &str) -> bool {
        self.present.borrow().contains(identity)
    }

    fn inject(&self, descriptor: &ResourceDescriptor) -> InjectFuture {
        let identity = descriptor.identity().to_string();
        let url = descriptor.url().to_string();
        self.injected.borrow_mut().push(identity.clone());
        let error = ResourceLoadError {
            identity: identity.clone(),
            url,
        };

        if self.auto_complete {
            let fails = self.failing.borrow().contains(&identity);
            return async move {
                yield_once().await;
                if fails { Err(error) } else { Ok(()) }
            }
            .boxed_local();
        }

        let (resolver, completion) = completion();
        self.pending.borrow_mut().insert(identity, resolver);
        async move {
            match completion.await {
                Ok(true) => Ok(()),
                _ => Err(error),
            }
        }
        .boxed_local()
    }
}

#[derive(Debug)]
pub struct ContainerNode {
    pub name: String,
}

/// Container compared by identity, like a DOM element.
#[derive(Debug, Clone)]
pub struct MockContainer(Rc<ContainerNode>);

impl MockContainer {
    pub fn new(name: &str) -> Self {
        Self(Rc::new(ContainerNode {
            name: name.to_string(),
        }))
    }

    pub fn downgrade(&self) -> Weak<ContainerNode> {
        Rc::downgrade(&self.0)
    }
}

impl PartialEq for MockContainer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockCloud {
    pub path: String,
}

impl MockCloud {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

struct PendingLoad {
    path: String,
    callback: Option<LoadCallback<MockCloud>>,
}

#[derive(Default)]
struct EngineLog {
    calls: Vec<String>,
    failing: HashSet<String>,
    viewers: usize,
    loads: Vec<PendingLoad>,
}

/// Engine whose data loads complete only when a test says so.
#[derive(Clone, Default)]
pub struct MockEngine {
    log: Rc<RefCell<EngineLog>>,
}

impl MockEngine {
    pub fn fail_method(&self, method: &str) {
        self.log.borrow_mut().failing.insert(method.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.log
            .borrow()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn viewer_count(&self) -> usize {
        self.log.borrow().viewers
    }

    pub fn pending_paths(&self) -> Vec<String> {
        self.log
            .borrow()
            .loads
            .iter()
            .filter(|load| load.callback.is_some())
            .map(|load| load.path.clone())
            .collect()
    }

    pub fn complete_load(&self, path: &str) {
        self.invoke(path, || Ok(MockCloud::new(path)));
    }

    pub fn fail_load(&self, path: &str, message: &str) {
        self.invoke(path, || {
            Err(EngineError::DataLoad {
                path: path.to_string(),
                message: message.to_string(),
            })
        });
    }

    pub fn drop_load(&self, path: &str) {
        for load in self.log.borrow_mut().loads.iter_mut() {
            if load.path == path {
                load.callback = None;
            }
        }
    }

    fn invoke(&self, path: &str, outcome: impl Fn() -> Result<MockCloud, EngineError>) {
        let taken: Vec<_> = self
            .log
            .borrow_mut()
            .loads
            .iter_mut()
            .enumerate()
            .filter(|(_, load)| load.path == path)
            .filter_map(|(index, load)| load.callback.take().map(|callback| (index, callback)))
            .collect();

        for (index, mut callback) in taken {
            callback(outcome());
            self.log.borrow_mut().loads[index].callback = Some(callback);
        }
    }
}

impl EngineRuntime for MockEngine {
    type Container = MockContainer;
    type Viewer = MockViewer;

    fn create_viewer(&self, container: &MockContainer) -> Result<MockViewer, EngineError> {
        let mut log = self.log.borrow_mut();
        if log.failing.contains("create_viewer") {
            return Err(EngineError::call("create_viewer", "mock failure"));
        }
        log.viewers += 1;

        Ok(MockViewer {
            _container: container.clone(),
            log: Rc::clone(&self.log),
            distance: Cell::new(50.0),
            loaded_path: RefCell::new(None),
        })
    }
}

pub struct MockViewer {
    _container: MockContainer,
    log: Rc<RefCell<EngineLog>>,
    distance: Cell<f64>,
    loaded_path: RefCell<Option<String>>,
}

impl MockViewer {
    pub fn loaded_path(&self) -> Option<String> {
        self.loaded_path.borrow().clone()
    }

    pub fn distance(&self) -> f64 {
        self.distance.get()
    }

    pub fn set_distance(&self, distance: f64) {
        self.distance.set(distance);
    }

    fn record(&self, call: String) -> Result<(), EngineError> {
        let method = call.split('(').next().unwrap_or_default().to_string();
        let mut log = self.log.borrow_mut();
        log.calls.push(call);
        if log.failing.contains(&method) {
            return Err(EngineError::call(&method, "mock failure"));
        }
        Ok(())
    }
}

impl EngineViewer for MockViewer {
    type Cloud = MockCloud;

    fn set_edl_enabled(&self, enabled: bool) -> Result<(), EngineError> {
        self.record(format!("set_edl_enabled({enabled})"))
    }

    fn set_fov(&self, degrees: f64) -> Result<(), EngineError> {
        self.record(format!("set_fov({degrees})"))
    }

    fn set_point_budget(&self, budget: u32) -> Result<(), EngineError> {
        self.record(format!("set_point_budget({budget})"))
    }

    fn set_background(&self, background: Background) -> Result<(), EngineError> {
        self.record(format!("set_background({})", background.engine_name()))
    }

    fn load_settings_from_url(&self) -> Result<(), EngineError> {
        self.record("load_settings_from_url".to_string())
    }

    fn load_point_cloud(&self, path: &str, _name: &str, on_loaded: LoadCallback<MockCloud>) {
        let _ = self.record(format!("load_point_cloud({path})"));
        self.log.borrow_mut().loads.push(PendingLoad {
            path: path.to_string(),
            callback: Some(on_loaded),
        });
    }

    fn add_to_scene(&self, cloud: MockCloud) -> Result<(), EngineError> {
        self.record(format!("add_to_scene({})", cloud.path))?;
        *self.loaded_path.borrow_mut() = Some(cloud.path);
        Ok(())
    }

    fn place_camera(&self, _placement: &CameraPlacement) -> Result<(), EngineError> {
        self.record("place_camera".to_string())
    }

    fn set_navigation_mode(&self, mode: NavigationMode) -> Result<(), EngineError> {
        self.record(format!("set_navigation_mode({})", mode.engine_controls()))
    }

    fn install_tool(&self, tool: HelperTool) -> Result<bool, EngineError> {
        self.record(format!("install_tool({})", tool.engine_class()))?;
        Ok(true)
    }

    fn load_gui(&self, gui: &GuiSettings) -> Result<bool, EngineError> {
        self.record(format!("load_gui({})", gui.language))?;
        Ok(true)
    }

    fn fit_to_screen(&self) -> Result<(), EngineError> {
        self.record("fit_to_screen".to_string())
    }

    fn camera_distance(&self) -> Option<f64> {
        Some(self.distance.get())
    }

    fn set_camera_distance(&self, distance: f64) -> Result<(), EngineError> {
        self.record(format!("set_camera_distance({distance})"))?;
        self.distance.set(distance);
        Ok(())
    }
}

type Listeners = Rc<RefCell<Vec<(u64, Rc<dyn Fn()>)>>>;

/// Fullscreen platform that applies requests immediately and notifies
/// listeners synchronously.
#[derive(Default)]
pub struct MockFullscreen {
    element: RefCell<Option<MockContainer>>,
    deny: Cell<bool>,
    listeners: Listeners,
    next_listener: Cell<u64>,
}

pub struct MockSubscription {
    listeners: Weak<RefCell<Vec<(u64, Rc<dyn Fn()>)>>>,
    id: u64,
}

impl Drop for MockSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl MockFullscreen {
    pub fn deny_requests(&self, deny: bool) {
        self.deny.set(deny);
    }

    pub fn enter_externally(&self, container: &MockContainer) {
        *self.element.borrow_mut() = Some(container.clone());
        self.notify();
    }

    pub fn is_element(&self, container: &MockContainer) -> bool {
        self.element.borrow().as_ref() == Some(container)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn notify(&self) {
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl FullscreenApi for MockFullscreen {
    type Container = MockContainer;
    type Subscription = MockSubscription;

    fn has_fullscreen_element(&self) -> bool {
        self.element.borrow().is_some()
    }

    fn is_fullscreen_element(&self, container: &MockContainer) -> bool {
        self.is_element(container)
    }

    fn request_fullscreen(&self, container: &MockContainer) -> FullscreenFuture {
        if self.deny.get() {
            return future::ready(Err(FullscreenError::Rejected(
                "user gesture required".into(),
            )))
            .boxed_local();
        }
        *self.element.borrow_mut() = Some(container.clone());
        self.notify();
        future::ready(Ok(())).boxed_local()
    }

    fn exit_fullscreen(&self) -> FullscreenFuture {
        let previous = self.element.borrow_mut().take();
        if previous.is_none() {
            return future::ready(Err(FullscreenError::Rejected("not fullscreen".into())))
                .boxed_local();
        }
        self.notify();
        future::ready(Ok(())).boxed_local()
    }

    fn subscribe(&self, on_change: Box<dyn Fn()>) -> MockSubscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::from(on_change)));
        MockSubscription {
            listeners: Rc::downgrade(&self.listeners),
            id,
        }
    }
}

/// Shared wiring for lifecycle, control, and mount tests.
pub struct Harness {
    pub pool: LocalPool,
    pub injector: Rc<MockInjector>,
    pub engine: MockEngine,
    pub runtime: ViewerRuntime<MockEngine>,
    pub signals: SignalHub,
    pub fullscreen: Rc<MockFullscreen>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Assets load but the engine entry point never shows up.
    pub fn without_engine() -> Self {
        Self::build(false)
    }

    fn build(engine_available: bool) -> Self {
        let injector = Rc::new(MockInjector::auto_completing());
        let engine = MockEngine::default();
        let lookup = engine.clone();
        let registry = EngineRegistry::new(move || engine_available.then(|| lookup.clone()));

        Self {
            pool: LocalPool::new(),
            runtime: ViewerRuntime::new(injector.clone(), registry),
            injector,
            engine,
            signals: SignalHub::new(),
            fullscreen: Rc::new(MockFullscreen::default()),
        }
    }

    pub fn spawner(&self) -> Rc<dyn LocalSpawn> {
        Rc::new(self.pool.spawner())
    }

    pub fn controller(&self) -> ViewerLifecycleController<MockEngine> {
        ViewerLifecycleController::new(
            self.runtime.clone(),
            Rc::new(ViewerConfig::default()),
            self.spawner(),
            self.signals.clone(),
        )
    }

    pub fn mount(&self) -> ViewerMount<MockEngine, MockFullscreen> {
        ViewerMount::new(
            self.runtime.clone(),
            ViewerConfig::default(),
            Rc::clone(&self.fullscreen),
            self.spawner(),
        )
    }

    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }
}
