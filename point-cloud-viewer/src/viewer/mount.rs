use crate::config::ViewerConfig;
use crate::engine::api::EngineRuntime;
use crate::runtime::ViewerRuntime;
use crate::viewer::controls::ControlSurface;
use crate::viewer::fullscreen::{FullscreenApi, FullscreenCoordinator};
use crate::viewer::lifecycle::ViewerLifecycleController;
use crate::viewer::session::ViewerState;
use crate::viewer::signals::{SignalHub, ViewerSignals};
use futures::task::LocalSpawn;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Point-in-time view of one mount, as reported to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSnapshot {
    pub state: ViewerState,
    pub data_path: Option<String>,
    #[serde(flatten)]
    pub signals: ViewerSignals,
}

/// One host container with its lifecycle, fullscreen tracking, and controls.
pub struct ViewerMount<E, F>
where
    E: EngineRuntime,
    F: FullscreenApi<Container = E::Container>,
{
    container: RefCell<Option<E::Container>>,
    lifecycle: ViewerLifecycleController<E>,
    fullscreen: FullscreenCoordinator<F>,
    controls: ControlSurface<E, F>,
    signals: SignalHub,
}

impl<E, F> ViewerMount<E, F>
where
    E: EngineRuntime,
    F: FullscreenApi<Container = E::Container>,
{
    pub fn new(
        runtime: ViewerRuntime<E>,
        config: ViewerConfig,
        fullscreen_api: Rc<F>,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Self {
        let signals = SignalHub::new();
        let lifecycle = ViewerLifecycleController::new(
            runtime,
            Rc::new(config),
            Rc::clone(&spawner),
            signals.clone(),
        );
        let fullscreen = FullscreenCoordinator::new(fullscreen_api, spawner, signals.clone());
        let controls = ControlSurface::new(lifecycle.clone(), fullscreen.clone());

        Self {
            container: RefCell::new(None),
            lifecycle,
            fullscreen,
            controls,
            signals,
        }
    }

    /// Bind `container` and load `data_path` into it. A `None` container is
    /// logged and changes nothing, including any existing binding.
    pub fn mount(&self, container: Option<E::Container>, data_path: &str) {
        let Some(container) = container else {
            warn!("No container supplied, mount of {} skipped", data_path);
            return;
        };

        self.fullscreen.attach(container.clone());
        *self.container.borrow_mut() = Some(container.clone());
        self.lifecycle.start(Some(container), data_path);
    }

    /// Host changed the requested data path.
    pub fn set_data_path(&self, data_path: &str) {
        let container = self.container.borrow().clone();
        if container.is_none() {
            debug!("Data path {} requested before mount", data_path);
        }
        self.lifecycle.start(container, data_path);
    }

    pub fn unmount(&self) {
        self.lifecycle.teardown();
        self.fullscreen.detach();
        self.container.borrow_mut().take();
    }

    pub fn controls(&self) -> &ControlSurface<E, F> {
        &self.controls
    }

    pub fn lifecycle(&self) -> &ViewerLifecycleController<E> {
        &self.lifecycle
    }

    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        ViewerSnapshot {
            state: self.lifecycle.state(),
            data_path: self.lifecycle.data_path(),
            signals: self.signals.current(),
        }
    }
}
