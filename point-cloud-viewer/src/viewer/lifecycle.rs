use crate::config::ViewerConfig;
use crate::engine::api::EngineRuntime;
use crate::engine::registry::EngineRegistry;
use crate::engine::{point_cloud, setup};
use crate::error::{EngineError, ViewerError};
use crate::loading::resource_loader::ResourceLoader;
use crate::runtime::ViewerRuntime;
use crate::viewer::session::{SessionToken, ViewerSession, ViewerState};
use crate::viewer::signals::SignalHub;
use futures::task::{LocalSpawn, LocalSpawnExt};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, warn};

type Session<E> = ViewerSession<<E as EngineRuntime>::Container, <E as EngineRuntime>::Viewer>;

struct ControllerInner<E: EngineRuntime> {
    session: Option<Session<E>>,
    next_token: u64,
}

/// Owns the single live [`ViewerSession`] of one container.
///
/// Bootstrap work runs as a spawned task that only holds a weak reference to
/// the controller state plus its session token. Tearing down or replacing the
/// session therefore releases the container and engine handle immediately,
/// and whatever the task produces later is discarded.
pub struct ViewerLifecycleController<E: EngineRuntime> {
    inner: Rc<RefCell<ControllerInner<E>>>,
    runtime: ViewerRuntime<E>,
    config: Rc<ViewerConfig>,
    spawner: Rc<dyn LocalSpawn>,
    signals: SignalHub,
}

impl<E: EngineRuntime> Clone for ViewerLifecycleController<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            runtime: self.runtime.clone(),
            config: Rc::clone(&self.config),
            spawner: Rc::clone(&self.spawner),
            signals: self.signals.clone(),
        }
    }
}

impl<E: EngineRuntime> ViewerLifecycleController<E> {
    pub fn new(
        runtime: ViewerRuntime<E>,
        config: Rc<ViewerConfig>,
        spawner: Rc<dyn LocalSpawn>,
        signals: SignalHub,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ControllerInner {
                session: None,
                next_token: 0,
            })),
            runtime,
            config,
            spawner,
            signals,
        }
    }

    /// `idle -> loading`.
    ///
    /// Short-circuits when the same container is already loading or showing
    /// `data_path`. A missing container is logged and ignored.
    pub fn start(&self, container: Option<E::Container>, data_path: &str) {
        let Some(container) = container else {
            warn!("No container bound, viewer start skipped");
            return;
        };

        if data_path.trim().is_empty() {
            debug!("Empty data path, nothing to load");
            self.teardown();
            return;
        }

        let already_initialised = self.inner.borrow().session.as_ref().is_some_and(|session| {
            matches!(session.state(), ViewerState::Loading | ViewerState::Ready)
                && session.container() == &container
                && session.data_path() == data_path
        });
        if already_initialised {
            debug!("Viewer already initialised for {}", data_path);
            return;
        }

        self.begin(container, data_path);
    }

    /// Switch the bound container to a new data path, abandoning any load
    /// still running for the previous one.
    pub fn reset(&self, data_path: &str) {
        let container = self
            .inner
            .borrow()
            .session
            .as_ref()
            .map(|session| session.container().clone());

        match container {
            Some(container) => self.start(Some(container), data_path),
            None => debug!("No session to reset, ignoring data path {}", data_path),
        }
    }

    /// `* -> idle`. Drops every reference to the container and engine handle;
    /// in-flight work for the old session becomes a no-op.
    pub fn teardown(&self) {
        let previous = self.inner.borrow_mut().session.take();
        if let Some(session) = previous {
            info!(
                "Viewer session for {} torn down in state {:?}",
                session.data_path(),
                session.state()
            );
        }
        publish(&self.inner, &self.signals);
    }

    pub fn state(&self) -> ViewerState {
        self.inner
            .borrow()
            .session
            .as_ref()
            .map_or(ViewerState::Idle, ViewerSession::state)
    }

    pub fn data_path(&self) -> Option<String> {
        self.inner
            .borrow()
            .session
            .as_ref()
            .map(|session| session.data_path().to_string())
    }

    pub fn error_message(&self) -> Option<String> {
        self.inner
            .borrow()
            .session
            .as_ref()
            .and_then(|session| session.error_message().map(str::to_string))
    }

    pub fn container(&self) -> Option<E::Container> {
        self.inner
            .borrow()
            .session
            .as_ref()
            .map(|session| session.container().clone())
    }

    /// The live viewer, only while the session is `ready`.
    pub fn ready_handle(&self) -> Option<Rc<E::Viewer>> {
        self.inner
            .borrow()
            .session
            .as_ref()
            .and_then(|session| session.ready_handle().cloned())
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    fn begin(&self, container: E::Container, data_path: &str) {
        let token = {
            let mut inner = self.inner.borrow_mut();
            let token = SessionToken::new(inner.next_token);
            inner.next_token += 1;

            let previous = inner
                .session
                .replace(ViewerSession::new(token, container, data_path));
            if let Some(previous) = previous {
                debug!(
                    "Replacing session for {} ({:?})",
                    previous.data_path(),
                    previous.state()
                );
            }
            token
        };

        info!("Viewer session started for {}", data_path);
        publish(&self.inner, &self.signals);

        let task = SessionTask {
            inner: Rc::downgrade(&self.inner),
            loader: Rc::clone(self.runtime.loader()),
            registry: Rc::clone(self.runtime.registry()),
            config: Rc::clone(&self.config),
            signals: self.signals.clone(),
            token,
            data_path: data_path.to_string(),
        };

        if let Err(spawn_error) = self.spawner.spawn_local(task.run()) {
            error!("Could not schedule viewer bootstrap: {}", spawn_error);
            let message = ViewerError::Startup(EngineError::call(
                "spawn",
                spawn_error.to_string(),
            ))
            .user_message();
            commit(&Rc::downgrade(&self.inner), &self.signals, token, |session| {
                session.fail(message)
            });
        }
    }
}

/// The asynchronous half of a session: assets, construction, data load.
struct SessionTask<E: EngineRuntime> {
    inner: Weak<RefCell<ControllerInner<E>>>,
    loader: Rc<ResourceLoader>,
    registry: Rc<EngineRegistry<E>>,
    config: Rc<ViewerConfig>,
    signals: SignalHub,
    token: SessionToken,
    data_path: String,
}

impl<E: EngineRuntime> SessionTask<E> {
    async fn run(self) {
        if let Err(load_error) = self.loader.ensure_manifest_loaded(&self.config.manifest).await {
            self.fail(ViewerError::Assets(load_error));
            return;
        }

        let Some(container) = self.with_session(|session| session.container().clone()) else {
            debug!("Session for {} went stale while assets loaded", self.data_path);
            return;
        };

        let Some(engine) = self.registry.engine() else {
            warn!("Engine entry point missing after assets loaded, viewer left idle");
            self.with_session(ViewerSession::release_to_idle);
            return;
        };

        let constructed = engine.create_viewer(&container).and_then(|viewer| {
            setup::apply_baseline(&viewer, &self.config.display)?;
            Ok(viewer)
        });
        drop(container);
        let viewer = match constructed {
            Ok(viewer) => viewer,
            Err(engine_error) => {
                self.fail(ViewerError::Startup(engine_error));
                return;
            }
        };

        let loading = point_cloud::load(&viewer, &self.data_path, &self.config.point_cloud_name);
        let viewer = Rc::new(viewer);
        if self
            .with_session(|session| session.attach_handle(Rc::clone(&viewer)))
            .is_none()
        {
            debug!("Session for {} went stale during construction", self.data_path);
            return;
        }
        drop(viewer);

        let outcome = loading.await;

        let Some(viewer) = self
            .with_session(|session| session.engine_handle().cloned())
            .flatten()
        else {
            debug!("Discarding stale load result for {}", self.data_path);
            return;
        };

        match outcome {
            Ok(cloud) => match setup::apply_post_load(viewer.as_ref(), cloud, &self.config) {
                Ok(()) => {
                    if self.with_session(ViewerSession::mark_ready) == Some(true) {
                        info!("Viewer ready for {}", self.data_path);
                    }
                }
                Err(engine_error) => self.fail(ViewerError::Startup(engine_error)),
            },
            Err(engine_error) => self.fail(ViewerError::DataLoad(engine_error)),
        }
    }

    fn with_session<R>(&self, change: impl FnOnce(&mut Session<E>) -> R) -> Option<R> {
        commit(&self.inner, &self.signals, self.token, change)
    }

    fn fail(&self, viewer_error: ViewerError) {
        let message = viewer_error.user_message();
        let detail = std::error::Error::source(&viewer_error)
            .map(ToString::to_string)
            .unwrap_or_default();

        if self.with_session(|session| session.fail(message)) == Some(true) {
            error!(
                "Viewer session for {} failed: {} ({})",
                self.data_path, viewer_error, detail
            );
        } else {
            debug!(
                "Dropping failure for stale session {}: {}",
                self.data_path, detail
            );
        }
    }
}

/// Apply `change` to the session if `token` is still current, then publish.
fn commit<E: EngineRuntime, R>(
    inner: &Weak<RefCell<ControllerInner<E>>>,
    signals: &SignalHub,
    token: SessionToken,
    change: impl FnOnce(&mut Session<E>) -> R,
) -> Option<R> {
    let inner = inner.upgrade()?;
    let result = {
        let mut state = inner.borrow_mut();
        let session = state
            .session
            .as_mut()
            .filter(|session| session.token() == token)?;
        change(session)
    };
    publish(&inner, signals);
    Some(result)
}

fn publish<E: EngineRuntime>(inner: &RefCell<ControllerInner<E>>, signals: &SignalHub) {
    let (loading, error_message) = match &inner.borrow().session {
        Some(session) => (
            session.state() == ViewerState::Loading,
            session.error_message().map(str::to_string),
        ),
        None => (false, None),
    };
    signals.set_lifecycle(loading, error_message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Harness, MockContainer};

    const CLOUD_A: &str = "/a/cloud.json";
    const CLOUD_B: &str = "/b/cloud.json";

    #[test]
    fn loads_to_ready() {
        let mut harness = Harness::new();
        let controller = harness.controller();
        let container = MockContainer::new("viewer");

        controller.start(Some(container), CLOUD_A);
        assert_eq!(controller.state(), ViewerState::Loading);
        assert!(harness.signals.current().loading);

        harness.settle();
        assert_eq!(harness.engine.viewer_count(), 1);
        assert_eq!(controller.state(), ViewerState::Loading);
        assert!(controller.ready_handle().is_none());

        harness.engine.complete_load(CLOUD_A);
        harness.settle();

        assert_eq!(controller.state(), ViewerState::Ready);
        assert!(!harness.signals.current().loading);
        assert_eq!(harness.signals.current().error, None);
        assert_eq!(
            controller.ready_handle().map(|viewer| viewer.loaded_path()),
            Some(Some(CLOUD_A.to_string()))
        );
    }

    #[test]
    fn stale_completion_never_reaches_ready() {
        let mut harness = Harness::new();
        let controller = harness.controller();

        controller.start(Some(MockContainer::new("viewer")), CLOUD_A);
        harness.settle();
        controller.reset(CLOUD_B);
        harness.settle();

        harness.engine.complete_load(CLOUD_A);
        harness.settle();
        assert_eq!(controller.state(), ViewerState::Loading);
        assert_eq!(controller.data_path().as_deref(), Some(CLOUD_B));

        harness.engine.complete_load(CLOUD_B);
        harness.settle();
        assert_eq!(controller.state(), ViewerState::Ready);
        assert_eq!(
            controller.ready_handle().and_then(|viewer| viewer.loaded_path()),
            Some(CLOUD_B.to_string())
        );
        assert_eq!(harness.engine.count_calls("add_to_scene"), 1);
    }

    #[test]
    fn reset_before_assets_finish_skips_the_old_viewer() {
        let mut harness = Harness::new();
        let controller = harness.controller();

        controller.start(Some(MockContainer::new("viewer")), CLOUD_A);
        controller.reset(CLOUD_B);
        harness.settle();

        assert_eq!(harness.engine.viewer_count(), 1);
        assert_eq!(harness.engine.pending_paths(), vec![CLOUD_B.to_string()]);
    }

    #[test]
    fn asset_failure_is_terminal() {
        let mut harness = Harness::new();
        harness.injector.fail_on("potree-script");
        let controller = harness.controller();

        controller.start(Some(MockContainer::new("viewer")), CLOUD_A);
        harness.settle();

        assert_eq!(controller.state(), ViewerState::Error);
        assert_eq!(
            harness.signals.current().error.as_deref(),
            Some("Could not load viewer assets")
        );
        assert!(!harness.signals.current().loading);
        assert_eq!(harness.engine.viewer_count(), 0);
    }

    #[test]
    fn construction_failure_reports_startup_error() {
        let mut harness = Harness::new();
        harness.engine.fail_method("set_point_budget");
        let controller = harness.controller();

        controller.start(Some(MockContainer::new("viewer")), CLOUD_A);
        harness.settle();

        assert_eq!(controller.state(), ViewerState::Error);
        assert_eq!(
            controller.error_message().as_deref(),
            Some("Viewer could not start")
        );
        assert!(harness.engine.pending_paths().is_empty());
    }

    #[test]
    fn data_load_failure_reports_error() {
        let mut harness = Harness::new();
        let controller = harness.controller();

        controller.start(Some(MockContainer::new("viewer")), CLOUD_A);
        harness.settle();
        harness.engine.fail_load(CLOUD_A, "404");
        harness.settle();

        assert_eq!(controller.state(), ViewerState::Error);
        assert_eq!(
            controller.error_message().as_deref(),
            Some("Point cloud could not be loaded")
        );
    }

    #[test]
    fn teardown_mid_load_discards_completion_and_releases_container() {
        let mut harness = Harness::new();
        let controller = harness.controller();
        let container = MockContainer::new("viewer");
        let weak = container.downgrade();

        controller.start(Some(container), CLOUD_A);
        harness.settle();
        controller.teardown();

        assert_eq!(controller.state(), ViewerState::Idle);
        assert!(weak.upgrade().is_none());

        harness.engine.complete_load(CLOUD_A);
        harness.settle();
        assert_eq!(controller.state(), ViewerState::Idle);
        assert_eq!(harness.engine.count_calls("add_to_scene"), 0);
        assert!(!harness.signals.current().loading);
    }

    #[test]
    fn second_start_for_same_path_is_short_circuited() {
        let mut harness = Harness::new();
        let controller = harness.controller();
        let container = MockContainer::new("viewer");

        controller.start(Some(container.clone()), CLOUD_A);
        controller.start(Some(container.clone()), CLOUD_A);
        harness.settle();
        harness.engine.complete_load(CLOUD_A);
        harness.settle();
        controller.start(Some(container), CLOUD_A);
        harness.settle();

        assert_eq!(harness.engine.viewer_count(), 1);
        assert_eq!(controller.state(), ViewerState::Ready);
    }

    #[test]
    fn repeated_engine_ready_is_a_no_op() {
        let mut harness = Harness::new();
        let controller = harness.controller();

        controller.start(Some(MockContainer::new("viewer")), CLOUD_A);
        harness.settle();
        harness.engine.complete_load(CLOUD_A);
        harness.engine.complete_load(CLOUD_A);
        harness.settle();

        assert_eq!(controller.state(), ViewerState::Ready);
        assert_eq!(harness.engine.count_calls("fit_to_screen"), 1);
    }

    #[test]
    fn missing_engine_leaves_session_idle_without_error() {
        let mut harness = Harness::without_engine();
        let controller = harness.controller();

        controller.start(Some(MockContainer::new("viewer")), CLOUD_A);
        harness.settle();

        assert_eq!(controller.state(), ViewerState::Idle);
        assert_eq!(harness.signals.current().error, None);
        assert!(!harness.signals.current().loading);
    }

    #[test]
    fn missing_container_is_ignored() {
        let mut harness = Harness::new();
        let controller = harness.controller();

        controller.start(None, CLOUD_A);
        harness.settle();

        assert_eq!(controller.state(), ViewerState::Idle);
        assert_eq!(harness.injector.injected().len(), 0);
    }

    #[test]
    fn restart_after_error_begins_a_fresh_session() {
        let mut harness = Harness::new();
        let controller = harness.controller();
        let container = MockContainer::new("viewer");

        controller.start(Some(container.clone()), CLOUD_A);
        harness.settle();
        harness.engine.fail_load(CLOUD_A, "timeout");
        harness.settle();
        assert_eq!(controller.state(), ViewerState::Error);

        controller.start(Some(container), CLOUD_A);
        assert_eq!(controller.state(), ViewerState::Loading);
        assert_eq!(harness.signals.current().error, None);
        harness.settle();
        harness.engine.complete_load(CLOUD_A);
        harness.settle();

        assert_eq!(harness.engine.viewer_count(), 2);
        assert_eq!(controller.state(), ViewerState::Ready);
    }

    #[test]
    fn empty_data_path_tears_down() {
        let mut harness = Harness::new();
        let controller = harness.controller();

        controller.start(Some(MockContainer::new("viewer")), CLOUD_A);
        harness.settle();
        controller.reset("");

        assert_eq!(controller.state(), ViewerState::Idle);
        assert_eq!(controller.data_path(), None);
    }
}
