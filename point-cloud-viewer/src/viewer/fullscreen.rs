use crate::error::FullscreenError;
use crate::viewer::signals::SignalHub;
use futures::future::LocalBoxFuture;
use futures::task::{LocalSpawn, LocalSpawnExt};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

pub type FullscreenFuture = LocalBoxFuture<'static, Result<(), FullscreenError>>;

/// Platform fullscreen API.
pub trait FullscreenApi: 'static {
    type Container: Clone + 'static;

    /// Dropping the subscription removes the change listener.
    type Subscription: 'static;

    /// Whether any element is currently fullscreen.
    fn has_fullscreen_element(&self) -> bool;

    fn is_fullscreen_element(&self, container: &Self::Container) -> bool;

    /// May reject, e.g. without a user gesture.
    fn request_fullscreen(&self, container: &Self::Container) -> FullscreenFuture;

    fn exit_fullscreen(&self) -> FullscreenFuture;

    fn subscribe(&self, on_change: Box<dyn Fn()>) -> Self::Subscription;
}

struct CoordinatorState<F: FullscreenApi> {
    container: Option<F::Container>,
    subscription: Option<F::Subscription>,
}

/// Tracks whether one container is the fullscreen element and publishes it.
///
/// Works independently of the viewer lifecycle, so an empty or failed
/// container can still go fullscreen.
pub struct FullscreenCoordinator<F: FullscreenApi> {
    api: Rc<F>,
    state: Rc<RefCell<CoordinatorState<F>>>,
    spawner: Rc<dyn LocalSpawn>,
    signals: SignalHub,
}

impl<F: FullscreenApi> Clone for FullscreenCoordinator<F> {
    fn clone(&self) -> Self {
        Self {
            api: Rc::clone(&self.api),
            state: Rc::clone(&self.state),
            spawner: Rc::clone(&self.spawner),
            signals: self.signals.clone(),
        }
    }
}

impl<F: FullscreenApi> FullscreenCoordinator<F> {
    pub fn new(api: Rc<F>, spawner: Rc<dyn LocalSpawn>, signals: SignalHub) -> Self {
        Self {
            api,
            state: Rc::new(RefCell::new(CoordinatorState {
                container: None,
                subscription: None,
            })),
            spawner,
            signals,
        }
    }

    /// Bind to `container` and start observing change notifications.
    /// Subscribes once no matter how often it is called.
    pub fn attach(&self, container: F::Container) {
        let needs_subscription = {
            let mut state = self.state.borrow_mut();
            state.container = Some(container);
            state.subscription.is_none()
        };

        if needs_subscription {
            let subscription = self.api.subscribe(self.change_listener());
            self.state.borrow_mut().subscription = Some(subscription);
            debug!("Fullscreen change listener registered");
        }

        self.refresh();
    }

    /// Unsubscribe and forget the container.
    pub fn detach(&self) {
        let released = {
            let mut state = self.state.borrow_mut();
            state.container = None;
            state.subscription.take()
        };
        drop(released);
        self.signals.set_fullscreen(false);
    }

    pub fn container(&self) -> Option<F::Container> {
        self.state.borrow().container.clone()
    }

    /// Exit fullscreen if anything is fullscreen, otherwise request it for the
    /// bound container. Rejections are logged and leave state untouched.
    pub fn toggle(&self) {
        let Some(container) = self.container() else {
            warn!("No container bound, fullscreen toggle skipped");
            return;
        };

        let request = if self.api.has_fullscreen_element() {
            debug!("Exiting fullscreen");
            self.api.exit_fullscreen()
        } else {
            debug!("Requesting fullscreen");
            self.api.request_fullscreen(&container)
        };

        let spawned = self.spawner.spawn_local(async move {
            if let Err(rejection) = request.await {
                debug!("Fullscreen change not applied: {}", rejection);
            }
        });
        if let Err(spawn_error) = spawned {
            warn!("Could not schedule fullscreen toggle: {}", spawn_error);
        }
    }

    fn refresh(&self) {
        refresh::<F>(&self.api, &self.state, &self.signals);
    }

    fn change_listener(&self) -> Box<dyn Fn()> {
        let api: Weak<F> = Rc::downgrade(&self.api);
        let state = Rc::downgrade(&self.state);
        let signals = self.signals.clone();

        Box::new(move || {
            if let (Some(api), Some(state)) = (api.upgrade(), state.upgrade()) {
                refresh::<F>(&api, &state, &signals);
            }
        })
    }
}

fn refresh<F: FullscreenApi>(
    api: &F,
    state: &RefCell<CoordinatorState<F>>,
    signals: &SignalHub,
) {
    let is_fullscreen = state
        .borrow()
        .container
        .as_ref()
        .is_some_and(|container| api.is_fullscreen_element(container));
    signals.set_fullscreen(is_fullscreen);
}
