use crate::error::ResourceLoadError;
use crate::loading::resource::{ResourceDescriptor, ResourceManifest};
use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

pub type InjectFuture = LocalBoxFuture<'static, Result<(), ResourceLoadError>>;

type PendingLoad = Shared<InjectFuture>;

/// Platform seam for putting a resource into the document.
pub trait ResourceInjector {
    /// Whether a resource with this identity is already present and loaded.
    fn is_present(&self, identity: &str) -> bool;

    /// Inject the resource and resolve once its load or error signal fires.
    fn inject(&self, descriptor: &ResourceDescriptor) -> InjectFuture;
}

/// Loads resource manifests exactly once per identity.
///
/// Shared by every viewer on the page. Concurrent callers for the same
/// identity await the same in-flight load instead of injecting again.
pub struct ResourceLoader {
    injector: Rc<dyn ResourceInjector>,
    loaded: RefCell<HashSet<String>>,
    in_flight: RefCell<HashMap<String, (u64, PendingLoad)>>,
    next_attempt: Cell<u64>,
}

impl ResourceLoader {
    pub fn new(injector: Rc<dyn ResourceInjector>) -> Self {
        Self {
            injector,
            loaded: RefCell::new(HashSet::new()),
            in_flight: RefCell::new(HashMap::new()),
            next_attempt: Cell::new(0),
        }
    }

    /// Ensure every descriptor is present, in order.
    ///
    /// Descriptor N+1 is never injected before descriptor N has completed.
    /// Rejects with the first failing descriptor and does not retry it.
    pub async fn ensure_manifest_loaded(
        &self,
        manifest: &ResourceManifest,
    ) -> Result<(), ResourceLoadError> {
        for descriptor in manifest.iter() {
            if self.is_present(descriptor.identity()) {
                trace!("Resource already present: {}", descriptor.identity());
                continue;
            }

            let (attempt, pending) = self.pending_or_inject(descriptor);
            let result = pending.await;
            self.settle(descriptor.identity(), attempt, result.is_ok());

            if let Err(error) = result {
                warn!("Resource failed to load: {}", error);
                return Err(error);
            }
        }

        Ok(())
    }

    pub fn is_present(&self, identity: &str) -> bool {
        self.loaded.borrow().contains(identity) || self.injector.is_present(identity)
    }

    fn pending_or_inject(&self, descriptor: &ResourceDescriptor) -> (u64, PendingLoad) {
        let mut in_flight = self.in_flight.borrow_mut();

        if let Some((attempt, pending)) = in_flight.get(descriptor.identity()) {
            debug!("Joining in-flight load of {}", descriptor.identity());
            return (*attempt, pending.clone());
        }

        let attempt = self.next_attempt.get();
        self.next_attempt.set(attempt + 1);

        info!(
            "Injecting {:?} resource {} ({})",
            descriptor.kind(),
            descriptor.identity(),
            descriptor.url()
        );
        let pending = self.injector.inject(descriptor).shared();
        in_flight.insert(
            descriptor.identity().to_string(),
            (attempt, pending.clone()),
        );

        (attempt, pending)
    }

    /// Record the outcome of one attempt. Successful identities stay marked
    /// for the lifetime of the loader; failed ones are forgotten so a later
    /// session can try again.
    fn settle(&self, identity: &str, attempt: u64, succeeded: bool) {
        if succeeded {
            self.loaded.borrow_mut().insert(identity.to_string());
        }

        let mut in_flight = self.in_flight.borrow_mut();
        if in_flight
            .get(identity)
            .is_some_and(|(current, _)| *current == attempt)
        {
            in_flight.remove(identity);
        }
    }
}
