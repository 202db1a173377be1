use crate::engine::api::EngineRuntime;
use crate::engine::registry::EngineRegistry;
use crate::loading::resource_loader::{ResourceInjector, ResourceLoader};
use std::rc::Rc;

/// Page-wide state shared by every mounted viewer: the resource loader with
/// its presence markers, and the engine registry.
pub struct ViewerRuntime<E> {
    loader: Rc<ResourceLoader>,
    registry: Rc<EngineRegistry<E>>,
}

impl<E> Clone for ViewerRuntime<E> {
    fn clone(&self) -> Self {
        Self {
            loader: Rc::clone(&self.loader),
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<E: EngineRuntime> ViewerRuntime<E> {
    pub fn new(injector: Rc<dyn ResourceInjector>, registry: EngineRegistry<E>) -> Self {
        Self {
            loader: Rc::new(ResourceLoader::new(injector)),
            registry: Rc::new(registry),
        }
    }

    pub fn loader(&self) -> &Rc<ResourceLoader> {
        &self.loader
    }

    pub fn registry(&self) -> &Rc<EngineRegistry<E>> {
        &self.registry
    }
}
