use std::cell::OnceCell;
use std::rc::Rc;
use tracing::{debug, info};

/// Write-once reference to the engine entry point.
///
/// Lookups before the runtime assets have executed simply return `None`.
/// Once an entry point is found it is kept for the lifetime of the registry
/// and shared by every later session.
pub struct EngineRegistry<E> {
    entry: OnceCell<Rc<E>>,
    resolve: Box<dyn Fn() -> Option<E>>,
}

impl<E> EngineRegistry<E> {
    pub fn new(resolve: impl Fn() -> Option<E> + 'static) -> Self {
        Self {
            entry: OnceCell::new(),
            resolve: Box::new(resolve),
        }
    }

    pub fn engine(&self) -> Option<Rc<E>> {
        if let Some(engine) = self.entry.get() {
            return Some(Rc::clone(engine));
        }

        let Some(engine) = (self.resolve)() else {
            debug!("Engine entry point not available yet");
            return None;
        };

        info!("Engine entry point registered");
        Some(Rc::clone(self.entry.get_or_init(|| Rc::new(engine))))
    }
}
