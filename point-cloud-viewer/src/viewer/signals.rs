use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// The three observables the host UI renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSignals {
    pub loading: bool,
    pub error: Option<String>,
    pub is_fullscreen: bool,
}

type Listener = Rc<dyn Fn(&ViewerSignals)>;

#[derive(Default)]
struct HubInner {
    current: ViewerSignals,
    listeners: Vec<Listener>,
}

/// Current signal values plus their subscribers.
///
/// Listeners run after internal state is released, so they may call back into
/// the viewer.
#[derive(Clone, Default)]
pub struct SignalHub {
    inner: Rc<RefCell<HubInner>>,
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ViewerSignals {
        self.inner.borrow().current.clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&ViewerSignals) + 'static) {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub(crate) fn set_lifecycle(&self, loading: bool, error: Option<String>) {
        self.update(|signals| {
            signals.loading = loading;
            signals.error = error;
        });
    }

    pub(crate) fn set_fullscreen(&self, is_fullscreen: bool) {
        self.update(|signals| signals.is_fullscreen = is_fullscreen);
    }

    fn update(&self, change: impl FnOnce(&mut ViewerSignals)) {
        let (snapshot, listeners) = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.current.clone();
            change(&mut inner.current);
            if inner.current == before {
                return;
            }
            (inner.current.clone(), inner.listeners.clone())
        };

        for listener in listeners {
            listener(&snapshot);
        }
    }
}
