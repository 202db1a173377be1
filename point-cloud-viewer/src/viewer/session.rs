use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerState {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl ViewerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

/// Identifies one session. Async work holding a stale token commits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

/// The unit of lifecycle state for one mounted container.
pub struct ViewerSession<C, V> {
    token: SessionToken,
    container: C,
    data_path: String,
    state: ViewerState,
    engine_handle: Option<Rc<V>>,
    error_message: Option<String>,
}

impl<C, V> ViewerSession<C, V> {
    pub fn new(token: SessionToken, container: C, data_path: impl Into<String>) -> Self {
        Self {
            token,
            container,
            data_path: data_path.into(),
            state: ViewerState::Loading,
            engine_handle: None,
            error_message: None,
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn data_path(&self) -> &str {
        &self.data_path
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Handle of the constructed viewer, live or not.
    pub fn engine_handle(&self) -> Option<&Rc<V>> {
        self.engine_handle.as_ref()
    }

    /// Handle usable by controls: only once the session is ready.
    pub fn ready_handle(&self) -> Option<&Rc<V>> {
        match self.state {
            ViewerState::Ready => self.engine_handle.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn attach_handle(&mut self, handle: Rc<V>) {
        self.engine_handle = Some(handle);
    }

    /// `loading -> ready`. Returns `false` for every other starting state, so
    /// a second ready signal is a no-op.
    pub(crate) fn mark_ready(&mut self) -> bool {
        if self.state != ViewerState::Loading || self.engine_handle.is_none() {
            return false;
        }
        self.state = ViewerState::Ready;
        true
    }

    /// `loading -> error`. Releases the engine handle.
    pub(crate) fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.state != ViewerState::Loading {
            return false;
        }
        self.state = ViewerState::Error;
        self.error_message = Some(message.into());
        self.engine_handle = None;
        true
    }

    /// `loading -> idle` for guarded preconditions that should self-resolve.
    pub(crate) fn release_to_idle(&mut self) {
        self.state = ViewerState::Idle;
        self.engine_handle = None;
    }
}
