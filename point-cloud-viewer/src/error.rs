use thiserror::Error;

/// Hint shown under every user-facing viewer error.
pub const ERROR_HINT: &str =
    "Your browser may not support WebGL, or the point cloud path may be unreachable.";

/// A runtime asset failed to load, or the platform dropped it without a signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load resource `{identity}` from {url}")]
pub struct ResourceLoadError {
    pub identity: String,
    pub url: String,
}

/// Failures raised by the external rendering engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine call `{method}` failed: {message}")]
    Call { method: String, message: String },

    #[error("engine does not provide `{what}`")]
    Missing { what: String },

    #[error("point cloud {path} failed to load: {message}")]
    DataLoad { path: String, message: String },

    #[error("engine dropped the load for {path} without completing it")]
    Abandoned { path: String },
}

impl EngineError {
    pub fn call(method: &str, message: impl Into<String>) -> Self {
        Self::Call {
            method: method.to_string(),
            message: message.into(),
        }
    }

    pub fn missing(what: &str) -> Self {
        Self::Missing {
            what: what.to_string(),
        }
    }
}

/// Session-terminal failures, converted into the host's `error` observable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error("Could not load viewer assets")]
    Assets(#[source] ResourceLoadError),

    #[error("Viewer could not start")]
    Startup(#[source] EngineError),

    #[error("Point cloud could not be loaded")]
    DataLoad(#[source] EngineError),
}

impl ViewerError {
    /// Short message for the host's error panel.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FullscreenError {
    #[error("fullscreen request was rejected: {0}")]
    Rejected(String),

    #[error("fullscreen is not available on this platform")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid viewer configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("resource manifest is empty")]
    EmptyManifest,

    #[error("resource identity `{0}` appears more than once in the manifest")]
    DuplicateIdentity(String),

    #[error("invalid viewer configuration: {0}")]
    Invalid(String),
}
