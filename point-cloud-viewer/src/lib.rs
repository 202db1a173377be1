//! Bootstrap and control surface for an externally loaded point-cloud engine.
//!
//! The crate loads the engine's runtime assets on demand, binds one viewer per
//! host container, exposes zoom/reset/fullscreen controls, and tears sessions
//! down safely when the data path changes or the host unmounts mid-load.
//!
//! Everything outside [`web`] is platform-agnostic and runs natively; the
//! browser bindings are compiled only for `wasm32`.

pub mod config;
pub mod engine;
pub mod error;
pub mod loading;
pub mod rpc;
pub mod runtime;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ViewerConfig;
pub use error::{ConfigError, EngineError, FullscreenError, ResourceLoadError, ViewerError};
pub use runtime::ViewerRuntime;
pub use viewer::mount::{ViewerMount, ViewerSnapshot};
pub use viewer::session::ViewerState;
pub use viewer::signals::{SignalHub, ViewerSignals};
