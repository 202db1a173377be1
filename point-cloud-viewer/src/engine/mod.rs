//! Boundary to the external point-cloud rendering engine.
//!
//! The engine is opaque: the crate only constructs viewers, applies display
//! settings, requests data loads, and drives the camera through the traits
//! in [`api`].

/// Engine runtime and viewer traits plus the display vocabulary they share.
pub mod api;

/// Point cloud data load wrapped into a single-resolution future.
pub mod point_cloud;

/// Process-wide, write-once reference to the engine entry point.
pub mod registry;

/// Baseline display configuration and post-load scene setup.
pub mod setup;

pub use api::{
    Background, CameraPlacement, EngineRuntime, EngineViewer, GuiSettings, HelperTool,
    LoadCallback, NavigationMode,
};
pub use registry::EngineRegistry;
