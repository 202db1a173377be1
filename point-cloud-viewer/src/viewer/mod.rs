//! Per-container viewer lifecycle and the controls exposed to the host UI.
//!
//! ## State machine
//!
//! ```text
//! idle ──start──> loading ──engine ready──> ready
//!                    │
//!                    └──failure──> error
//!
//! ready | error | loading ──new data path──> loading (fresh session)
//! *                       ──teardown──────> idle
//! ```
//!
//! Every session carries a token captured when it starts. Asynchronous work
//! re-checks the token before committing anything, so results for an old data
//! path or an unmounted container are dropped on the floor.

/// Zoom, reset, and fullscreen delegates acting on the live viewer.
pub mod controls;

/// Fullscreen change observation for one container.
pub mod fullscreen;

/// Session state machine and the async bootstrap task.
pub mod lifecycle;

/// Container glue binding lifecycle, fullscreen, controls, and signals.
pub mod mount;

/// Per-container session value and its state.
pub mod session;

/// Observable values published to the host UI.
pub mod signals;
