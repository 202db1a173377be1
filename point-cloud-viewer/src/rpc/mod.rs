//! JSON-RPC 2.0 bridge for hosts that embed the viewer in an iframe.
//!
//! The host page drives a mounted viewer through `postMessage` and receives
//! the viewer's observables back as notifications.
//!
//! ## Message Flow
//!
//! ```text
//! Host (Parent Window)  <──postMessage──>  Viewer (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Dispatch to ViewerMount
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <──── viewer_signals notification ─────┤
//! ```
//!
//! Requests without an `id` are notifications: they run, but nothing is sent
//! back.
//!
//! ## Calling From the Host
//!
//! ```typescript
//! iframe.contentWindow.postMessage(JSON.stringify({
//!   jsonrpc: "2.0",
//!   method: "set_data_path",
//!   params: { path: "/pointclouds/site/metadata.json" },
//!   id: 1
//! }), "*");
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32700`: Parse error (response carries a null id)
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Methods
//!
//! ### Camera
//! - `zoom_in`, `zoom_out`: Scale the orbit distance; `success` is false until ready
//! - `reset_view`: Fit the loaded data to the screen
//!
//! ### Container
//! - `toggle_fullscreen`: Enter or leave fullscreen for the viewer container
//!
//! ### Session
//! - `set_data_path`: Load another point cloud into the same container
//! - `get_state`: Lifecycle state, data path, and current signals
//!
//! ### Notifications sent to the host
//! - `viewer_signals`: `{ loading, error, isFullscreen }` on every change

/// Request dispatch, response shaping, and the browser message listener.
pub mod web_rpc;
