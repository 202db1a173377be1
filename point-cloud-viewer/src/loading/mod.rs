//! Runtime asset loading for the external rendering engine.
//!
//! Resources are injected strictly in manifest order, each at most once per
//! identity, no matter how many viewers request the manifest concurrently.

/// Single-resolution completion wrapper for callback-style platform APIs.
///
/// Resolves exactly once even when the underlying callback fires repeatedly.
pub mod completion;

/// Resource descriptors and the ordered manifest.
pub mod resource;

/// Idempotent, sequential manifest loader and its injection seam.
pub mod resource_loader;

pub use completion::{Abandoned, Completion, Resolver, completion};
pub use resource::{ResourceDescriptor, ResourceKind, ResourceManifest};
pub use resource_loader::{InjectFuture, ResourceInjector, ResourceLoader};
