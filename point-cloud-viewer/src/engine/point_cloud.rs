use crate::engine::api::EngineViewer;
use crate::error::EngineError;
use crate::loading::completion::{Completion, completion};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tracing::debug;

/// Start loading `path` and return a future that resolves exactly once with
/// the engine's first reported outcome.
///
/// Further callback invocations are ignored. A callback the engine drops
/// without calling resolves as [`EngineError::Abandoned`].
pub fn load<V: EngineViewer>(
    viewer: &V,
    path: &str,
    name: &str,
) -> LocalBoxFuture<'static, Result<V::Cloud, EngineError>> {
    let (resolver, completion): (_, Completion<Result<V::Cloud, EngineError>>) = completion();
    let callback_path = path.to_string();

    viewer.load_point_cloud(
        path,
        name,
        Box::new(move |outcome| {
            if !resolver.resolve(outcome) {
                debug!("Ignoring repeated load callback for {}", callback_path);
            }
        }),
    );

    let path = path.to_string();
    completion
        .map(move |received| match received {
            Ok(outcome) => outcome,
            Err(_) => Err(EngineError::Abandoned { path }),
        })
        .boxed_local()
}
