use crate::engine::api::{EngineRuntime, EngineViewer};
use crate::viewer::fullscreen::{FullscreenApi, FullscreenCoordinator};
use crate::viewer::lifecycle::ViewerLifecycleController;
use tracing::{debug, trace, warn};

/// Remote control for the host UI.
///
/// Camera operations act on the live viewer only while the session is ready
/// and are silent no-ops otherwise. Fullscreen is a container concern and
/// works in every state. Nothing here changes lifecycle state.
pub struct ControlSurface<E, F>
where
    E: EngineRuntime,
    F: FullscreenApi<Container = E::Container>,
{
    lifecycle: ViewerLifecycleController<E>,
    fullscreen: FullscreenCoordinator<F>,
}

impl<E, F> ControlSurface<E, F>
where
    E: EngineRuntime,
    F: FullscreenApi<Container = E::Container>,
{
    pub fn new(
        lifecycle: ViewerLifecycleController<E>,
        fullscreen: FullscreenCoordinator<F>,
    ) -> Self {
        Self {
            lifecycle,
            fullscreen,
        }
    }

    /// Returns whether the camera moved.
    pub fn zoom_in(&self) -> bool {
        self.zoom(self.lifecycle.config().zoom.in_factor)
    }

    pub fn zoom_out(&self) -> bool {
        self.zoom(self.lifecycle.config().zoom.out_factor)
    }

    /// Frame the loaded data again.
    pub fn reset_view(&self) -> bool {
        let Some(viewer) = self.lifecycle.ready_handle() else {
            trace!("Reset ignored, viewer not ready");
            return false;
        };

        match viewer.fit_to_screen() {
            Ok(()) => true,
            Err(error) => {
                warn!("Reset view failed: {}", error);
                false
            }
        }
    }

    pub fn toggle_fullscreen(&self) {
        self.fullscreen.toggle();
    }

    fn zoom(&self, factor: f64) -> bool {
        let Some(viewer) = self.lifecycle.ready_handle() else {
            trace!("Zoom ignored, viewer not ready");
            return false;
        };

        let Some(distance) = viewer.camera_distance() else {
            debug!("Engine reports no camera distance, zoom skipped");
            return false;
        };

        match viewer.set_camera_distance(distance * factor) {
            Ok(()) => true,
            Err(error) => {
                warn!("Zoom failed: {}", error);
                false
            }
        }
    }
}
