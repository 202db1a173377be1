use crate::config::{DisplaySettings, ViewerConfig};
use crate::engine::api::EngineViewer;
use crate::error::EngineError;
use tracing::{debug, info, warn};

/// Display settings applied right after construction, before any data load.
pub fn apply_baseline<V: EngineViewer>(
    viewer: &V,
    settings: &DisplaySettings,
) -> Result<(), EngineError> {
    viewer.set_edl_enabled(settings.edl_enabled)?;
    viewer.set_fov(settings.fov)?;
    viewer.set_point_budget(settings.point_budget)?;
    viewer.set_background(settings.background)?;

    if settings.restore_url_settings {
        viewer.load_settings_from_url()?;
    }

    debug!(
        "Baseline applied: edl={} fov={} budget={} background={:?}",
        settings.edl_enabled, settings.fov, settings.point_budget, settings.background
    );
    Ok(())
}

/// Scene setup once the data has arrived.
///
/// Helper tools and the auxiliary panel are optional: failures there are
/// logged and skipped. Everything else is fatal for the session.
pub fn apply_post_load<V: EngineViewer>(
    viewer: &V,
    cloud: V::Cloud,
    config: &ViewerConfig,
) -> Result<(), EngineError> {
    viewer.add_to_scene(cloud)?;
    viewer.place_camera(&config.camera)?;
    viewer.set_navigation_mode(config.navigation_mode)?;

    for tool in &config.tools {
        match viewer.install_tool(*tool) {
            Ok(true) => debug!("Installed helper tool {:?}", tool),
            Ok(false) => debug!("Engine has no {:?} tool, skipping", tool),
            Err(error) => warn!("Helper tool {:?} failed to install: {}", tool, error),
        }
    }

    if let Some(gui) = &config.gui {
        match viewer.load_gui(gui) {
            Ok(true) => debug!("Auxiliary panel loaded ({})", gui.language),
            Ok(false) => debug!("Engine has no auxiliary panel"),
            Err(error) => warn!("Auxiliary panel failed to load: {}", error),
        }
    }

    viewer.fit_to_screen()?;
    info!("Point cloud framed and ready");
    Ok(())
}
