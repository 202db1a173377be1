//! Viewer configuration supplied by the host page.
//!
//! Every field has a default taken from the `constants` crate, so hosts only
//! pass what they want to override:
//!
//! ```json
//! { "display": { "pointBudget": 2000000 }, "gui": { "language": "de" } }
//! ```

use crate::engine::api::{Background, CameraPlacement, GuiSettings, HelperTool, NavigationMode};
use crate::error::ConfigError;
use crate::loading::resource::{ResourceManifest, default_manifest};
use constants::controls::{ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use constants::render_settings::{
    BACKGROUND, EDL_ENABLED, FIELD_OF_VIEW, POINT_BUDGET, POINT_CLOUD_NAME, RESTORE_URL_SETTINGS,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub manifest: ResourceManifest,
    pub point_cloud_name: String,
    pub display: DisplaySettings,
    pub navigation_mode: NavigationMode,
    pub camera: CameraPlacement,
    pub tools: Vec<HelperTool>,
    pub gui: Option<GuiSettings>,
    pub zoom: ZoomSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            point_cloud_name: POINT_CLOUD_NAME.to_string(),
            display: DisplaySettings::default(),
            navigation_mode: NavigationMode::default(),
            camera: CameraPlacement::default(),
            tools: HelperTool::ALL.to_vec(),
            gui: Some(GuiSettings::default()),
            zoom: ZoomSettings::default(),
        }
    }
}

/// Baseline display settings applied to each new viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplaySettings {
    pub edl_enabled: bool,
    pub fov: f64,
    pub point_budget: u32,
    pub background: Background,
    pub restore_url_settings: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            edl_enabled: EDL_ENABLED,
            fov: FIELD_OF_VIEW,
            point_budget: POINT_BUDGET,
            background: Background::from_engine_name(BACKGROUND).unwrap_or_default(),
            restore_url_settings: RESTORE_URL_SETTINGS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomSettings {
    pub in_factor: f64,
    pub out_factor: f64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            in_factor: ZOOM_IN_FACTOR,
            out_factor: ZOOM_OUT_FACTOR,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest.is_empty() {
            return Err(ConfigError::EmptyManifest);
        }
        if let Some(identity) = self.manifest.duplicate_identity() {
            return Err(ConfigError::DuplicateIdentity(identity.to_string()));
        }

        let fov = self.display.fov;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "field of view must be between 0 and 180 degrees, got {fov}"
            )));
        }
        if self.display.point_budget == 0 {
            return Err(ConfigError::Invalid("point budget must be positive".into()));
        }

        let ZoomSettings {
            in_factor,
            out_factor,
        } = self.zoom;
        let valid_in = in_factor.is_finite() && in_factor > 0.0 && in_factor < 1.0;
        let valid_out = out_factor.is_finite() && out_factor > 1.0;
        if !valid_in || !valid_out {
            return Err(ConfigError::Invalid(format!(
                "zoom factors must satisfy 0 < in < 1 < out, got in={in_factor} out={out_factor}"
            )));
        }

        if self.point_cloud_name.trim().is_empty() {
            return Err(ConfigError::Invalid("point cloud name is empty".into()));
        }

        Ok(())
    }
}
