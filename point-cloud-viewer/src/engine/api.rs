use crate::error::EngineError;
use constants::render_settings::{CAMERA_POSITION, CAMERA_TARGET, GUI_LANGUAGE};
use serde::{Deserialize, Serialize};

/// Callback handed to the engine's data loader. The engine may call it more
/// than once or never; [`crate::engine::point_cloud::load`] tames that.
pub type LoadCallback<C> = Box<dyn FnMut(Result<C, EngineError>)>;

/// Entry point of a loaded engine runtime.
pub trait EngineRuntime: 'static {
    /// Host element a viewer renders into.
    type Container: Clone + PartialEq + 'static;
    type Viewer: EngineViewer + 'static;

    fn create_viewer(&self, container: &Self::Container) -> Result<Self::Viewer, EngineError>;
}

/// One constructed engine instance, bound to a single container.
pub trait EngineViewer {
    /// Loaded point cloud object as returned by the engine.
    type Cloud: 'static;

    fn set_edl_enabled(&self, enabled: bool) -> Result<(), EngineError>;
    fn set_fov(&self, degrees: f64) -> Result<(), EngineError>;
    fn set_point_budget(&self, budget: u32) -> Result<(), EngineError>;
    fn set_background(&self, background: Background) -> Result<(), EngineError>;

    /// Restore view settings serialised into the current navigation context.
    fn load_settings_from_url(&self) -> Result<(), EngineError>;

    /// Begin streaming the octree manifest at `path`.
    fn load_point_cloud(&self, path: &str, name: &str, on_loaded: LoadCallback<Self::Cloud>);

    fn add_to_scene(&self, cloud: Self::Cloud) -> Result<(), EngineError>;
    fn place_camera(&self, placement: &CameraPlacement) -> Result<(), EngineError>;
    fn set_navigation_mode(&self, mode: NavigationMode) -> Result<(), EngineError>;

    /// Returns `Ok(false)` when the engine does not ship this tool.
    fn install_tool(&self, tool: HelperTool) -> Result<bool, EngineError>;

    /// Returns `Ok(false)` when the engine has no auxiliary panel.
    fn load_gui(&self, gui: &GuiSettings) -> Result<bool, EngineError>;

    fn fit_to_screen(&self) -> Result<(), EngineError>;

    /// Distance from the active camera to its orbit target.
    fn camera_distance(&self) -> Option<f64>;
    fn set_camera_distance(&self, distance: f64) -> Result<(), EngineError>;
}

/// Background modes. All of them are opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    Gradient,
    Black,
    White,
    Skybox,
}

impl Background {
    pub fn engine_name(self) -> &'static str {
        match self {
            Self::Gradient => "gradient",
            Self::Black => "black",
            Self::White => "white",
            Self::Skybox => "skybox",
        }
    }

    pub fn from_engine_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gradient" => Some(Self::Gradient),
            "black" => Some(Self::Black),
            "white" => Some(Self::White),
            "skybox" => Some(Self::Skybox),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationMode {
    #[default]
    Orbit,
    Earth,
    FirstPerson,
}

impl NavigationMode {
    /// Constructor name of the matching controls class in the engine.
    pub fn engine_controls(self) -> &'static str {
        match self {
            Self::Orbit => "OrbitControls",
            Self::Earth => "EarthControls",
            Self::FirstPerson => "FirstPersonControls",
        }
    }
}

/// Measurement and annotation helpers instantiated when the engine offers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperTool {
    Measuring,
    Profile,
    Volume,
}

impl HelperTool {
    pub const ALL: [HelperTool; 3] = [Self::Measuring, Self::Profile, Self::Volume];

    pub fn engine_class(self) -> &'static str {
        match self {
            Self::Measuring => "MeasuringTool",
            Self::Profile => "ProfileTool",
            Self::Volume => "VolumeTool",
        }
    }

    /// Property name the instance is attached under on the viewer.
    pub fn viewer_property(self) -> &'static str {
        match self {
            Self::Measuring => "measuringTool",
            Self::Profile => "profileTool",
            Self::Volume => "volumeTool",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub position: [f64; 3],
    pub target: [f64; 3],
}

impl Default for CameraPlacement {
    fn default() -> Self {
        Self {
            position: CAMERA_POSITION,
            target: CAMERA_TARGET,
        }
    }
}

/// Auxiliary control panel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuiSettings {
    pub language: String,
    pub show_sidebar: bool,
}

impl Default for GuiSettings {
    fn default() -> Self {
        Self {
            language: GUI_LANGUAGE.to_string(),
            show_sidebar: false,
        }
    }
}
