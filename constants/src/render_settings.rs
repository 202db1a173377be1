/// Eye-dome lighting is on for every freshly constructed viewer.
pub const EDL_ENABLED: bool = true;

/// Vertical field of view in degrees.
pub const FIELD_OF_VIEW: f64 = 60.0;

/// Ceiling on the number of points the engine keeps resident at once.
/// Bounds memory and frame time on low-end devices.
pub const POINT_BUDGET: u32 = 1_000_000;

/// Background mode name understood by the engine's `setBackground`.
pub const BACKGROUND: &str = "gradient";

/// Restore camera and display settings serialised into the page URL.
pub const RESTORE_URL_SETTINGS: bool = true;

/// Name the loaded cloud is registered under in the engine scene.
pub const POINT_CLOUD_NAME: &str = "pointcloud";

/// Default camera placement applied after data load, before fitting to screen.
pub const CAMERA_POSITION: [f64; 3] = [10.0, 10.0, 10.0];
pub const CAMERA_TARGET: [f64; 3] = [0.0, 0.0, 0.0];

/// Locale of the auxiliary sidebar panel.
pub const GUI_LANGUAGE: &str = "en";
