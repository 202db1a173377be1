/// Camera distance multiplier applied on zoom in.
pub const ZOOM_IN_FACTOR: f64 = 0.8;

/// Camera distance multiplier applied on zoom out.
pub const ZOOM_OUT_FACTOR: f64 = 1.2;
