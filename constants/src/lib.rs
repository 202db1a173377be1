pub mod controls;
pub mod render_settings;
pub mod resources;
