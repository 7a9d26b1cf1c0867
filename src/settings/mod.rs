// Settings module
// Read-only player configuration with documented defaults

pub mod settings;

pub use settings::Settings;
