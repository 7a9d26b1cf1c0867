// Speed control module
// Smoothing, the stepped speed table, and the rate actuator

pub mod actuator;
pub mod mapper;
pub mod slider;
pub mod smoothing;

pub use actuator::{Actuation, PlaybackTransport, RateActuator, SpeedSlider};
pub use mapper::{map_to_speed, SpeedBand, SpeedMapper};
pub use slider::SliderState;
pub use smoothing::ActivitySmoother;
