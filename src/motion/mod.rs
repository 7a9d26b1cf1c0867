// Motion input module
// Turns accelerometer events into a scalar activity level

pub mod cell;
pub mod estimator;
pub mod permission;
pub mod sample;
pub mod simulator;

pub use cell::ActivityCell;
pub use estimator::ActivityEstimator;
pub use sample::{Acceleration, DeviceMotionEvent, MotionSample};
