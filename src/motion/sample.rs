// Motion event and sample types
use serde::{Deserialize, Serialize};

/// Three-axis acceleration including gravity, in m/s²
///
/// Axes missing from the delivered event count as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Acceleration {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Acceleration {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the vector
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A device-motion event as delivered by the sensor collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMotionEvent {
    /// Delivery time in milliseconds; stamped from the wall clock when absent
    #[serde(default)]
    pub timestamp: Option<i64>,

    #[serde(
        default,
        rename = "accelerationIncludingGravity",
        alias = "acceleration_including_gravity"
    )]
    pub acceleration_including_gravity: Option<Acceleration>,
}

impl DeviceMotionEvent {
    pub fn new(timestamp: i64, acceleration: Acceleration) -> Self {
        Self {
            timestamp: Some(timestamp),
            acceleration_including_gravity: Some(acceleration),
        }
    }

    /// Convert into a sample, or None if the event carries no acceleration
    /// or its magnitude is not a finite number
    pub fn to_sample(&self, now_ms: impl FnOnce() -> i64) -> Option<MotionSample> {
        let magnitude = self.acceleration_including_gravity?.magnitude();
        if !magnitude.is_finite() {
            return None;
        }
        Some(MotionSample {
            timestamp: self.timestamp.unwrap_or_else(now_ms),
            magnitude,
        })
    }
}

/// One magnitude reading, immutable once created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub timestamp: i64,
    pub magnitude: f64,
}

impl MotionSample {
    pub fn new(timestamp: i64, magnitude: f64) -> Self {
        Self { timestamp, magnitude }
    }
}

/// Milliseconds since the Unix epoch
pub fn wall_clock_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
