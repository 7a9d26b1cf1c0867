// Activity-to-speed mapping
// Six fixed bands instead of a continuous curve so the tempo doesn't twitch

use serde::{Deserialize, Serialize};

use crate::settings::settings::MappingSettings;

/// Activity below `upper` (exclusive) maps to `speed`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBand {
    pub upper: f64,
    pub speed: f64,
}

impl SpeedBand {
    pub const fn new(upper: f64, speed: f64) -> Self {
        Self { upper, speed }
    }
}

/// Default table: [0,2) 1.10, [2,4) 1.15, [4,6) 1.20, [6,8) 1.25, [8,10) 1.30, [10,∞) 1.35
pub const DEFAULT_BANDS: [SpeedBand; 5] = [
    SpeedBand::new(2.0, 1.10),
    SpeedBand::new(4.0, 1.15),
    SpeedBand::new(6.0, 1.20),
    SpeedBand::new(8.0, 1.25),
    SpeedBand::new(10.0, 1.30),
];
pub const DEFAULT_CEILING_SPEED: f64 = 1.35;

#[derive(Debug, Clone)]
pub struct SpeedMapper {
    bands: Vec<SpeedBand>,
    ceiling_speed: f64,
}

impl SpeedMapper {
    pub fn new(settings: &MappingSettings) -> Self {
        Self {
            bands: settings.bands.clone(),
            ceiling_speed: settings.ceiling_speed,
        }
    }

    /// First band whose upper bound exceeds `activity`, else the ceiling
    pub fn map(&self, activity: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| activity < band.upper)
            .map(|band| band.speed)
            .unwrap_or(self.ceiling_speed)
    }

    pub fn min_speed(&self) -> f64 {
        self.bands
            .iter()
            .map(|b| b.speed)
            .fold(self.ceiling_speed, f64::min)
    }

    pub fn max_speed(&self) -> f64 {
        self.bands
            .iter()
            .map(|b| b.speed)
            .fold(self.ceiling_speed, f64::max)
    }
}

impl Default for SpeedMapper {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS.to_vec(),
            ceiling_speed: DEFAULT_CEILING_SPEED,
        }
    }
}

/// Map with the default table
pub fn map_to_speed(activity: f64) -> f64 {
    SpeedMapper::default().map(activity)
}
