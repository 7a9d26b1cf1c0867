// Synthetic motion source
// Stands in for a phone's accelerometer when no real events are piped in

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::sample::{Acceleration, DeviceMotionEvent};

const GRAVITY: f64 = 9.81;

/// Event rate of the simulated sensor
pub const SIMULATED_RATE_HZ: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShakeProfile {
    /// Phone lying on a table
    Still,
    /// Walking pace
    Gentle,
    /// Hard shaking: magnitude swings between 4 and 26 m/s²
    Vigorous,
}

pub struct ShakeSimulator {
    profile: ShakeProfile,
    rng: StdRng,
    tick: u64,
}

impl ShakeSimulator {
    pub fn new(profile: ShakeProfile) -> Self {
        Self::with_rng(profile, StdRng::from_entropy())
    }

    pub fn with_seed(profile: ShakeProfile, seed: u64) -> Self {
        Self::with_rng(profile, StdRng::seed_from_u64(seed))
    }

    fn with_rng(profile: ShakeProfile, rng: StdRng) -> Self {
        Self { profile, rng, tick: 0 }
    }

    pub fn profile(&self) -> ShakeProfile {
        self.profile
    }

    /// Produce the next event, stamped at `timestamp`
    pub fn next_event(&mut self, timestamp: i64) -> DeviceMotionEvent {
        let tick = self.tick;
        self.tick += 1;

        let acceleration = match self.profile {
            ShakeProfile::Still => Acceleration::new(
                self.rng.gen_range(-0.02..0.02),
                self.rng.gen_range(-0.02..0.02),
                GRAVITY,
            ),
            ShakeProfile::Gentle => Acceleration::new(
                self.rng.gen_range(-1.5..1.5),
                self.rng.gen_range(-1.5..1.5),
                GRAVITY + self.rng.gen_range(-3.0..3.0),
            ),
            ShakeProfile::Vigorous => {
                // Direction is random, magnitude alternates. Wide enough that the
                // smoothed activity clears the top band instead of creeping up on it.
                let magnitude = if tick % 2 == 0 { 4.0 } else { 26.0 };
                let x: f64 = self.rng.gen_range(-1.0..1.0);
                let y: f64 = self.rng.gen_range(-1.0..1.0);
                let z: f64 = self.rng.gen_range(0.1..1.0);
                let norm = (x * x + y * y + z * z).sqrt();
                Acceleration::new(x / norm * magnitude, y / norm * magnitude, z / norm * magnitude)
            }
        };

        DeviceMotionEvent::new(timestamp, acceleration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::estimator::ActivityEstimator;
    use crate::settings::settings::MotionSettings;

    fn activity_after(profile: ShakeProfile, seconds: i64) -> f64 {
        let mut sim = ShakeSimulator::with_seed(profile, 7);
        let mut est = ActivityEstimator::new(&MotionSettings::default());
        let step = 1000 / SIMULATED_RATE_HZ as i64;
        let mut activity = 0.0;
        for i in 0..(seconds * SIMULATED_RATE_HZ as i64) {
            let event = sim.next_event(i * step);
            activity = est.on_event(&event, || 0).unwrap();
        }
        activity
    }

    #[test]
    fn test_still_is_near_zero() {
        assert!(activity_after(ShakeProfile::Still, 3) < 0.1);
    }

    #[test]
    fn test_gentle_is_moderate() {
        let activity = activity_after(ShakeProfile::Gentle, 3);
        assert!(activity > 0.5 && activity < 10.0, "activity {}", activity);
    }

    #[test]
    fn test_vigorous_reaches_top_band() {
        assert!(activity_after(ShakeProfile::Vigorous, 3) >= 10.0);
    }
}
