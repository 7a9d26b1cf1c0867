// Activity estimation
// Standard deviation of acceleration magnitude over a trailing time window

use std::collections::VecDeque;

use super::sample::{DeviceMotionEvent, MotionSample};
use crate::settings::settings::MotionSettings;

/// Maintains the sliding sample window and the latest activity level.
///
/// The statistic is recomputed from the whole window on every sample. Sensor
/// rates are tens of Hz and the window is two seconds, so this stays in the
/// tens of samples. A larger window would want an incremental (Welford)
/// mean/variance updated on push and evict.
#[derive(Debug, Clone)]
pub struct ActivityEstimator {
    window: VecDeque<MotionSample>,
    window_ms: i64,
    min_samples: usize,
    newest: Option<i64>,
    activity: f64,
}

impl ActivityEstimator {
    pub fn new(settings: &MotionSettings) -> Self {
        Self {
            window: VecDeque::new(),
            window_ms: settings.window_ms,
            min_samples: settings.min_samples,
            newest: None,
            activity: 0.0,
        }
    }

    /// Add a sample, evict anything older than the window, and recompute the activity level.
    ///
    /// The window is anchored on the newest timestamp seen so far. A sample that
    /// is already outside it on arrival, or one with a non-finite magnitude, is
    /// dropped and the previous activity level is returned unchanged.
    pub fn on_sample(&mut self, sample: MotionSample) -> f64 {
        if !sample.magnitude.is_finite() {
            log::debug!("Dropping sample with non-finite magnitude at {}", sample.timestamp);
            return self.activity;
        }

        let newest = self.newest.map_or(sample.timestamp, |t| t.max(sample.timestamp));
        let cutoff = newest - self.window_ms;
        if sample.timestamp < cutoff {
            log::trace!("Dropping late sample at {} (window starts {})", sample.timestamp, cutoff);
            return self.activity;
        }

        self.newest = Some(newest);
        self.window.push_back(sample);

        // Not a front-only pop: a late arrival can sit behind newer samples
        self.window.retain(|s| s.timestamp >= cutoff);

        let activity = if self.window.len() < self.min_samples {
            0.0
        } else {
            population_std_dev(self.window.iter().map(|s| s.magnitude))
        };

        // Magnitudes near f64::MAX can still overflow the variance
        if activity.is_finite() {
            self.activity = activity;
        } else {
            log::debug!("Activity overflowed, keeping {}", self.activity);
        }

        self.activity
    }

    /// Feed a raw event; events without acceleration are dropped and return None
    pub fn on_event(
        &mut self,
        event: &DeviceMotionEvent,
        now_ms: impl FnOnce() -> i64,
    ) -> Option<f64> {
        let sample = event.to_sample(now_ms)?;
        Some(self.on_sample(sample))
    }

    /// Latest activity level (0 until enough samples have arrived)
    pub fn activity(&self) -> f64 {
        self.activity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = &MotionSample> {
        self.window.iter()
    }
}

/// Population standard deviation (divides by n, not n - 1)
pub fn population_std_dev(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let (count, sum) = values
        .clone()
        .fold((0usize, 0.0), |(n, sum), v| (n + 1, sum + v));
    if count == 0 {
        return 0.0;
    }

    let mean = sum / count as f64;
    let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
    variance.sqrt()
}
