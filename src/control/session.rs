// Speed control session
// The two halves of one motion-to-speed loop, sharing only the target activity

use serde::Serialize;
use std::sync::Arc;

use crate::motion::sample::wall_clock_ms;
use crate::motion::{ActivityCell, ActivityEstimator, DeviceMotionEvent};
use crate::settings::Settings;
use crate::speed::{
    Actuation, ActivitySmoother, PlaybackTransport, RateActuator, SliderState, SpeedMapper,
    SpeedSlider,
};

/// Create a session: the sensor-side half and the frame-side half.
///
/// The estimator's window belongs to the ingest half alone; the frame half
/// owns the smoothed activity and the slider. The only shared state is the
/// target activity cell, written by ingest and read by the frame loop.
pub fn new_session(settings: &Settings) -> (MotionIngest, SpeedLoop) {
    let target = Arc::new(ActivityCell::new(0.0));
    let ingest = MotionIngest {
        estimator: ActivityEstimator::new(&settings.motion),
        target: Arc::clone(&target),
    };
    (ingest, SpeedLoop::new(settings, target))
}

/// Sensor side: owns the sample window
pub struct MotionIngest {
    estimator: ActivityEstimator,
    target: Arc<ActivityCell>,
}

impl MotionIngest {
    /// Handle a delivered event, stamping it with the wall clock if needed
    pub fn on_event(&mut self, event: &DeviceMotionEvent) -> Option<f64> {
        let activity = self.estimator.on_event(event, wall_clock_ms)?;
        self.target.store(activity);
        log::trace!("activity {:.3} over {} samples", activity, self.estimator.len());
        Some(activity)
    }

    pub fn target_activity(&self) -> f64 {
        self.target.load()
    }

    pub fn estimator(&self) -> &ActivityEstimator {
        &self.estimator
    }
}

/// What a single frame computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    pub target_activity: f64,
    pub current_activity: f64,
    pub target_speed: f64,
    pub actuation: Actuation,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoopSnapshot {
    pub target_activity: f64,
    pub current_activity: f64,
    pub target_speed: f64,
    pub slider_value: f64,
    pub slider_label: String,
}

/// Frame side: smoothing, mapping and actuation
pub struct SpeedLoop {
    target: Arc<ActivityCell>,
    smoother: ActivitySmoother,
    mapper: SpeedMapper,
    actuator: RateActuator,
    slider: SliderState,
}

impl SpeedLoop {
    fn new(settings: &Settings, target: Arc<ActivityCell>) -> Self {
        let mapper = SpeedMapper::new(&settings.mapping);
        let slider = SliderState::new(
            mapper.min_speed(),
            mapper.max_speed(),
            settings.playback.base_speed,
        );

        Self {
            target,
            smoother: ActivitySmoother::new(settings.smoothing.alpha),
            mapper,
            actuator: RateActuator::new(&settings.playback),
            slider,
        }
    }

    /// Run one frame: smooth toward the latest target, map, actuate
    pub fn on_frame(&mut self, transport: &dyn PlaybackTransport) -> FrameUpdate {
        let target_activity = self.target.load();
        let current_activity = self.smoother.step(target_activity);
        let target_speed = self.mapper.map(current_activity);
        let actuation = self
            .actuator
            .apply_target(target_speed, &mut self.slider, transport);

        FrameUpdate {
            target_activity,
            current_activity,
            target_speed,
            actuation,
        }
    }

    /// The user moved the slider; apply it right away, bypassing the sensor path
    pub fn on_manual_input(&mut self, value: f64, transport: &dyn PlaybackTransport) -> Option<f64> {
        self.slider.set_value(value);
        self.actuator.apply_manual(&mut self.slider, transport)
    }

    pub fn slider(&self) -> &SliderState {
        &self.slider
    }

    pub fn current_activity(&self) -> f64 {
        self.smoother.current()
    }

    pub fn snapshot(&self) -> LoopSnapshot {
        let current_activity = self.smoother.current();
        LoopSnapshot {
            target_activity: self.target.load(),
            current_activity,
            target_speed: self.mapper.map(current_activity),
            slider_value: self.slider.value(),
            slider_label: self.slider.label().to_string(),
        }
    }
}
