// Rate actuation
// Pushes a target speed to the slider and to the live playback rate

use super::slider::{manual_label, sensor_label};
use crate::settings::settings::PlaybackSettings;

/// The slider and its read-out
pub trait SpeedSlider {
    fn value(&self) -> f64;
    fn set_value(&mut self, value: f64);
    fn set_label(&mut self, label: String);
}

/// The audio side the actuator drives
pub trait PlaybackTransport {
    fn is_playing(&self) -> bool;

    /// Approach `rate` exponentially with the given time constant rather than jumping to it
    fn set_rate_target(&self, rate: f64, time_constant_s: f64);
}

/// What one actuation changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actuation {
    pub slider_moved: bool,
    /// Playback rate handed to the transport, if it was playing
    pub rate: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RateActuator {
    base_speed: f64,
    time_constant_s: f64,
    slider_epsilon: f64,
}

impl RateActuator {
    pub fn new(settings: &PlaybackSettings) -> Self {
        Self {
            base_speed: settings.base_speed,
            time_constant_s: settings.time_constant_s,
            slider_epsilon: settings.slider_epsilon,
        }
    }

    /// Playback rate multiplier for a speed value
    pub fn rate_for(&self, speed: f64) -> f64 {
        speed / self.base_speed
    }

    /// Sensor path, once per frame.
    ///
    /// The slider only moves when it is more than the epsilon away from the
    /// target, so sub-threshold jitter doesn't fight a drag in progress.
    pub fn apply_target(
        &self,
        target_speed: f64,
        slider: &mut dyn SpeedSlider,
        transport: &dyn PlaybackTransport,
    ) -> Actuation {
        let slider_moved = (slider.value() - target_speed).abs() > self.slider_epsilon;
        if slider_moved {
            slider.set_value(target_speed);
            slider.set_label(sensor_label(target_speed));
        }

        Actuation {
            slider_moved,
            rate: self.drive(target_speed, transport),
        }
    }

    /// Manual path: the slider has already been moved by the user.
    ///
    /// This is only a momentary priority. The next frame's sensor-derived
    /// target overwrites it once it differs by more than the epsilon.
    pub fn apply_manual(
        &self,
        slider: &mut dyn SpeedSlider,
        transport: &dyn PlaybackTransport,
    ) -> Option<f64> {
        let speed = slider.value();
        slider.set_label(manual_label(speed));
        self.drive(speed, transport)
    }

    fn drive(&self, speed: f64, transport: &dyn PlaybackTransport) -> Option<f64> {
        if !transport.is_playing() {
            return None;
        }

        let rate = self.rate_for(speed);
        transport.set_rate_target(rate, self.time_constant_s);
        Some(rate)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::speed::slider::SliderState;
    use std::cell::{Cell, RefCell};

    /// Records every rate target it is handed
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        pub playing: Cell<bool>,
        pub targets: RefCell<Vec<(f64, f64)>>,
    }

    impl FakeTransport {
        pub fn playing() -> Self {
            let transport = Self::default();
            transport.playing.set(true);
            transport
        }

        pub fn last_rate(&self) -> Option<f64> {
            self.targets.borrow().last().map(|(rate, _)| *rate)
        }
    }

    impl PlaybackTransport for FakeTransport {
        fn is_playing(&self) -> bool {
            self.playing.get()
        }

        fn set_rate_target(&self, rate: f64, time_constant_s: f64) {
            self.targets.borrow_mut().push((rate, time_constant_s));
        }
    }

    fn slider() -> SliderState {
        SliderState::new(1.10, 1.35, 1.10)
    }

    fn actuator() -> RateActuator {
        RateActuator::new(&PlaybackSettings::default())
    }

    #[test]
    fn test_moves_slider_past_epsilon() {
        let mut slider = slider();
        let transport = FakeTransport::default();
        let result = actuator().apply_target(1.25, &mut slider, &transport);

        assert!(result.slider_moved);
        assert_eq!(slider.value(), 1.25);
        assert_eq!(slider.label(), "1.25");
    }

    #[test]
    fn test_leaves_slider_within_epsilon() {
        let mut slider = slider();
        slider.set_value(1.205);
        slider.set_label("1.205".to_string());

        let transport = FakeTransport::default();
        let result = actuator().apply_target(1.20, &mut slider, &transport);

        assert!(!result.slider_moved);
        assert_eq!(slider.value(), 1.205);
        assert_eq!(slider.label(), "1.205");
    }

    #[test]
    fn test_drives_rate_only_while_playing() {
        let mut slider = slider();
        let transport = FakeTransport::default();
        let actuator = actuator();

        assert_eq!(actuator.apply_target(1.10, &mut slider, &transport).rate, None);
        assert!(transport.targets.borrow().is_empty());

        transport.playing.set(true);
        let rate = actuator.apply_target(1.32, &mut slider, &transport).rate.unwrap();
        assert!((rate - 1.2).abs() < 1e-12);

        let (applied, tau) = transport.targets.borrow()[0];
        assert!((applied - 1.2).abs() < 1e-12);
        assert!((tau - 0.015).abs() < 1e-12);
    }

    #[test]
    fn test_rate_applied_even_when_slider_unchanged() {
        let mut slider = slider();
        let transport = FakeTransport::playing();
        let result = actuator().apply_target(1.10, &mut slider, &transport);

        assert!(!result.slider_moved);
        assert!((transport.last_rate().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_manual_uses_slider_value() {
        let mut slider = slider();
        slider.set_value(1.21);
        let transport = FakeTransport::playing();

        let rate = actuator().apply_manual(&mut slider, &transport).unwrap();
        assert!((rate - 1.1).abs() < 1e-12);
        assert_eq!(slider.label(), "1.210");
    }

    #[test]
    fn test_manual_while_stopped_only_updates_label() {
        let mut slider = slider();
        slider.set_value(1.3);
        let transport = FakeTransport::default();

        assert_eq!(actuator().apply_manual(&mut slider, &transport), None);
        assert_eq!(slider.label(), "1.300");
        assert!(transport.targets.borrow().is_empty());
    }
}
