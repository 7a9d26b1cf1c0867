// Speed slider model
// Holds what a range input and its read-out would show

use super::actuator::SpeedSlider;

/// A clamped numeric slider with a text read-out
#[derive(Debug, Clone, PartialEq)]
pub struct SliderState {
    min: f64,
    max: f64,
    value: f64,
    label: String,
}

impl SliderState {
    pub fn new(min: f64, max: f64, initial: f64) -> Self {
        let value = initial.clamp(min, max);
        Self {
            min,
            max,
            value,
            label: sensor_label(value),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl SpeedSlider for SliderState {
    fn value(&self) -> f64 {
        self.value
    }

    /// Out-of-range values are clamped, as a range input does
    fn set_value(&mut self, value: f64) {
        if value.is_finite() {
            self.value = value.clamp(self.min, self.max);
        }
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}

/// Read-out text when the sensor path moves the slider (two decimals)
pub fn sensor_label(speed: f64) -> String {
    format!("{:.2}", speed)
}

/// Read-out text when the user moves the slider (three decimals)
pub fn manual_label(speed: f64) -> String {
    format!("{:.3}", speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_value_and_label() {
        let slider = SliderState::new(1.10, 1.35, 1.10);
        assert_eq!(slider.value(), 1.10);
        assert_eq!(slider.label(), "1.10");
    }

    #[test]
    fn test_clamps_to_range() {
        let mut slider = SliderState::new(1.10, 1.35, 1.10);
        slider.set_value(2.0);
        assert_eq!(slider.value(), 1.35);
        slider.set_value(0.5);
        assert_eq!(slider.value(), 1.10);
    }

    #[test]
    fn test_ignores_nan() {
        let mut slider = SliderState::new(1.10, 1.35, 1.20);
        slider.set_value(f64::NAN);
        assert_eq!(slider.value(), 1.20);
    }

    #[test]
    fn test_label_precision() {
        assert_eq!(sensor_label(1.25), "1.25");
        assert_eq!(manual_label(1.25), "1.250");
        assert_eq!(manual_label(1.2), "1.200");
    }
}
