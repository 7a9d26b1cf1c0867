// First-order low-pass filter over the activity level, stepped once per frame

#[derive(Debug, Clone)]
pub struct ActivitySmoother {
    alpha: f64,
    current: f64,
}

impl ActivitySmoother {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, current: 0.0 }
    }

    /// Move the smoothed value a fraction `alpha` of the way toward `target`.
    /// A non-finite target leaves the value where it is.
    pub fn step(&mut self, target: f64) -> f64 {
        if target.is_finite() {
            self.current += (target - self.current) * self.alpha;
        }
        self.current
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}
