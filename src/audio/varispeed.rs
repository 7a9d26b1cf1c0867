// Variable-speed looped playback
// A playback-rate parameter with exponential approach, and a voice that reads
// the clip at that rate

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::clip::AudioClip;

#[derive(Debug)]
struct RateShared {
    target: AtomicU64,
    time_constant_s: AtomicU64,
}

/// Playback-rate parameter shared between the control side and the render thread
#[derive(Debug, Clone)]
pub struct RateParam {
    inner: Arc<RateShared>,
}

impl RateParam {
    pub fn new(initial: f64) -> Self {
        Self {
            inner: Arc::new(RateShared {
                target: AtomicU64::new(initial.to_bits()),
                time_constant_s: AtomicU64::new(0f64.to_bits()),
            }),
        }
    }

    /// Start approaching `rate` from the current value; 0 jumps immediately
    pub fn set_target_at_time(&self, rate: f64, time_constant_s: f64) {
        self.inner
            .time_constant_s
            .store(time_constant_s.max(0.0).to_bits(), Ordering::Release);
        self.inner.target.store(rate.to_bits(), Ordering::Release);
    }

    pub fn target(&self) -> f64 {
        f64::from_bits(self.inner.target.load(Ordering::Acquire))
    }

    pub fn time_constant_s(&self) -> f64 {
        f64::from_bits(self.inner.time_constant_s.load(Ordering::Acquire))
    }
}

/// Render-side view of a `RateParam`, advanced once per output frame.
///
/// Each frame moves `1 - exp(-dt/τ)` of the remaining distance, so the
/// rate never steps discontinuously.
#[derive(Debug)]
pub struct RateSmoother {
    param: RateParam,
    value: f64,
    frame_secs: f64,
    // (time constant, coefficient) for the last seen time constant
    coeff: (f64, f64),
}

impl RateSmoother {
    pub fn new(param: RateParam, sample_rate: u32) -> Self {
        let value = param.target();
        Self {
            param,
            value,
            frame_secs: 1.0 / sample_rate as f64,
            coeff: (0.0, 1.0),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advance one output frame and return the rate for it
    pub fn next_rate(&mut self) -> f64 {
        let target = self.param.target();
        let tau = self.param.time_constant_s();

        if tau <= 0.0 {
            self.value = target;
            return self.value;
        }

        if self.coeff.0 != tau {
            self.coeff = (tau, 1.0 - (-self.frame_secs / tau).exp());
        }
        self.value += (target - self.value) * self.coeff.1;
        self.value
    }
}

/// Reads a clip in a loop with a fractional playhead
pub struct LoopVoice {
    clip: Arc<AudioClip>,
    out_channels: usize,
    /// Clip frames per output frame at rate 1.0
    step_scale: f64,
    position: f64,
    rate: RateSmoother,
}

impl LoopVoice {
    pub fn new(clip: Arc<AudioClip>, out_channels: usize, out_rate: u32, rate: RateParam) -> Self {
        let step_scale = clip.sample_rate() as f64 / out_rate as f64;
        Self {
            clip,
            out_channels: out_channels.max(1),
            step_scale,
            position: 0.0,
            rate: RateSmoother::new(rate, out_rate),
        }
    }

    /// Back to the start of the clip
    pub fn restart(&mut self) {
        self.position = 0.0;
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> f64 {
        self.position
    }

    pub fn current_rate(&self) -> f64 {
        self.rate.value()
    }

    /// Fill an interleaved buffer, linear-interpolating between clip frames
    pub fn render(&mut self, out: &mut [f32]) {
        let frames = self.clip.frames() as f64;

        for frame in out.chunks_exact_mut(self.out_channels) {
            let index = self.position.floor();
            let frac = (self.position - index) as f32;
            let index = index as usize;

            for (channel, sample) in frame.iter_mut().enumerate() {
                let a = self.clip.sample(index, channel);
                let b = self.clip.sample(index + 1, channel);
                *sample = a + (b - a) * frac;
            }

            self.position += self.rate.next_rate() * self.step_scale;
            if self.position >= frames {
                self.position %= frames;
            }
        }
    }
}
