// In-memory audio asset
// Decoded once at startup and looped for the rest of the session

use rubato::{FftFixedIn, Resampler};

use crate::error::AudioError;

/// Input chunk size for sample rate conversion
const RESAMPLE_CHUNK: usize = 1024;

fn resample_err(e: impl std::fmt::Display) -> AudioError {
    AudioError::Resample(e.to_string())
}

#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Interleaved samples
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Result<Self, AudioError> {
        if channels == 0 || samples.len() < channels {
            return Err(AudioError::Empty);
        }

        let mut samples = samples;
        // Drop a trailing partial frame
        samples.truncate(samples.len() / channels * channels);

        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Sample at `frame` on `channel`; frame indices wrap around the loop
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let frame = frame % self.frames();
        self.samples[frame * self.channels + channel.min(self.channels - 1)]
    }

    /// Convert to another sample rate; a no-op when the rates already match
    pub fn resampled(self, target_rate: u32) -> Result<Self, AudioError> {
        if target_rate == self.sample_rate {
            return Ok(self);
        }

        let frames = self.frames();
        let channels = self.channels;

        let planes: Vec<Vec<f32>> = (0..channels)
            .map(|ch| self.samples.iter().skip(ch).step_by(channels).copied().collect())
            .collect();

        let mut resampler = FftFixedIn::<f32>::new(
            self.sample_rate as usize,
            target_rate as usize,
            RESAMPLE_CHUNK,
            2,
            channels,
        )
        .map_err(resample_err)?;

        let mut out: Vec<Vec<f32>> = vec![Vec::new(); channels];
        let mut append = |chunk: Vec<Vec<f32>>| {
            for (dst, src) in out.iter_mut().zip(chunk) {
                dst.extend(src);
            }
        };

        let mut pos = 0;
        while pos + resampler.input_frames_next() <= frames {
            let n = resampler.input_frames_next();
            let chunk: Vec<&[f32]> = planes.iter().map(|p| &p[pos..pos + n]).collect();
            append(resampler.process(chunk.as_slice(), None).map_err(resample_err)?);
            pos += n;
        }
        if pos < frames {
            let chunk: Vec<&[f32]> = planes.iter().map(|p| &p[pos..]).collect();
            append(
                resampler
                    .process_partial(Some(chunk.as_slice()), None)
                    .map_err(resample_err)?,
            );
        }
        // Flush what the filter is still holding
        append(
            resampler
                .process_partial(None::<&[Vec<f32>]>, None)
                .map_err(resample_err)?,
        );

        let delay = resampler.output_delay();
        let expected = (frames as u64 * target_rate as u64 / self.sample_rate as u64) as usize;
        for plane in out.iter_mut() {
            plane.drain(..delay.min(plane.len()));
            plane.truncate(expected);
        }

        let out_frames = out.iter().map(Vec::len).min().unwrap_or(0);
        let mut samples = Vec::with_capacity(out_frames * channels);
        for frame in 0..out_frames {
            for plane in &out {
                samples.push(plane[frame]);
            }
        }

        log::debug!(
            "Resampled {} frames @ {} Hz to {} frames @ {} Hz",
            frames,
            self.sample_rate,
            out_frames,
            target_rate
        );
        Self::new(samples, channels, target_rate)
    }
}
