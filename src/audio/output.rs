// Audio output using cpal
// The device callback drains a ring buffer that the render thread fills

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use parking_lot::Mutex;
use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapRb,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::AudioError;

/// Ring length in milliseconds. Rate changes reach the speaker this much
/// later, so it is kept short.
const RING_BUFFER_MS: usize = 50;

type RingProducer = ringbuf::HeapProd<f32>;
type RingConsumer = ringbuf::HeapCons<f32>;

/// Owns the device stream; stays on the thread that created it
pub struct AudioOutput {
    _stream: Stream,
    writer: OutputWriter,
    sample_rate: u32,
    channels: u16,
}

/// Producer end of the ring, safe to move to the render thread
#[derive(Clone)]
pub struct OutputWriter {
    producer: Arc<Mutex<RingProducer>>,
    clear_flag: Arc<AtomicBool>,
}

impl AudioOutput {
    /// Open the default output device
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::OutputConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        log::info!(
            "Audio: {} @ {}Hz, {} ch",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        let ring_len = sample_rate as usize * channels as usize * RING_BUFFER_MS / 1000;
        let (producer, consumer) = HeapRb::<f32>::new(ring_len.max(1)).split();
        let consumer = Arc::new(Mutex::new(consumer));

        let clear_flag = Arc::new(AtomicBool::new(false));
        let stream_config: StreamConfig = config.config();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &stream_config, consumer, clear_flag.clone())?
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &stream_config, consumer, clear_flag.clone())?
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &stream_config, consumer, clear_flag.clone())?
            }
            format => return Err(AudioError::UnsupportedFormat(format!("{:?}", format))),
        };

        stream
            .play()
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            writer: OutputWriter::new(producer, clear_flag),
            sample_rate,
            channels,
        })
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        consumer: Arc<Mutex<RingConsumer>>,
        clear_flag: Arc<AtomicBool>,
    ) -> Result<Stream, AudioError> {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let mut consumer = consumer.lock();

                    // Drop whatever was queued before a stop
                    if clear_flag.swap(false, Ordering::SeqCst) {
                        while consumer.try_pop().is_some() {}
                    }

                    for sample in data.iter_mut() {
                        let value = consumer.try_pop().unwrap_or(0.0);
                        *sample = T::from_sample(value);
                    }
                },
                move |err| {
                    log::error!("Audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::Stream(e.to_string()))
    }

    pub fn writer(&self) -> OutputWriter {
        self.writer.clone()
    }

    /// Silence the output on the next callback
    pub fn clear(&self) {
        self.writer.clear();
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl OutputWriter {
    pub(crate) fn new(producer: RingProducer, clear_flag: Arc<AtomicBool>) -> Self {
        Self {
            producer: Arc::new(Mutex::new(producer)),
            clear_flag,
        }
    }

    /// Ask the device callback to drop everything queued so far
    pub fn clear(&self) {
        self.clear_flag.store(true, Ordering::SeqCst);
    }

    /// Write samples, returning how many fit
    pub fn write(&self, samples: &[f32]) -> usize {
        self.producer.lock().push_slice(samples)
    }

    /// Free space in the ring, in samples
    pub fn available_space(&self) -> usize {
        self.producer.lock().vacant_len()
    }
}
