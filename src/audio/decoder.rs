// Audio decoder using Symphonia
// Decodes the asset once into interleaved f32 PCM

use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::clip::AudioClip;
use crate::error::AudioError;

pub struct AudioDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    buffer: Option<SampleBuffer<f32>>,
}

impl AudioDecoder {
    /// Open an audio file and prepare for decoding
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let file = File::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint using the file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(AudioError::Probe)?;
        let format = probed.format;

        // First decodable track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(AudioError::NoTrack)?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2);

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(AudioError::Codec)?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            buffer: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Decode the next packet as interleaved samples; None at end of stream
    pub fn decode_next(&mut self) -> Result<Option<&[f32]>, AudioError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(AudioError::Read(e)),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
                Err(e) => return Err(AudioError::Read(e)),
            };

            // Packets can report the real layout even when the header didn't
            let spec = *decoded.spec();
            self.sample_rate = spec.rate;
            self.channels = spec.channels.count();

            let needed = decoded.capacity() * self.channels;
            if self.buffer.as_ref().is_some_and(|b| b.capacity() < needed) {
                self.buffer = None;
            }
            let capacity = decoded.capacity() as u64;
            let buffer = self
                .buffer
                .get_or_insert_with(|| SampleBuffer::new(capacity, spec));
            buffer.copy_interleaved_ref(decoded);
            return Ok(Some(buffer.samples()));
        }
    }

    /// Decode the whole stream into memory
    pub fn decode_all(mut self) -> Result<AudioClip, AudioError> {
        let mut samples = Vec::new();
        while let Some(chunk) = self.decode_next()? {
            samples.extend_from_slice(chunk);
        }
        AudioClip::new(samples, self.channels, self.sample_rate)
    }
}

/// Load an asset file into a clip
pub fn load_clip(path: &Path) -> Result<AudioClip, AudioError> {
    let decoder = AudioDecoder::open(path)?;
    log::info!(
        "Decoding {:?} ({} Hz, {} ch)",
        path,
        decoder.sample_rate(),
        decoder.channels()
    );
    decoder.decode_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_open_error() {
        let path = std::env::temp_dir().join("shakeplay-no-such-asset.wav");
        assert!(matches!(
            AudioDecoder::open(&path),
            Err(AudioError::Open { .. })
        ));
    }

    #[test]
    fn test_decodes_wav() {
        // 16-bit mono PCM, 8 frames at 8 kHz
        let frames: [i16; 8] = [0, 8192, 16384, 8192, 0, -8192, -16384, -8192];
        let data_len = (frames.len() * 2) as u32;

        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&8000u32.to_le_bytes());
        wav.extend_from_slice(&16000u32.to_le_bytes()); // byte rate
        wav.extend_from_slice(&2u16.to_le_bytes()); // block align
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        for f in frames {
            wav.extend_from_slice(&f.to_le_bytes());
        }

        let path = std::env::temp_dir().join(format!("shakeplay-decoder-{}.wav", std::process::id()));
        std::fs::write(&path, &wav).unwrap();
        let clip = load_clip(&path);
        std::fs::remove_file(&path).ok();

        let clip = clip.unwrap();
        assert_eq!(clip.sample_rate(), 8000);
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.frames(), 8);
        assert!((clip.samples()[2] - 0.5).abs() < 1e-4);
        assert!((clip.samples()[6] + 0.5).abs() < 1e-4);
    }
}
