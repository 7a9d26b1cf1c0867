// Player configuration
// Loaded once at startup; nothing is ever written back
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SettingsError;
use crate::speed::mapper::{SpeedBand, DEFAULT_BANDS, DEFAULT_CEILING_SPEED};

/// Motion window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Length of the trailing sample window in milliseconds
    pub window_ms: i64,
    /// Below this many samples the activity level is forced to 0
    pub min_samples: usize,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            window_ms: 2000,
            min_samples: 10,
        }
    }
}

/// Smoothing filter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    /// Per-frame blend factor, 0 < alpha <= 1
    pub alpha: f64,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self { alpha: 0.05 }
    }
}

/// Activity-to-speed table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingSettings {
    /// Bands in ascending order of their exclusive upper bound
    pub bands: Vec<SpeedBand>,
    /// Speed for activity at or above the last band's upper bound
    pub ceiling_speed: f64,
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS.to_vec(),
            ceiling_speed: DEFAULT_CEILING_SPEED,
        }
    }
}

/// Playback rate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Tempo the asset was authored at; playback rate = speed / base_speed
    pub base_speed: f64,
    /// Exponential-approach time constant for rate changes, in seconds
    pub time_constant_s: f64,
    /// The slider is only moved when it differs from the target by more than this
    pub slider_epsilon: f64,
    /// How often the frame loop runs
    pub frame_rate_hz: f64,
}

/// Frame loop rates outside this range cannot be turned into a timer period
pub const MIN_FRAME_RATE_HZ: f64 = 0.1;
pub const MAX_FRAME_RATE_HZ: f64 = 1000.0;

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            base_speed: 1.10,
            time_constant_s: 0.015,
            slider_epsilon: 0.01,
            frame_rate_hz: 60.0,
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub motion: MotionSettings,
    pub smoothing: SmoothingSettings,
    pub mapping: MappingSettings,
    pub playback: PlaybackSettings,
}

impl Settings {
    /// Load settings from a JSON file, or return defaults if none is given or it doesn't exist
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            log::info!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = Self::from_json(&content)?;
        log::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: String| Err(SettingsError::Invalid(msg));

        if self.motion.window_ms <= 0 {
            return invalid(format!("motion.window_ms must be positive, got {}", self.motion.window_ms));
        }
        if !(self.smoothing.alpha > 0.0 && self.smoothing.alpha <= 1.0) {
            return invalid(format!("smoothing.alpha must be in (0, 1], got {}", self.smoothing.alpha));
        }
        if self.playback.base_speed <= 0.0 {
            return invalid(format!("playback.base_speed must be positive, got {}", self.playback.base_speed));
        }
        if self.playback.time_constant_s < 0.0 {
            return invalid(format!(
                "playback.time_constant_s must not be negative, got {}",
                self.playback.time_constant_s
            ));
        }
        if self.playback.slider_epsilon < 0.0 {
            return invalid(format!(
                "playback.slider_epsilon must not be negative, got {}",
                self.playback.slider_epsilon
            ));
        }
        let hz = self.playback.frame_rate_hz;
        if !(MIN_FRAME_RATE_HZ..=MAX_FRAME_RATE_HZ).contains(&hz) {
            return invalid(format!(
                "playback.frame_rate_hz must be in [{}, {}], got {}",
                MIN_FRAME_RATE_HZ, MAX_FRAME_RATE_HZ, hz
            ));
        }

        let bands = &self.mapping.bands;
        if bands.windows(2).any(|pair| pair[0].upper >= pair[1].upper) {
            return invalid("mapping.bands must have strictly ascending upper bounds".to_string());
        }
        if bands.iter().any(|b| b.speed <= 0.0) || self.mapping.ceiling_speed <= 0.0 {
            return invalid("mapping speeds must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let settings = Settings::default();
        assert_eq!(settings.motion.window_ms, 2000);
        assert_eq!(settings.motion.min_samples, 10);
        assert!((settings.smoothing.alpha - 0.05).abs() < 1e-12);
        assert!((settings.playback.base_speed - 1.10).abs() < 1e-12);
        assert!((settings.playback.time_constant_s - 0.015).abs() < 1e-12);
        assert_eq!(settings.mapping.bands.len(), 5);
        assert!((settings.mapping.ceiling_speed - 1.35).abs() < 1e-12);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "smoothing": { "alpha": 0.2 } }"#).unwrap();
        assert!((settings.smoothing.alpha - 0.2).abs() < 1e-12);
        assert_eq!(settings.motion.window_ms, 2000);
        assert_eq!(settings.mapping.bands.len(), 5);
    }

    #[test]
    fn test_rejects_bad_alpha() {
        let err = Settings::from_json(r#"{ "smoothing": { "alpha": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json(r#"{ "smoothing": { "alpha": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_frame_rate_bounds() {
        for bad in ["0", "-60", "0.001", "1001", "1e12"] {
            let json = format!(r#"{{ "playback": {{ "frame_rate_hz": {} }} }}"#, bad);
            let err = Settings::from_json(&json).unwrap_err();
            assert!(matches!(err, SettingsError::Invalid(_)), "accepted {}", bad);
        }
        for good in ["0.1", "30", "60", "1000"] {
            let json = format!(r#"{{ "playback": {{ "frame_rate_hz": {} }} }}"#, good);
            assert!(Settings::from_json(&json).is_ok(), "rejected {}", good);
        }
    }

    #[test]
    fn test_rejects_unordered_bands() {
        let json = r#"{ "mapping": { "bands": [
            { "upper": 4.0, "speed": 1.1 },
            { "upper": 2.0, "speed": 1.2 }
        ] } }"#;
        assert!(matches!(
            Settings::from_json(json),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("shakeplay-settings-does-not-exist.json");
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.motion.min_samples, 10);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("shakeplay-settings-{}.json", std::process::id()));
        fs::write(&path, r#"{ "playback": { "base_speed": 1.0 } }"#).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        fs::remove_file(&path).ok();

        assert!((settings.playback.base_speed - 1.0).abs() < 1e-12);
        assert!((settings.playback.time_constant_s - 0.015).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Parse(_))
        ));
    }
}
