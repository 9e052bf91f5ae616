use std::env;
use std::time::Duration;

use foundation::{CameraState, LonLat};
use serde::Deserialize;

use crate::error::ConfigError;

/// Tunables for [`GlobeController`](crate::GlobeController).
///
/// Durations are read as milliseconds when deserialized.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Never zero.
    #[serde(rename = "rotation_tick_ms", deserialize_with = "millis::nonzero")]
    pub rotation_tick: Duration,
    /// Longitude advanced per rotation tick, degrees.
    pub rotation_step_deg: f64,
    /// Time without gestures before idle rotation resumes.
    #[serde(rename = "quiet_period_ms", with = "millis")]
    pub quiet_period: Duration,
    pub trip_zoom: f64,
    pub trip_pitch_deg: f64,
    #[serde(rename = "fly_in_ms", with = "millis")]
    pub fly_in_duration: Duration,
    #[serde(rename = "fly_out_ms", with = "millis")]
    pub fly_out_duration: Duration,
    /// Zoom restored after a trip when no camera state was ever observed.
    pub default_zoom: f64,
    pub pin_icon_path: String,
    pub pin_icon_size: f64,
    /// Fallback for rotation ticks when the camera has never been read.
    pub initial_camera: CameraState,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            rotation_tick: Duration::from_millis(100),
            rotation_step_deg: 0.15,
            quiet_period: Duration::from_secs(5),
            trip_zoom: 8.0,
            trip_pitch_deg: 45.0,
            fly_in_duration: Duration::from_millis(3000),
            fly_out_duration: Duration::from_millis(2000),
            default_zoom: 1.5,
            pin_icon_path: "assets/pin.png".to_string(),
            pin_icon_size: 0.05,
            initial_camera: CameraState::new(LonLat::new(0.0, 0.0), 1.5, 0.0),
        }
    }
}

impl GlobeConfig {
    /// Defaults overridden by `GLOBE_*` environment variables.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            rotation_tick: env_var_period("GLOBE_ROTATION_TICK_MS", d.rotation_tick),
            rotation_step_deg: env_var_f64("GLOBE_ROTATION_STEP_DEG", d.rotation_step_deg),
            quiet_period: env_var_ms("GLOBE_QUIET_PERIOD_MS", d.quiet_period),
            trip_zoom: env_var_f64("GLOBE_TRIP_ZOOM", d.trip_zoom),
            trip_pitch_deg: env_var_f64("GLOBE_TRIP_PITCH_DEG", d.trip_pitch_deg),
            fly_in_duration: env_var_ms("GLOBE_FLY_IN_MS", d.fly_in_duration),
            fly_out_duration: env_var_ms("GLOBE_FLY_OUT_MS", d.fly_out_duration),
            default_zoom: env_var_f64("GLOBE_DEFAULT_ZOOM", d.default_zoom),
            pin_icon_path: env::var("GLOBE_PIN_ICON").unwrap_or(d.pin_icon_path),
            pin_icon_size: env_var_f64("GLOBE_PIN_ICON_SIZE", d.pin_icon_size),
            initial_camera: d.initial_camera,
        }
    }

    /// Parse a JSON config; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| ConfigError::new("json", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall rotation or put non-finite numbers on
    /// the camera.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rotation_tick.is_zero() {
            return Err(ConfigError::new("rotation_tick_ms", "must be non-zero"));
        }
        let camera = &self.initial_camera;
        let numbers = [
            ("rotation_step_deg", self.rotation_step_deg),
            ("trip_zoom", self.trip_zoom),
            ("trip_pitch_deg", self.trip_pitch_deg),
            ("default_zoom", self.default_zoom),
            ("pin_icon_size", self.pin_icon_size),
            ("initial_camera.center.lon", camera.center.lon),
            ("initial_camera.center.lat", camera.center.lat),
            ("initial_camera.zoom", camera.zoom),
            ("initial_camera.pitch", camera.pitch),
        ];
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(ConfigError::new(field, format!("{value} is not finite")));
            }
        }
        Ok(())
    }
}

fn env_var_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| parse_finite(&v))
        .unwrap_or(default)
}

fn env_var_ms(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn env_var_period(key: &str, default: Duration) -> Duration {
    Some(env_var_ms(key, default))
        .filter(|d| !d.is_zero())
        .unwrap_or(default)
}

fn parse_finite(v: &str) -> Option<f64> {
    v.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

mod millis {
    use std::time::Duration;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }

    pub fn nonzero<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match u64::deserialize(deserializer)? {
            0 => Err(D::Error::custom("period must be non-zero")),
            ms => Ok(Duration::from_millis(ms)),
        }
    }
}
