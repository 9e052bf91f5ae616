use serde::{Deserialize, Serialize};

use crate::geo::LonLat;

/// Snapshot of a rendering surface's viewpoint.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub center: LonLat,
    pub zoom: f64,
    /// Degrees from nadir.
    pub pitch: f64,
}

impl CameraState {
    pub fn new(center: LonLat, zoom: f64, pitch: f64) -> Self {
        Self {
            center,
            zoom,
            pitch,
        }
    }

    /// Returns the state after applying `options` on top of `self`.
    pub fn apply(&self, options: &CameraOptions) -> Self {
        Self {
            center: options.center.unwrap_or(self.center),
            zoom: options.zoom.unwrap_or(self.zoom),
            pitch: options.pitch.unwrap_or(self.pitch),
        }
    }
}

/// A camera write. `None` fields leave that property untouched.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LonLat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
}

impl CameraOptions {
    pub fn center(center: LonLat) -> Self {
        Self {
            center: Some(center),
            ..Self::default()
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraOptions, CameraState};
    use crate::geo::LonLat;

    #[test]
    fn apply_overrides_only_present_fields() {
        let cam = CameraState::new(LonLat::new(10.0, 20.0), 3.0, 15.0);
        let next = cam.apply(&CameraOptions::default().with_zoom(8.0));
        assert_eq!(next, CameraState::new(LonLat::new(10.0, 20.0), 8.0, 15.0));

        let next = cam.apply(&CameraOptions::center(LonLat::new(-5.0, 1.0)).with_pitch(0.0));
        assert_eq!(next, CameraState::new(LonLat::new(-5.0, 1.0), 3.0, 0.0));
    }

    #[test]
    fn empty_options_serialize_to_empty_object() {
        let json = serde_json::to_string(&CameraOptions::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
