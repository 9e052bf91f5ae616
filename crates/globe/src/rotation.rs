use foundation::{CameraOptions, CameraState, LonLat, wrap_longitude};

/// Camera write for one idle-rotation tick: spin east by `step_deg`,
/// keeping latitude and zoom.
pub fn advance(camera: &CameraState, step_deg: f64) -> CameraOptions {
    let lon = wrap_longitude(camera.center.lon + step_deg);
    CameraOptions::center(LonLat::new(lon, camera.center.lat)).with_zoom(camera.zoom)
}
