use serde::{Deserialize, Serialize};

/// A place a photo or video was taken, in WGS84 degrees.
///
/// `(0.0, 0.0)` is what upstream media metadata reports when no position was
/// recorded, so it is treated as "unset" rather than as Null Island.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both coordinates are exactly zero.
    pub fn is_unset(&self) -> bool {
        self.lat == 0.0 && self.lon == 0.0
    }

    pub fn to_lon_lat(self) -> LonLat {
        LonLat::new(self.lon, self.lat)
    }
}

/// Point geometry in (longitude, latitude) order, degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Wrap a finite longitude into the half-open range (-180, 180].
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::{Location, LonLat, wrap_longitude};

    fn assert_in_range(lon: f64) {
        assert!(lon > -180.0 && lon <= 180.0, "{lon} outside (-180, 180]");
    }

    #[test]
    fn unset_only_when_both_zero() {
        assert!(Location::new(0.0, 0.0).is_unset());
        assert!(Location::new(-0.0, 0.0).is_unset());
        assert!(!Location::new(0.0, 12.5).is_unset());
        assert!(!Location::new(51.5, 0.0).is_unset());
    }

    #[test]
    fn location_swaps_into_lon_lat_order() {
        let p = Location::new(48.85, 2.35).to_lon_lat();
        assert_eq!(p, LonLat::new(2.35, 48.85));
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {a} ~= {b}");
    }

    #[test]
    fn wrap_keeps_in_range_values() {
        assert_close(wrap_longitude(0.0), 0.0);
        assert_close(wrap_longitude(179.9), 179.9);
        assert_close(wrap_longitude(-179.5), -179.5);
        assert_eq!(wrap_longitude(180.0), 180.0);
    }

    #[test]
    fn wrap_maps_minus_180_to_plus_180() {
        assert_eq!(wrap_longitude(-180.0), 180.0);
        assert_eq!(wrap_longitude(540.0), 180.0);
    }

    #[test]
    fn wrap_crosses_antimeridian() {
        assert_close(wrap_longitude(179.95 + 0.15), -179.9);
        assert_close(wrap_longitude(-190.0), 170.0);
    }

    #[test]
    fn wrap_stays_in_range_for_many_increments() {
        let mut lon = -179.99;
        for step in [0.15, 1.0, 7.3, 90.0, 179.999, 360.0, 725.5] {
            for _ in 0..5_000 {
                lon = wrap_longitude(lon + step);
                assert_in_range(lon);
            }
        }
        for raw in [-1e6, -360.0, -180.000_001, 180.000_001, 359.99, 1e9] {
            assert_in_range(wrap_longitude(raw));
        }
    }

    #[test]
    fn location_deserializes_from_json() {
        let loc: Location = serde_json::from_str(r#"{"lat": 35.68, "lon": 139.69}"#).unwrap();
        assert_eq!(loc, Location::new(35.68, 139.69));
    }
}
