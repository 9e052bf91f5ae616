//! Pin plotting: full replace of the marker set.

use foundation::{Location, LonLat};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::assets::AssetSource;
use crate::surface::{PointAnnotationOptions, PointAnnotations};

/// Outcome of one plot pass, handed to the completion callback.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PlotReport {
    pub requested: usize,
    pub skipped_unset: usize,
    pub created: usize,
    pub failed: usize,
}

/// Locations that should get a pin, as point geometries.
pub fn plottable(locations: &[Location]) -> Vec<LonLat> {
    locations
        .iter()
        .filter(|loc| !loc.is_unset())
        .map(|loc| loc.to_lon_lat())
        .collect()
}

/// Replace all pins with one per set location.
///
/// Returns `None` if the pass was abandoned before any pin was attempted
/// (clearing failed, or the icon could not be loaded).
pub(crate) async fn replace_pins(
    annotations: &dyn PointAnnotations,
    assets: &dyn AssetSource,
    icon_path: &str,
    icon_size: f64,
    locations: &[Location],
) -> Option<PlotReport> {
    if let Err(err) = annotations.delete_all().await {
        error!("clearing pins failed: {err}");
        return None;
    }

    let points = plottable(locations);
    let mut report = PlotReport {
        requested: locations.len(),
        skipped_unset: locations.len() - points.len(),
        ..PlotReport::default()
    };
    if points.is_empty() {
        debug!("no plottable locations ({} unset)", report.skipped_unset);
        return Some(report);
    }

    let image = match assets.load(icon_path).await {
        Ok(image) => image,
        Err(err) => {
            error!("pin icon load failed: {err}");
            return None;
        }
    };

    for point in points {
        let options = PointAnnotationOptions {
            point,
            image: image.clone(),
            icon_size,
        };
        match annotations.create(options).await {
            Ok(_) => report.created += 1,
            Err(err) => {
                warn!("pin at lon={:.5} lat={:.5} skipped: {err}", point.lon, point.lat);
                report.failed += 1;
            }
        }
    }

    Some(report)
}
