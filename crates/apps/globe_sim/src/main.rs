use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use foundation::{CameraState, Location, LonLat};
use globe::{
    AssetSource, CameraCommand, FsAssets, GestureKind, GlobeConfig, GlobeController,
    HeadlessSurface, MemoryAssets, PlotReport,
};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Drive the globe controller against a headless surface and report what the
/// camera did.
#[derive(Parser, Debug)]
#[command(name = "globe-sim")]
struct Args {
    /// JSON array of `{"lat": .., "lon": ..}` to plot.
    #[arg(long)]
    locations: Option<PathBuf>,

    /// JSON controller config; otherwise GLOBE_* environment variables apply.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the pin icon. Without it a placeholder icon is used.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Trip to fly to after idling, as `lat,lon`.
    #[arg(long, value_parser = parse_lat_lon)]
    trip: Option<Location>,

    /// Seconds to let the globe spin before interacting.
    #[arg(long, default_value_t = 2.0)]
    seconds: f64,
}

#[derive(Serialize)]
struct Summary {
    plot: Option<PlotReport>,
    rotation_updates: usize,
    final_camera: CameraState,
    commands: Vec<CameraCommand>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => {
            let text = read_text(path).await?;
            GlobeConfig::from_json(&text).map_err(|e| format!("{path:?}: {e}"))?
        }
        None => GlobeConfig::from_env(),
    };
    config.validate().map_err(|e| e.to_string())?;
    let idle = idle_duration(args.seconds)?;

    let locations = match &args.locations {
        Some(path) => {
            let text = read_text(path).await?;
            serde_json::from_str::<Vec<Location>>(&text)
                .map_err(|e| format!("parse locations {path:?}: {e}"))?
        }
        None => sample_locations(),
    };

    let assets: Arc<dyn AssetSource> = match &args.assets {
        Some(dir) => Arc::new(FsAssets::new(dir)),
        None => Arc::new(MemoryAssets::new().with(
            config.pin_icon_path.clone(),
            b"\x89PNG\r\n\x1a\n".to_vec(),
        )),
    };

    let fly_in = config.fly_in_duration;
    let fly_out = config.fly_out_duration;
    let controller = GlobeController::new(config, assets);
    let surface = Arc::new(HeadlessSurface::new(CameraState::new(
        LonLat::new(0.0, 20.0),
        1.5,
        0.0,
    )));

    controller.initialize(surface.clone()).await;
    if !controller.is_initialized() {
        return Err("controller failed to initialize".to_string());
    }

    let mut plot = None;
    controller
        .plot_locations(&locations, |report| plot = Some(report))
        .await;

    tokio::time::sleep(idle).await;
    info!("camera after idle: {:?}", surface.camera());

    surface.emit(GestureKind::PointerMove);
    info!("gesture: rotation state {:?}", controller.rotation_state());

    if let Some(trip) = args.trip {
        controller.fly_to_location(trip.lat, trip.lon).await;
        tokio::time::sleep(fly_in).await;
        controller.zoom_back_out().await;
        tokio::time::sleep(fly_out).await;
    }

    let summary = Summary {
        plot,
        rotation_updates: surface.set_camera_count(),
        final_camera: surface.camera(),
        commands: surface
            .journal()
            .into_iter()
            .filter(CameraCommand::is_fly_to)
            .collect(),
    };
    let json = serde_json::to_string_pretty(&summary).map_err(|e| format!("summary: {e}"))?;
    println!("{json}");
    Ok(())
}

async fn read_text(path: &Path) -> Result<String, String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("read {path:?}: {e}"))
}

fn idle_duration(seconds: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(seconds.max(0.0)).map_err(|e| format!("--seconds {seconds}: {e}"))
}

fn parse_lat_lon(s: &str) -> Result<Location, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon but got {s:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("lat: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("lon: {e}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("{lat},{lon} is not a valid position"));
    }
    Ok(Location::new(lat, lon))
}

fn sample_locations() -> Vec<Location> {
    vec![
        Location::new(48.8566, 2.3522),
        Location::new(35.6762, 139.6503),
        Location::new(0.0, 0.0),
        Location::new(-33.8688, 151.2093),
        Location::new(64.1466, -21.9426),
    ]
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{idle_duration, parse_lat_lon};

    #[test]
    fn parses_trip_argument() {
        let loc = parse_lat_lon("48.85, 2.35").unwrap();
        assert_eq!((loc.lat, loc.lon), (48.85, 2.35));
    }

    #[test]
    fn rejects_bad_trip_argument() {
        assert!(parse_lat_lon("48.85").is_err());
        assert!(parse_lat_lon("north,east").is_err());
        assert!(parse_lat_lon("95.0,10.0").is_err());
    }

    #[test]
    fn idle_duration_rejects_unrepresentable_seconds() {
        assert_eq!(idle_duration(1.5), Ok(Duration::from_millis(1_500)));
        assert_eq!(idle_duration(-3.0), Ok(Duration::ZERO));
        assert!(idle_duration(f64::INFINITY).is_err());
        assert!(idle_duration(1e30).is_err());
    }
}
