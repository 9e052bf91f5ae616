//! Globe controller: idle rotation, trip fly-to and pin plotting on top of an
//! abstract map rendering surface.

pub mod assets;
pub mod config;
pub mod controller;
pub mod error;
pub mod headless;
pub mod pins;
pub mod rotation;
pub mod state;
pub mod surface;

pub use assets::{AssetSource, FsAssets, MemoryAssets};
pub use config::GlobeConfig;
pub use controller::GlobeController;
pub use error::{AssetError, ConfigError, SurfaceError, SurfaceErrorKind};
pub use headless::{CameraCommand, HeadlessAnnotations, HeadlessSurface};
pub use pins::PlotReport;
pub use state::{Effect, RotationEvent, RotationState};
pub use surface::{
    AnnotationId, BoxFuture, GestureHandler, GestureKind, MapSurface, Ornament, PointAnnotation,
    PointAnnotationOptions, PointAnnotations,
};
