//! Rendering-surface abstraction.
//!
//! The controller never talks to a map SDK directly. A host embeds one by
//! implementing [`MapSurface`] and [`PointAnnotations`]; [`HeadlessSurface`]
//! (in `headless.rs`) is the in-process implementation.
//!
//! Methods return boxed futures so the traits stay dyn-compatible.
//!
//! [`HeadlessSurface`]: crate::HeadlessSurface

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use foundation::{CameraOptions, CameraState, LonLat};

use crate::error::SurfaceError;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Surface-assigned identifier for a created point annotation.
pub type AnnotationId = u64;

/// Default chrome drawn on top of the map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Ornament {
    Compass,
    Logo,
    ScaleBar,
}

impl Ornament {
    pub const ALL: [Ornament; 3] = [Ornament::Compass, Ornament::Logo, Ornament::ScaleBar];
}

/// User gestures the controller listens for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GestureKind {
    PointerMove,
    Tap,
}

/// Callback invoked by the surface on a gesture.
pub type GestureHandler = Arc<dyn Fn(GestureKind) + Send + Sync>;

/// Request to place a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAnnotationOptions {
    pub point: LonLat,
    /// Encoded icon image bytes.
    pub image: Bytes,
    pub icon_size: f64,
}

/// A marker as stored by a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAnnotation {
    pub id: AnnotationId,
    pub options: PointAnnotationOptions,
}

/// Marker sub-manager handed out by [`MapSurface::create_annotation_manager`].
pub trait PointAnnotations: Send + Sync {
    fn create(&self, options: PointAnnotationOptions)
    -> BoxFuture<'_, Result<AnnotationId, SurfaceError>>;

    fn delete_all(&self) -> BoxFuture<'_, Result<(), SurfaceError>>;
}

/// A map rendering surface showing a globe.
///
/// Implementations must be `Send + Sync` for use across async tasks.
pub trait MapSurface: Send + Sync {
    fn create_annotation_manager(
        &self,
    ) -> BoxFuture<'_, Result<Arc<dyn PointAnnotations>, SurfaceError>>;

    fn camera_state(&self) -> BoxFuture<'_, Result<CameraState, SurfaceError>>;

    /// Jump the camera without animation.
    fn set_camera(&self, options: CameraOptions) -> BoxFuture<'_, Result<(), SurfaceError>>;

    /// Start an animated transition. Resolves once the animation is issued,
    /// not when it finishes.
    fn fly_to(
        &self,
        options: CameraOptions,
        duration: Duration,
    ) -> BoxFuture<'_, Result<(), SurfaceError>>;

    fn set_ornament_visible(
        &self,
        ornament: Ornament,
        visible: bool,
    ) -> BoxFuture<'_, Result<(), SurfaceError>>;

    /// Register `handler` for gestures of `kind`. Handlers are never removed.
    fn subscribe(&self, kind: GestureKind, handler: GestureHandler) -> Result<(), SurfaceError>;
}
