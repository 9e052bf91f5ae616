//! In-process [`MapSurface`] with no renderer behind it.
//!
//! Camera writes take effect immediately and are journaled, which makes it
//! useful for the simulator binary and for tests. Each surface call can be
//! made to fail on demand.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use foundation::{CameraOptions, CameraState, LonLat};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::{SurfaceError, SurfaceErrorKind};
use crate::surface::{
    AnnotationId, BoxFuture, GestureHandler, GestureKind, MapSurface, Ornament, PointAnnotation,
    PointAnnotationOptions, PointAnnotations,
};

/// A camera write as received by the surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraCommand {
    Set(CameraOptions),
    FlyTo {
        options: CameraOptions,
        duration_ms: u64,
    },
}

impl CameraCommand {
    pub fn options(&self) -> &CameraOptions {
        match self {
            CameraCommand::Set(options) => options,
            CameraCommand::FlyTo { options, .. } => options,
        }
    }

    pub fn is_fly_to(&self) -> bool {
        matches!(self, CameraCommand::FlyTo { .. })
    }
}

struct HeadlessState {
    camera: CameraState,
    hidden: HashSet<Ornament>,
    handlers: Vec<(GestureKind, GestureHandler)>,
    journal: Vec<CameraCommand>,
    manager_requests: usize,
    camera_read_delay: Duration,
}

pub struct HeadlessSurface {
    state: Mutex<HeadlessState>,
    annotations: Arc<HeadlessAnnotations>,
    fail_camera_reads: AtomicBool,
    fail_camera_writes: AtomicBool,
    fail_annotation_manager: AtomicBool,
}

impl HeadlessSurface {
    pub fn new(camera: CameraState) -> Self {
        Self {
            state: Mutex::new(HeadlessState {
                camera,
                hidden: HashSet::new(),
                handlers: Vec::new(),
                journal: Vec::new(),
                manager_requests: 0,
                camera_read_delay: Duration::ZERO,
            }),
            annotations: Arc::new(HeadlessAnnotations::new()),
            fail_camera_reads: AtomicBool::new(false),
            fail_camera_writes: AtomicBool::new(false),
            fail_annotation_manager: AtomicBool::new(false),
        }
    }

    pub fn camera(&self) -> CameraState {
        self.state.lock().camera
    }

    pub fn journal(&self) -> Vec<CameraCommand> {
        self.state.lock().journal.clone()
    }

    pub fn take_journal(&self) -> Vec<CameraCommand> {
        std::mem::take(&mut self.state.lock().journal)
    }

    /// Number of non-animated camera writes (idle-rotation updates).
    pub fn set_camera_count(&self) -> usize {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|c| !c.is_fly_to())
            .count()
    }

    pub fn ornament_visible(&self, ornament: Ornament) -> bool {
        !self.state.lock().hidden.contains(&ornament)
    }

    pub fn handler_count(&self) -> usize {
        self.state.lock().handlers.len()
    }

    pub fn manager_requests(&self) -> usize {
        self.state.lock().manager_requests
    }

    pub fn annotations(&self) -> Arc<HeadlessAnnotations> {
        self.annotations.clone()
    }

    /// Deliver a gesture to every handler subscribed to `kind`.
    /// Returns how many handlers ran.
    pub fn emit(&self, kind: GestureKind) -> usize {
        let handlers: Vec<GestureHandler> = self
            .state
            .lock()
            .handlers
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, h)| h.clone())
            .collect();
        for handler in &handlers {
            handler(kind);
        }
        handlers.len()
    }

    /// Delay camera reads, to hold a rotation tick mid-flight.
    pub fn set_camera_read_delay(&self, delay: Duration) {
        self.state.lock().camera_read_delay = delay;
    }

    pub fn fail_camera_reads(&self, fail: bool) {
        self.fail_camera_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_camera_writes(&self, fail: bool) {
        self.fail_camera_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_annotation_manager(&self, fail: bool) {
        self.fail_annotation_manager.store(fail, Ordering::SeqCst);
    }

    fn write_camera(&self, command: CameraCommand) -> Result<(), SurfaceError> {
        if self.fail_camera_writes.load(Ordering::SeqCst) {
            return Err(SurfaceError::new(
                SurfaceErrorKind::CameraWrite,
                "surface rejected camera",
            ));
        }
        let mut state = self.state.lock();
        state.camera = state.camera.apply(command.options());
        state.journal.push(command);
        Ok(())
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(CameraState::new(LonLat::new(0.0, 20.0), 1.5, 0.0))
    }
}

impl MapSurface for HeadlessSurface {
    fn create_annotation_manager(
        &self,
    ) -> BoxFuture<'_, Result<Arc<dyn PointAnnotations>, SurfaceError>> {
        Box::pin(async move {
            self.state.lock().manager_requests += 1;
            if self.fail_annotation_manager.load(Ordering::SeqCst) {
                return Err(SurfaceError::new(
                    SurfaceErrorKind::AnnotationManager,
                    "style not loaded",
                ));
            }
            let manager: Arc<dyn PointAnnotations> = self.annotations.clone();
            Ok(manager)
        })
    }

    fn camera_state(&self) -> BoxFuture<'_, Result<CameraState, SurfaceError>> {
        Box::pin(async move {
            let delay = self.state.lock().camera_read_delay;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if self.fail_camera_reads.load(Ordering::SeqCst) {
                return Err(SurfaceError::new(
                    SurfaceErrorKind::CameraRead,
                    "camera unavailable",
                ));
            }
            Ok(self.state.lock().camera)
        })
    }

    fn set_camera(&self, options: CameraOptions) -> BoxFuture<'_, Result<(), SurfaceError>> {
        Box::pin(async move { self.write_camera(CameraCommand::Set(options)) })
    }

    fn fly_to(
        &self,
        options: CameraOptions,
        duration: Duration,
    ) -> BoxFuture<'_, Result<(), SurfaceError>> {
        let command = CameraCommand::FlyTo {
            options,
            duration_ms: duration.as_millis() as u64,
        };
        Box::pin(async move { self.write_camera(command) })
    }

    fn set_ornament_visible(
        &self,
        ornament: Ornament,
        visible: bool,
    ) -> BoxFuture<'_, Result<(), SurfaceError>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if visible {
                state.hidden.remove(&ornament);
            } else {
                state.hidden.insert(ornament);
            }
            Ok(())
        })
    }

    fn subscribe(&self, kind: GestureKind, handler: GestureHandler) -> Result<(), SurfaceError> {
        self.state.lock().handlers.push((kind, handler));
        Ok(())
    }
}

/// Marker store behind [`HeadlessSurface`].
pub struct HeadlessAnnotations {
    pins: Mutex<Vec<PointAnnotation>>,
    rejected: Mutex<Vec<LonLat>>,
    next_id: AtomicU64,
    create_calls: AtomicUsize,
    fail_delete_all: AtomicBool,
}

impl HeadlessAnnotations {
    fn new() -> Self {
        Self {
            pins: Mutex::new(Vec::new()),
            rejected: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            create_calls: AtomicUsize::new(0),
            fail_delete_all: AtomicBool::new(false),
        }
    }

    pub fn pins(&self) -> Vec<PointAnnotation> {
        self.pins.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.pins.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.lock().is_empty()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Make creation of a pin at exactly `point` fail.
    pub fn reject_at(&self, point: LonLat) {
        self.rejected.lock().push(point);
    }

    pub fn fail_delete_all(&self, fail: bool) {
        self.fail_delete_all.store(fail, Ordering::SeqCst);
    }
}

impl PointAnnotations for HeadlessAnnotations {
    fn create(
        &self,
        options: PointAnnotationOptions,
    ) -> BoxFuture<'_, Result<AnnotationId, SurfaceError>> {
        Box::pin(async move {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.rejected.lock().contains(&options.point) {
                return Err(SurfaceError::new(
                    SurfaceErrorKind::CreateAnnotation,
                    "annotation rejected",
                ));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.pins.lock().push(PointAnnotation { id, options });
            Ok(id)
        })
    }

    fn delete_all(&self) -> BoxFuture<'_, Result<(), SurfaceError>> {
        Box::pin(async move {
            if self.fail_delete_all.load(Ordering::SeqCst) {
                return Err(SurfaceError::new(
                    SurfaceErrorKind::DeleteAnnotations,
                    "annotation layer busy",
                ));
            }
            self.pins.lock().clear();
            Ok(())
        })
    }
}
