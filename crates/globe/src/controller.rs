//! Globe controller.
//!
//! Owns the attached rendering surface and its annotation manager, spins the
//! globe while idle, pauses on user gestures and trip views, plots pins, and
//! flies the camera in and out of a trip.
//!
//! All shared state sits behind one lock. A transition's timer effects are
//! applied while that lock is held, so two racing transitions can never
//! leave a stale timer behind. Every camera write goes through a single
//! async gate, which keeps an in-flight rotation write from landing after a
//! fly-to.

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use std::time::Duration;

use foundation::{CameraOptions, CameraState, Location, LonLat};
use parking_lot::Mutex;
use runtime::{TaskSlot, run_after, run_periodic};
use tracing::{debug, error, info, warn};

use crate::assets::AssetSource;
use crate::config::GlobeConfig;
use crate::pins::{self, PlotReport};
use crate::rotation;
use crate::state::{Effect, RotationEvent, RotationState};
use crate::surface::{GestureHandler, GestureKind, MapSurface, Ornament, PointAnnotations};

/// Cheap to clone; clones share the same controller.
#[derive(Clone)]
pub struct GlobeController {
    inner: Arc<Inner>,
}

struct Inner {
    config: GlobeConfig,
    assets: Arc<dyn AssetSource>,
    state: Mutex<ControllerState>,
    rotation_task: TaskSlot,
    quiet_task: TaskSlot,
    camera_gate: tokio::sync::Mutex<()>,
    plot_gate: tokio::sync::Mutex<()>,
}

#[derive(Clone)]
struct Attached {
    surface: Arc<dyn MapSurface>,
    annotations: Arc<dyn PointAnnotations>,
}

enum Lifecycle {
    Uninitialized,
    Initializing,
    Ready(Attached),
}

struct ControllerState {
    lifecycle: Lifecycle,
    rotation: RotationState,
    /// Bumped on every effectful transition; rotation ticks compare against it.
    generation: u64,
    previous_zoom: Option<f64>,
    last_camera: Option<CameraState>,
}

impl ControllerState {
    fn attached(&self) -> Option<Attached> {
        match &self.lifecycle {
            Lifecycle::Ready(attached) => Some(attached.clone()),
            _ => None,
        }
    }

    fn rotation_current(&self, generation: u64) -> bool {
        self.rotation.is_rotating() && self.generation == generation
    }
}

impl GlobeController {
    pub fn new(config: GlobeConfig, assets: Arc<dyn AssetSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                assets,
                state: Mutex::new(ControllerState {
                    lifecycle: Lifecycle::Uninitialized,
                    rotation: RotationState::Rotating,
                    generation: 0,
                    previous_zoom: None,
                    last_camera: None,
                }),
                rotation_task: TaskSlot::new("rotation"),
                quiet_task: TaskSlot::new("interaction"),
                camera_gate: tokio::sync::Mutex::new(()),
                plot_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.inner.config
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.inner.state.lock().lifecycle, Lifecycle::Ready(_))
    }

    pub fn rotation_state(&self) -> RotationState {
        self.inner.state.lock().rotation
    }

    pub fn is_viewing_trip(&self) -> bool {
        self.rotation_state().is_viewing_trip()
    }

    pub fn is_user_interacting(&self) -> bool {
        self.rotation_state().is_user_interacting()
    }

    /// True while a rotation loop is scheduled.
    pub fn is_rotation_scheduled(&self) -> bool {
        self.inner.rotation_task.is_active()
    }

    /// True while a post-gesture quiet timer is pending.
    pub fn is_quiet_timer_pending(&self) -> bool {
        self.inner.quiet_task.is_active()
    }

    /// Zoom captured on entering the current trip view.
    pub fn previous_zoom(&self) -> Option<f64> {
        self.inner.state.lock().previous_zoom
    }

    pub fn last_camera(&self) -> Option<CameraState> {
        self.inner.state.lock().last_camera
    }

    /// Attach to `surface`. Later calls are ignored once attached (or while
    /// attaching); a failed attach may be retried.
    pub async fn initialize(&self, surface: Arc<dyn MapSurface>) {
        {
            let mut state = self.inner.state.lock();
            if !matches!(state.lifecycle, Lifecycle::Uninitialized) {
                debug!("initialize ignored: already initialized or in progress");
                return;
            }
            state.lifecycle = Lifecycle::Initializing;
        }

        let annotations = match surface.create_annotation_manager().await {
            Ok(annotations) => annotations,
            Err(err) => {
                error!("annotation manager unavailable: {err}");
                self.inner.state.lock().lifecycle = Lifecycle::Uninitialized;
                return;
            }
        };

        for ornament in Ornament::ALL {
            if let Err(err) = surface.set_ornament_visible(ornament, false).await {
                warn!("hiding {ornament:?} failed: {err}");
            }
        }

        {
            let mut state = self.inner.state.lock();
            state.lifecycle = Lifecycle::Ready(Attached {
                surface: surface.clone(),
                annotations,
            });
            self.inner
                .apply(&mut state, RotationEvent::ResumeRequested, Duration::ZERO);
        }

        for kind in [GestureKind::PointerMove, GestureKind::Tap] {
            let weak: Weak<Inner> = Arc::downgrade(&self.inner);
            let handler: GestureHandler = Arc::new(move |_kind: GestureKind| {
                if let Some(inner) = weak.upgrade() {
                    inner.user_interaction();
                }
            });
            if let Err(err) = surface.subscribe(kind, handler) {
                warn!("subscribing to {kind:?} failed: {err}");
            }
        }

        info!("globe controller initialized");
    }

    /// Gesture entry point; the surface handlers registered by
    /// [`initialize`](Self::initialize) call this.
    pub fn on_user_interaction(&self) {
        self.inner.user_interaction();
    }

    pub fn set_viewing_trip(&self, viewing: bool) {
        let event = if viewing {
            RotationEvent::TripEntered
        } else {
            RotationEvent::TripExited
        };
        self.inner.apply_if_ready(event, "set_viewing_trip");
    }

    /// Restart idle rotation now, skipping any pending quiet period.
    /// Has no effect during a trip view.
    pub fn resume_auto_rotation(&self) {
        self.inner
            .apply_if_ready(RotationEvent::ResumeRequested, "resume_auto_rotation");
    }

    /// Replace every pin with one per location, skipping unset `(0, 0)`
    /// entries.
    ///
    /// `on_complete` runs exactly once after all pins were attempted, even
    /// when some failed. It is not run when the controller is not
    /// initialized, clearing the old pins fails, or the icon cannot be
    /// loaded.
    pub async fn plot_locations<F>(&self, locations: &[Location], on_complete: F)
    where
        F: FnOnce(PlotReport),
    {
        let Some(attached) = self.inner.state.lock().attached() else {
            warn!("plot_locations ignored: controller not initialized");
            return;
        };

        let _plotting = self.inner.plot_gate.lock().await;
        let config = &self.inner.config;
        let report = pins::replace_pins(
            attached.annotations.as_ref(),
            self.inner.assets.as_ref(),
            &config.pin_icon_path,
            config.pin_icon_size,
            locations,
        )
        .await;

        if let Some(report) = report {
            info!(
                "plotted {} pins ({} failed, {} unset)",
                report.created, report.failed, report.skipped_unset
            );
            on_complete(report);
        }
    }

    /// Enter trip view and fly to the trip.
    ///
    /// Rotation is suspended before anything is awaited. The zoom to return
    /// to is captured only when entering from outside a trip view, so
    /// hopping between trips still returns to the original zoom. The fly-in
    /// is dropped if trip view was left or re-entered while the zoom was
    /// being read.
    pub async fn fly_to_location(&self, lat: f64, lon: f64) {
        let config = &self.inner.config;
        let (attached, trip_generation, snapshot_fallback) = {
            let mut state = self.inner.state.lock();
            let Some(attached) = state.attached() else {
                warn!("fly_to_location ignored: controller not initialized");
                return;
            };
            let entering = !state.rotation.is_viewing_trip();
            self.inner
                .apply(&mut state, RotationEvent::TripEntered, Duration::ZERO);
            let fallback = entering.then(|| {
                state
                    .last_camera
                    .map(|camera| camera.zoom)
                    .unwrap_or(config.default_zoom)
            });
            (attached, state.generation, fallback)
        };

        // Queued ahead of any zoom-out requested from here on, so the
        // snapshot is stored before that zoom-out takes it.
        let _camera = self.inner.camera_gate.lock().await;

        if let Some(fallback) = snapshot_fallback {
            let zoom = match attached.surface.camera_state().await {
                Ok(camera) => {
                    self.inner.state.lock().last_camera = Some(camera);
                    camera.zoom
                }
                Err(err) => {
                    warn!("zoom snapshot fell back to {fallback}: {err}");
                    fallback
                }
            };
            self.inner.state.lock().previous_zoom = Some(zoom);
        }

        {
            let state = self.inner.state.lock();
            if !state.rotation.is_viewing_trip() || state.generation != trip_generation {
                debug!("dropping stale fly-in to lat={lat:.4} lon={lon:.4}");
                return;
            }
        }

        let options = CameraOptions::center(LonLat::new(lon, lat))
            .with_zoom(config.trip_zoom)
            .with_pitch(config.trip_pitch_deg);
        info!("flying to lat={lat:.4} lon={lon:.4}");
        if let Err(err) = attached.surface.fly_to(options, config.fly_in_duration).await {
            warn!("fly-to trip failed: {err}");
        }
    }

    /// Leave trip view and fly back out to the captured zoom.
    ///
    /// Rotation is resumed right away, with its first tick deferred until the
    /// zoom-out animation has had time to finish.
    pub async fn zoom_back_out(&self) {
        let config = &self.inner.config;
        let attached = {
            let mut state = self.inner.state.lock();
            let Some(attached) = state.attached() else {
                warn!("zoom_back_out ignored: controller not initialized");
                return;
            };
            self.inner
                .apply(&mut state, RotationEvent::TripExited, config.fly_out_duration);
            attached
        };

        let _camera = self.inner.camera_gate.lock().await;
        let zoom = self
            .inner
            .state
            .lock()
            .previous_zoom
            .take()
            .unwrap_or(config.default_zoom);
        let options = CameraOptions::default().with_zoom(zoom).with_pitch(0.0);
        info!("zooming back out to {zoom:.2}");
        if let Err(err) = attached.surface.fly_to(options, config.fly_out_duration).await {
            warn!("zoom-out failed: {err}");
        }
    }
}

impl Inner {
    fn user_interaction(self: &Arc<Self>) {
        self.apply_if_ready(RotationEvent::UserGesture, "user interaction");
    }

    fn apply_if_ready(self: &Arc<Self>, event: RotationEvent, what: &str) {
        let mut state = self.state.lock();
        if !matches!(state.lifecycle, Lifecycle::Ready(_)) {
            warn!("{what} ignored: controller not initialized");
            return;
        }
        self.apply(&mut state, event, Duration::ZERO);
    }

    /// Run one state-machine transition and its timer effect. Caller holds
    /// the state lock for the whole call.
    fn apply(
        self: &Arc<Self>,
        state: &mut ControllerState,
        event: RotationEvent,
        rotation_delay: Duration,
    ) {
        let (next, effect) = state.rotation.on(event);
        if next != state.rotation {
            debug!("rotation {:?} -> {next:?} on {event:?}", state.rotation);
        }
        state.rotation = next;
        if effect == Effect::Nothing {
            return;
        }
        state.generation = state.generation.wrapping_add(1);

        match effect {
            Effect::Nothing => {}
            Effect::StartRotation => {
                self.quiet_task.cancel();
                self.spawn_rotation(state.generation, rotation_delay);
            }
            Effect::PauseForUser | Effect::RearmQuietTimer => {
                self.rotation_task.cancel();
                self.spawn_quiet_timer();
            }
            Effect::PauseForTrip => {
                self.rotation_task.cancel();
                self.quiet_task.cancel();
            }
        }
    }

    fn spawn_rotation(self: &Arc<Self>, generation: u64, start_delay: Duration) {
        let weak = Arc::downgrade(self);
        let period = self.config.rotation_tick;
        self.rotation_task
            .reschedule(run_periodic(start_delay, period, move || {
                let weak = weak.clone();
                async move {
                    match weak.upgrade() {
                        Some(inner) => inner.rotation_tick(generation).await,
                        None => ControlFlow::Break(()),
                    }
                }
            }));
    }

    fn spawn_quiet_timer(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.quiet_task
            .reschedule(run_after(self.config.quiet_period, move || {
                if let Some(inner) = weak.upgrade() {
                    let mut state = inner.state.lock();
                    inner.apply(
                        &mut state,
                        RotationEvent::QuietPeriodElapsed,
                        Duration::ZERO,
                    );
                }
            }));
    }

    /// One idle-rotation step. Breaks the loop once this generation is stale.
    async fn rotation_tick(self: &Arc<Self>, generation: u64) -> ControlFlow<()> {
        let (surface, fallback) = {
            let state = self.state.lock();
            if !state.rotation_current(generation) {
                return ControlFlow::Break(());
            }
            let Some(attached) = state.attached() else {
                return ControlFlow::Break(());
            };
            let fallback = state.last_camera.unwrap_or(self.config.initial_camera);
            (attached.surface, fallback)
        };

        let camera = match surface.camera_state().await {
            Ok(camera) => {
                self.state.lock().last_camera = Some(camera);
                camera
            }
            Err(err) => {
                warn!("rotation tick using last known camera: {err}");
                fallback
            }
        };
        let next = rotation::advance(&camera, self.config.rotation_step_deg);

        let _camera = self.camera_gate.lock().await;
        if !self.state.lock().rotation_current(generation) {
            debug!("dropping stale rotation update");
            return ControlFlow::Break(());
        }
        match surface.set_camera(next).await {
            Ok(()) => {
                self.state.lock().last_camera = Some(camera.apply(&next));
            }
            Err(err) => warn!("rotation update failed: {err}"),
        }
        ControlFlow::Continue(())
    }
}
