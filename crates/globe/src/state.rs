//! Idle-rotation state machine.
//!
//! Pure transition logic; the controller turns each [`Effect`] into timer
//! operations.

/// Why the globe is or is not spinning.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RotationState {
    #[default]
    Rotating,
    /// A live gesture paused rotation; a quiet timer is pending.
    SuspendedByUser,
    /// The camera is focused on a trip. Only leaving the trip resumes.
    SuspendedByTrip,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RotationEvent {
    UserGesture,
    QuietPeriodElapsed,
    TripEntered,
    TripExited,
    ResumeRequested,
}

/// Timer work implied by a transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Effect {
    Nothing,
    /// Cancel the quiet timer and (re)start the rotation loop.
    StartRotation,
    /// Cancel the rotation loop and arm the quiet timer.
    PauseForUser,
    /// Replace the pending quiet timer with a fresh one.
    RearmQuietTimer,
    /// Cancel both the rotation loop and the quiet timer.
    PauseForTrip,
}

impl RotationState {
    pub fn on(self, event: RotationEvent) -> (RotationState, Effect) {
        use RotationEvent::*;
        use RotationState::*;

        match (self, event) {
            (_, TripEntered) => (SuspendedByTrip, Effect::PauseForTrip),
            (SuspendedByTrip, TripExited) => (Rotating, Effect::StartRotation),
            (_, TripExited) => (self, Effect::Nothing),

            (SuspendedByTrip, _) => (self, Effect::Nothing),

            (Rotating, UserGesture) => (SuspendedByUser, Effect::PauseForUser),
            (SuspendedByUser, UserGesture) => (SuspendedByUser, Effect::RearmQuietTimer),
            (SuspendedByUser, QuietPeriodElapsed) => (Rotating, Effect::StartRotation),
            (Rotating, QuietPeriodElapsed) => (Rotating, Effect::Nothing),
            (_, ResumeRequested) => (Rotating, Effect::StartRotation),
        }
    }

    pub fn is_rotating(self) -> bool {
        self == RotationState::Rotating
    }

    pub fn is_viewing_trip(self) -> bool {
        self == RotationState::SuspendedByTrip
    }

    pub fn is_user_interacting(self) -> bool {
        self == RotationState::SuspendedByUser
    }
}
