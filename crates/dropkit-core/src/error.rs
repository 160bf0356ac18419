//! Typed errors for engine configuration and host scheduling.

use thiserror::Error;

use crate::host::TimerId;

/// Configuration-order violations of the registration API.
///
/// These are caller bugs and surface immediately from the `make_*` calls;
/// the engine never continues setup past one.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `make_drop_area` or `make_draggable` was called before `make_drag_area`.
    #[error("a drag area must be registered before drop areas or draggables")]
    NoDragArea,
    /// `make_draggable` was called before any drop area existed.
    #[error("at least one drop area must be registered before draggables")]
    NoDropAreas,
}

/// Failures raised by the host scheduler when arming a named timer.
///
/// Recovered locally: the engine logs them and the interaction in progress
/// carries on. They are never propagated to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A timer with this id is already armed.
    #[error("timer `{0}` is already armed")]
    DuplicateTimer(TimerId),
    /// The scheduler is no longer accepting timers.
    #[error("scheduler is shut down")]
    SchedulerUnavailable,
}
