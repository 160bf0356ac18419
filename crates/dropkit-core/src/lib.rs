//! Dropkit core: the drag-and-drop interaction engine.
//!
//! A [`DragEngine`] owns all drag-and-drop state for one drag area: the
//! registered drop areas, the draggables with their per-axis permissions and
//! callbacks, and the single in-motion reference. The engine renders nothing
//! and owns no widgets; it talks to the embedding framework exclusively
//! through the [`DragHost`] capability trait (geometry reads, position
//! writes, reparenting, timers, scroll lock, and the snap-back animation
//! runner).
//!
//! Everything is single-threaded and event-driven: the host delivers
//! touch-start on a draggable, then touch-move and touch-end on the drag
//! area, and the engine reacts on those callbacks plus the timers it arms.

mod engine;
mod error;
mod host;
mod resolve;

pub use engine::{DragCallback, DragEngine, DropCallback};
pub use error::{ConfigError, ScheduleError};
pub use host::{DragHost, ElementId, TimerId};
pub use resolve::{resolve_target_position, AxisPermissions};

pub use dropkit_animation::{Easing, SnapBack, SNAP_BACK_DURATION};
pub use dropkit_geometry::{Point, Rect, Size};
