//! The host boundary: capabilities the embedding framework provides.
//!
//! The engine never touches widgets directly. Elements are opaque to it and
//! identified by a stable [`ElementId`]; every read or mutation goes through
//! the [`DragHost`] trait, which an embedding implements once per UI
//! framework. `dropkit-testing` ships an in-memory implementation for tests
//! and headless demos.

use std::fmt;
use std::time::Duration;

use dropkit_animation::SnapBack;
use dropkit_geometry::{Point, Rect};

use crate::error::ScheduleError;

/// Stable identity of a host element (drag area, drop area, or draggable).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of a cancelable host timer.
///
/// The engine derives these from the owning engine instance and element so
/// that timers armed by a torn-down engine can never collide with a
/// successor's.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TimerId(String);

impl TimerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capabilities the engine requires from the embedding UI framework.
///
/// All methods are called from the host's own event loop; implementations
/// may re-enter the engine from `set_position` (a forced layout pass can
/// deliver layout-settled notifications synchronously), so the engine never
/// holds internal borrows across these calls.
pub trait DragHost {
    /// Current geometry of an element, relative to its parent container.
    fn frame(&self, element: ElementId) -> Rect;

    /// The element's current parent container, if it has one.
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Sets an element's left/top position and forces a synchronous layout
    /// recompute.
    fn set_position(&self, element: ElementId, position: Point);

    /// Moves an element under `new_parent` in the widget tree. Positions are
    /// not adjusted; callers translate coordinates explicitly beforehand.
    fn reparent(&self, element: ElementId, new_parent: ElementId);

    /// Whether the hosting screen currently allows scrolling.
    fn is_scroll_enabled(&self) -> bool;

    /// Enables or disables scrolling on the hosting screen.
    fn set_scroll_enabled(&self, enabled: bool);

    /// Arms a named, cancelable timer. `repeating` timers fire until
    /// cancelled; others fire once.
    fn schedule(
        &self,
        timer: TimerId,
        delay: Duration,
        repeating: bool,
        callback: Box<dyn FnMut()>,
    ) -> Result<(), ScheduleError>;

    /// Cancels a named timer. Unknown ids are ignored.
    fn cancel(&self, timer: &TimerId);

    /// Invokes `callback` once the element's geometry is non-zero: right away
    /// if layout has already produced it, otherwise after the layout pass
    /// that first does.
    fn notify_layout_settled(&self, element: ElementId, callback: Box<dyn FnOnce()>);

    /// Runs `snap_back` on the element's position and invokes `on_end` when
    /// the run completes. The element holds the end position afterwards.
    fn animate(&self, element: ElementId, snap_back: SnapBack, on_end: Box<dyn FnOnce()>);
}
