//! In-memory host for exercising the drag engine without a UI framework.
//!
//! [`TestHost`] implements every [`DragHost`] capability over a plain element
//! registry: frames and parents are stored directly, timers and layout-settle
//! subscriptions are queued until the test pumps them, and snap-back runs are
//! recorded instead of rendered. Tests (and the headless demo) drive the
//! clock explicitly:
//!
//! - [`run_layout`](TestHost::run_layout) performs a layout pass, delivering
//!   pending settle notifications for elements whose geometry is non-zero;
//! - [`fire_timers`](TestHost::fire_timers) fires every armed timer once,
//!   removing the non-repeating ones;
//! - [`complete_animations`](TestHost::complete_animations) jumps recorded
//!   snap-backs to their end position and invokes their completion callbacks.

mod test_host;

pub use test_host::TestHost;
