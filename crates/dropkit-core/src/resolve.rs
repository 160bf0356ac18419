//! Target-position resolution: raw touch point to applied position.

use dropkit_geometry::{Point, Rect, Size};

/// Per-axis movement permissions for a draggable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisPermissions {
    pub horizontal: bool,
    pub vertical: bool,
}

impl AxisPermissions {
    pub fn both(&self) -> bool {
        self.horizontal && self.vertical
    }
}

/// Converts a raw touch point into the position the draggable should move to.
///
/// The touch point represents the draggable's center, so the applied position
/// is the touch point minus half the draggable's extent per axis. Each axis is
/// resolved independently: an axis moves only if its permission flag is set
/// and, when `single_area` is given (exactly one drop area registered), the
/// raw coordinate stays within that area's span; otherwise the axis keeps the
/// coordinate of `last_position`.
///
/// Pure function of its inputs; the touch handlers and the tests share it.
pub fn resolve_target_position(
    single_area: Option<Rect>,
    permissions: AxisPermissions,
    size: Size,
    last_position: Point,
    touch: Point,
) -> Point {
    let x_valid = single_area.map_or(true, |area| area.contains_centered_x(size.width, touch.x));
    let y_valid = single_area.map_or(true, |area| area.contains_centered_y(size.height, touch.y));

    let x = if permissions.horizontal && x_valid {
        touch.x - size.width / 2.0
    } else {
        last_position.x
    };
    let y = if permissions.vertical && y_valid {
        touch.y - size.height / 2.0
    } else {
        last_position.y
    };
    Point::new(x, y)
}
