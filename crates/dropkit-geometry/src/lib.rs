//! Geometric primitives: Point, Size, Rect, plus the centered-containment
//! tests used for drop-area hit-testing.
//!
//! All coordinates are in device-independent units in the host framework's
//! coordinate space. Containment is evaluated against a draggable's bounding
//! box centered on a candidate point; touching an edge counts as inside.

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    /// True while the host has not produced a real layout for the element.
    pub fn is_zero(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Horizontal containment: a box of `width` centered at `cx` lies fully
    /// inside this rect's horizontal span. Edges count as inside.
    pub fn contains_centered_x(&self, width: f32, cx: f32) -> bool {
        let half = width / 2.0;
        self.x <= cx - half && cx + half <= self.x + self.width
    }

    /// Vertical containment: a box of `height` centered at `cy` lies fully
    /// inside this rect's vertical span. Edges count as inside.
    pub fn contains_centered_y(&self, height: f32, cy: f32) -> bool {
        let half = height / 2.0;
        self.y <= cy - half && cy + half <= self.y + self.height
    }

    /// Full containment of a box of `size` centered at (`cx`, `cy`).
    pub fn contains_centered(&self, size: Size, cx: f32, cy: f32) -> bool {
        self.contains_centered_x(size.width, cx) && self.contains_centered_y(size.height, cy)
    }
}
