//! Geometry for pointer gestures: resize handles, minimum sizes and snapping.

use serde::{Deserialize, Serialize};

/// Smallest width or height a resize can produce.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Distance in pixels within which a dragged element snaps to a guide.
pub const SNAP_THRESHOLD: f64 = 10.0;

/// Offset applied to pasted and duplicated elements.
pub const PASTE_OFFSET: f64 = 20.0;

/// Hit slop around a resize handle, in pixels.
pub const HANDLE_RADIUS: f64 = 6.0;

/// A point in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    #[must_use]
    pub fn delta_from(self, origin: Self) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Width and height of the editing canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
}

impl CanvasSize {
    /// Create a canvas size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside or on the edge.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Location of a resize handle on this box.
    #[must_use]
    pub fn handle_position(&self, handle: ResizeHandle) -> Point {
        let (left, mid_x, right) = (self.x, self.x + self.width / 2.0, self.x + self.width);
        let (top, mid_y, bottom) = (self.y, self.y + self.height / 2.0, self.y + self.height);
        match handle {
            ResizeHandle::N => Point::new(mid_x, top),
            ResizeHandle::Ne => Point::new(right, top),
            ResizeHandle::E => Point::new(right, mid_y),
            ResizeHandle::Se => Point::new(right, bottom),
            ResizeHandle::S => Point::new(mid_x, bottom),
            ResizeHandle::Sw => Point::new(left, bottom),
            ResizeHandle::W => Point::new(left, mid_y),
            ResizeHandle::Nw => Point::new(left, top),
        }
    }

    /// The handle within [`HANDLE_RADIUS`] of `p`, if any.
    #[must_use]
    pub fn handle_at(&self, p: Point) -> Option<ResizeHandle> {
        ResizeHandle::ALL
            .into_iter()
            .find(|h| self.handle_position(*h).distance_to(p) <= HANDLE_RADIUS)
    }
}

/// One of the eight compass handles drawn around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Top edge.
    N,
    /// Top-right corner.
    Ne,
    /// Right edge.
    E,
    /// Bottom-right corner.
    Se,
    /// Bottom edge.
    S,
    /// Bottom-left corner.
    Sw,
    /// Left edge.
    W,
    /// Top-left corner.
    Nw,
}

impl ResizeHandle {
    /// Every handle, corners before edges so corners win overlapping hits.
    pub const ALL: [Self; 8] = [
        Self::Nw,
        Self::Ne,
        Self::Se,
        Self::Sw,
        Self::N,
        Self::E,
        Self::S,
        Self::W,
    ];

    const fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    const fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    const fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    const fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }
}

impl std::str::FromStr for ResizeHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "n" => Ok(Self::N),
            "ne" => Ok(Self::Ne),
            "e" => Ok(Self::E),
            "se" => Ok(Self::Se),
            "s" => Ok(Self::S),
            "sw" => Ok(Self::Sw),
            "w" => Ok(Self::W),
            "nw" => Ok(Self::Nw),
            other => Err(format!("unknown resize handle: {other}")),
        }
    }
}

/// Resize `start` by the pointer delta `(dx, dy)` from `handle`.
///
/// Width and height never drop below [`MIN_ELEMENT_SIZE`]. West and north
/// handles move the origin so the opposite edge stays put.
#[must_use]
pub fn resize(start: Rect, handle: ResizeHandle, dx: f64, dy: f64) -> Rect {
    let mut out = start;
    if handle.moves_east() {
        out.width = (start.width + dx).max(MIN_ELEMENT_SIZE);
    }
    if handle.moves_west() {
        let width = (start.width - dx).max(MIN_ELEMENT_SIZE);
        out.x = start.x + (start.width - width);
        out.width = width;
    }
    if handle.moves_south() {
        out.height = (start.height + dy).max(MIN_ELEMENT_SIZE);
    }
    if handle.moves_north() {
        let height = (start.height - dy).max(MIN_ELEMENT_SIZE);
        out.y = start.y + (start.height - height);
        out.height = height;
    }
    out
}

/// Pull a candidate position toward the canvas center lines and edges.
///
/// Axes snap independently. Center guides are tested first; an edge within
/// `threshold` overrides a center snap on the same axis.
#[must_use]
pub fn snap_to_guides(
    candidate: Point,
    width: f64,
    height: f64,
    canvas: CanvasSize,
    threshold: f64,
) -> Point {
    let center_x = canvas.width / 2.0;
    let center_y = canvas.height / 2.0;
    let mut snapped = candidate;

    if (candidate.x + width / 2.0 - center_x).abs() < threshold {
        snapped.x = center_x - width / 2.0;
    }
    if (candidate.y + height / 2.0 - center_y).abs() < threshold {
        snapped.y = center_y - height / 2.0;
    }

    if candidate.x.abs() < threshold {
        snapped.x = 0.0;
    }
    if candidate.y.abs() < threshold {
        snapped.y = 0.0;
    }
    if (candidate.x + width - canvas.width).abs() < threshold {
        snapped.x = canvas.width - width;
    }
    if (candidate.y + height - canvas.height).abs() < threshold {
        snapped.y = canvas.height - height;
    }

    snapped
}

/// Keep a dragged position inside the top-left quadrant of the page.
#[must_use]
pub fn clamp_to_page(p: Point) -> Point {
    Point::new(p.x.max(0.0), p.y.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Rect = Rect::new(100.0, 100.0, 200.0, 100.0);

    #[test]
    fn test_resize_east_grows_width() {
        let r = resize(START, ResizeHandle::E, 50.0, 999.0);
        assert_eq!(r, Rect::new(100.0, 100.0, 250.0, 100.0));
    }

    #[test]
    fn test_resize_west_keeps_right_edge() {
        let r = resize(START, ResizeHandle::W, 30.0, 0.0);
        assert_eq!(r.width, 170.0);
        assert_eq!(r.x + r.width, START.x + START.width);
    }

    #[test]
    fn test_resize_north_west_clamps_and_keeps_opposite_corner() {
        let r = resize(START, ResizeHandle::Nw, 500.0, 500.0);
        assert_eq!(r.width, MIN_ELEMENT_SIZE);
        assert_eq!(r.height, MIN_ELEMENT_SIZE);
        assert_eq!(r.x + r.width, 300.0);
        assert_eq!(r.y + r.height, 200.0);
    }

    #[test]
    fn test_resize_south_east_floor() {
        let r = resize(START, ResizeHandle::Se, -1000.0, -1000.0);
        assert_eq!((r.width, r.height), (MIN_ELEMENT_SIZE, MIN_ELEMENT_SIZE));
        assert_eq!((r.x, r.y), (100.0, 100.0));
    }

    #[test]
    fn test_snap_to_center() {
        let canvas = CanvasSize::new(1000.0, 800.0);
        // element 100x50, center at (505, 397) -> within 10px of (500, 400)
        let p = snap_to_guides(Point::new(455.0, 372.0), 100.0, 50.0, canvas, SNAP_THRESHOLD);
        assert_eq!(p, Point::new(450.0, 375.0));
    }

    #[test]
    fn test_snap_to_edges() {
        let canvas = CanvasSize::new(1000.0, 800.0);
        let p = snap_to_guides(Point::new(7.0, 300.0), 100.0, 50.0, canvas, SNAP_THRESHOLD);
        assert_eq!(p, Point::new(0.0, 300.0));
        let p = snap_to_guides(Point::new(500.0, 745.0), 100.0, 50.0, canvas, SNAP_THRESHOLD);
        assert_eq!(p, Point::new(500.0, 750.0));
    }

    #[test]
    fn test_snap_outside_threshold_is_noop() {
        let canvas = CanvasSize::new(1000.0, 800.0);
        let p = snap_to_guides(Point::new(200.0, 200.0), 100.0, 50.0, canvas, SNAP_THRESHOLD);
        assert_eq!(p, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_handle_hit() {
        assert_eq!(START.handle_at(Point::new(102.0, 98.0)), Some(ResizeHandle::Nw));
        assert_eq!(START.handle_at(Point::new(300.0, 150.0)), Some(ResizeHandle::E));
        assert_eq!(START.handle_at(Point::new(200.0, 150.0)), None);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_to_page(Point::new(-5.0, 3.0)), Point::new(0.0, 3.0));
    }

    #[test]
    fn test_handle_parse() {
        assert_eq!("se".parse::<ResizeHandle>(), Ok(ResizeHandle::Se));
        assert!("x".parse::<ResizeHandle>().is_err());
    }
}
