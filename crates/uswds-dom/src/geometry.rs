//! Geometry APIs
//!
//! DOMRect plus the host-provided layout boxes used by
//! `Document::bounding_client_rect`.

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create empty rect
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Horizontal center
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical center
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Check if point is inside
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Check if `other` lies entirely within this rect
    pub fn contains_rect(&self, other: &DOMRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check if rects intersect
    pub fn intersects(&self, other: &DOMRect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_rect() {
        let rect = DOMRect::from_xywh(10.0, 20.0, 100.0, 50.0);

        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.center_x(), 60.0);
        assert_eq!(rect.center_y(), 45.0);
    }

    #[test]
    fn test_contains_rect() {
        let viewport = DOMRect::from_xywh(0.0, 0.0, 800.0, 600.0);

        assert!(viewport.contains_rect(&DOMRect::from_xywh(10.0, 10.0, 100.0, 20.0)));
        assert!(!viewport.contains_rect(&DOMRect::from_xywh(-5.0, 10.0, 100.0, 20.0)));
        assert!(!viewport.contains_rect(&DOMRect::from_xywh(750.0, 10.0, 100.0, 20.0)));
    }

    #[test]
    fn test_intersects() {
        let rect1 = DOMRect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let rect2 = DOMRect::from_xywh(50.0, 50.0, 100.0, 100.0);
        let rect3 = DOMRect::from_xywh(200.0, 200.0, 50.0, 50.0);

        assert!(rect1.intersects(&rect2));
        assert!(!rect1.intersects(&rect3));
    }
}
