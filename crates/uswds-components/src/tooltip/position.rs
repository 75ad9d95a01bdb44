//! Tooltip placement
//!
//! Pure geometry: given the trigger box, the body size and the viewport,
//! pick a side whose box stays fully visible.

use uswds_dom::DOMRect;

/// Side of the trigger the body is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Right,
    Left,
}

impl Side {
    /// Fallback order after the preferred side
    pub const ORDER: [Side; 4] = [Side::Top, Side::Bottom, Side::Right, Side::Left];

    /// Parse a `data-position` value
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Side::Top),
            "bottom" => Some(Side::Bottom),
            "right" => Some(Side::Right),
            "left" => Some(Side::Left),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Right => "right",
            Side::Left => "left",
        }
    }
}

/// Box of a `width` x `height` body placed on `side` of `trigger`
pub fn place(trigger: DOMRect, width: f64, height: f64, side: Side, gap: f64) -> DOMRect {
    let (x, y) = match side {
        Side::Top => (trigger.center_x() - width / 2.0, trigger.top() - gap - height),
        Side::Bottom => (trigger.center_x() - width / 2.0, trigger.bottom() + gap),
        Side::Right => (trigger.right() + gap, trigger.center_y() - height / 2.0),
        Side::Left => (trigger.left() - gap - width, trigger.center_y() - height / 2.0),
    };
    DOMRect::from_xywh(x, y, width, height)
}

/// First side, starting with `preferred`, whose box fits in `viewport`.
/// Falls back to `preferred` when nothing fits.
pub fn choose(
    trigger: DOMRect,
    width: f64,
    height: f64,
    viewport: DOMRect,
    preferred: Side,
    gap: f64,
) -> (Side, DOMRect) {
    std::iter::once(preferred)
        .chain(Side::ORDER.into_iter().filter(|&s| s != preferred))
        .map(|side| (side, place(trigger, width, height, side, gap)))
        .find(|(_, rect)| viewport.contains_rect(rect))
        .unwrap_or_else(|| (preferred, place(trigger, width, height, preferred, gap)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: DOMRect = DOMRect {
        x: 0.0,
        y: 0.0,
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn test_place_centers_on_trigger() {
        let trigger = DOMRect::from_xywh(100.0, 100.0, 40.0, 20.0);
        let top = place(trigger, 60.0, 30.0, Side::Top, 5.0);
        assert_eq!(top, DOMRect::from_xywh(90.0, 65.0, 60.0, 30.0));

        let right = place(trigger, 60.0, 30.0, Side::Right, 5.0);
        assert_eq!(right, DOMRect::from_xywh(145.0, 95.0, 60.0, 30.0));
    }

    #[test]
    fn test_choose_prefers_requested_side() {
        let trigger = DOMRect::from_xywh(300.0, 300.0, 40.0, 20.0);
        let (side, _) = choose(trigger, 60.0, 30.0, VIEWPORT, Side::Left, 5.0);
        assert_eq!(side, Side::Left);
    }

    #[test]
    fn test_choose_flips_at_the_edge() {
        // Flush with the top of the viewport: top cannot fit
        let trigger = DOMRect::from_xywh(300.0, 0.0, 40.0, 20.0);
        let (side, rect) = choose(trigger, 60.0, 30.0, VIEWPORT, Side::Top, 5.0);
        assert_eq!(side, Side::Bottom);
        assert_eq!(rect.y, 25.0);
    }

    #[test]
    fn test_choose_falls_back_to_preferred() {
        let trigger = DOMRect::from_xywh(0.0, 0.0, 800.0, 600.0);
        let (side, _) = choose(trigger, 60.0, 30.0, VIEWPORT, Side::Right, 5.0);
        assert_eq!(side, Side::Right);
    }

    #[test]
    fn test_parse_side() {
        assert_eq!(Side::parse(" Bottom "), Some(Side::Bottom));
        assert_eq!(Side::parse("center"), None);
    }
}
