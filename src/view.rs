//! Pan and zoom of a chart's visible window.
//!
//! The chart toolkit is not part of this crate. An adapter forwards scroll
//! events as [`ScrollEvent`]s and applies the returned [`ViewWindow`] to its
//! axes; the arithmetic lives here so it can be tested without a UI.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Visible bounds along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    fn shifted(&self, by: f64) -> Self {
        Self::new(self.min + by, self.max + by)
    }

    fn scaled_about(&self, center: f64, scale: f64) -> Self {
        let half = self.width() * 0.5 * scale;
        Self::new(center - half, center + half)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub x: AxisRange,
    pub y: AxisRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub direction: ScrollDirection,
    /// Zoom modifier (shift) held while scrolling.
    pub modifier_held: bool,
    /// Cursor position in data coordinates, if over the plot area.
    pub cursor: Option<(f64, f64)>,
}

/// Scroll pans the x-axis; scroll with the modifier held zooms both axes
/// about the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanZoom {
    /// Zoom factor per scroll step, > 1.
    pub base_scale: f64,
    /// Fraction of the x-range moved per scroll step.
    pub pan_factor: f64,
}

impl Default for PanZoom {
    fn default() -> Self {
        Self {
            base_scale: 1.5,
            pan_factor: 0.1,
        }
    }
}

impl PanZoom {
    /// New window after `event`, or `None` when the event changes nothing
    /// (a zoom without a cursor position).
    pub fn apply(&self, view: &ViewWindow, event: &ScrollEvent) -> Option<ViewWindow> {
        if event.modifier_held {
            let (cx, cy) = event.cursor?;
            let scale = match event.direction {
                ScrollDirection::Up => 1.0 / self.base_scale,
                ScrollDirection::Down => self.base_scale,
            };
            return Some(ViewWindow {
                x: view.x.scaled_about(cx, scale),
                y: view.y.scaled_about(cy, scale),
            });
        }

        let amount = view.x.width() * self.pan_factor;
        let by = match event.direction {
            ScrollDirection::Up => amount,
            ScrollDirection::Down => -amount,
        };
        Some(ViewWindow {
            x: view.x.shifted(by),
            y: view.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewWindow {
        ViewWindow {
            x: AxisRange::new(0.0, 100.0),
            y: AxisRange::new(-10.0, 10.0),
        }
    }

    fn event(
        direction: ScrollDirection,
        modifier_held: bool,
        cursor: Option<(f64, f64)>,
    ) -> ScrollEvent {
        ScrollEvent {
            direction,
            modifier_held,
            cursor,
        }
    }

    #[test]
    fn test_pan_shifts_x_only() {
        let pz = PanZoom::default();

        let up = pz.apply(&view(), &event(ScrollDirection::Up, false, None)).expect("Pan applies");
        assert_eq!(up.x, AxisRange::new(10.0, 110.0));
        assert_eq!(up.y, view().y);

        let down = pz
            .apply(&view(), &event(ScrollDirection::Down, false, Some((3.0, 4.0))))
            .expect("Pan applies");
        assert_eq!(down.x, AxisRange::new(-10.0, 90.0));
    }

    #[test]
    fn test_zoom_about_cursor() {
        let pz = PanZoom {
            base_scale: 2.0,
            pan_factor: 0.1,
        };

        let zin = pz
            .apply(&view(), &event(ScrollDirection::Up, true, Some((40.0, 0.0))))
            .expect("Zoom applies");
        assert_eq!(zin.x, AxisRange::new(15.0, 65.0));
        assert_eq!(zin.y, AxisRange::new(-5.0, 5.0));

        let zout = pz
            .apply(&view(), &event(ScrollDirection::Down, true, Some((50.0, 0.0))))
            .expect("Zoom applies");
        assert_eq!(zout.x.width(), 200.0);
        assert_eq!(zout.y, AxisRange::new(-20.0, 20.0));
    }

    #[test]
    fn test_zoom_without_cursor_is_noop() {
        let pz = PanZoom::default();
        assert!(pz.apply(&view(), &event(ScrollDirection::Up, true, None)).is_none());
    }
}
