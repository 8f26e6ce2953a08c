//! Raw pointer/touch events and their translation into drag updates.
//!
//! Mouse and touch deliberately use different movement semantics: mouse
//! moves arrive as relative deltas and are accumulated, while each touch
//! move carries the absolute finger position and recenters the overlay
//! under the finger (offset by half the overlay's own size). Both paths
//! are preserved here exactly as the interaction requires.

use serde::{Deserialize, Serialize};

use crate::drag::{DragController, DragSession, Position};
use crate::OverlaySize;

/// A raw input event on the interaction surface.
///
/// Down events originate on the overlay; move and up events are observed
/// on the whole surface so a fast drag is not lost when the pointer
/// outruns the overlay's bounds. `PointerLeave` is the pointer leaving
/// the surface entirely, which also ends any drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    MouseDown,
    MouseMove { dx: f64, dy: f64 },
    MouseUp,
    TouchStart { x: f64, y: f64 },
    TouchMove { x: f64, y: f64 },
    TouchEnd,
    PointerLeave,
}

/// Cursor affordance shown over the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Grab,
    Grabbing,
}

impl Cursor {
    /// CSS cursor keyword equivalent.
    pub fn name(self) -> &'static str {
        match self {
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        }
    }
}

/// Converts raw events into drag-controller updates and manages the
/// cursor affordance.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    overlay: OverlaySize,
    cursor: Cursor,
}

impl PointerTracker {
    pub fn new(overlay: OverlaySize) -> Self {
        Self {
            overlay,
            cursor: Cursor::Grab,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Feed one event through to the drag controller.
    ///
    /// Move events with no active session fall through silently; they are
    /// expected whenever the pointer crosses the surface without a drag
    /// in progress.
    pub fn track(&mut self, event: PointerEvent, drag: &mut DragController) {
        match event {
            PointerEvent::MouseDown => {
                drag.begin(DragSession::Mouse);
                self.cursor = Cursor::Grabbing;
            }
            PointerEvent::TouchStart { x, y } => {
                drag.begin(DragSession::Touch {
                    last_touch: Position::new(x, y),
                });
                self.cursor = Cursor::Grabbing;
            }
            PointerEvent::MouseMove { dx, dy } => {
                if matches!(drag.session(), Some(DragSession::Mouse)) {
                    drag.apply_delta(dx, dy);
                }
            }
            PointerEvent::TouchMove { x, y } => {
                let touch = Position::new(x, y);
                let recentered = Position::new(
                    x - self.overlay.width / 2.0,
                    y - self.overlay.height / 2.0,
                );
                drag.move_touch(touch, recentered);
            }
            PointerEvent::MouseUp | PointerEvent::TouchEnd | PointerEvent::PointerLeave => {
                drag.end();
                self.cursor = Cursor::Grab;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> PointerTracker {
        PointerTracker::new(OverlaySize {
            width: 120.0,
            height: 60.0,
        })
    }

    #[test]
    fn mouse_sequence_accumulates_deltas() {
        let mut t = tracker();
        let mut drag = DragController::new(Position::new(100.0, 100.0));
        t.track(PointerEvent::MouseDown, &mut drag);
        assert_eq!(t.cursor(), Cursor::Grabbing);
        t.track(PointerEvent::MouseMove { dx: 10.0, dy: 0.0 }, &mut drag);
        t.track(PointerEvent::MouseMove { dx: 0.0, dy: 10.0 }, &mut drag);
        t.track(PointerEvent::MouseMove { dx: -5.0, dy: -5.0 }, &mut drag);
        t.track(PointerEvent::MouseUp, &mut drag);
        assert_eq!(t.cursor(), Cursor::Grab);
        assert_eq!(drag.position(), Position::new(105.0, 105.0));
    }

    #[test]
    fn touch_move_recenters_under_finger() {
        let mut t = tracker();
        let mut drag = DragController::new(Position::new(0.0, 0.0));
        t.track(PointerEvent::TouchStart { x: 200.0, y: 200.0 }, &mut drag);
        t.track(PointerEvent::TouchMove { x: 300.0, y: 150.0 }, &mut drag);
        // Overlay centered under the finger: minus half width/height.
        assert_eq!(drag.position(), Position::new(240.0, 120.0));
        t.track(PointerEvent::TouchEnd, &mut drag);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn touch_moves_are_not_order_sensitive() {
        // Each touch move sets an absolute position; only the last matters.
        let mut t = tracker();
        let mut drag = DragController::new(Position::new(0.0, 0.0));
        t.track(PointerEvent::TouchStart { x: 10.0, y: 10.0 }, &mut drag);
        t.track(PointerEvent::TouchMove { x: 500.0, y: 500.0 }, &mut drag);
        t.track(PointerEvent::TouchMove { x: 100.0, y: 100.0 }, &mut drag);
        assert_eq!(drag.position(), Position::new(40.0, 70.0));
    }

    #[test]
    fn move_without_session_is_a_noop() {
        let mut t = tracker();
        let mut drag = DragController::new(Position::new(5.0, 5.0));
        t.track(PointerEvent::MouseMove { dx: 50.0, dy: 50.0 }, &mut drag);
        t.track(PointerEvent::TouchMove { x: 400.0, y: 400.0 }, &mut drag);
        assert_eq!(drag.position(), Position::new(5.0, 5.0));
    }

    #[test]
    fn pointer_leave_ends_the_session() {
        let mut t = tracker();
        let mut drag = DragController::new(Position::new(0.0, 0.0));
        t.track(PointerEvent::MouseDown, &mut drag);
        t.track(PointerEvent::PointerLeave, &mut drag);
        assert!(!drag.is_dragging());
        assert_eq!(t.cursor(), Cursor::Grab);
        // A move after the leave must not land.
        t.track(PointerEvent::MouseMove { dx: 1.0, dy: 1.0 }, &mut drag);
        assert_eq!(drag.position(), Position::new(0.0, 0.0));
    }

    #[test]
    fn pointer_event_json_round_trip() {
        let ev = PointerEvent::TouchMove { x: 12.0, y: 34.0 };
        let json = serde_json::to_string(&ev).expect("serialize");
        assert!(json.contains("touch_move"));
        let back: PointerEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, ev);
    }
}
