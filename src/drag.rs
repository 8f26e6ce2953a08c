//! Drag-session state and position tracking for the overlay.

use serde::{Deserialize, Serialize};

/// Overlay top-left offset in pixels, relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset this position by a relative delta.
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// An in-flight drag. Exists only while the pointer is held down.
///
/// Mouse drags carry no extra state: each move event already arrives as a
/// relative delta. Touch drags remember the last raw touch point so the
/// absolute-movement semantics can be observed after the fact.
#[derive(Debug, Clone)]
pub enum DragSession {
    Mouse,
    Touch { last_touch: Position },
}

impl DragSession {
    pub fn is_touch(&self) -> bool {
        matches!(self, DragSession::Touch { .. })
    }

    /// Last raw touch point, if this is a touch drag.
    pub fn last_touch(&self) -> Option<Position> {
        match self {
            DragSession::Touch { last_touch } => Some(*last_touch),
            DragSession::Mouse => None,
        }
    }
}

/// Owns the overlay position and the ephemeral drag session.
///
/// Updates are applied strictly in call order; the position returned by
/// [`DragController::position`] is always the latest applied value, so the
/// rendered overlay coordinates never lag the input stream.
#[derive(Debug, Clone)]
pub struct DragController {
    position: Position,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(initial: Position) -> Self {
        Self {
            position: initial,
            session: None,
        }
    }

    /// Current overlay position.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Begin a drag session. A second begin while one is active replaces it,
    /// matching platform behavior when a down event is delivered twice.
    pub fn begin(&mut self, session: DragSession) {
        self.session = Some(session);
    }

    /// Apply a relative movement delta (mouse mode). Ignored when no
    /// session is active.
    pub fn apply_delta(&mut self, dx: f64, dy: f64) {
        if self.session.is_none() {
            return;
        }
        self.position = self.position.translated(dx, dy);
    }

    /// Apply a touch move: `touch` is the raw finger point, `recentered`
    /// the overlay position derived from it. Ignored when no touch session
    /// is active.
    pub fn move_touch(&mut self, touch: Position, recentered: Position) {
        if matches!(self.session, Some(DragSession::Touch { .. })) {
            self.session = Some(DragSession::Touch { last_touch: touch });
            self.position = recentered;
        }
    }

    /// End the drag session. The position keeps its latest value.
    pub fn end(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_accumulate_in_order() {
        let mut drag = DragController::new(Position::new(100.0, 100.0));
        drag.begin(DragSession::Mouse);
        drag.apply_delta(10.0, 0.0);
        drag.apply_delta(0.0, 10.0);
        drag.apply_delta(-5.0, -5.0);
        drag.end();
        assert_eq!(drag.position(), Position::new(105.0, 105.0));
    }

    #[test]
    fn delta_without_session_is_ignored() {
        let mut drag = DragController::new(Position::new(0.0, 0.0));
        drag.apply_delta(50.0, 50.0);
        assert_eq!(drag.position(), Position::new(0.0, 0.0));
    }

    #[test]
    fn touch_move_sets_absolute_position() {
        let mut drag = DragController::new(Position::new(10.0, 10.0));
        drag.begin(DragSession::Touch {
            last_touch: Position::new(200.0, 200.0),
        });
        drag.move_touch(Position::new(300.0, 120.0), Position::new(250.0, 95.0));
        assert_eq!(drag.position(), Position::new(250.0, 95.0));
        assert_eq!(
            drag.session().and_then(|s| s.last_touch()),
            Some(Position::new(300.0, 120.0))
        );
    }

    #[test]
    fn touch_move_in_mouse_session_is_ignored() {
        let mut drag = DragController::new(Position::new(10.0, 10.0));
        drag.begin(DragSession::Mouse);
        drag.move_touch(Position::new(300.0, 120.0), Position::new(250.0, 95.0));
        assert_eq!(drag.position(), Position::new(10.0, 10.0));
    }

    #[test]
    fn position_survives_session_end() {
        let mut drag = DragController::new(Position::new(0.0, 0.0));
        drag.begin(DragSession::Mouse);
        drag.apply_delta(7.0, 3.0);
        drag.end();
        assert!(!drag.is_dragging());
        assert_eq!(drag.position(), Position::new(7.0, 3.0));
    }
}
