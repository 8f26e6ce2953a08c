//! The editor session: one card, one overlay, one export at a time.

use crate::background::{Alignment, BackgroundAsset, BackgroundPicker};
use crate::drag::{DragController, Position};
use crate::export::{self, ExportArtifact};
use crate::input::{Cursor, PointerEvent, PointerTracker};
use crate::scene::{Color, OverlayView, Scene};
use crate::text::{StampedText, TextCommitBuffer};
use crate::{EditorConfig, Error, Rasterizer, Result};

/// Editor lifecycle states. Dragging and capturing never overlap: input
/// is event-driven and the capture sequence runs to completion before
/// the next event is seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Dragging,
    Capturing,
}

/// A single editing session over one card.
///
/// Owns the drag state, the text buffer, the background selection, and
/// the two pieces of capture-mutable presentation state (overlay
/// visibility and container fill). Everything lives and dies with this
/// value; nothing is persisted.
pub struct CardEditor {
    config: EditorConfig,
    tracker: PointerTracker,
    drag: DragController,
    text: TextCommitBuffer,
    picker: BackgroundPicker,
    overlay_visible: bool,
    fill: Option<Color>,
    state: EditorState,
}

impl CardEditor {
    pub fn new(config: EditorConfig) -> Result<Self> {
        if config.canvas.width == 0 || config.canvas.height == 0 {
            return Err(Error::ConfigError("canvas must be non-empty".into()));
        }
        if config.overlay.width <= 0.0 || config.overlay.height <= 0.0 {
            return Err(Error::ConfigError("overlay must be non-empty".into()));
        }
        if config.export_ceiling_bytes == 0 {
            return Err(Error::ConfigError("export ceiling must be positive".into()));
        }
        if config.max_render_scale <= 0.0 {
            return Err(Error::ConfigError("max render scale must be positive".into()));
        }
        if !(config.scale_decay > 0.0 && config.scale_decay < 1.0) {
            return Err(Error::ConfigError(
                "scale decay must be strictly between 0 and 1".into(),
            ));
        }
        if config.scale_search_passes == 0 {
            return Err(Error::ConfigError(
                "at least one scale search pass is required".into(),
            ));
        }
        if let crate::ExportFormat::Jpeg { quality } = config.export_format {
            if !(1..=100).contains(&quality) {
                return Err(Error::ConfigError(
                    "jpeg quality must be between 1 and 100".into(),
                ));
            }
        }

        Ok(Self {
            tracker: PointerTracker::new(config.overlay),
            drag: DragController::new(config.initial_position),
            text: TextCommitBuffer::new(),
            picker: BackgroundPicker::new(),
            overlay_visible: true,
            fill: Some(Color::WHITE),
            state: EditorState::Idle,
            config,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Current overlay position.
    pub fn position(&self) -> Position {
        self.drag.position()
    }

    pub fn cursor(&self) -> Cursor {
        self.tracker.cursor()
    }

    /// Feed one raw input event through the tracker and drag controller.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.tracker.track(event, &mut self.drag);
        self.state = if self.drag.is_dragging() {
            EditorState::Dragging
        } else {
            EditorState::Idle
        };
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.text.set_draft(text);
    }

    pub fn draft(&self) -> &str {
        self.text.draft()
    }

    /// Stamp the draft at the overlay's current position.
    pub fn commit(&mut self) -> &StampedText {
        let position = self.drag.position();
        self.text.commit(position)
    }

    pub fn stamps(&self) -> &[StampedText] {
        self.text.stamps()
    }

    /// Select a background by id or exact url. Returns false when the
    /// reference matches no catalog entry.
    pub fn select_background(&mut self, reference: &str) -> bool {
        self.picker.select(reference)
    }

    pub fn background(&self) -> &'static BackgroundAsset {
        self.picker.selected()
    }

    /// Alignment derived from the active background.
    pub fn alignment(&self) -> Alignment {
        self.picker.alignment()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub(crate) fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay_visible = visible;
    }

    /// Container fill painted under the background image.
    pub fn container_fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn set_container_fill(&mut self, fill: Option<Color>) {
        self.fill = fill;
    }

    /// Assemble the renderable snapshot of the current state. The
    /// overlay is present only while it is visible, so a capture in
    /// progress simply never hands editing affordances to the backend.
    pub fn scene(&self) -> Scene {
        Scene {
            size: self.config.canvas,
            background: self.picker.selected(),
            fill: self.fill,
            stamps: self.text.stamps().to_vec(),
            overlay: if self.overlay_visible {
                Some(OverlayView {
                    position: self.drag.position(),
                    size: self.config.overlay,
                    draft: self.text.draft().to_string(),
                    cursor: self.tracker.cursor(),
                })
            } else {
                None
            },
        }
    }

    /// Export the current artwork layer through the given rasterizer.
    ///
    /// Refuses to start while another export is in flight. After the
    /// attempt settles the draft and the stamps are cleared, on success
    /// and failure alike; overlay visibility and container fill are
    /// restored to their pre-call values on every path.
    pub fn export_as_image<R: Rasterizer + ?Sized>(
        &mut self,
        raster: &mut R,
    ) -> Result<ExportArtifact> {
        if self.state == EditorState::Capturing {
            return Err(Error::ExportInProgress);
        }
        self.state = EditorState::Capturing;

        let result = export::run_capture(self, raster);

        self.text.clear();
        self.state = if self.drag.is_dragging() {
            EditorState::Dragging
        } else {
            EditorState::Idle
        };

        match &result {
            Ok(artifact) => log::debug!("Exported {} ({} bytes)", artifact.filename, artifact.len()),
            Err(e) => log::warn!("Export failed: {}", e),
        }
        result
    }
}
