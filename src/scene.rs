//! The renderable scene handed to a rasterizer backend.
//!
//! A `Scene` is a plain-data snapshot assembled by the editor for each
//! capture: background layer, stamp layer, and (outside of export) the
//! live overlay. The editing affordances never reach the rasterizer
//! during an export because the snapshot simply omits them.

use crate::background::BackgroundAsset;
use crate::drag::Position;
use crate::input::Cursor;
use crate::text::StampedText;
use crate::{CanvasSize, OverlaySize};

/// RGBA color, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
}

/// The live editing overlay as the rasterizer would draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub position: Position,
    pub size: OverlaySize,
    pub draft: String,
    pub cursor: Cursor,
}

/// Snapshot of everything renderable.
#[derive(Debug, Clone)]
pub struct Scene {
    pub size: CanvasSize,
    pub background: &'static BackgroundAsset,
    /// Container fill painted under the background image. `None` means
    /// transparent; export clears this so the rasterizer does not bake a
    /// solid fill where the image itself does not cover.
    pub fill: Option<Color>,
    pub stamps: Vec<StampedText>,
    /// `None` when the overlay is hidden (capture in progress).
    pub overlay: Option<OverlayView>,
}

impl Scene {
    pub fn overlay_hidden(&self) -> bool {
        self.overlay.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::CATALOG;

    #[test]
    fn hidden_overlay_is_absent_from_the_snapshot() {
        let scene = Scene {
            size: CanvasSize::default(),
            background: &CATALOG[0],
            fill: Some(Color::WHITE),
            stamps: vec![],
            overlay: None,
        };
        assert!(scene.overlay_hidden());
    }

    #[test]
    fn color_constructors() {
        assert_eq!(Color::rgb(1, 2, 3).a, 255);
        assert_eq!(Color::TRANSPARENT.a, 0);
    }
}
