//! Cardpress Editor Engine
//!
//! A headless greeting-card editor engine for Rust: drag a text overlay
//! across a background, stamp messages in place, and export the composited
//! card as an image file.
//!
//! # Features
//!
//! - **Soft-raster backend** (default): deterministic pure-Rust rasterizer
//!   for tests, goldens, and CLI exports
//! - **Modular design**: the rasterizer is a trait; swap in any backend
//!   that can turn a [`Scene`] into a [`Bitmap`]
//! - **Capture-safe export**: editing affordances are hidden and restored
//!   around rasterization on every exit path, success or failure
//!
//! # Example
//!
//! ```no_run
//! use cardpress::{EditorConfig, PointerEvent};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut editor = cardpress::new_editor(EditorConfig::default())?;
//! let mut raster = cardpress::new_rasterizer();
//!
//! editor.handle_pointer(PointerEvent::MouseDown);
//! editor.handle_pointer(PointerEvent::MouseMove { dx: 24.0, dy: 12.0 });
//! editor.handle_pointer(PointerEvent::MouseUp);
//! editor.set_draft("Happy birthday!");
//! editor.commit();
//!
//! let artifact = editor.export_as_image(&mut raster)?;
//! artifact.write_to("card.png")?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod background;
pub mod drag;
pub mod editor;
pub mod export;
pub mod input;
pub mod scene;
pub mod text;

// Software rasterizer backend (default feature)
#[cfg(feature = "soft-raster")]
pub mod raster;

// Async-friendly editor API (simple worker-backed abstraction)
pub mod async_api;

pub use async_api::Studio;
pub use background::{Alignment, BackgroundPicker, CATALOG};
pub use drag::{DragController, Position};
pub use editor::{CardEditor, EditorState};
pub use export::{ExportArtifact, ExportFormat, DEFAULT_EXPORT_CEILING};
pub use input::{Cursor, PointerEvent, PointerTracker};
pub use scene::{Color, OverlayView, Scene};
pub use text::{StampedText, TextCommitBuffer};

/// Configuration for an editor session
///
/// The defaults are chosen to match the card layout the engine was built
/// around: a 1280x720 canvas, an overlay input box a little wider than it
/// is tall, and an export pipeline capped at the 10 MiB artifact ceiling.
///
/// # Examples
///
/// ```
/// let cfg = cardpress::EditorConfig::default();
/// assert_eq!(cfg.export_ceiling_bytes, 10 * 1024 * 1024);
/// assert!(cfg.max_render_scale >= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Canvas dimensions in pixels
    pub canvas: CanvasSize,
    /// Overlay input-box dimensions, used for touch recentering
    pub overlay: OverlaySize,
    /// Overlay position when the session opens
    pub initial_position: Position,
    /// Encoding for exported artifacts
    pub export_format: ExportFormat,
    /// Maximum encoded artifact size in bytes
    pub export_ceiling_bytes: usize,
    /// Render scale the size search starts from
    pub max_render_scale: f64,
    /// Multiplier applied to the scale after each oversized pass
    pub scale_decay: f64,
    /// Maximum number of rasterize/encode passes before giving up
    pub scale_search_passes: u32,
    /// Deadline for the whole export sequence in milliseconds
    pub export_timeout_ms: u64,
    /// Timeout for background asset downloads in milliseconds
    pub asset_timeout_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            overlay: OverlaySize::default(),
            initial_position: Position::new(100.0, 100.0),
            export_format: ExportFormat::Png,
            export_ceiling_bytes: DEFAULT_EXPORT_CEILING,
            max_render_scale: 3.0,
            scale_decay: 0.75,
            scale_search_passes: 6,
            export_timeout_ms: 30000,
            asset_timeout_ms: 30000,
        }
    }
}

/// Canvas dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Overlay input-box dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySize {
    pub width: f64,
    pub height: f64,
}

impl Default for OverlaySize {
    fn default() -> Self {
        Self {
            width: 240.0,
            height: 90.0,
        }
    }
}

/// An RGBA8 pixel buffer produced by a rasterizer backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Allocate a fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap an existing RGBA8 buffer. Panics in debug builds if the
    /// buffer length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Fill the whole buffer with one color.
    pub fn fill(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = color.a;
        }
    }

    /// Write one pixel; out-of-bounds coordinates are ignored.
    pub fn put_pixel(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.pixels[idx] = color.r;
        self.pixels[idx + 1] = color.g;
        self.pixels[idx + 2] = color.b;
        self.pixels[idx + 3] = color.a;
    }

    /// Read one pixel, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some(Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }
}

/// Options for a single rasterization call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Permit cross-origin image sources without tainting the output
    pub allow_cross_origin: bool,
    /// Base coat painted before any scene content; `None` leaves it
    /// transparent. The scene's own fill is content and is controlled
    /// separately by the capture sequence.
    pub background: Option<Color>,
    /// Output scale relative to the canvas size
    pub scale: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            allow_cross_origin: true,
            background: None,
            scale: 1.0,
        }
    }
}

/// Core trait for rasterizer backends: render a scene snapshot into a
/// bitmap at the requested scale.
pub trait Rasterizer {
    fn render(&mut self, scene: &Scene, options: &RenderOptions) -> Result<Bitmap>;
}

/// Create a new editor session after validating the configuration.
pub fn new_editor(config: EditorConfig) -> Result<CardEditor> {
    CardEditor::new(config)
}

/// Create a rasterizer with the default backend.
#[cfg(feature = "soft-raster")]
pub fn new_rasterizer() -> impl Rasterizer {
    raster::SoftRasterizer::new()
}
