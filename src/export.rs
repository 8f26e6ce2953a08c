//! Capture-safe export pipeline.
//!
//! The export sequence hides the live overlay and neutralizes the
//! container fill, rasterizes the scene, and restores both mutations on
//! every exit path via [`CaptureGuard`]. Encoded output is held under a
//! byte ceiling by re-rendering at progressively smaller scales; the
//! search is bounded so an unsatisfiable ceiling surfaces as
//! [`Error::ExportTooLarge`] instead of looping.

use std::io::Write as _;
use std::path::Path;
use std::time::{Duration, Instant};

use base64::Engine as Base64Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

use crate::editor::CardEditor;
use crate::{Bitmap, Error, Rasterizer, RenderOptions, Result};

/// Maximum encoded artifact size: 10 MiB.
pub const DEFAULT_EXPORT_CEILING: usize = 10 * 1024 * 1024;

/// Encoding for exported artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    /// JPEG at the given quality (1-100).
    Jpeg { quality: u8 },
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    /// Canonical artifact filename for this format.
    pub fn filename(self) -> &'static str {
        match self {
            ExportFormat::Png => "export.png",
            ExportFormat::Jpeg { .. } => "export.jpg",
        }
    }
}

/// Transient output of the capture pipeline: encoded bytes plus the
/// download metadata. Nothing is persisted until the caller asks.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub format: ExportFormat,
    pub data: Vec<u8>,
}

impl ExportArtifact {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Base64 data URL form, the in-page download-href equivalent.
    pub fn to_data_url(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.format.mime(), b64)
    }

    /// Write the artifact to disk, the download-click equivalent.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut f = std::fs::File::create(path)?;
        f.write_all(&self.data)?;
        Ok(())
    }
}

/// Scoped acquisition of a capture-safe view of the editor.
///
/// Acquiring hides the overlay and clears the container fill, recording
/// the prior values; dropping restores them. Restoration therefore runs
/// on success, error, and early return alike.
pub(crate) struct CaptureGuard<'a> {
    editor: &'a mut CardEditor,
    prev_visible: bool,
    prev_fill: Option<crate::Color>,
}

impl<'a> CaptureGuard<'a> {
    pub(crate) fn acquire(editor: &'a mut CardEditor) -> Self {
        let prev_visible = editor.overlay_visible();
        let prev_fill = editor.container_fill();
        editor.set_overlay_visible(false);
        editor.set_container_fill(None);
        Self {
            editor,
            prev_visible,
            prev_fill,
        }
    }

    pub(crate) fn editor(&self) -> &CardEditor {
        self.editor
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.editor.set_overlay_visible(self.prev_visible);
        self.editor.set_container_fill(self.prev_fill);
    }
}

/// Encode a bitmap in the requested format. JPEG output is flattened
/// onto white first since the format carries no alpha.
pub fn encode(bitmap: &Bitmap, format: ExportFormat) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match format {
        ExportFormat::Png => {
            PngEncoder::new(&mut out)
                .write_image(
                    bitmap.pixels(),
                    bitmap.width(),
                    bitmap.height(),
                    ColorType::Rgba8,
                )
                .map_err(|e| Error::EncodeError(e.to_string()))?;
        }
        ExportFormat::Jpeg { quality } => {
            let rgb = flatten_to_rgb(bitmap);
            JpegEncoder::new_with_quality(&mut out, quality)
                .write_image(&rgb, bitmap.width(), bitmap.height(), ColorType::Rgb8)
                .map_err(|e| Error::EncodeError(e.to_string()))?;
        }
    }
    Ok(out)
}

fn flatten_to_rgb(bitmap: &Bitmap) -> Vec<u8> {
    let px = bitmap.pixels();
    let mut rgb = Vec::with_capacity(px.len() / 4 * 3);
    for chunk in px.chunks_exact(4) {
        let a = chunk[3] as u16;
        for c in &chunk[..3] {
            rgb.push(((*c as u16 * a + 255 * (255 - a)) / 255) as u8);
        }
    }
    rgb
}

/// Run the full capture sequence against the editor's current scene.
///
/// The scale search starts at `max_render_scale` and decays toward
/// smaller output until the encoding fits under the ceiling or the pass
/// bound is reached. The deadline covers the whole sequence; an expired
/// deadline aborts with the same guaranteed restoration as any error.
pub(crate) fn run_capture<R: Rasterizer + ?Sized>(
    editor: &mut CardEditor,
    raster: &mut R,
) -> Result<ExportArtifact> {
    let config = editor.config().clone();
    let deadline = Instant::now() + Duration::from_millis(config.export_timeout_ms);

    let guard = CaptureGuard::acquire(editor);

    let mut scale = config.max_render_scale;
    let mut last_size = 0usize;
    for pass in 1..=config.scale_search_passes {
        if Instant::now() >= deadline {
            return Err(Error::Timeout(config.export_timeout_ms));
        }

        let scene = guard.editor().scene();
        let options = RenderOptions {
            allow_cross_origin: true,
            background: None,
            scale,
        };
        let bitmap = raster.render(&scene, &options).map_err(|e| match e {
            Error::CaptureError(_) => e,
            other => Error::CaptureError(other.to_string()),
        })?;

        if Instant::now() >= deadline {
            return Err(Error::Timeout(config.export_timeout_ms));
        }

        let data = encode(&bitmap, config.export_format)?;
        if data.len() <= config.export_ceiling_bytes {
            log::debug!(
                "Export pass {} fit at scale {:.2}: {} bytes",
                pass,
                scale,
                data.len()
            );
            return Ok(ExportArtifact {
                filename: config.export_format.filename().to_string(),
                format: config.export_format,
                data,
            });
        }

        log::debug!(
            "Export pass {} at scale {:.2} produced {} bytes, over the {} byte ceiling",
            pass,
            scale,
            data.len(),
            config.export_ceiling_bytes
        );
        last_size = data.len();
        scale *= config.scale_decay;
    }

    Err(Error::ExportTooLarge {
        bytes: last_size,
        ceiling: config.export_ceiling_bytes,
    })
}
