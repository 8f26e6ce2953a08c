//! Software rasterizer backend.
//!
//! Deterministic pure-Rust rendering of a [`Scene`]: base coat, container
//! fill, background layer, stamp plates, and (outside of capture) the
//! live overlay. When a background asset has not been decoded into the
//! store, its layer is a flat tint derived from the asset reference, so
//! output is stable with or without network access.

pub mod font;

use sha2::{Digest, Sha256};

use crate::background::AssetStore;
use crate::scene::{Color, Scene};
use crate::{Bitmap, Error, Rasterizer, RenderOptions, Result};

/// Largest output dimension the backend will attempt.
pub const MAX_DIMENSION: u32 = 16384;

const STAMP_PLATE: Color = Color::rgb(254, 240, 138);
const PLATE_BORDER: Color = Color::rgb(209, 213, 219);
const INK: Color = Color::rgb(31, 41, 55);
const OVERLAY_PLATE: Color = Color::WHITE;
const DRAFT_INK: Color = Color::rgb(107, 114, 128);

/// The built-in deterministic backend.
#[derive(Debug, Default)]
pub struct SoftRasterizer {
    assets: AssetStore,
}

impl SoftRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded background images available to this backend.
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetStore {
        &mut self.assets
    }
}

impl Rasterizer for SoftRasterizer {
    fn render(&mut self, scene: &Scene, options: &RenderOptions) -> Result<Bitmap> {
        if options.scale <= 0.0 || !options.scale.is_finite() {
            return Err(Error::CaptureError(format!(
                "render scale must be positive, got {}",
                options.scale
            )));
        }

        let width = (scene.size.width as f64 * options.scale).round() as u64;
        let height = (scene.size.height as f64 * options.scale).round() as u64;
        if width == 0 || height == 0 {
            return Err(Error::CaptureError("render output would be empty".into()));
        }
        if width > MAX_DIMENSION as u64 || height > MAX_DIMENSION as u64 {
            return Err(Error::CaptureError(format!(
                "render output {}x{} exceeds the {} pixel dimension limit",
                width, height, MAX_DIMENSION
            )));
        }

        let remote = scene.background.url.starts_with("http");
        if remote && !options.allow_cross_origin {
            return Err(Error::CaptureError(format!(
                "cross-origin image blocked: {}",
                scene.background.url
            )));
        }

        let mut bmp = Bitmap::new(width as u32, height as u32);

        if let Some(base) = options.background {
            bmp.fill(base);
        }
        if let Some(fill) = scene.fill {
            bmp.fill(fill);
        }

        match self.assets.get(scene.background.id) {
            Some(src) => blit_cover(&mut bmp, src),
            None => bmp.fill(asset_tint(scene.background.url)),
        }

        let k = glyph_pixel(options.scale);
        let pad = (8.0 * options.scale).round() as i64;

        for stamp in &scene.stamps {
            let x = scaled(stamp.position.x, options.scale);
            let y = scaled(stamp.position.y, options.scale);
            let w = font::text_width(&stamp.text) as i64 * k + 2 * pad;
            let h = font::GLYPH_HEIGHT as i64 * k + 2 * pad;
            fill_rect(&mut bmp, x, y, w, h, STAMP_PLATE);
            stroke_rect(&mut bmp, x, y, w, h, k, PLATE_BORDER);
            draw_text(&mut bmp, x + pad, y + pad, &stamp.text, k, INK);
        }

        if let Some(overlay) = &scene.overlay {
            let x = scaled(overlay.position.x, options.scale);
            let y = scaled(overlay.position.y, options.scale);
            let w = scaled(overlay.size.width, options.scale);
            let h = scaled(overlay.size.height, options.scale);
            fill_rect(&mut bmp, x, y, w, h, OVERLAY_PLATE);
            stroke_rect(&mut bmp, x, y, w, h, k, PLATE_BORDER);
            draw_text(&mut bmp, x + pad, y + pad, &overlay.draft, k, DRAFT_INK);
        }

        Ok(bmp)
    }
}

/// Flat wash standing in for an asset that has not been decoded.
/// Content-addressed on the reference so output is reproducible.
pub fn asset_tint(reference: &str) -> Color {
    let digest = Sha256::digest(reference.as_bytes());
    Color::rgb(
        128 + digest[0] / 2,
        128 + digest[1] / 2,
        128 + digest[2] / 2,
    )
}

fn glyph_pixel(scale: f64) -> i64 {
    ((2.0 * scale).round() as i64).max(1)
}

fn scaled(v: f64, scale: f64) -> i64 {
    (v * scale).round() as i64
}

fn fill_rect(bmp: &mut Bitmap, x: i64, y: i64, w: i64, h: i64, color: Color) {
    for yy in y..y + h {
        for xx in x..x + w {
            bmp.put_pixel(xx, yy, color);
        }
    }
}

fn stroke_rect(bmp: &mut Bitmap, x: i64, y: i64, w: i64, h: i64, t: i64, color: Color) {
    fill_rect(bmp, x, y, w, t, color);
    fill_rect(bmp, x, y + h - t, w, t, color);
    fill_rect(bmp, x, y, t, h, color);
    fill_rect(bmp, x + w - t, y, t, h, color);
}

fn draw_text(bmp: &mut Bitmap, x: i64, y: i64, text: &str, k: i64, color: Color) {
    let mut cx = x;
    for ch in text.chars() {
        let rows = font::glyph(ch);
        for (ry, bits) in rows.iter().enumerate() {
            for rx in 0..font::GLYPH_WIDTH as i64 {
                if bits & (1 << (font::GLYPH_WIDTH as i64 - 1 - rx)) != 0 {
                    fill_rect(bmp, cx + rx * k, y + ry as i64 * k, k, k, color);
                }
            }
        }
        cx += font::GLYPH_ADVANCE as i64 * k;
    }
}

/// Scale `src` to cover `dst` (centered crop), nearest-neighbor.
fn blit_cover(dst: &mut Bitmap, src: &Bitmap) {
    if src.width() == 0 || src.height() == 0 {
        return;
    }
    let (dw, dh) = (dst.width() as f64, dst.height() as f64);
    let (sw, sh) = (src.width() as f64, src.height() as f64);
    let f = (dw / sw).max(dh / sh);
    let ox = (sw - dw / f) / 2.0;
    let oy = (sh - dh / f) / 2.0;
    for y in 0..dst.height() {
        for x in 0..dst.width() {
            let sx = ((ox + x as f64 / f).floor().max(0.0)).min(sw - 1.0) as u32;
            let sy = ((oy + y as f64 / f).floor().max(0.0)).min(sh - 1.0) as u32;
            if let Some(c) = src.pixel(sx, sy) {
                dst.put_pixel(x as i64, y as i64, c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::CATALOG;
    use crate::drag::Position;
    use crate::scene::OverlayView;
    use crate::text::StampedText;
    use crate::{CanvasSize, Cursor, OverlaySize};

    fn scene_with(stamps: Vec<StampedText>, overlay: Option<OverlayView>) -> Scene {
        Scene {
            size: CanvasSize {
                width: 64,
                height: 64,
            },
            background: &CATALOG[0],
            fill: None,
            stamps,
            overlay,
        }
    }

    #[test]
    fn scale_scales_output_dimensions() {
        let mut r = SoftRasterizer::new();
        let scene = scene_with(vec![], None);
        let one = r.render(&scene, &RenderOptions::default()).expect("render");
        let two = r
            .render(
                &scene,
                &RenderOptions {
                    scale: 2.0,
                    ..Default::default()
                },
            )
            .expect("render");
        assert_eq!((one.width(), one.height()), (64, 64));
        assert_eq!((two.width(), two.height()), (128, 128));
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut r = SoftRasterizer::new();
        let scene = scene_with(
            vec![StampedText {
                text: "Hello".into(),
                position: Position::new(4.0, 4.0),
            }],
            None,
        );
        let a = r.render(&scene, &RenderOptions::default()).expect("render");
        let b = r.render(&scene, &RenderOptions::default()).expect("render");
        assert_eq!(a, b);
    }

    #[test]
    fn stamps_leave_ink_on_the_canvas() {
        let mut r = SoftRasterizer::new();
        let plain = r
            .render(&scene_with(vec![], None), &RenderOptions::default())
            .expect("render");
        let stamped = r
            .render(
                &scene_with(
                    vec![StampedText {
                        text: "Hi".into(),
                        position: Position::new(4.0, 4.0),
                    }],
                    None,
                ),
                &RenderOptions::default(),
            )
            .expect("render");
        assert_ne!(plain, stamped);
        // Plate corner pixel carries the border color.
        assert_eq!(stamped.pixel(4, 4), Some(PLATE_BORDER));
    }

    #[test]
    fn overlay_is_rendered_only_when_present() {
        let mut r = SoftRasterizer::new();
        let overlay = OverlayView {
            position: Position::new(10.0, 10.0),
            size: OverlaySize {
                width: 30.0,
                height: 20.0,
            },
            draft: String::new(),
            cursor: Cursor::Grab,
        };
        let with = r
            .render(&scene_with(vec![], Some(overlay)), &RenderOptions::default())
            .expect("render");
        let without = r
            .render(&scene_with(vec![], None), &RenderOptions::default())
            .expect("render");
        assert_ne!(with, without);
        // Inside the plate, past the border stroke.
        assert_eq!(with.pixel(15, 15), Some(OVERLAY_PLATE));
    }

    #[test]
    fn cross_origin_block_fails_the_capture() {
        let mut r = SoftRasterizer::new();
        let scene = scene_with(vec![], None);
        let err = r
            .render(
                &scene,
                &RenderOptions {
                    allow_cross_origin: false,
                    ..Default::default()
                },
            )
            .expect_err("blocked");
        assert!(matches!(err, Error::CaptureError(_)));
    }

    #[test]
    fn decoded_asset_replaces_the_tint() {
        let mut r = SoftRasterizer::new();
        let mut red = Bitmap::new(2, 2);
        red.fill(Color::rgb(255, 0, 0));
        r.assets_mut().insert(CATALOG[0].id, red);
        let out = r
            .render(&scene_with(vec![], None), &RenderOptions::default())
            .expect("render");
        assert_eq!(out.pixel(32, 32), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn tint_is_content_addressed() {
        assert_eq!(asset_tint("a"), asset_tint("a"));
        assert_ne!(asset_tint("a"), asset_tint("b"));
    }

    #[test]
    fn absurd_scale_is_rejected() {
        let mut r = SoftRasterizer::new();
        let scene = scene_with(vec![], None);
        for bad in [0.0, -1.0, f64::NAN, 100000.0] {
            let res = r.render(
                &scene,
                &RenderOptions {
                    scale: bad,
                    ..Default::default()
                },
            );
            assert!(res.is_err(), "scale {} should fail", bad);
        }
    }
}
