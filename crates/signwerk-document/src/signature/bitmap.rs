// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bitmap processor — content bounding-box detection, path rasterisation,
// cropping, overlay loading and recolouring.

use image::{Rgba, RgbaImage};
use signwerk_core::{AppConfig, SignatureColor};
use tracing::{debug, info, instrument};

use super::geometry::Rect;
use super::mode::Mode;
use super::paint::PaintManager;
use super::raster::RasterCanvas;
use super::render::Canvas;
use super::state::StateManager;

/// Pixel-level operations on signature bitmaps.
#[derive(Debug, Clone, Copy)]
pub struct BitmapProcessor {
    padding: u32,
    alpha_tolerance: u8,
}

impl BitmapProcessor {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            padding: config.content_bounds_padding,
            alpha_tolerance: config.content_alpha_tolerance,
        }
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    // -- Detection --------------------------------------------------------------

    /// Smallest box around every pixel whose alpha exceeds the tolerance,
    /// grown by the padding and clamped to the bitmap. Right and bottom are
    /// exclusive, so a single inked pixel still yields a non-empty box.
    ///
    /// Returns [`Rect::EMPTY`] for a bitmap with no ink.
    #[instrument(skip_all, fields(width = bitmap.width(), height = bitmap.height()))]
    pub fn find_content_bounds(&self, bitmap: &RgbaImage) -> Rect {
        let (width, height) = bitmap.dimensions();
        let mut found: Option<(u32, u32, u32, u32)> = None;

        for (x, y, pixel) in bitmap.enumerate_pixels() {
            if pixel[3] <= self.alpha_tolerance {
                continue;
            }
            found = Some(match found {
                None => (x, y, x, y),
                Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x), b.max(y)),
            });
        }

        let Some((left, top, right, bottom)) = found else {
            debug!("No content pixels found");
            return Rect::EMPTY;
        };

        let bounds = Rect::new(
            left.saturating_sub(self.padding) as f32,
            top.saturating_sub(self.padding) as f32,
            (right + 1).saturating_add(self.padding).min(width) as f32,
            (bottom + 1).saturating_add(self.padding).min(height) as f32,
        );
        debug!(?bounds, "Content bounds found");
        bounds
    }

    /// Detect the bounding box of the overlay (mapped into the frame) or of
    /// the inked free-hand path, and seed the crop box from it.
    ///
    /// The path is rasterised with the signature paint, so round caps and the
    /// outer half of wide strokes are inside the box, and a perfectly straight
    /// stroke still has area. A laid-out view clamps the box to its bounds.
    ///
    /// With nothing drawn the state is left untouched and an empty box is
    /// returned.
    pub fn detect_bounding_box(
        &self,
        state: &mut StateManager,
        paints: &PaintManager,
        view_width: u32,
        view_height: u32,
    ) -> Rect {
        if state.path().is_empty() && !state.has_overlay() {
            debug!("Nothing drawn, bounding box detection skipped");
            return Rect::EMPTY;
        }

        let detected = match state.overlay_bitmap() {
            Some(overlay) => {
                let content = self.find_content_bounds(overlay);
                if content.is_empty() {
                    Rect::EMPTY
                } else {
                    overlay_to_frame(content, overlay, state.frame())
                }
            }
            None => {
                let view = (view_width > 0 && view_height > 0)
                    .then(|| Rect::new(0.0, 0.0, view_width as f32, view_height as f32));
                self.path_content_bounds(state, paints, view)
            }
        };

        state.set_bounding_box(detected);
        state.set_crop_box(detected);
        state.set_show_bounding_box(true);
        info!(?detected, "Bounding box detected");
        detected
    }

    /// Padded bounds of the pixels the path inks, in view space.
    fn path_content_bounds(&self, state: &StateManager, paints: &PaintManager, view: Option<Rect>) -> Rect {
        let paint = paints.signature_paint();
        let extent = state.path().bounds();
        let margin = paint.stroke_width / 2.0 + self.padding as f32 + 1.0;
        let mut region = Rect::new(
            (extent.left - margin).floor(),
            (extent.top - margin).floor(),
            (extent.right + margin).ceil(),
            (extent.bottom + margin).ceil(),
        );
        if let Some(view) = view {
            match clamp_to(region, view) {
                Some(clamped) => region = clamped,
                None => return Rect::EMPTY,
            }
        }

        let Some(ink) = render_region(region, |canvas| canvas.draw_path(state.path(), paint)) else {
            return Rect::EMPTY;
        };
        let mut content = self.find_content_bounds(&ink);
        if !content.is_empty() {
            content.offset(region.left.trunc(), region.top.trunc());
        }
        content
    }

    // -- Rasterisation ------------------------------------------------------------

    /// The free-hand path on a transparent bitmap covering exactly the
    /// bounding box, or the frame when no box has been detected. Callers that
    /// place the bitmap must place it at the same box.
    pub fn signature_bitmap(&self, state: &StateManager, paints: &PaintManager) -> Option<RgbaImage> {
        let bounds = if state.bounding_box().is_empty() {
            state.frame()
        } else {
            state.bounding_box()
        };
        render_region(bounds, |canvas| canvas.draw_path(state.path(), paints.signature_paint()))
    }

    /// The visible signature cut out of a `view_width × view_height` surface:
    /// the overlay inside the frame when there is one, otherwise the path
    /// inside the crop box. `None` when there is nothing to cut.
    pub fn cropped_bitmap(
        &self,
        state: &StateManager,
        paints: &PaintManager,
        view_width: u32,
        view_height: u32,
    ) -> Option<RgbaImage> {
        let view = Rect::new(0.0, 0.0, view_width as f32, view_height as f32);

        if let Some(overlay) = state.overlay_bitmap().filter(|_| !state.frame().is_empty()) {
            let frame = state.frame();
            let region = clamp_to(frame, view)?;
            return render_region(region, |canvas| canvas.draw_bitmap(overlay, frame));
        }

        if !state.crop_box().is_empty() {
            let region = clamp_to(state.crop_box(), view)?;
            return render_region(region, |canvas| {
                canvas.draw_path(state.path(), paints.signature_paint())
            });
        }

        None
    }

    // -- Overlay management ---------------------------------------------------------

    /// Install `bitmap` as the overlay: drop the path, size the frame to the
    /// bitmap when the view has been laid out, switch to editing and show the
    /// frame.
    #[instrument(skip_all, fields(width = bitmap.width(), height = bitmap.height()))]
    pub fn load_bitmap(&self, state: &mut StateManager, bitmap: RgbaImage, view_width: u32, view_height: u32) {
        if view_width > 0 && view_height > 0 {
            state.set_frame(Rect::new(0.0, 0.0, bitmap.width() as f32, bitmap.height() as f32));
        }
        state.set_overlay_bitmap(Some(bitmap));
        state.clear_path();
        state.set_mode(Mode::Editing);
        state.set_show_frame(true);
        info!(frame = ?state.frame(), "Overlay bitmap loaded");
    }

    /// Swap the overlay pixels without touching the frame, path or mode.
    pub fn replace_overlay_bitmap(&self, state: &mut StateManager, bitmap: RgbaImage) {
        debug!(width = bitmap.width(), height = bitmap.height(), "Overlay bitmap replaced");
        state.set_overlay_bitmap(Some(bitmap));
    }
}

/// Recolour a signature with source-atop semantics: every pixel keeps its
/// alpha and takes `color`. Fully clear pixels stay clear. The input is never
/// modified, and recolouring twice with one colour equals recolouring once.
#[instrument(skip_all, fields(width = bitmap.width(), height = bitmap.height(), color = %color))]
pub fn recolor(bitmap: &RgbaImage, color: SignatureColor) -> RgbaImage {
    let (r, g, b) = (color.r(), color.g(), color.b());
    RgbaImage::from_fn(bitmap.width(), bitmap.height(), |x, y| {
        match bitmap.get_pixel(x, y)[3] {
            0 => Rgba([0, 0, 0, 0]),
            alpha => Rgba([r, g, b, alpha]),
        }
    })
}

/// Map a content box in overlay pixels onto the frame the overlay is
/// stretched into.
fn overlay_to_frame(content: Rect, overlay: &RgbaImage, frame: Rect) -> Rect {
    let sx = frame.width() / overlay.width() as f32;
    let sy = frame.height() / overlay.height() as f32;
    Rect::new(
        frame.left + content.left * sx,
        frame.top + content.top * sy,
        frame.left + content.right * sx,
        frame.top + content.bottom * sy,
    )
}

/// `rect` clipped to `bounds`, or `None` when nothing of it is left.
fn clamp_to(rect: Rect, bounds: Rect) -> Option<Rect> {
    let mut clipped = rect;
    if !clipped.intersect(&bounds) || clipped.width() < 1.0 || clipped.height() < 1.0 {
        return None;
    }
    Some(clipped)
}

/// Rasterise into a bitmap covering exactly `region` (view space, truncated
/// to whole pixels). `None` when the region is under a pixel in either axis.
fn render_region(region: Rect, draw: impl FnOnce(&mut RasterCanvas)) -> Option<RgbaImage> {
    let mut canvas = RasterCanvas::new(region.width() as u32, region.height() as u32)?;
    canvas.translate(-region.left.trunc(), -region.top.trunc());
    draw(&mut canvas);
    Some(canvas.into_image())
}
