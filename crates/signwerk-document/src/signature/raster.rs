// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster canvas — executes draw calls against an anti-aliased tiny-skia
// pixmap. Clips are coverage masks, bitmaps are sampled bilinearly and
// labels are set in the bundled DejaVu Sans face.

use std::sync::OnceLock;

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint as SkiaPaint, Path,
    PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash, Transform,
};
use tracing::warn;

use super::geometry::{Point, Rect};
use super::paint::{Paint, PaintStyle, TextStyle};
use super::path::SignaturePath;
use super::render::{Canvas, TextAlign};

static LABEL_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// The bundled label face, parsed once. `None` if it fails to parse.
fn label_font() -> Option<&'static FontRef<'static>> {
    static FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();
    FONT.get_or_init(|| match FontRef::try_from_slice(LABEL_FONT) {
        Ok(font) => Some(font),
        Err(err) => {
            warn!(%err, "Label font rejected, text will not be drawn");
            None
        }
    })
    .as_ref()
}

struct Layer {
    transform: Transform,
    clip: Option<Mask>,
}

/// [`Canvas`] over an owned RGBA pixmap.
pub struct RasterCanvas {
    pixmap: Pixmap,
    transform: Transform,
    clip: Option<Mask>,
    stack: Vec<Layer>,
}

impl RasterCanvas {
    /// Transparent canvas, or `None` for a zero-sized one.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
            transform: Transform::identity(),
            clip: None,
            stack: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Overwrite every pixel with `color`, ignoring transform and clip.
    pub fn clear(&mut self, color: Rgba<u8>) {
        let [r, g, b, a] = color.0;
        self.pixmap.fill(Color::from_rgba8(r, g, b, a));
    }

    /// The drawn pixels, un-premultiplied.
    pub fn into_image(self) -> RgbaImage {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let pixels = self.pixmap.pixels();
        RgbaImage::from_fn(width, height, |x, y| {
            let color = pixels[(y * width + x) as usize].demultiply();
            Rgba([color.red(), color.green(), color.blue(), color.alpha()])
        })
    }

    fn fill(&mut self, path: &Path, color: Rgba<u8>) {
        self.pixmap.fill_path(
            path,
            &solid(color),
            FillRule::Winding,
            self.transform,
            self.clip.as_ref(),
        );
    }

    fn stroke(&mut self, path: &Path, color: Rgba<u8>, stroke: &Stroke) {
        self.pixmap
            .stroke_path(path, &solid(color), stroke, self.transform, self.clip.as_ref());
    }
}

impl Canvas for RasterCanvas {
    fn save(&mut self) {
        self.stack.push(Layer {
            transform: self.transform,
            clip: self.clip.clone(),
        });
    }

    fn restore(&mut self) {
        if let Some(layer) = self.stack.pop() {
            self.transform = layer.transform;
            self.clip = layer.clip;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform.pre_translate(dx, dy);
    }

    fn rotate(&mut self, radians: f32, pivot: Point) {
        self.transform = self
            .transform
            .pre_concat(Transform::from_rotate_at(radians.to_degrees(), pivot.x, pivot.y));
    }

    fn clip_rect(&mut self, rect: Rect) {
        let Some(path) = rect_path(rect) else {
            // Clipping to nothing hides everything until the next restore.
            self.clip = Mask::new(self.width(), self.height());
            return;
        };
        match self.clip.as_mut() {
            Some(mask) => mask.intersect_path(&path, FillRule::Winding, true, self.transform),
            None => {
                if let Some(mut mask) = Mask::new(self.width(), self.height()) {
                    mask.fill_path(&path, FillRule::Winding, true, self.transform);
                    self.clip = Some(mask);
                }
            }
        }
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        let Some(path) = rect_path(rect) else {
            return;
        };
        if matches!(paint.style, PaintStyle::Fill | PaintStyle::FillAndStroke) {
            self.fill(&path, paint.color);
        }
        if matches!(paint.style, PaintStyle::Stroke | PaintStyle::FillAndStroke) {
            self.stroke(&path, paint.color, &outline_stroke(paint));
        }
    }

    fn draw_circle(&mut self, center: Point, radius: f32, paint: &Paint) {
        let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) else {
            return;
        };
        if matches!(paint.style, PaintStyle::Fill | PaintStyle::FillAndStroke) {
            self.fill(&path, paint.color);
        }
        if matches!(paint.style, PaintStyle::Stroke | PaintStyle::FillAndStroke) {
            self.stroke(&path, paint.color, &outline_stroke(paint));
        }
    }

    fn draw_path(&mut self, path: &SignaturePath, paint: &Paint) {
        let mut builder = PathBuilder::new();
        for stroke in path.strokes().iter().filter(|stroke| stroke.len() >= 2) {
            builder.move_to(stroke[0].x, stroke[0].y);
            for point in &stroke[1..] {
                builder.line_to(point.x, point.y);
            }
        }
        let Some(outline) = builder.finish() else {
            return;
        };
        let pen = Stroke {
            width: paint.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.stroke(&outline, paint.color, &pen);
    }

    fn draw_bitmap(&mut self, bitmap: &RgbaImage, dst: Rect) {
        if dst.is_empty() {
            return;
        }
        let Some(source) = to_pixmap(bitmap) else {
            return;
        };
        let transform = self.transform.pre_translate(dst.left, dst.top).pre_scale(
            dst.width() / bitmap.width() as f32,
            dst.height() / bitmap.height() as f32,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, self.clip.as_ref());
    }

    /// `at` is the left end of the baseline, or its middle for
    /// [`TextAlign::Center`].
    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle, align: TextAlign) {
        let Some(font) = label_font() else {
            return;
        };
        let Some(glyphs) = set_text(font, text, style) else {
            return;
        };
        let ascent = font.as_scaled(PxScale::from(style.size)).ascent();
        let left = match align {
            TextAlign::Left => at.x,
            TextAlign::Center => at.x - glyphs.width() as f32 / 2.0,
        };
        let dst = Rect::from_xywh(left, at.y - ascent, glyphs.width() as f32, glyphs.height() as f32);
        self.draw_bitmap(&glyphs, dst);
    }
}

/// One line of `text` coloured with `style`, on a transparent bitmap one
/// line-height tall whose top edge is the ascent line.
fn set_text(font: &FontRef<'_>, text: &str, style: &TextStyle) -> Option<RgbaImage> {
    let scale = PxScale::from(style.size);
    let metrics = font.as_scaled(scale);
    let (advance, _) = text_size(scale, font, text);
    // Italic overhang and the last glyph's side bearing can run past the advance.
    let width = advance + (style.size / 4.0).ceil() as u32;
    let height = (metrics.ascent() - metrics.descent()).ceil() as u32;
    if text.is_empty() || width == 0 || height == 0 {
        return None;
    }

    let mut coverage = GrayImage::new(width, height);
    draw_text_mut(&mut coverage, Luma([255]), 0, 0, scale, font, text);

    let [r, g, b, a] = style.color.0;
    Some(RgbaImage::from_fn(width, height, |x, y| {
        let cover = coverage.get_pixel(x, y)[0] as u32;
        Rgba([r, g, b, (cover * a as u32 / 255) as u8])
    }))
}

fn solid(color: Rgba<u8>) -> SkiaPaint<'static> {
    let [r, g, b, a] = color.0;
    let mut paint = SkiaPaint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Mitred outline stroke, dashed when the paint carries a pattern.
fn outline_stroke(paint: &Paint) -> Stroke {
    Stroke {
        width: paint.stroke_width,
        dash: paint
            .dash
            .and_then(|dash| StrokeDash::new(vec![dash.on, dash.off], dash.phase)),
        ..Stroke::default()
    }
}

fn rect_path(rect: Rect) -> Option<Path> {
    if rect.is_empty() {
        return None;
    }
    tiny_skia::Rect::from_ltrb(rect.left, rect.top, rect.right, rect.bottom).map(PathBuilder::from_rect)
}

/// Premultiplied copy of `bitmap`, or `None` when it has no pixels.
fn to_pixmap(bitmap: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(bitmap.width(), bitmap.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(bitmap.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}
