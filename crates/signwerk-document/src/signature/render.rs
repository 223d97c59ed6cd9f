// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Renderer — turns a state snapshot plus the paint registry into an ordered
// sequence of draw calls on a drawing surface.

use image::RgbaImage;

use super::geometry::{Point, Rect};
use super::paint::{Paint, PaintManager, TextStyle};
use super::path::SignaturePath;
use super::state::StateManager;

pub const INSTRUCTION_TEXT: &str = "Sign here";
pub const INSTRUCTION_SUB_TEXT: &str = "Drag the corner to resize and rotate";
pub const BOUNDING_BOX_LABEL: &str = "Bounding Box";
pub const CROP_BOX_LABEL: &str = "Crop Area";

/// Vertical distance of each instruction line from the frame centre.
const INSTRUCTION_LINE_OFFSET: f32 = 20.0;
/// Labels sit this far above the box they name.
const LABEL_OFFSET: f32 = 10.0;

/// Horizontal anchoring of a text run relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A drawing surface with a save/restore transform and clip stack.
///
/// Transforms apply to every subsequent call until the matching `restore`.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    /// Rotate subsequent drawing by `radians` around `pivot`.
    fn rotate(&mut self, radians: f32, pivot: Point);
    fn clip_rect(&mut self, rect: Rect);
    fn draw_rect(&mut self, rect: Rect, paint: &Paint);
    fn draw_circle(&mut self, center: Point, radius: f32, paint: &Paint);
    fn draw_path(&mut self, path: &SignaturePath, paint: &Paint);
    /// Draw `bitmap` stretched to exactly fill `dst`.
    fn draw_bitmap(&mut self, bitmap: &RgbaImage, dst: Rect);
    /// One line of text with its baseline through `at`.
    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle, align: TextAlign);
}

/// One recorded call on a [`CommandRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Translate { dx: f32, dy: f32 },
    Rotate { radians: f32, pivot: Point },
    ClipRect(Rect),
    Rect { rect: Rect, paint: Paint },
    Circle { center: Point, radius: f32, paint: Paint },
    Path { point_count: usize, paint: Paint },
    Bitmap { width: u32, height: u32, dst: Rect },
    Text { text: String, at: Point, style: TextStyle, align: TextAlign },
}

/// Canvas that records calls instead of rasterising them.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    ops: Vec<DrawOp>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }
}

impl Canvas for CommandRecorder {
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.ops.push(DrawOp::Translate { dx, dy });
    }

    fn rotate(&mut self, radians: f32, pivot: Point) {
        self.ops.push(DrawOp::Rotate { radians, pivot });
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::ClipRect(rect));
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.ops.push(DrawOp::Rect {
            rect,
            paint: paint.clone(),
        });
    }

    fn draw_circle(&mut self, center: Point, radius: f32, paint: &Paint) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn draw_path(&mut self, path: &SignaturePath, paint: &Paint) {
        self.ops.push(DrawOp::Path {
            point_count: path.point_count(),
            paint: paint.clone(),
        });
    }

    fn draw_bitmap(&mut self, bitmap: &RgbaImage, dst: Rect) {
        self.ops.push(DrawOp::Bitmap {
            width: bitmap.width(),
            height: bitmap.height(),
            dst,
        });
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle, align: TextAlign) {
        self.ops.push(DrawOp::Text {
            text: text.to_owned(),
            at,
            style: *style,
            align,
        });
    }
}

/// Stateless renderer for the signature view.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    handle_size: f32,
}

impl Renderer {
    pub fn new(handle_size: f32) -> Self {
        Self { handle_size }
    }

    /// Draw one frame of the view. Layering, bottom to top: background,
    /// frame chrome, clipped content, bounding box, crop box.
    pub fn draw(
        &self,
        canvas: &mut impl Canvas,
        state: &StateManager,
        paints: &PaintManager,
        width: u32,
        height: u32,
    ) {
        if state.mode().shows_drawing_background() {
            canvas.draw_rect(
                Rect::new(0.0, 0.0, width as f32, height as f32),
                paints.background_paint(),
            );
        }

        if state.is_frame_shown() && state.is_frame_resizable() {
            self.draw_frame(canvas, state, paints);
        }

        let frame = state.frame();
        canvas.save();
        if state.rotation() != 0.0 {
            canvas.rotate(state.rotation(), frame.center());
        }
        if state.is_frame_shown() {
            canvas.clip_rect(frame);
        }
        canvas.draw_path(state.path(), paints.signature_paint());
        if let Some(overlay) = state.overlay_bitmap() {
            canvas.draw_bitmap(overlay, frame);
        }
        canvas.restore();

        let bounding_box = state.bounding_box();
        if state.is_bounding_box_shown() && !bounding_box.is_empty() {
            canvas.draw_rect(bounding_box, paints.bounding_box_paint());
            canvas.draw_text(
                BOUNDING_BOX_LABEL,
                Point::new(bounding_box.left, bounding_box.top - LABEL_OFFSET),
                paints.bounding_box_label_style(),
                TextAlign::Left,
            );
        }

        let crop_box = state.crop_box();
        if state.mode().shows_crop_handles() && !crop_box.is_empty() {
            self.draw_crop_box(canvas, state, paints, crop_box);
        }
    }

    fn draw_frame(&self, canvas: &mut impl Canvas, state: &StateManager, paints: &PaintManager) {
        let frame = state.frame();

        canvas.save();
        if state.rotation() != 0.0 {
            canvas.rotate(state.rotation(), frame.center());
        }
        canvas.draw_rect(frame, paints.frame_paint());
        canvas.restore();

        self.draw_handle(canvas, frame, state.rotation(), paints.frame_handle_paint(), paints);

        if state.path().is_empty() && !state.has_overlay() {
            let center = frame.center();
            canvas.draw_text(
                INSTRUCTION_TEXT,
                Point::new(center.x, center.y - INSTRUCTION_LINE_OFFSET),
                paints.instruction_style(),
                TextAlign::Center,
            );
            canvas.draw_text(
                INSTRUCTION_SUB_TEXT,
                Point::new(center.x, center.y + INSTRUCTION_LINE_OFFSET),
                paints.instruction_sub_style(),
                TextAlign::Center,
            );
        }
    }

    fn draw_crop_box(
        &self,
        canvas: &mut impl Canvas,
        state: &StateManager,
        paints: &PaintManager,
        crop_box: Rect,
    ) {
        // Box and handle share one rotation about the crop centre.
        canvas.save();
        if state.rotation() != 0.0 {
            canvas.rotate(state.rotation(), crop_box.center());
        }
        canvas.draw_rect(crop_box, paints.crop_box_paint());
        canvas.restore();

        canvas.draw_text(
            CROP_BOX_LABEL,
            Point::new(crop_box.left, crop_box.top - LABEL_OFFSET),
            paints.crop_box_label_style(),
            TextAlign::Left,
        );

        self.draw_handle(canvas, crop_box, state.rotation(), paints.crop_handle_paint(), paints);
    }

    /// Filled disc plus white ring at the shape's rotated handle corner.
    fn draw_handle(
        &self,
        canvas: &mut impl Canvas,
        shape: Rect,
        rotation: f32,
        fill: &Paint,
        paints: &PaintManager,
    ) {
        let anchor = handle_position(shape, rotation);
        let radius = self.handle_size / 2.0;
        canvas.draw_circle(anchor, radius, fill);
        canvas.draw_circle(anchor, radius, paints.handle_border_paint());
    }
}

/// Where the resize/rotate handle of `shape` is drawn and hit-tested.
pub fn handle_position(shape: Rect, rotation: f32) -> Point {
    let anchor = shape.handle_anchor();
    if rotation == 0.0 {
        return anchor;
    }
    super::geometry::rotate_point(anchor, shape.center(), rotation)
}
