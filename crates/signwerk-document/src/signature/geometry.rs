// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stateless geometry for the signature editor — points, rectangles, rotation
// around a pivot, and affine transforms used by the raster canvas.

use serde::{Deserialize, Serialize};

/// A point in view or bitmap space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle stored as edges. `right`/`bottom` are exclusive.
///
/// A rectangle is empty when it has no area (`left >= right` or
/// `top >= bottom`); empty rectangles contain no point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const EMPTY: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Rectangle of the given size centred on `center`.
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            center.x + width / 2.0,
            center.y + height / 2.0,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn set_empty(&mut self) {
        *self = Self::EMPTY;
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        !self.is_empty() && x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn offset(&mut self, dx: f32, dy: f32) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }

    /// Shrink `self` to its overlap with `other`.
    ///
    /// Returns `false` and leaves `self` untouched when the two do not overlap.
    pub fn intersect(&mut self, other: &Rect) -> bool {
        if self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
        {
            self.left = self.left.max(other.left);
            self.top = self.top.max(other.top);
            self.right = self.right.min(other.right);
            self.bottom = self.bottom.min(other.bottom);
            true
        } else {
            false
        }
    }

    /// The corner that carries the single resize/rotate handle.
    pub fn handle_anchor(&self) -> Point {
        Point::new(self.left, self.bottom)
    }

    /// Smallest rectangle enclosing every point, or empty for no points.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::EMPTY;
        };
        iter.fold(
            Rect::new(first.x, first.y, first.x, first.y),
            |acc, p| Rect::new(acc.left.min(p.x), acc.top.min(p.y), acc.right.max(p.x), acc.bottom.max(p.y)),
        )
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Angle in radians of the vector from `origin` to `p`.
pub fn angle(p: Point, origin: Point) -> f32 {
    (p.y - origin.y).atan2(p.x - origin.x)
}

/// Rotate `p` by `radians` around `center` (positive is clockwise on a
/// y-down surface).
pub fn rotate_point(p: Point, center: Point, radians: f32) -> Point {
    let (sin, cos) = radians.sin_cos();
    let tx = p.x - center.x;
    let ty = p.y - center.y;
    Point::new(tx * cos - ty * sin + center.x, tx * sin + ty * cos + center.y)
}

/// Grow `rect` from its top-left corner until it is at least
/// `min_width × min_height`.
pub fn ensure_min_size(rect: &mut Rect, min_width: f32, min_height: f32) {
    if rect.width() < min_width {
        rect.right = rect.left + min_width;
    }
    if rect.height() < min_height {
        rect.bottom = rect.top + min_height;
    }
}

/// Keep the crop box inside the frame and the frame inside the view, each at
/// a usable minimum size.
///
/// An empty crop box stays empty; there is nothing to crop yet.
pub fn constrain_boxes(
    crop_box: &mut Rect,
    frame: &mut Rect,
    view_width: f32,
    view_height: f32,
    min_crop_size: f32,
    min_frame: (f32, f32),
) {
    if !crop_box.is_empty() {
        crop_box.intersect(frame);
        ensure_min_size(crop_box, min_crop_size, min_crop_size);
    }

    frame.intersect(&Rect::new(0.0, 0.0, view_width, view_height));
    ensure_min_size(frame, min_frame.0, min_frame.1);
}
