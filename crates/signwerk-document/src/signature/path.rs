// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Free-hand signature path — an ordered list of strokes, each an ordered list
// of points in view space.

use super::geometry::{Point, Rect};

/// Free-hand strokes drawn by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignaturePath {
    strokes: Vec<Vec<Point>>,
}

impl SignaturePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke at `p`.
    pub fn move_to(&mut self, p: Point) {
        self.strokes.push(vec![p]);
    }

    /// Extend the current stroke to `p`, starting one if none is open.
    pub fn line_to(&mut self, p: Point) {
        match self.strokes.last_mut() {
            Some(stroke) => stroke.push(p),
            None => self.strokes.push(vec![p]),
        }
    }

    /// `true` when no stroke has a single segment yet.
    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(|stroke| stroke.len() < 2)
    }

    pub fn reset(&mut self) {
        self.strokes.clear();
    }

    pub fn strokes(&self) -> &[Vec<Point>] {
        &self.strokes
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Vec::len).sum()
    }

    /// Control-point bounds of every stroke, ignoring stroke width.
    pub fn bounds(&self) -> Rect {
        if self.is_empty() {
            return Rect::EMPTY;
        }
        Rect::bounding(self.strokes.iter().flatten().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_move_is_still_empty() {
        let mut path = SignaturePath::new();
        path.move_to(Point::new(1.0, 1.0));
        assert!(path.is_empty());
        assert!(path.bounds().is_empty());
    }

    #[test]
    fn bounds_cover_all_strokes() {
        let mut path = SignaturePath::new();
        path.move_to(Point::new(10.0, 20.0));
        path.line_to(Point::new(30.0, 25.0));
        path.move_to(Point::new(5.0, 40.0));
        path.line_to(Point::new(12.0, 60.0));
        assert!(!path.is_empty());
        assert_eq!(path.bounds(), Rect::new(5.0, 20.0, 30.0, 60.0));
        assert_eq!(path.strokes().len(), 2);
        assert_eq!(path.point_count(), 4);
    }

    #[test]
    fn reset_clears_everything() {
        let mut path = SignaturePath::new();
        path.line_to(Point::new(1.0, 1.0));
        path.line_to(Point::new(2.0, 2.0));
        path.reset();
        assert!(path.is_empty());
        assert_eq!(path.point_count(), 0);
    }
}
