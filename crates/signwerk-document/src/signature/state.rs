// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editing state — the single owner of every mutable field of the signature
// view. All other components read snapshots and write through these setters.

use image::RgbaImage;
use tracing::debug;

use super::geometry::{Point, Rect};
use super::mode::Mode;
use super::path::SignaturePath;

/// All mutable editing state of one signature view.
///
/// Rectangles are returned by value so callers cannot alias the stored copy.
/// The overlay bitmap is owned here; replacing or clearing it drops the old
/// pixels immediately.
#[derive(Debug, Clone)]
pub struct StateManager {
    path: SignaturePath,
    frame: Rect,
    bounding_box: Rect,
    crop_box: Rect,
    overlay: Option<RgbaImage>,
    mode: Mode,
    show_frame: bool,
    show_bounding_box: bool,
    frame_resizable: bool,
    /// Radians, applied around the frame centre.
    rotation: f32,
    initial_frame_size: (f32, f32),
}

impl StateManager {
    pub fn new(initial_frame_width: f32, initial_frame_height: f32) -> Self {
        Self {
            path: SignaturePath::new(),
            frame: Rect::EMPTY,
            bounding_box: Rect::EMPTY,
            crop_box: Rect::EMPTY,
            overlay: None,
            mode: Mode::Drawing,
            show_frame: true,
            show_bounding_box: false,
            frame_resizable: true,
            rotation: 0.0,
            initial_frame_size: (initial_frame_width, initial_frame_height),
        }
    }

    /// Centre a frame of the initial size inside a `width × height` view.
    pub fn initialize_frame(&mut self, width: u32, height: u32) {
        let center = Point::new(width as f32 / 2.0, height as f32 / 2.0);
        let (w, h) = self.initial_frame_size;
        self.frame = Rect::centered(center, w, h);
    }

    /// Drop all drawn content: path, frame, crop box, bounding box, overlay
    /// bitmap and rotation. The mode is left to the caller.
    pub fn clear(&mut self) {
        self.path.reset();
        self.frame.set_empty();
        self.bounding_box.set_empty();
        self.crop_box.set_empty();
        if let Some(old) = self.overlay.take() {
            debug!(width = old.width(), height = old.height(), "Overlay bitmap released");
        }
        self.show_bounding_box = false;
        self.rotation = 0.0;
    }

    // -- Path -----------------------------------------------------------------

    pub fn path(&self) -> &SignaturePath {
        &self.path
    }

    pub fn begin_stroke(&mut self, p: Point) {
        self.path.move_to(p);
    }

    pub fn extend_stroke(&mut self, p: Point) {
        self.path.line_to(p);
    }

    pub fn clear_path(&mut self) {
        self.path.reset();
    }

    // -- Rectangles -----------------------------------------------------------

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    pub fn set_bounding_box(&mut self, bounding_box: Rect) {
        self.bounding_box = bounding_box;
    }

    pub fn crop_box(&self) -> Rect {
        self.crop_box
    }

    pub fn set_crop_box(&mut self, crop_box: Rect) {
        self.crop_box = crop_box;
    }

    // -- Overlay bitmap ---------------------------------------------------------

    pub fn overlay_bitmap(&self) -> Option<&RgbaImage> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Install a new overlay (or none), releasing the previous one.
    pub fn set_overlay_bitmap(&mut self, bitmap: Option<RgbaImage>) {
        if let Some(old) = std::mem::replace(&mut self.overlay, bitmap) {
            debug!(width = old.width(), height = old.height(), "Overlay bitmap replaced");
        }
    }

    // -- Flags ----------------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn is_frame_shown(&self) -> bool {
        self.show_frame
    }

    pub fn set_show_frame(&mut self, show: bool) {
        self.show_frame = show;
    }

    pub fn is_bounding_box_shown(&self) -> bool {
        self.show_bounding_box
    }

    pub fn set_show_bounding_box(&mut self, show: bool) {
        self.show_bounding_box = show;
    }

    pub fn is_frame_resizable(&self) -> bool {
        self.frame_resizable
    }

    pub fn set_frame_resizable(&mut self, resizable: bool) {
        self.frame_resizable = resizable;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_frame_centres_default_size() {
        let mut state = StateManager::new(600.0, 200.0);
        state.initialize_frame(1000, 800);
        assert_eq!(state.frame(), Rect::new(200.0, 300.0, 800.0, 500.0));
    }

    #[test]
    fn clear_empties_content_and_releases_overlay() {
        let mut state = StateManager::new(600.0, 200.0);
        state.initialize_frame(1000, 800);
        state.begin_stroke(Point::new(1.0, 1.0));
        state.extend_stroke(Point::new(5.0, 5.0));
        state.set_bounding_box(Rect::new(0.0, 0.0, 5.0, 5.0));
        state.set_crop_box(Rect::new(0.0, 0.0, 5.0, 5.0));
        state.set_overlay_bitmap(Some(RgbaImage::new(4, 4)));
        state.set_rotation(1.2);
        state.set_show_bounding_box(true);

        state.clear();

        assert!(state.path().is_empty());
        assert!(state.frame().is_empty());
        assert!(state.bounding_box().is_empty());
        assert!(state.crop_box().is_empty());
        assert!(!state.has_overlay());
        assert_eq!(state.rotation(), 0.0);
        assert!(!state.is_bounding_box_shown());
    }

    #[test]
    fn returned_rects_are_copies() {
        let mut state = StateManager::new(600.0, 200.0);
        state.initialize_frame(1000, 800);
        let mut frame = state.frame();
        frame.offset(50.0, 50.0);
        assert_eq!(state.frame(), Rect::new(200.0, 300.0, 800.0, 500.0));
    }
}
