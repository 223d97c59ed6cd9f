// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signature view controller — owns the editing state and wires touch input,
// mode changes, rendering and notifications together for one host screen.

use image::{Rgba, RgbaImage};
use signwerk_core::{AppConfig, SignatureColor};
use tracing::{debug, instrument};

use super::bitmap::BitmapProcessor;
use super::callbacks::{CallbackHandler, SignatureEvent, SignatureObserver};
use super::geometry::{constrain_boxes, Point, Rect};
use super::mode::ModeManager;
use super::paint::PaintManager;
use super::raster::RasterCanvas;
use super::render::{Canvas, Renderer};
use super::state::StateManager;
use super::touch::{TouchAction, TouchHandler};

/// One interactive signature surface.
///
/// Every mutation goes through this type on the interaction thread; it sets
/// a redraw flag instead of repainting, and the host polls
/// [`SignatureView::take_redraw_request`].
#[derive(Debug)]
pub struct SignatureView {
    state: StateManager,
    paints: PaintManager,
    touch: TouchHandler,
    callbacks: CallbackHandler,
    processor: BitmapProcessor,
    renderer: Renderer,
    width: u32,
    height: u32,
    min_crop_size: f32,
    min_frame: (f32, f32),
    redraw: bool,
}

impl SignatureView {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            state: StateManager::new(config.initial_frame_width, config.initial_frame_height),
            paints: PaintManager::new(config),
            touch: TouchHandler::new(config),
            callbacks: CallbackHandler::new(),
            processor: BitmapProcessor::new(config),
            renderer: Renderer::new(config.handle_size),
            width: 0,
            height: 0,
            min_crop_size: config.handle_size * 2.0,
            min_frame: (config.min_frame_width, config.min_frame_height),
            redraw: false,
        }
    }

    // -- Host plumbing ------------------------------------------------------------

    /// Lay the view out at `width × height` and centre a fresh frame in it.
    pub fn on_size_changed(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.state.initialize_frame(width, height);
        debug!(width, height, frame = ?self.state.frame(), "Signature view resized");
        self.invalidate();
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Feed one pointer event. Returns whether the view consumed it.
    pub fn on_touch_event(&mut self, action: TouchAction, x: f32, y: f32) -> bool {
        let p = Point::new(x, y);

        let handled = if ModeManager::is_in_drawing_mode(&self.state) {
            let handled = self.touch.handle_drawing_touch(&mut self.state, action, p);
            if handled && action == TouchAction::Down {
                self.callbacks.notify(SignatureEvent::SignatureChanged);
            }
            handled
        } else {
            let gesture = self.touch.handle_editing_touch(&mut self.state, action, p);
            if let (TouchAction::Up, Some(ended)) = (action, gesture) {
                let event = if ended.affects_crop_box() {
                    SignatureEvent::CropBoxChanged(self.state.crop_box())
                } else {
                    SignatureEvent::FrameResized(self.state.frame())
                };
                self.callbacks.notify(event);
            }
            gesture.is_some()
        };

        if handled {
            self.constrain_boxes();
            self.invalidate();
        }
        handled
    }

    /// Draw the current state onto `canvas`.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        self.renderer
            .draw(canvas, &self.state, &self.paints, self.width, self.height);
    }

    /// Rasterise the whole view on a transparent surface.
    #[instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn render(&self) -> RgbaImage {
        let Some(mut canvas) = RasterCanvas::new(self.width, self.height) else {
            return RgbaImage::new(self.width, self.height);
        };
        self.draw(&mut canvas);
        canvas.into_image()
    }

    /// `true` once after any change that needs a repaint.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn set_observer(&mut self, observer: impl SignatureObserver + Send + 'static) {
        self.callbacks.set_observer(observer);
    }

    pub fn clear_observer(&mut self) {
        self.callbacks.clear_observer();
    }

    // -- Editing ------------------------------------------------------------------

    /// Drop everything drawn and re-seat the frame in the laid-out view.
    pub fn clear(&mut self) {
        self.state.clear();
        if self.has_size() {
            self.state.initialize_frame(self.width, self.height);
        }
        self.invalidate();
        self.callbacks.notify(SignatureEvent::SignatureChanged);
    }

    pub fn detect_bounding_box(&mut self) -> Rect {
        let detected =
            self.processor
                .detect_bounding_box(&mut self.state, &self.paints, self.width, self.height);
        self.invalidate();
        self.callbacks
            .notify(SignatureEvent::BoundingBoxDetected(self.state.bounding_box()));
        detected
    }

    pub fn show_crop_mode(&mut self) {
        let view_size = (self.width, self.height);
        if ModeManager::enter_crop_mode(&mut self.state, &self.processor, &self.paints, view_size).is_some() {
            self.callbacks
                .notify(SignatureEvent::BoundingBoxDetected(self.state.bounding_box()));
        }
        self.invalidate();
    }

    pub fn hide_crop_mode(&mut self) {
        ModeManager::exit_crop_mode(&mut self.state);
        self.invalidate();
    }

    pub fn enter_drawing_mode(&mut self) {
        ModeManager::enter_drawing_mode(&mut self.state);
        self.invalidate();
    }

    pub fn enter_editing_mode(&mut self) {
        ModeManager::enter_editing_mode(&mut self.state);
        self.invalidate();
    }

    pub fn reset_to_initial_state(&mut self) {
        ModeManager::reset_to_initial_state(&mut self.state);
        if self.has_size() {
            self.state.initialize_frame(self.width, self.height);
        }
        self.invalidate();
    }

    pub fn set_frame_resizable(&mut self, resizable: bool) {
        self.state.set_frame_resizable(resizable);
        self.invalidate();
    }

    pub fn show_signature_frame(&mut self, show: bool) {
        self.state.set_show_frame(show);
        self.invalidate();
    }

    pub fn set_signature_frame(&mut self, frame: Rect) {
        self.state.set_frame(frame);
        self.constrain_boxes();
        self.invalidate();
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.state.set_rotation(radians);
        self.invalidate();
    }

    // -- Bitmaps ------------------------------------------------------------------

    pub fn load_bitmap(&mut self, bitmap: RgbaImage) {
        self.processor
            .load_bitmap(&mut self.state, bitmap, self.width, self.height);
        self.invalidate();
    }

    /// Swap the overlay pixels (for example after recolouring) in place.
    pub fn replace_overlay_bitmap(&mut self, bitmap: RgbaImage) {
        self.processor.replace_overlay_bitmap(&mut self.state, bitmap);
        self.invalidate();
    }

    pub fn signature_bitmap(&self) -> Option<RgbaImage> {
        self.processor.signature_bitmap(&self.state, &self.paints)
    }

    pub fn cropped_bitmap(&self) -> Option<RgbaImage> {
        self.processor
            .cropped_bitmap(&self.state, &self.paints, self.width, self.height)
    }

    // -- Accessors ----------------------------------------------------------------

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn paints(&self) -> &PaintManager {
        &self.paints
    }

    /// `true` while no stroke has been drawn.
    pub fn is_empty(&self) -> bool {
        self.state.path().is_empty()
    }

    pub fn signature_frame(&self) -> Rect {
        self.state.frame()
    }

    pub fn bounding_box(&self) -> Rect {
        self.state.bounding_box()
    }

    pub fn crop_box(&self) -> Rect {
        self.state.crop_box()
    }

    pub fn rotation(&self) -> f32 {
        self.state.rotation()
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.paints.set_signature_stroke_width(width);
        self.invalidate();
    }

    pub fn stroke_width(&self) -> f32 {
        self.paints.signature_stroke_width()
    }

    pub fn set_signature_color(&mut self, color: SignatureColor) {
        self.paints.set_signature_color(color);
        self.invalidate();
    }

    pub fn signature_color(&self) -> SignatureColor {
        self.paints.signature_color()
    }

    pub fn reset_signature_color(&mut self) {
        self.paints.reset_signature_color();
        self.invalidate();
    }

    pub fn set_background_color(&mut self, color: Rgba<u8>) {
        self.paints.set_background_color(color);
        self.invalidate();
    }

    // -- Internals ----------------------------------------------------------------

    fn has_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    fn invalidate(&mut self) {
        self.redraw = true;
    }

    fn constrain_boxes(&mut self) {
        if !self.has_size() {
            return;
        }
        let mut crop_box = self.state.crop_box();
        let mut frame = self.state.frame();
        constrain_boxes(
            &mut crop_box,
            &mut frame,
            self.width as f32,
            self.height as f32,
            self.min_crop_size,
            self.min_frame,
        );
        self.state.set_crop_box(crop_box);
        self.state.set_frame(frame);
    }
}
