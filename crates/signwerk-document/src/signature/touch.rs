// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Touch gestures — free-hand drawing, and moving, scaling and rotating the
// frame and the crop box through their corner handles.

use signwerk_core::AppConfig;
use tracing::trace;

use super::geometry::{angle, distance, Point, Rect};
use super::render::handle_position;
use super::state::StateManager;

/// Pointer phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
}

/// What a gesture started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveHandle {
    CropHandle,
    CropBody,
    FrameHandle,
    FrameBody,
}

impl ActiveHandle {
    pub fn affects_crop_box(self) -> bool {
        matches!(self, Self::CropHandle | Self::CropBody)
    }
}

/// Shape measurements captured when a handle drag starts.
#[derive(Debug, Clone, Copy)]
struct HandleDrag {
    distance: f32,
    angle: f32,
    width: f32,
    height: f32,
    rotation: f32,
}

impl HandleDrag {
    fn start(p: Point, shape: Rect, rotation: f32) -> Self {
        let center = shape.center();
        Self {
            distance: distance(p, center),
            angle: angle(p, center),
            width: shape.width(),
            height: shape.height(),
            rotation,
        }
    }

    /// Scale `shape` about its centre by the pointer's distance ratio and
    /// return the new rotation.
    fn update(&self, p: Point, shape: Rect) -> (Rect, f32) {
        let center = shape.center();
        let scale = if self.distance > f32::EPSILON {
            distance(p, center) / self.distance
        } else {
            1.0
        };
        let rotation = self.rotation + (angle(p, center) - self.angle);
        (Rect::centered(center, self.width * scale, self.height * scale), rotation)
    }
}

/// Translates raw pointer events into state edits.
#[derive(Debug, Clone)]
pub struct TouchHandler {
    /// Half the touch target edge around a handle.
    tolerance: f32,
    active: Option<ActiveHandle>,
    drag: Option<HandleDrag>,
    last: Point,
}

impl TouchHandler {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            tolerance: config.handle_touch_tolerance / 2.0,
            active: None,
            drag: None,
            last: Point::default(),
        }
    }

    pub fn active_handle(&self) -> Option<ActiveHandle> {
        self.active
    }

    /// Drawing-mode input. Points outside a shown frame are ignored.
    pub fn handle_drawing_touch(&mut self, state: &mut StateManager, action: TouchAction, p: Point) -> bool {
        if state.is_frame_shown() && !state.frame().contains(p.x, p.y) {
            return false;
        }
        match action {
            TouchAction::Down => state.begin_stroke(p),
            TouchAction::Move | TouchAction::Up => state.extend_stroke(p),
        }
        true
    }

    /// Editing/cropping input. `Up` returns the gesture that just ended so
    /// the caller knows which shape changed.
    pub fn handle_editing_touch(
        &mut self,
        state: &mut StateManager,
        action: TouchAction,
        p: Point,
    ) -> Option<ActiveHandle> {
        match action {
            TouchAction::Down => self.touch_down(state, p),
            TouchAction::Move => self.touch_move(state, p),
            TouchAction::Up => {
                self.drag = None;
                self.active.take()
            }
        }
    }

    fn touch_down(&mut self, state: &StateManager, p: Point) -> Option<ActiveHandle> {
        self.last = p;
        self.active = self.hit_test(state, p);
        self.drag = match self.active {
            Some(ActiveHandle::CropHandle) => Some(HandleDrag::start(p, state.crop_box(), state.rotation())),
            Some(ActiveHandle::FrameHandle) => Some(HandleDrag::start(p, state.frame(), state.rotation())),
            _ => None,
        };
        trace!(active = ?self.active, x = p.x, y = p.y, "Touch down");
        self.active
    }

    fn touch_move(&mut self, state: &mut StateManager, p: Point) -> Option<ActiveHandle> {
        let active = self.active?;
        let dx = p.x - self.last.x;
        let dy = p.y - self.last.y;

        match (active, self.drag) {
            (ActiveHandle::CropHandle, Some(drag)) => {
                let (crop_box, rotation) = drag.update(p, state.crop_box());
                state.set_crop_box(crop_box);
                state.set_rotation(rotation);
            }
            (ActiveHandle::FrameHandle, Some(drag)) => {
                let (frame, rotation) = drag.update(p, state.frame());
                state.set_frame(frame);
                state.set_rotation(rotation);
            }
            (ActiveHandle::CropBody, _) => {
                let mut crop_box = state.crop_box();
                crop_box.offset(dx, dy);
                state.set_crop_box(crop_box);
            }
            (ActiveHandle::FrameBody, _) => {
                let mut frame = state.frame();
                frame.offset(dx, dy);
                state.set_frame(frame);
            }
            _ => {}
        }

        self.last = p;
        Some(active)
    }

    /// Crop handle, crop body, frame handle, frame body, in that priority.
    fn hit_test(&self, state: &StateManager, p: Point) -> Option<ActiveHandle> {
        if state.mode().shows_crop_handles() {
            let crop_box = state.crop_box();
            if self.near(p, handle_position(crop_box, state.rotation())) {
                return Some(ActiveHandle::CropHandle);
            }
            if crop_box.contains(p.x, p.y) {
                return Some(ActiveHandle::CropBody);
            }
        }

        if state.is_frame_resizable() && state.is_frame_shown() {
            let frame = state.frame();
            if self.near(p, handle_position(frame, state.rotation())) {
                return Some(ActiveHandle::FrameHandle);
            }
            if frame.contains(p.x, p.y) {
                return Some(ActiveHandle::FrameBody);
            }
        }

        None
    }

    fn near(&self, p: Point, handle: Point) -> bool {
        (p.x - handle.x).abs() < self.tolerance && (p.y - handle.y).abs() < self.tolerance
    }
}
