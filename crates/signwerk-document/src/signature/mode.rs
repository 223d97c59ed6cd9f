// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interaction modes of the signature view and the transitions between them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bitmap::BitmapProcessor;
use super::geometry::Rect;
use super::paint::PaintManager;
use super::state::StateManager;

/// Which interaction is active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Free-hand drawing on the background fill.
    Drawing,
    /// Moving, resizing and rotating the frame.
    Editing,
    /// Adjusting the crop box; the frame is locked.
    Cropping,
}

impl Mode {
    pub fn shows_drawing_background(self) -> bool {
        self == Mode::Drawing
    }

    pub fn shows_crop_handles(self) -> bool {
        self == Mode::Cropping
    }
}

/// Mode transitions and their side effects on [`StateManager`].
pub struct ModeManager;

impl ModeManager {
    pub fn enter_drawing_mode(state: &mut StateManager) {
        state.set_mode(Mode::Drawing);
        state.set_frame_resizable(true);
    }

    pub fn enter_editing_mode(state: &mut StateManager) {
        state.set_mode(Mode::Editing);
        state.set_frame_resizable(true);
    }

    /// Lock the frame and show the crop box, detecting the bounding box first
    /// if none exists. Returns the freshly detected box, if detection ran.
    pub fn enter_crop_mode(
        state: &mut StateManager,
        processor: &BitmapProcessor,
        paints: &PaintManager,
        view_size: (u32, u32),
    ) -> Option<Rect> {
        state.set_frame_resizable(false);

        let detected = if state.bounding_box().is_empty() {
            Some(processor.detect_bounding_box(state, paints, view_size.0, view_size.1))
        } else {
            None
        };

        state.set_mode(Mode::Cropping);
        debug!(crop_box = ?state.crop_box(), "Entered crop mode");
        detected
    }

    /// Leave cropping and return to drawing.
    pub fn exit_crop_mode(state: &mut StateManager) {
        state.set_mode(Mode::Drawing);
        state.set_frame_resizable(true);
    }

    pub fn toggle_frame_visibility(state: &mut StateManager) {
        state.set_show_frame(!state.is_frame_shown());
    }

    /// Clear every editing field and start over in drawing mode.
    pub fn reset_to_initial_state(state: &mut StateManager) {
        state.clear();
        Self::enter_drawing_mode(state);
    }

    pub fn is_in_drawing_mode(state: &StateManager) -> bool {
        state.mode() == Mode::Drawing
    }

    pub fn is_in_editing_mode(state: &StateManager) -> bool {
        state.mode() == Mode::Editing
    }

    pub fn is_in_crop_mode(state: &StateManager) -> bool {
        state.mode() == Mode::Cropping
    }

    pub fn is_frame_visible(state: &StateManager) -> bool {
        state.is_frame_shown()
    }

    pub fn is_frame_resizable(state: &StateManager) -> bool {
        state.is_frame_resizable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::geometry::Point;
    use signwerk_core::AppConfig;

    const VIEW: (u32, u32) = (1000, 800);

    fn fixture() -> (StateManager, BitmapProcessor) {
        let config = AppConfig::default();
        let mut state = StateManager::new(config.initial_frame_width, config.initial_frame_height);
        state.initialize_frame(VIEW.0, VIEW.1);
        (state, BitmapProcessor::new(&config))
    }

    fn enter_crop(state: &mut StateManager, processor: &BitmapProcessor) -> Option<Rect> {
        ModeManager::enter_crop_mode(state, processor, &PaintManager::default(), VIEW)
    }

    fn active_modes(state: &StateManager) -> usize {
        [
            ModeManager::is_in_drawing_mode(state),
            ModeManager::is_in_editing_mode(state),
            ModeManager::is_in_crop_mode(state),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    #[test]
    fn exactly_one_mode_after_any_sequence() {
        let (mut state, processor) = fixture();
        // Small LCG so the sequence is long but deterministic.
        let mut seed: u32 = 0x2545_F491;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            match (seed >> 16) % 4 {
                0 => ModeManager::enter_drawing_mode(&mut state),
                1 => ModeManager::enter_editing_mode(&mut state),
                2 => {
                    enter_crop(&mut state, &processor);
                }
                _ => ModeManager::exit_crop_mode(&mut state),
            }
            assert_eq!(active_modes(&state), 1);
            let mode = state.mode();
            assert!(!(mode.shows_drawing_background() && mode.shows_crop_handles()));
        }
    }

    #[test]
    fn crop_mode_locks_frame_and_exit_unlocks() {
        let (mut state, processor) = fixture();
        enter_crop(&mut state, &processor);
        assert!(ModeManager::is_in_crop_mode(&state));
        assert!(!ModeManager::is_frame_resizable(&state));

        ModeManager::exit_crop_mode(&mut state);
        assert!(ModeManager::is_in_drawing_mode(&state));
        assert!(ModeManager::is_frame_resizable(&state));
    }

    #[test]
    fn crop_mode_detects_bounding_box_when_missing() {
        let (mut state, processor) = fixture();
        state.begin_stroke(Point::new(300.0, 350.0));
        state.extend_stroke(Point::new(500.0, 420.0));

        let detected = enter_crop(&mut state, &processor).unwrap();
        assert!(detected.contains(300.0, 350.0));
        assert!(detected.contains(499.0, 419.0));
        assert_eq!(state.crop_box(), state.bounding_box());

        // A second entry keeps the existing box.
        ModeManager::exit_crop_mode(&mut state);
        assert_eq!(enter_crop(&mut state, &processor), None);
        assert_eq!(state.bounding_box(), detected);
    }

    #[test]
    fn reset_yields_clean_drawing_state() {
        let (mut state, processor) = fixture();
        state.begin_stroke(Point::new(300.0, 350.0));
        state.extend_stroke(Point::new(500.0, 420.0));
        state.set_overlay_bitmap(Some(image::RgbaImage::new(8, 8)));
        enter_crop(&mut state, &processor);

        ModeManager::reset_to_initial_state(&mut state);

        assert!(state.path().is_empty());
        assert!(state.overlay_bitmap().is_none());
        assert!(state.bounding_box().is_empty());
        assert!(ModeManager::is_in_drawing_mode(&state));
    }

    #[test]
    fn toggle_frame_visibility_flips() {
        let (mut state, _) = fixture();
        assert!(ModeManager::is_frame_visible(&state));
        ModeManager::toggle_frame_visibility(&mut state);
        assert!(!ModeManager::is_frame_visible(&state));
    }
}
