// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signature capture — the free-hand drawing screen. Finishing a capture
// rasterises the ink, caches it as PNG, remembers it in the saved signature
// store and hands a placement to the sign-preview screen.

use signwerk_core::error::{Result, SignwerkError};
use signwerk_core::{AppConfig, CachePurpose, ImageRef, Placement};
use signwerk_document::{CacheWriter, SignatureView};
use tracing::{debug, info, instrument};

use super::signature_store::SignatureStore;

/// What a finished capture hands to the sign-preview screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSignature {
    pub signature: ImageRef,
    /// Top-left of the detected ink in the drawing surface.
    pub placement: Placement,
}

/// One drawing screen.
#[derive(Debug)]
pub struct SignatureCapture {
    view: SignatureView,
    cache: CacheWriter,
    store: SignatureStore,
}

impl SignatureCapture {
    pub fn new(config: &AppConfig, cache: CacheWriter, store: SignatureStore) -> Self {
        let mut view = SignatureView::new(config);
        view.enter_drawing_mode();
        view.show_signature_frame(false);
        view.set_frame_resizable(false);
        Self { view, cache, store }
    }

    pub fn view(&self) -> &SignatureView {
        &self.view
    }

    /// Touch input, stroke width and colour go straight to the view.
    pub fn view_mut(&mut self) -> &mut SignatureView {
        &mut self.view
    }

    /// Persist the drawn signature. `None` when nothing was drawn.
    ///
    /// On a cache failure the drawing is kept so the user can retry.
    #[instrument(skip(self))]
    pub fn finish(&mut self) -> Result<Option<CapturedSignature>> {
        if self.view.is_empty() {
            debug!("Nothing drawn, capture not saved");
            return Ok(None);
        }

        // The bitmap is cut from the detected box, so the placement and the
        // pixels always agree.
        let bounds = self.view.detect_bounding_box();
        if bounds.is_empty() {
            return Err(SignwerkError::MissingInput("signature has no ink".into()));
        }
        let bitmap = self
            .view
            .signature_bitmap()
            .ok_or_else(|| SignwerkError::MissingInput("signature has no area".into()))?;

        let signature = self.cache.store(CachePurpose::Signature, &bitmap)?;
        self.store.add(&signature)?;

        let placement = Placement {
            x: bounds.left,
            y: bounds.top,
        };
        info!(
            signature = %signature,
            x = placement.x,
            y = placement.y,
            "Signature captured"
        );

        self.view.clear();
        Ok(Some(CapturedSignature { signature, placement }))
    }

    /// Throw the drawing away without saving.
    pub fn discard(&mut self) {
        self.view.clear();
    }
}

#[cfg(test)]
mod tests {
    use signwerk_document::signature::TouchAction;
    use signwerk_document::ImageProcessor;

    use super::*;

    fn capture(root: &std::path::Path) -> SignatureCapture {
        let config = AppConfig::default();
        let cache = CacheWriter::new(root.join("cache"), &config);
        let store = SignatureStore::open(root);
        let mut capture = SignatureCapture::new(&config, cache, store);
        capture.view_mut().on_size_changed(1000, 800);
        capture
    }

    fn draw_line(capture: &mut SignatureCapture) {
        let view = capture.view_mut();
        view.on_touch_event(TouchAction::Down, 300.0, 350.0);
        view.on_touch_event(TouchAction::Move, 400.0, 380.0);
        view.on_touch_event(TouchAction::Move, 500.0, 420.0);
        view.on_touch_event(TouchAction::Up, 500.0, 420.0);
    }

    #[test]
    fn empty_capture_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = capture(dir.path());

        assert_eq!(capture.finish().unwrap(), None);
        assert!(SignatureStore::open(dir.path()).list().is_empty());
    }

    /// Inked pixels of a decoded capture, and whether any touches the border.
    fn ink_extent(image: &image::RgbaImage) -> (usize, bool) {
        let (width, height) = image.dimensions();
        let mut inked = 0;
        let mut at_edge = false;
        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel[3] == 0 {
                continue;
            }
            inked += 1;
            at_edge |= x == 0 || y == 0 || x == width - 1 || y == height - 1;
        }
        (inked, at_edge)
    }

    #[test]
    fn finish_persists_and_remembers_the_signature() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = capture(dir.path());
        draw_line(&mut capture);
        let half_stroke = capture.view().paints().signature_stroke_width() / 2.0;

        let captured = capture.finish().unwrap().unwrap();

        // The placement is the padded ink box, so it starts before the caps.
        assert!(captured.placement.x <= 300.0 - half_stroke);
        assert!(captured.placement.y <= 350.0 - half_stroke);
        let name = captured
            .signature
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(name.starts_with("signature_"));
        assert!(name.ends_with(".png"));

        let decoded = ImageProcessor::open(captured.signature.path()).unwrap();
        assert!(decoded.width() as f32 >= 200.0 + 2.0 * half_stroke);
        assert!(decoded.height() as f32 >= 70.0 + 2.0 * half_stroke);
        let (inked, at_edge) = ink_extent(&decoded.into_rgba());
        assert!(inked > 0);
        assert!(!at_edge, "stroke clipped by the capture bounds");

        assert_eq!(
            SignatureStore::open(dir.path()).list(),
            vec![captured.signature.clone()]
        );
        assert!(capture.view().is_empty());
    }

    #[test]
    fn straight_strokes_capture_their_ink() {
        let strokes = [
            ((300.0, 350.0), (500.0, 350.0)),
            ((420.0, 300.0), (420.0, 460.0)),
        ];
        for (from, to) in strokes {
            let dir = tempfile::tempdir().unwrap();
            let mut capture = capture(dir.path());
            let view = capture.view_mut();
            view.on_touch_event(TouchAction::Down, from.0, from.1);
            view.on_touch_event(TouchAction::Move, to.0, to.1);
            view.on_touch_event(TouchAction::Up, to.0, to.1);

            let captured = capture.finish().unwrap().unwrap();
            assert!(captured.placement.x < from.0 && captured.placement.y < from.1);

            let decoded = ImageProcessor::open(captured.signature.path()).unwrap().into_rgba();
            let (inked, at_edge) = ink_extent(&decoded);
            assert!(inked > 0, "blank capture for {from:?} -> {to:?}");
            assert!(!at_edge);

            // The ink lands where it was drawn once the bitmap is placed.
            let mid = (
                ((from.0 + to.0) / 2.0 - captured.placement.x) as u32,
                ((from.1 + to.1) / 2.0 - captured.placement.y) as u32,
            );
            assert!(decoded.get_pixel(mid.0, mid.1)[3] > 0);
        }
    }

    #[test]
    fn capture_starts_in_drawing_mode_without_frame() {
        let dir = tempfile::tempdir().unwrap();
        let capture = capture(dir.path());
        let state = capture.view().state();

        assert!(!state.is_frame_shown());
        assert!(!state.is_frame_resizable());
        assert_eq!(state.mode(), signwerk_document::signature::Mode::Drawing);
    }
}
