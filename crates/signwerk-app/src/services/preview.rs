// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sign-preview session — places a captured signature over a base image,
// lets the user move, resize, rotate and recolour it, then composites the
// result on a blocking worker.
//
// The session owns all editing state on the interaction thread. Confirm
// snapshots what the worker needs (shared source bitmaps, frame, rotation,
// colour) so nothing is mutated concurrently. At most one composite runs per
// session, and closing the session abandons any pending result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use image::RgbaImage;
use signwerk_core::error::{Result, SignwerkError};
use signwerk_core::{
    AppConfig, CachePurpose, CompositeOutcome, ImageRef, Placement, SessionId, SignatureColor,
};
use signwerk_document::image::fingerprint_rgba;
use signwerk_document::signature::recolor;
use signwerk_document::{CacheWriter, CompositeRequest, ImageProcessor, LetterboxTransform, SignatureView};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// One open sign-preview screen.
#[derive(Debug)]
pub struct SignPreviewSession {
    id: SessionId,
    max_size: (u32, u32),
    cache: CacheWriter,
    view: SignatureView,
    base: Option<Arc<RgbaImage>>,
    original_signature: Option<Arc<RgbaImage>>,
    colored_signature: Option<Arc<RgbaImage>>,
    color: SignatureColor,
    alive: Arc<AtomicBool>,
    in_flight: Arc<AtomicBool>,
}

impl SignPreviewSession {
    /// Open a session over a `view_width × view_height` preview.
    ///
    /// References that cannot be decoded are logged and treated as absent;
    /// confirm then reports the missing input.
    #[instrument(skip(config, cache))]
    pub fn open(
        config: &AppConfig,
        cache: CacheWriter,
        image: Option<&ImageRef>,
        signature: Option<&ImageRef>,
        placement: Option<Placement>,
        view_width: u32,
        view_height: u32,
    ) -> Self {
        let id = SessionId::new();
        let base = load_rgba(image, "base image");
        let original_signature = load_rgba(signature, "signature");

        let mut view = SignatureView::new(config);
        view.on_size_changed(view_width, view_height);
        view.enter_editing_mode();

        let color = SignatureColor::BLACK;
        let colored_signature = original_signature
            .as_deref()
            .map(|original| Arc::new(recolor(original, color)));

        if let Some(colored) = &colored_signature {
            view.load_bitmap(RgbaImage::clone(colored));

            let transform = base.as_deref().and_then(|base| {
                LetterboxTransform::fit(
                    view_width as f32,
                    view_height as f32,
                    base.width(),
                    base.height(),
                )
            });
            if let Some(transform) = transform {
                let frame = transform.placement_frame(
                    placement.unwrap_or_default(),
                    colored.width(),
                    colored.height(),
                );
                view.set_signature_frame(frame);
            }
        }

        info!(
            session = %id,
            has_image = base.is_some(),
            has_signature = original_signature.is_some(),
            frame = ?view.signature_frame(),
            "Sign preview opened"
        );

        Self {
            id,
            max_size: (config.max_composite_width, config.max_composite_height),
            cache,
            view,
            base,
            original_signature,
            colored_signature,
            color,
            alive: Arc::new(AtomicBool::new(true)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn view(&self) -> &SignatureView {
        &self.view
    }

    /// Touch input goes straight to the view.
    pub fn view_mut(&mut self) -> &mut SignatureView {
        &mut self.view
    }

    pub fn color(&self) -> SignatureColor {
        self.color
    }

    pub fn has_base_image(&self) -> bool {
        self.base.is_some()
    }

    pub fn original_signature(&self) -> Option<&RgbaImage> {
        self.original_signature.as_deref()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Whether a composite for this session is still running.
    pub fn is_compositing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    // -- Editing ------------------------------------------------------------------

    /// Recolour from the untouched original and swap the overlay. The frame,
    /// rotation and mode stay where the user left them.
    pub fn select_color(&mut self, color: SignatureColor) {
        let Some(original) = self.original_signature.as_deref() else {
            debug!(color = %color, "No signature to recolour");
            return;
        };
        let colored = Arc::new(recolor(original, color));
        self.view.replace_overlay_bitmap(RgbaImage::clone(&colored));
        self.colored_signature = Some(colored);
        self.color = color;
        info!(session = %self.id, color = %color, "Signature colour selected");
    }

    // -- Confirm / close ----------------------------------------------------------

    /// Start compositing on a blocking worker.
    ///
    /// `Ok(None)` when the session is closed or a composite is already in
    /// flight. Must be called from within a Tokio runtime.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn confirm(&mut self) -> Result<Option<CompositeTask>> {
        let base = self
            .base
            .clone()
            .ok_or_else(|| SignwerkError::MissingInput("no base image".into()))?;
        if self.original_signature.is_none() {
            return Err(SignwerkError::MissingInput("no signature".into()));
        }
        let signature = self
            .colored_signature
            .clone()
            .ok_or_else(|| SignwerkError::MissingInput("no coloured signature".into()))?;

        if !self.is_alive() {
            debug!("Session closed, confirm ignored");
            return Ok(None);
        }
        let runtime = Handle::try_current()
            .map_err(|err| SignwerkError::Background(format!("no runtime: {}", err)))?;
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("Composite already in flight, confirm ignored");
            return Ok(None);
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let (view_width, view_height) = self.view.size();
        let request = CompositeRequest {
            base,
            signature,
            color: self.color,
            frame: self.view.signature_frame(),
            rotation: self.view.rotation(),
            view_width,
            view_height,
            max_width: self.max_size.0,
            max_height: self.max_size.1,
        };
        info!(
            frame = ?request.frame,
            degrees = request.rotation.to_degrees(),
            color = %request.color,
            "Compositing signature"
        );

        let cache = self.cache.clone();
        let alive = Arc::clone(&self.alive);
        let session = self.id;
        let handle = runtime.spawn_blocking(move || {
            let _guard = guard;
            run_composite(&request, &cache, &alive, session)
        });

        Ok(Some(CompositeTask {
            session,
            handle,
            alive: Arc::clone(&self.alive),
            cache: self.cache.clone(),
        }))
    }

    /// Abandon the session. A composite still running finishes on its worker
    /// but its result is discarded.
    pub fn close(&mut self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            info!(session = %self.id, "Sign preview closed");
        }
    }
}

impl Drop for SignPreviewSession {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

/// Handle to a running composite.
#[derive(Debug)]
pub struct CompositeTask {
    session: SessionId,
    handle: JoinHandle<Result<Option<CompositeOutcome>>>,
    alive: Arc<AtomicBool>,
    cache: CacheWriter,
}

impl CompositeTask {
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the composite. `None` if the session closed before the
    /// result could be delivered; the written file is removed in that case.
    pub async fn wait(self) -> Result<Option<CompositeOutcome>> {
        let outcome = self
            .handle
            .await
            .map_err(|err| SignwerkError::Background(err.to_string()))??;

        match outcome {
            Some(outcome) if !self.alive.load(Ordering::SeqCst) => {
                discard(&self.cache, &outcome.image, self.session)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }
}

/// Clears the in-flight flag however the worker exits.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn run_composite(
    request: &CompositeRequest,
    cache: &CacheWriter,
    alive: &AtomicBool,
    session: SessionId,
) -> Result<Option<CompositeOutcome>> {
    if !alive.load(Ordering::SeqCst) {
        debug!(session = %session, "Session closed before compositing");
        return Ok(None);
    }

    let result = request
        .run()
        .ok_or_else(|| SignwerkError::MissingInput("preview has no area".into()))?;
    let fingerprint = fingerprint_rgba(&result.image);
    let image = cache.store(CachePurpose::MergedImage, &result.image)?;

    if !alive.load(Ordering::SeqCst) {
        discard(cache, &image, session)?;
        return Ok(None);
    }

    info!(
        session = %session,
        path = %image,
        fingerprint = %fingerprint,
        "Composite saved"
    );
    Ok(Some(CompositeOutcome {
        image,
        color: request.color,
        width: result.image.width(),
        height: result.image.height(),
        fingerprint,
        created_at: Utc::now(),
    }))
}

fn discard(cache: &CacheWriter, image: &ImageRef, session: SessionId) -> Result<()> {
    info!(session = %session, path = %image, "Session closed, composite discarded");
    cache.remove(image)
}

fn load_rgba(reference: Option<&ImageRef>, what: &str) -> Option<Arc<RgbaImage>> {
    let reference = reference?;
    match ImageProcessor::open(reference.path()) {
        Ok(processor) => Some(Arc::new(processor.into_rgba())),
        Err(err) => {
            warn!(path = %reference, error = %err, "Could not load {}", what);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use image::{DynamicImage, Rgba};
    use signwerk_document::signature::Rect;

    use super::*;

    const RED: SignatureColor = SignatureColor(0xFF0000);

    fn write_png(path: &Path, image: RgbaImage) -> ImageRef {
        let bytes = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(image))
            .to_png_bytes()
            .unwrap();
        std::fs::write(path, bytes).unwrap();
        ImageRef::new(path)
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        config: AppConfig,
        cache: CacheWriter,
        base: ImageRef,
        signature: ImageRef,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let cache = CacheWriter::new(dir.path().join("cache"), &config);
        let base = write_png(
            &dir.path().join("base.png"),
            RgbaImage::from_pixel(500, 800, Rgba([255, 255, 255, 255])),
        );
        let signature = write_png(
            &dir.path().join("sig.png"),
            RgbaImage::from_pixel(100, 50, Rgba([0, 0, 0, 255])),
        );
        Fixture {
            _dir: dir,
            config,
            cache,
            base,
            signature,
        }
    }

    fn open(f: &Fixture) -> SignPreviewSession {
        SignPreviewSession::open(
            &f.config,
            f.cache.clone(),
            Some(&f.base),
            Some(&f.signature),
            Some(Placement { x: 20.0, y: 30.0 }),
            1000,
            1600,
        )
    }

    fn merged_files(cache: &CacheWriter) -> usize {
        std::fs::read_dir(cache.dir_for(CachePurpose::MergedImage))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[test]
    fn placement_maps_into_the_view() {
        let f = fixture();
        let session = open(&f);

        // Scale 2, no letterbox offset.
        assert_eq!(session.view().signature_frame(), Rect::new(40.0, 60.0, 240.0, 160.0));
        assert!(session.view().state().is_frame_resizable());
        assert_eq!(session.color(), SignatureColor::BLACK);
    }

    #[test]
    fn select_color_keeps_frame_and_original() {
        let f = fixture();
        let mut session = open(&f);
        session.view_mut().set_signature_frame(Rect::new(100.0, 100.0, 400.0, 300.0));
        let original = fingerprint_rgba(session.original_signature().unwrap());

        session.select_color(RED);

        assert_eq!(session.color(), RED);
        assert_eq!(session.view().signature_frame(), Rect::new(100.0, 100.0, 400.0, 300.0));
        assert_eq!(fingerprint_rgba(session.original_signature().unwrap()), original);
        let overlay = session.view().state().overlay_bitmap().unwrap();
        assert_eq!(*overlay.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[tokio::test]
    async fn confirm_writes_the_composite() {
        let f = fixture();
        let mut session = open(&f);
        session.select_color(RED);

        let task = session.confirm().unwrap().unwrap();
        let outcome = task.wait().await.unwrap().unwrap();

        let name = outcome.image.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("merged_image_"));
        assert!(name.ends_with(".jpg"));
        assert_eq!((outcome.width, outcome.height), (500, 800));
        assert_eq!(outcome.color, RED);
        assert_eq!(outcome.fingerprint.len(), 64);

        let merged = ImageProcessor::open(outcome.image.path()).unwrap().into_rgba();
        // Signature covers (20, 30)..(120, 80) in base pixels.
        let inside = merged.get_pixel(70, 55);
        assert!(inside[0] > 200 && inside[1] < 60 && inside[2] < 60);
        let outside = merged.get_pixel(400, 700);
        assert!(outside[0] > 240 && outside[1] > 240 && outside[2] > 240);
        assert!(!session.is_compositing());
    }

    #[tokio::test]
    async fn missing_inputs_are_reported() {
        let f = fixture();
        let mut no_image = SignPreviewSession::open(
            &f.config,
            f.cache.clone(),
            None,
            Some(&f.signature),
            None,
            1000,
            1600,
        );
        assert!(matches!(no_image.confirm(), Err(SignwerkError::MissingInput(_))));

        let mut no_signature = SignPreviewSession::open(
            &f.config,
            f.cache.clone(),
            Some(&f.base),
            None,
            None,
            1000,
            1600,
        );
        assert!(matches!(no_signature.confirm(), Err(SignwerkError::MissingInput(_))));
        assert_eq!(merged_files(&f.cache), 0);
    }

    #[tokio::test]
    async fn undecodable_reference_degrades_to_absent() {
        let f = fixture();
        let garbage = f.base.path().with_file_name("garbage.png");
        std::fs::write(&garbage, b"not an image").unwrap();
        let garbage = ImageRef::new(garbage);

        let mut session = SignPreviewSession::open(
            &f.config,
            f.cache.clone(),
            Some(&garbage),
            Some(&f.signature),
            None,
            1000,
            1600,
        );
        assert!(!session.has_base_image());
        assert!(session.original_signature().is_some());
        assert!(matches!(session.confirm(), Err(SignwerkError::MissingInput(_))));
    }

    #[tokio::test]
    async fn second_confirm_never_shares_a_file() {
        let f = fixture();
        let mut session = open(&f);

        let first = session.confirm().unwrap().unwrap();
        let second = session.confirm().unwrap();

        let first = first.wait().await.unwrap().unwrap();
        if let Some(second) = second {
            let second = second.wait().await.unwrap().unwrap();
            assert_ne!(first.image, second.image);
        }

        // Once the first finished, confirming again works.
        let third = session.confirm().unwrap().unwrap();
        let third = third.wait().await.unwrap().unwrap();
        assert_ne!(first.image, third.image);
    }

    #[tokio::test]
    async fn closing_abandons_the_result() {
        let f = fixture();
        let mut session = open(&f);

        let task = session.confirm().unwrap().unwrap();
        session.close();

        assert_eq!(task.wait().await.unwrap(), None);
        assert_eq!(merged_files(&f.cache), 0);
        assert!(session.confirm().unwrap().is_none());
    }

    #[test]
    fn confirm_outside_a_runtime_fails_cleanly() {
        let f = fixture();
        let mut session = open(&f);

        assert!(matches!(session.confirm(), Err(SignwerkError::Background(_))));
        assert!(!session.is_compositing());
    }
}
