// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads configuration, prepares the cache and the
// saved signature store, and opens capture and sign-preview screens.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use signwerk_core::error::Result;
use signwerk_core::{AppConfig, ImageRef, Placement};
use signwerk_document::CacheWriter;
use tracing::{info, warn};

use super::capture::SignatureCapture;
use super::data_dir;
use super::preview::SignPreviewSession;
use super::signature_store::SignatureStore;

/// Shared application services handed to every screen.
///
/// Cheap to clone; clones share the same configuration.
#[derive(Debug, Clone)]
pub struct SignwerkServices {
    data_dir: PathBuf,
    cache: CacheWriter,
    store: SignatureStore,
    config: Arc<Mutex<AppConfig>>,
}

impl SignwerkServices {
    /// Initialise against the platform data and cache directories.
    pub fn init() -> Self {
        Self::with_dirs(data_dir::data_dir(), data_dir::cache_dir())
    }

    /// Initialise against explicit directories (mobile hosts pass their own
    /// documents and cache paths).
    pub fn with_dirs(data_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let cache_dir = cache_dir.into();
        info!(
            data = %data_dir.display(),
            cache = %cache_dir.display(),
            "initialising signwerk services"
        );

        let config = AppConfig::load(&data_dir);
        let cache = CacheWriter::new(cache_dir, &config);
        let store = SignatureStore::open(&data_dir);

        Self {
            data_dir,
            cache,
            store,
            config: Arc::new(Mutex::new(config)),
        }
    }

    // -- Screens ------------------------------------------------------------------

    /// Start a free-hand signature capture.
    pub fn new_capture(&self) -> SignatureCapture {
        SignatureCapture::new(&self.config(), self.cache.clone(), self.store.clone())
    }

    /// Open a sign-preview over a `view_width × view_height` preview.
    pub fn open_preview(
        &self,
        image: Option<&ImageRef>,
        signature: Option<&ImageRef>,
        placement: Option<Placement>,
        view_width: u32,
        view_height: u32,
    ) -> SignPreviewSession {
        SignPreviewSession::open(
            &self.config(),
            self.cache.clone(),
            image,
            signature,
            placement,
            view_width,
            view_height,
        )
    }

    // -- Saved signatures ---------------------------------------------------------

    pub fn saved_signatures(&self) -> Vec<ImageRef> {
        self.store.list()
    }

    /// Forget a saved signature and delete its cached PNG.
    pub fn delete_signature(&self, signature: &ImageRef) -> Result<bool> {
        let removed = self.store.remove(signature)?;
        if removed {
            self.cache.remove(signature)?;
        }
        Ok(removed)
    }

    /// Drop a cache artifact the caller has finished with.
    pub fn release(&self, image: &ImageRef) -> Result<()> {
        self.cache.remove(image)
    }

    // -- Config Persistence -------------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        self.lock_config().clone()
    }

    /// Update and persist the config. Screens opened afterwards pick it up;
    /// the cache writer keeps the directories it was created with.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.lock_config() = config.clone();
        config.save(&self.data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cache(&self) -> &CacheWriter {
        &self.cache
    }

    fn lock_config(&self) -> MutexGuard<'_, AppConfig> {
        self.config.lock().unwrap_or_else(|poisoned| {
            warn!("config lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use signwerk_document::signature::TouchAction;

    use super::*;

    fn services_in(dir: &Path) -> SignwerkServices {
        SignwerkServices::with_dirs(dir.join("data"), dir.join("cache"))
    }

    #[test]
    fn config_changes_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let services = services_in(dir.path());
        let config = AppConfig {
            jpeg_quality: 70,
            ..services.config()
        };

        services.save_config(&config).unwrap();

        assert_eq!(services.config().jpeg_quality, 70);
        assert_eq!(services_in(dir.path()).config().jpeg_quality, 70);
    }

    #[tokio::test]
    async fn capture_then_preview_then_confirm() {
        let dir = tempfile::tempdir().unwrap();
        let services = services_in(dir.path());

        let base_path = dir.path().join("photo.png");
        image::RgbaImage::from_pixel(500, 800, image::Rgba([255, 255, 255, 255]))
            .save(&base_path)
            .unwrap();
        let base = ImageRef::new(base_path);

        let mut capture = services.new_capture();
        let view = capture.view_mut();
        view.on_size_changed(1000, 1600);
        view.on_touch_event(TouchAction::Down, 100.0, 100.0);
        view.on_touch_event(TouchAction::Move, 200.0, 140.0);
        view.on_touch_event(TouchAction::Up, 300.0, 180.0);
        let captured = capture.finish().unwrap().unwrap();
        assert_eq!(services.saved_signatures(), vec![captured.signature.clone()]);

        let mut preview = services.open_preview(
            Some(&base),
            Some(&captured.signature),
            Some(captured.placement),
            1000,
            1600,
        );
        let outcome = preview.confirm().unwrap().unwrap().wait().await.unwrap().unwrap();
        assert!(outcome.image.path().exists());

        services.release(&outcome.image).unwrap();
        assert!(!outcome.image.path().exists());

        assert!(services.delete_signature(&captured.signature).unwrap());
        assert!(!captured.signature.path().exists());
        assert!(services.saved_signatures().is_empty());
    }
}
