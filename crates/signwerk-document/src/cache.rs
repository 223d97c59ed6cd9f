// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cache writer — persists composited images and captured signatures under
// purpose-specific subdirectories of an application-private cache root.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbaImage};
use signwerk_core::error::{Result, SignwerkError};
use signwerk_core::{AppConfig, CachePurpose, ImageRef};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::image::ImageProcessor;

/// Attempts at finding an unused file name before giving up.
const NAME_ATTEMPTS: usize = 4;

/// `<purpose>_<millis>_<suffix>.<ext>`. The random suffix keeps names unique
/// when two writes land in the same millisecond.
pub fn cache_file_name(purpose: CachePurpose, now: DateTime<Utc>, suffix: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        purpose.prefix(),
        now.timestamp_millis(),
        suffix,
        purpose.extension()
    )
}

/// Writes encoded images into the cache, never overwriting an existing file.
#[derive(Debug, Clone)]
pub struct CacheWriter {
    root: PathBuf,
    merged_dir: String,
    signature_dir: String,
    jpeg_quality: u8,
}

impl CacheWriter {
    pub fn new(root: impl Into<PathBuf>, config: &AppConfig) -> Self {
        Self {
            root: root.into(),
            merged_dir: config.merged_cache_dir.clone(),
            signature_dir: config.signature_cache_dir.clone(),
            jpeg_quality: config.jpeg_quality,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_for(&self, purpose: CachePurpose) -> PathBuf {
        match purpose {
            CachePurpose::MergedImage => self.root.join(&self.merged_dir),
            CachePurpose::Signature => self.root.join(&self.signature_dir),
        }
    }

    /// Encode `image` for `purpose` (JPEG for composites, PNG for
    /// signatures) and write it under a fresh name.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn store(&self, purpose: CachePurpose, image: &RgbaImage) -> Result<ImageRef> {
        let processor = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(image.clone()));
        let bytes = match purpose {
            CachePurpose::MergedImage => processor.to_jpeg_bytes(self.jpeg_quality)?,
            CachePurpose::Signature => processor.to_png_bytes()?,
        };
        self.write_bytes(purpose, &bytes)
    }

    /// Write already-encoded bytes under a fresh name for `purpose`.
    pub fn write_bytes(&self, purpose: CachePurpose, bytes: &[u8]) -> Result<ImageRef> {
        let dir = self.dir_for(purpose);
        std::fs::create_dir_all(&dir)
            .map_err(|err| SignwerkError::Cache(format!("{}: {}", dir.display(), err)))?;

        for _ in 0..NAME_ATTEMPTS {
            let suffix = Uuid::new_v4().simple().to_string();
            let path = dir.join(cache_file_name(purpose, Utc::now(), &suffix[..8]));

            let mut file = match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => file,
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Cache name taken, retrying");
                    continue;
                }
                Err(err) => return Err(SignwerkError::Cache(format!("{}: {}", path.display(), err))),
            };

            file.write_all(bytes)
                .and_then(|()| file.sync_all())
                .map_err(|err| SignwerkError::Cache(format!("{}: {}", path.display(), err)))?;

            info!(path = %path.display(), bytes = bytes.len(), "Cache file written");
            return Ok(ImageRef::new(path));
        }

        Err(SignwerkError::Cache(format!(
            "no free file name in {} after {} attempts",
            dir.display(),
            NAME_ATTEMPTS
        )))
    }

    /// Delete a cache artifact. A file that is already gone is not an error.
    pub fn remove(&self, reference: &ImageRef) -> Result<()> {
        match std::fs::remove_file(reference.path()) {
            Ok(()) => {
                debug!(path = %reference, "Cache file removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %reference, "Cache file already gone");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
