// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// signwerk-document — Raster and geometry work for Signwerk.
//
// Provides image loading (EXIF orientation, bounded downscaling, encoding),
// the interactive signature overlay (state, modes, touch, rendering,
// bounding-box detection, recolouring), compositing onto a base image, and
// the cache file writer.

pub mod cache;
pub mod image;
pub mod signature;

// Re-export the primary structs so callers can use `signwerk_document::SignatureView` etc.
pub use cache::CacheWriter;
pub use crate::image::processor::ImageProcessor;
pub use signature::compositor::{CompositeRequest, LetterboxTransform};
pub use signature::view::SignatureView;
