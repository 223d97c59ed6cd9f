// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decoding with EXIF orientation, bounded downscaling,
// encoding and pixel fingerprints. Operates on in-memory images using the
// `image` crate.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbaImage};
use sha2::{Digest, Sha256};
use signwerk_core::error::{Result, SignwerkError};
use tracing::{debug, info, instrument};

/// Image pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::open("photo.jpg")?
///     .resize_to_fit(1080, 1920)
///     .to_jpeg_bytes(90)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path, applying its EXIF orientation.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|err| SignwerkError::Decode(format!("{}: {}", path.display(), err)))?;
        let image = decode_oriented(reader, &path.display().to_string())?;
        info!(width = image.width(), height = image.height(), "Image loaded");
        Ok(Self { image })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.), applying
    /// any EXIF orientation they carry.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| SignwerkError::Decode(format!("in-memory image: {}", err)))?;
        let image = decode_oriented(reader, "in-memory image")?;
        debug!(width = image.width(), height = image.height(), "Image decoded from bytes");
        Ok(Self { image })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Consume the processor and return RGBA pixels.
    pub fn into_rgba(self) -> RgbaImage {
        self.image.into_rgba8()
    }

    /// SHA-256 of the RGBA pixels, hex encoded.
    pub fn fingerprint(&self) -> String {
        fingerprint_rgba(&self.image.to_rgba8())
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Downscale uniformly to fit within `max_width` x `max_height`, rounding
    /// the new dimensions. Images that already fit are returned unchanged;
    /// nothing is ever upscaled.
    #[instrument(skip(self), fields(max_width, max_height))]
    pub fn resize_to_fit(self, max_width: u32, max_height: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if fits_within(width, height, max_width, max_height) {
            return self;
        }

        let ratio = (max_width as f32 / width as f32).min(max_height as f32 / height as f32);
        let new_w = ((width as f32 * ratio).round() as u32).max(1);
        let new_h = ((height as f32 * ratio).round() as u32).max(1);
        info!(from_w = width, from_h = height, new_w, new_h, "Downscaling image");

        let resized = self
            .image
            .resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| SignwerkError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    /// Alpha is dropped.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|err| SignwerkError::ImageError(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Whether a `width × height` image needs no downscaling for the limits.
pub fn fits_within(width: u32, height: u32, max_width: u32, max_height: u32) -> bool {
    width <= max_width && height <= max_height
}

/// SHA-256 over the dimensions and raw RGBA bytes, hex encoded.
pub fn fingerprint_rgba(image: &RgbaImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_le_bytes());
    hasher.update(image.height().to_le_bytes());
    hasher.update(image.as_raw());
    hex::encode(hasher.finalize())
}

/// Decode through the format's decoder so the EXIF orientation can be read
/// before pixels are handed out.
fn decode_oriented<R>(reader: ImageReader<R>, source: &str) -> Result<DynamicImage>
where
    R: std::io::BufRead + std::io::Seek,
{
    let decode_err = |err: image::ImageError| SignwerkError::Decode(format!("{}: {}", source, err));

    let mut decoder = reader.into_decoder().map_err(decode_err)?;
    let orientation = decoder.orientation().map_err(decode_err)?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
    image.apply_orientation(orientation);
    debug!(?orientation, "Orientation applied");
    Ok(image)
}
