// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the editor, the compositor and the screens.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one editing session (one open sign-preview screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque ink colour, stored as `0xRRGGBB`.
///
/// Signature colours are always fully opaque; the alpha of a recoloured
/// signature comes from the signature itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureColor(pub u32);

impl SignatureColor {
    pub const BLACK: Self = Self(0x000000);
    pub const WHITE: Self = Self(0xFFFFFF);

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn r(&self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub fn g(&self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub fn b(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// `#RRGGBB` form used in logs and the colour preview label.
    pub fn to_hex(&self) -> String {
        format!("#{:06X}", self.0 & 0xFF_FFFF)
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self)
    }
}

impl Default for SignatureColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl std::fmt::Display for SignatureColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Reference to an image managed by an external store (a file on disk here).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageRef(pub PathBuf);

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Initial signature placement in base-image pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
}

/// What a cache artifact is for. Drives the file name prefix and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachePurpose {
    /// A base photo with a signature composited onto it (JPEG).
    MergedImage,
    /// A rasterised free-hand signature with transparency (PNG).
    Signature,
}

impl CachePurpose {
    /// File name prefix, `<purpose>_<timestamp>_<suffix>.<ext>`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::MergedImage => "merged_image",
            Self::Signature => "signature",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::MergedImage => "jpg",
            Self::Signature => "png",
        }
    }
}

/// Result handed back to the caller once a composite has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeOutcome {
    /// Where the composited JPEG was written.
    pub image: ImageRef,
    /// Ink colour the signature was composited with.
    pub color: SignatureColor,
    pub width: u32,
    pub height: u32,
    /// SHA-256 of the composited RGBA pixels.
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}
