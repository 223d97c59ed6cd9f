// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Tunable constants for the signature editor and the compositing pipeline.
///
/// Every field has a default so that older or partial config files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Diameter of the corner handle drawn on the frame and crop box.
    pub handle_size: f32,
    /// Touch target size around a handle (half of it on each axis).
    pub handle_touch_tolerance: f32,
    /// Size of the frame when a view is first laid out.
    pub initial_frame_width: f32,
    pub initial_frame_height: f32,
    /// The frame is never resized below these dimensions.
    pub min_frame_width: f32,
    pub min_frame_height: f32,
    /// Padding added around detected signature ink, in bitmap pixels.
    pub content_bounds_padding: u32,
    /// Pixels with alpha at or below this value count as background.
    pub content_alpha_tolerance: u8,
    /// Free-hand stroke width limits.
    pub default_stroke_width: f32,
    pub min_stroke_width: f32,
    pub max_stroke_width: f32,
    /// Base images larger than this are downscaled before compositing.
    pub max_composite_width: u32,
    pub max_composite_height: u32,
    /// JPEG quality (1-100) for composited output.
    pub jpeg_quality: u8,
    /// Cache subdirectory names.
    pub merged_cache_dir: String,
    pub signature_cache_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            handle_size: 50.0,
            handle_touch_tolerance: 80.0,
            initial_frame_width: 600.0,
            initial_frame_height: 200.0,
            min_frame_width: 200.0,
            min_frame_height: 100.0,
            content_bounds_padding: 20,
            content_alpha_tolerance: 0,
            default_stroke_width: 6.0,
            min_stroke_width: 1.0,
            max_stroke_width: 20.0,
            max_composite_width: 1080,
            max_composite_height: 1920,
            jpeg_quality: 90,
            merged_cache_dir: "merged_images".into(),
            signature_cache_dir: "signatures".into(),
        }
    }
}

impl AppConfig {
    /// Load the config from `data_dir`, falling back to defaults when the file
    /// is missing or cannot be parsed.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default()
    }

    /// Persist the config as pretty JSON inside `data_dir`.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(data_dir.join(CONFIG_FILE), json)?;
        Ok(())
    }
}
