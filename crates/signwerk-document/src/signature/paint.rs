// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paint registry — colours, stroke widths and dash patterns for every element
// the renderer draws. Holds appearance only, no editing state.

use image::Rgba;
use signwerk_core::{AppConfig, SignatureColor};

/// How a shape is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStyle {
    Fill,
    Stroke,
    FillAndStroke,
}

/// On/off dash lengths along a stroke, starting `phase` into the pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashPattern {
    pub on: f32,
    pub off: f32,
    pub phase: f32,
}

/// Appearance of a shape or path.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: Rgba<u8>,
    pub stroke_width: f32,
    pub style: PaintStyle,
    pub dash: Option<DashPattern>,
}

impl Paint {
    pub fn new(color: Rgba<u8>, stroke_width: f32, style: PaintStyle) -> Self {
        Self {
            color,
            stroke_width,
            style,
            dash: None,
        }
    }

    pub fn with_dash(mut self, dash: DashPattern) -> Self {
        self.dash = Some(dash);
        self
    }
}

/// Appearance of a text label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgba<u8>,
    pub size: f32,
}

/// Opaque pixel from a `0xRRGGBB` literal.
pub const fn rgb(hex: u32) -> Rgba<u8> {
    Rgba([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xFF])
}

/// Opaque pixel carrying a signature colour.
pub fn ink(color: SignatureColor) -> Rgba<u8> {
    Rgba([color.r(), color.g(), color.b(), 0xFF])
}

const DEFAULT_SIGNATURE_COLOR: SignatureColor = SignatureColor::BLACK;
const DEFAULT_BACKGROUND_COLOR: Rgba<u8> = rgb(0xF8F8F8);
const FRAME_COLOR: Rgba<u8> = rgb(0x4CAF50);
const FRAME_HANDLE_COLOR: Rgba<u8> = rgb(0xFFFF00);
const CROP_BOX_COLOR: Rgba<u8> = rgb(0x2196F3);
const CROP_HANDLE_COLOR: Rgba<u8> = rgb(0x0000FF);
const WHITE: Rgba<u8> = rgb(0xFFFFFF);

const FRAME_BORDER_WIDTH: f32 = 8.0;
const BOUNDING_BOX_STROKE_WIDTH: f32 = 4.0;
const CROP_BOX_STROKE_WIDTH: f32 = 6.0;
const CROP_HANDLE_STROKE_WIDTH: f32 = 4.0;
const HANDLE_BORDER_WIDTH: f32 = 3.0;
const FRAME_DASH: DashPattern = DashPattern {
    on: 20.0,
    off: 10.0,
    phase: 0.0,
};

/// Registry of every paint used by the signature view.
#[derive(Debug, Clone)]
pub struct PaintManager {
    signature: Paint,
    frame: Paint,
    frame_handle: Paint,
    bounding_box: Paint,
    crop_box: Paint,
    crop_handle: Paint,
    handle_border: Paint,
    background: Paint,
    instruction: TextStyle,
    instruction_sub: TextStyle,
    bounding_box_label: TextStyle,
    crop_box_label: TextStyle,
    signature_color: SignatureColor,
    min_stroke_width: f32,
    max_stroke_width: f32,
    default_stroke_width: f32,
}

impl Default for PaintManager {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl PaintManager {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            signature: Paint::new(
                ink(DEFAULT_SIGNATURE_COLOR),
                config.default_stroke_width,
                PaintStyle::Stroke,
            ),
            frame: Paint::new(FRAME_COLOR, FRAME_BORDER_WIDTH, PaintStyle::Stroke).with_dash(FRAME_DASH),
            frame_handle: Paint::new(FRAME_HANDLE_COLOR, 0.0, PaintStyle::Fill),
            bounding_box: Paint::new(WHITE, BOUNDING_BOX_STROKE_WIDTH, PaintStyle::Stroke),
            crop_box: Paint::new(CROP_BOX_COLOR, CROP_BOX_STROKE_WIDTH, PaintStyle::Stroke),
            crop_handle: Paint::new(
                CROP_HANDLE_COLOR,
                CROP_HANDLE_STROKE_WIDTH,
                PaintStyle::FillAndStroke,
            ),
            handle_border: Paint::new(WHITE, HANDLE_BORDER_WIDTH, PaintStyle::Stroke),
            background: Paint::new(DEFAULT_BACKGROUND_COLOR, 0.0, PaintStyle::Fill),
            instruction: TextStyle {
                color: rgb(0x666666),
                size: 32.0,
            },
            instruction_sub: TextStyle {
                color: rgb(0x999999),
                size: 20.0,
            },
            bounding_box_label: TextStyle {
                color: WHITE,
                size: 24.0,
            },
            crop_box_label: TextStyle {
                color: CROP_BOX_COLOR,
                size: 20.0,
            },
            signature_color: DEFAULT_SIGNATURE_COLOR,
            min_stroke_width: config.min_stroke_width,
            max_stroke_width: config.max_stroke_width,
            default_stroke_width: config.default_stroke_width,
        }
    }

    // -- Signature stroke -----------------------------------------------------

    /// Set the free-hand stroke width, clamped to the configured range.
    pub fn set_signature_stroke_width(&mut self, width: f32) {
        self.signature.stroke_width = width.clamp(self.min_stroke_width, self.max_stroke_width);
    }

    pub fn signature_stroke_width(&self) -> f32 {
        self.signature.stroke_width
    }

    pub fn min_stroke_width(&self) -> f32 {
        self.min_stroke_width
    }

    pub fn max_stroke_width(&self) -> f32 {
        self.max_stroke_width
    }

    pub fn default_stroke_width(&self) -> f32 {
        self.default_stroke_width
    }

    pub fn set_signature_color(&mut self, color: SignatureColor) {
        self.signature_color = color;
        self.signature.color = ink(color);
    }

    pub fn signature_color(&self) -> SignatureColor {
        self.signature_color
    }

    pub fn reset_signature_color(&mut self) {
        self.set_signature_color(DEFAULT_SIGNATURE_COLOR);
    }

    // -- Other element colours --------------------------------------------------

    pub fn set_background_color(&mut self, color: Rgba<u8>) {
        self.background.color = color;
    }

    pub fn background_color(&self) -> Rgba<u8> {
        self.background.color
    }

    pub fn reset_background_color(&mut self) {
        self.background.color = DEFAULT_BACKGROUND_COLOR;
    }

    pub fn set_frame_color(&mut self, color: Rgba<u8>) {
        self.frame.color = color;
    }

    pub fn frame_color(&self) -> Rgba<u8> {
        self.frame.color
    }

    pub fn set_crop_handle_color(&mut self, color: Rgba<u8>) {
        self.crop_handle.color = color;
    }

    pub fn crop_handle_color(&self) -> Rgba<u8> {
        self.crop_handle.color
    }

    pub fn set_bounding_box_color(&mut self, color: Rgba<u8>) {
        self.bounding_box.color = color;
    }

    pub fn bounding_box_color(&self) -> Rgba<u8> {
        self.bounding_box.color
    }

    /// Restore signature colour, stroke width and background.
    pub fn reset_to_defaults(&mut self) {
        self.reset_signature_color();
        self.set_signature_stroke_width(self.default_stroke_width);
        self.reset_background_color();
    }

    // -- Paint accessors ---------------------------------------------------------

    pub fn signature_paint(&self) -> &Paint {
        &self.signature
    }

    pub fn frame_paint(&self) -> &Paint {
        &self.frame
    }

    pub fn frame_handle_paint(&self) -> &Paint {
        &self.frame_handle
    }

    pub fn bounding_box_paint(&self) -> &Paint {
        &self.bounding_box
    }

    pub fn crop_box_paint(&self) -> &Paint {
        &self.crop_box
    }

    pub fn crop_handle_paint(&self) -> &Paint {
        &self.crop_handle
    }

    pub fn handle_border_paint(&self) -> &Paint {
        &self.handle_border
    }

    pub fn background_paint(&self) -> &Paint {
        &self.background
    }

    pub fn instruction_style(&self) -> &TextStyle {
        &self.instruction
    }

    pub fn instruction_sub_style(&self) -> &TextStyle {
        &self.instruction_sub
    }

    pub fn bounding_box_label_style(&self) -> &TextStyle {
        &self.bounding_box_label
    }

    pub fn crop_box_label_style(&self) -> &TextStyle {
        &self.crop_box_label
    }
}

/// Whether `color` reads as dark (luma-weighted darkness of at least 0.5).
pub fn is_dark_color(color: SignatureColor) -> bool {
    let luma = 0.299 * color.r() as f64 + 0.587 * color.g() as f64 + 0.114 * color.b() as f64;
    1.0 - luma / 255.0 >= 0.5
}

/// White on dark colours, black on light ones.
pub fn contrast_color(color: SignatureColor) -> SignatureColor {
    if is_dark_color(color) {
        SignatureColor::WHITE
    } else {
        SignatureColor::BLACK
    }
}
