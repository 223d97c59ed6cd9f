// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositor — maps the on-screen signature frame into base-image pixels and
// warps the signature onto a copy of the base image.
//
// The base image is shown letterboxed inside the preview view. One transform
// converts in both directions: placement → initial on-screen frame when the
// preview opens, and final frame → bitmap pixels on confirm.

use std::borrow::Cow;
use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use signwerk_core::{Placement, SignatureColor};
use tracing::{debug, info, instrument};

use super::geometry::{Point, Rect, rotate_point};
use crate::image::{ImageProcessor, fits_within};

/// Uniform fit of a bitmap inside a view, centred with padding on the
/// shorter axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl LetterboxTransform {
    /// `None` when either the view or the bitmap has no area.
    pub fn fit(view_width: f32, view_height: f32, bitmap_width: u32, bitmap_height: u32) -> Option<Self> {
        if view_width <= 0.0 || view_height <= 0.0 || bitmap_width == 0 || bitmap_height == 0 {
            return None;
        }
        let bw = bitmap_width as f32;
        let bh = bitmap_height as f32;
        let scale = (view_width / bw).min(view_height / bh);
        Some(Self {
            scale,
            offset_x: (view_width - bw * scale) / 2.0,
            offset_y: (view_height - bh * scale) / 2.0,
        })
    }

    pub fn to_bitmap_point(&self, p: Point) -> Point {
        Point::new((p.x - self.offset_x) / self.scale, (p.y - self.offset_y) / self.scale)
    }

    pub fn to_view_point(&self, p: Point) -> Point {
        Point::new(self.offset_x + p.x * self.scale, self.offset_y + p.y * self.scale)
    }

    /// Convert each edge independently. Rotation is not applied here; it
    /// happens at composite time around the converted rectangle's centre.
    pub fn to_bitmap_rect(&self, view: Rect) -> Rect {
        let tl = self.to_bitmap_point(Point::new(view.left, view.top));
        let br = self.to_bitmap_point(Point::new(view.right, view.bottom));
        Rect::new(tl.x, tl.y, br.x, br.y)
    }

    pub fn to_view_rect(&self, bitmap: Rect) -> Rect {
        let tl = self.to_view_point(Point::new(bitmap.left, bitmap.top));
        let br = self.to_view_point(Point::new(bitmap.right, bitmap.bottom));
        Rect::new(tl.x, tl.y, br.x, br.y)
    }

    /// On-screen frame for a signature of `width × height` bitmap pixels
    /// placed with its top-left corner at `placement`.
    pub fn placement_frame(&self, placement: Placement, width: u32, height: u32) -> Rect {
        self.to_view_rect(Rect::from_xywh(placement.x, placement.y, width as f32, height as f32))
    }
}

/// Draw `signature` stretched into `frame` (base-image pixels), rotated by
/// `rotation` radians around the frame centre, onto a copy of `base`.
pub fn composite(base: &RgbaImage, signature: &RgbaImage, frame: Rect, rotation: f32) -> RgbaImage {
    composite_onto(base.clone(), signature, frame, rotation)
}

/// [`composite`] onto `base` itself. The signature is warped bilinearly into
/// a transparent layer over the rotated frame's footprint and alpha-blended
/// onto the base.
#[instrument(skip(base, signature), fields(
    base_w = base.width(),
    base_h = base.height(),
    degrees = rotation.to_degrees()
))]
pub fn composite_onto(mut base: RgbaImage, signature: &RgbaImage, frame: Rect, rotation: f32) -> RgbaImage {
    if frame.is_empty() || signature.width() == 0 || signature.height() == 0 {
        debug!(?frame, "Nothing to composite");
        return base;
    }

    let center = frame.center();
    let corners = [
        Point::new(frame.left, frame.top),
        Point::new(frame.right, frame.top),
        Point::new(frame.right, frame.bottom),
        Point::new(frame.left, frame.bottom),
    ];
    let mut footprint = Rect::bounding(corners.map(|p| rotate_point(p, center, rotation)));
    footprint = Rect::new(
        footprint.left.floor().max(0.0),
        footprint.top.floor().max(0.0),
        footprint.right.ceil().min(base.width() as f32),
        footprint.bottom.ceil().min(base.height() as f32),
    );
    if footprint.is_empty() {
        debug!(?frame, "Frame lies outside the base image");
        return base;
    }

    // Pixel centres sit at +0.5 in frame space and at integers for imageproc.
    let projection = Projection::translate(-0.5 - footprint.left, -0.5 - footprint.top)
        * Projection::translate(center.x, center.y)
        * Projection::rotate(rotation)
        * Projection::translate(frame.left - center.x, frame.top - center.y)
        * Projection::scale(
            frame.width() / signature.width() as f32,
            frame.height() / signature.height() as f32,
        )
        * Projection::translate(0.5, 0.5);

    let mut layer = RgbaImage::new(footprint.width() as u32, footprint.height() as u32);
    warp_into(signature, &projection, Interpolation::Bilinear, Rgba([0, 0, 0, 0]), &mut layer);
    imageops::overlay(&mut base, &layer, footprint.left as i64, footprint.top as i64);

    debug!(?frame, ?footprint, "Signature composited");
    base
}

/// Everything a background composite needs, captured on the interaction
/// thread at confirm time. Source bitmaps are shared read-only.
#[derive(Debug, Clone)]
pub struct CompositeRequest {
    pub base: Arc<RgbaImage>,
    /// Already recoloured.
    pub signature: Arc<RgbaImage>,
    pub color: SignatureColor,
    /// Frame in view coordinates.
    pub frame: Rect,
    pub rotation: f32,
    pub view_width: u32,
    pub view_height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

/// Pixels produced by [`CompositeRequest::run`].
#[derive(Debug, Clone)]
pub struct CompositeResult {
    pub image: RgbaImage,
    /// Where the frame landed in the (possibly downscaled) base image.
    pub bitmap_frame: Rect,
}

impl CompositeRequest {
    /// Downscale the base if needed, convert the frame into its pixels and
    /// composite. `None` when the view or base has no area.
    pub fn run(&self) -> Option<CompositeResult> {
        let processed: Cow<'_, RgbaImage> =
            if fits_within(self.base.width(), self.base.height(), self.max_width, self.max_height) {
                Cow::Borrowed(&*self.base)
            } else {
                Cow::Owned(
                    ImageProcessor::from_dynamic(DynamicImage::ImageRgba8((*self.base).clone()))
                        .resize_to_fit(self.max_width, self.max_height)
                        .into_dynamic()
                        .into_rgba8(),
                )
            };

        let transform = LetterboxTransform::fit(
            self.view_width as f32,
            self.view_height as f32,
            processed.width(),
            processed.height(),
        )?;
        let bitmap_frame = transform.to_bitmap_rect(self.frame);
        info!(
            ?bitmap_frame,
            degrees = self.rotation.to_degrees(),
            color = %self.color,
            "Compositing signature"
        );

        let image = composite_onto(processed.into_owned(), &self.signature, bitmap_frame, self.rotation);
        Some(CompositeResult { image, bitmap_frame })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::fingerprint_rgba;
    use std::f32::consts::{FRAC_PI_2, PI};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn close(a: Rect, b: Rect) -> bool {
        (a.left - b.left).abs() < 1e-3
            && (a.top - b.top).abs() < 1e-3
            && (a.right - b.right).abs() < 1e-3
            && (a.bottom - b.bottom).abs() < 1e-3
    }

    /// 4×4 signature with one colour per quadrant.
    fn quadrants() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| match (x < 2, y < 2) {
            (true, true) => RED,
            (false, true) => GREEN,
            (true, false) => BLUE,
            (false, false) => BLACK,
        })
    }

    #[test]
    fn matching_aspect_has_no_letterbox() {
        let t = LetterboxTransform::fit(1000.0, 1600.0, 500, 800).unwrap();
        assert_eq!(t.scale, 2.0);
        assert_eq!((t.offset_x, t.offset_y), (0.0, 0.0));
        assert_eq!(
            t.to_bitmap_rect(Rect::new(100.0, 100.0, 300.0, 300.0)),
            Rect::new(50.0, 50.0, 150.0, 150.0)
        );
    }

    #[test]
    fn wide_bitmap_is_padded_vertically() {
        let t = LetterboxTransform::fit(1000.0, 1000.0, 500, 250).unwrap();
        assert_eq!(t.scale, 2.0);
        assert_eq!((t.offset_x, t.offset_y), (0.0, 250.0));
        assert_eq!(t.to_bitmap_point(Point::new(0.0, 250.0)), Point::new(0.0, 0.0));
    }

    #[test]
    fn degenerate_sizes_have_no_transform() {
        assert!(LetterboxTransform::fit(0.0, 100.0, 10, 10).is_none());
        assert!(LetterboxTransform::fit(100.0, 100.0, 0, 10).is_none());
    }

    #[test]
    fn view_and_bitmap_conversions_round_trip() {
        let cases = [
            (1080.0, 1920.0, 3024, 4032),
            (720.0, 1280.0, 1920, 1080),
            (1000.0, 1000.0, 333, 777),
            (411.0, 683.0, 1080, 1920),
        ];
        let frames = [
            Rect::new(10.0, 20.0, 210.0, 120.0),
            Rect::new(-50.0, 300.5, 400.25, 333.0),
            Rect::new(0.0, 0.0, 1.0, 1.0),
        ];
        for (vw, vh, bw, bh) in cases {
            let t = LetterboxTransform::fit(vw, vh, bw, bh).unwrap();
            for frame in frames {
                assert!(close(t.to_bitmap_rect(t.to_view_rect(frame)), frame));
                assert!(close(t.to_view_rect(t.to_bitmap_rect(frame)), frame));
            }
        }
    }

    #[test]
    fn placement_survives_the_trip_through_the_view() {
        let t = LetterboxTransform::fit(1080.0, 1700.0, 2000, 1500).unwrap();
        let frame = t.placement_frame(Placement { x: 120.0, y: 340.0 }, 600, 200);
        assert!(close(t.to_bitmap_rect(frame), Rect::new(120.0, 340.0, 720.0, 540.0)));
    }

    /// Channel-wise equality within bilinear rounding.
    fn assert_near(actual: &Rgba<u8>, expected: Rgba<u8>) {
        let close = actual
            .0
            .iter()
            .zip(expected.0)
            .all(|(a, e)| (*a as i16 - e as i16).abs() <= 3);
        assert!(close, "{actual:?} is not close to {expected:?}");
    }

    #[test]
    fn full_frame_at_zero_rotation_reproduces_the_signature() {
        let base = RgbaImage::from_pixel(8, 8, WHITE);
        let merged = composite(&base, &quadrants(), Rect::new(0.0, 0.0, 8.0, 8.0), 0.0);

        assert_near(merged.get_pixel(1, 1), RED);
        assert_near(merged.get_pixel(6, 1), GREEN);
        assert_near(merged.get_pixel(1, 6), BLUE);
        assert_near(merged.get_pixel(6, 6), BLACK);
    }

    #[test]
    fn upscaled_signature_is_smoothed() {
        let base = RgbaImage::from_pixel(8, 8, WHITE);
        let merged = composite(&base, &quadrants(), Rect::new(0.0, 0.0, 8.0, 8.0), 0.0);

        // Across the red/green seam the two colours mix instead of stepping.
        let seam = merged.get_pixel(4, 1);
        assert!(seam[0] > 40 && seam[1] > 40, "{seam:?}");
    }

    #[test]
    fn half_turn_swaps_opposite_corners() {
        let base = RgbaImage::from_pixel(8, 8, WHITE);
        let merged = composite(&base, &quadrants(), Rect::new(0.0, 0.0, 8.0, 8.0), PI);

        assert_near(merged.get_pixel(1, 1), BLACK);
        assert_near(merged.get_pixel(6, 6), RED);
        assert_near(merged.get_pixel(6, 1), BLUE);
    }

    #[test]
    fn quarter_turn_rotates_about_the_frame_centre() {
        let base = RgbaImage::from_pixel(40, 40, WHITE);
        let signature = RgbaImage::from_pixel(20, 4, BLACK);
        // A wide bar turned upright around (20, 20).
        let merged = composite(&base, &signature, Rect::new(10.0, 18.0, 30.0, 22.0), FRAC_PI_2);

        assert_near(merged.get_pixel(20, 12), BLACK);
        assert_near(merged.get_pixel(20, 27), BLACK);
        assert_eq!(*merged.get_pixel(12, 20), WHITE);
        assert_eq!(*merged.get_pixel(27, 20), WHITE);
    }

    #[test]
    fn transparent_signature_pixels_keep_the_base() {
        let base = RgbaImage::from_pixel(6, 6, WHITE);
        let mut signature = RgbaImage::new(2, 2);
        signature.put_pixel(0, 0, BLACK);

        let merged = composite(&base, &signature, Rect::new(2.0, 2.0, 4.0, 4.0), 0.0);
        assert_eq!(*merged.get_pixel(2, 2), BLACK);
        assert_eq!(*merged.get_pixel(3, 3), WHITE);
        assert_eq!(*merged.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn frame_outside_the_base_changes_nothing() {
        let base = RgbaImage::from_pixel(6, 6, WHITE);
        let merged = composite(&base, &quadrants(), Rect::new(50.0, 50.0, 60.0, 60.0), 0.0);
        assert_eq!(fingerprint_rgba(&merged), fingerprint_rgba(&base));
    }

    fn request(base: &Arc<RgbaImage>, frame: Rect, view: (u32, u32)) -> CompositeRequest {
        CompositeRequest {
            base: Arc::clone(base),
            signature: Arc::new(quadrants()),
            color: SignatureColor::BLACK,
            frame,
            rotation: 0.0,
            view_width: view.0,
            view_height: view.1,
            max_width: 1080,
            max_height: 1920,
        }
    }

    #[test]
    fn request_downscales_and_leaves_sources_alone() {
        let base = Arc::new(RgbaImage::from_pixel(2160, 100, WHITE));
        let base_print = fingerprint_rgba(&base);

        let result = request(&base, Rect::new(0.0, 0.0, 108.0, 5.0), (1080, 50)).run().unwrap();

        assert_eq!(result.image.dimensions(), (1080, 50));
        assert!(close(result.bitmap_frame, Rect::new(0.0, 0.0, 108.0, 5.0)));
        assert_near(result.image.get_pixel(20, 1), RED);
        assert_eq!(fingerprint_rgba(&base), base_print);
    }

    #[test]
    fn request_within_limits_keeps_base_pixels_verbatim() {
        // A pattern any resampling would smear.
        let base = Arc::new(RgbaImage::from_fn(300, 200, |x, y| {
            if (x + y) % 2 == 0 { WHITE } else { BLACK }
        }));

        let result = request(&base, Rect::new(0.0, 0.0, 40.0, 40.0), (300, 200)).run().unwrap();

        assert_eq!(result.image.dimensions(), (300, 200));
        for (x, y) in [(100, 100), (101, 100), (299, 199), (150, 3)] {
            assert_eq!(result.image.get_pixel(x, y), base.get_pixel(x, y));
        }
        assert_eq!(Arc::strong_count(&base), 1);
    }
}
