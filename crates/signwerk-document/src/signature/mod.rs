// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signature overlay subsystem — editing state, modes, touch gestures,
// rendering, bounding-box detection and compositing onto a base image.

pub mod bitmap;
pub mod callbacks;
pub mod compositor;
pub mod geometry;
pub mod mode;
pub mod paint;
pub mod path;
pub mod raster;
pub mod render;
pub mod state;
pub mod touch;
pub mod view;

pub use bitmap::{recolor, BitmapProcessor};
pub use callbacks::{CallbackHandler, SignatureEvent, SignatureObserver};
pub use compositor::{composite, composite_onto, CompositeRequest, CompositeResult, LetterboxTransform};
pub use geometry::{Point, Rect};
pub use mode::{Mode, ModeManager};
pub use paint::PaintManager;
pub use path::SignaturePath;
pub use raster::RasterCanvas;
pub use render::{Canvas, CommandRecorder, DrawOp, Renderer};
pub use state::StateManager;
pub use touch::{TouchAction, TouchHandler};
pub use view::SignatureView;
