// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding with orientation, downscaling, encoding, fingerprints.

pub mod processor;

pub use processor::{fingerprint_rgba, fits_within, ImageProcessor};
