// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Signwerk.

use thiserror::Error;

/// Top-level error type for all Signwerk operations.
///
/// Geometry, mode transitions and rendering never fail; only decoding,
/// encoding, file I/O and background work cross this boundary.
#[derive(Debug, Error)]
pub enum SignwerkError {
    // -- Image errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("could not decode {0}")]
    Decode(String),

    // -- Editing session --
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("background task failed: {0}")]
    Background(String),

    // -- Storage / persistence --
    #[error("cache write failed: {0}")]
    Cache(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SignwerkError>;
