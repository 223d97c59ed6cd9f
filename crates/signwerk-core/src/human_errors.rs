// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the signing screens.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the screen presents it (toast, dialog, retry button).

use crate::error::SignwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Storage blip or interrupted work, retrying may help.
    Transient,
    /// User must do something (pick an image, draw a signature).
    ActionRequired,
    /// Cannot be fixed by retrying, e.g. a damaged file.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading or toast).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same action can succeed. Edits are kept either way.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `SignwerkError` into a `HumanError` for display.
pub fn humanize_error(err: &SignwerkError) -> HumanError {
    match err {
        SignwerkError::ImageError(_) => HumanError {
            message: "We couldn't process this image.".into(),
            suggestion: "The image may be too large or in an unusual format. Try a different photo.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        SignwerkError::Decode(what) => HumanError {
            message: "The picture couldn't be opened.".into(),
            suggestion: format!("It may have been moved or damaged. Try choosing it again. ({what})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SignwerkError::MissingInput(what) => HumanError {
            message: "Something is missing before we can sign.".into(),
            suggestion: format!("Make sure both a photo and a signature are selected. (Missing: {what})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SignwerkError::Background(_) => HumanError {
            message: "Signing the image was interrupted.".into(),
            suggestion: "Your signature placement is still there. Tap confirm to try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SignwerkError::Cache(_) => HumanError {
            message: "Saving the signed image failed.".into(),
            suggestion: "Your signature placement is still there. Free up some storage and tap confirm again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SignwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "That image is no longer on the device.".into(),
                suggestion: "Pick the photo or signature again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to use that file.".into(),
                suggestion: "Check the app's storage permission, then try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "The signed image couldn't be read or saved.".into(),
                suggestion: "Free up some storage and try again.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        SignwerkError::Serialization(_) => HumanError {
            message: "Saved settings or signatures could not be read.".into(),
            suggestion: "Try again. Your saved signatures may need to be added again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
