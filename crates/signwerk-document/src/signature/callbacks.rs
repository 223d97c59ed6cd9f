// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Change notifications from the signature view to its single host observer.

use super::geometry::Rect;

/// Something the host screen may want to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignatureEvent {
    /// A new stroke was started.
    SignatureChanged,
    BoundingBoxDetected(Rect),
    CropBoxChanged(Rect),
    FrameResized(Rect),
}

/// Receiver of [`SignatureEvent`]s. Closures implement it directly.
pub trait SignatureObserver {
    fn on_event(&mut self, event: &SignatureEvent);
}

impl<F> SignatureObserver for F
where
    F: FnMut(&SignatureEvent),
{
    fn on_event(&mut self, event: &SignatureEvent) {
        self(event)
    }
}

/// Holds at most one observer and forwards events to it.
///
/// Events carry copies of the rectangles, so observers never see later edits.
#[derive(Default)]
pub struct CallbackHandler {
    observer: Option<Box<dyn SignatureObserver + Send>>,
}

impl CallbackHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl SignatureObserver + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    pub fn notify(&mut self, event: SignatureEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&event);
        }
    }
}

impl std::fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("has_observer", &self.has_observer())
            .finish()
    }
}
