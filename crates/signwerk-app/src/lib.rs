// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// signwerk-app — Host-screen services for Signwerk.
//
// Signature capture, the sign-preview compositing session, the saved
// signature store and logging setup for whichever shell embeds them.

pub mod services;

pub use services::app_services::SignwerkServices;
pub use services::capture::{CapturedSignature, SignatureCapture};
pub use services::preview::{CompositeTask, SignPreviewSession};
pub use services::signature_store::SignatureStore;

use tracing_subscriber::EnvFilter;

/// Initialise structured logging. `RUST_LOG` overrides the default `info`
/// level. Calling this more than once is harmless.
pub fn init_logging() {
    let initialised = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();
    if initialised {
        tracing::info!("Signwerk logging initialised");
    }
}
