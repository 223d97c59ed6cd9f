// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Saved signature store — the set of captured signature references offered
// for reuse, persisted as JSON in the data directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use signwerk_core::error::Result;
use signwerk_core::ImageRef;
use tracing::{debug, info, warn};

/// File name of the store inside the data directory.
pub const STORE_FILE: &str = "signatures.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSignatures {
    signatures: BTreeSet<ImageRef>,
}

/// Opaque signature references. Each call reads and rewrites the file, so
/// two stores on one directory never hold stale copies.
#[derive(Debug, Clone)]
pub struct SignatureStore {
    path: PathBuf,
}

impl SignatureStore {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORE_FILE),
        }
    }

    /// Remember `reference`. Returns `false` if it was already stored.
    pub fn add(&self, reference: &ImageRef) -> Result<bool> {
        let mut stored = self.load();
        let added = stored.signatures.insert(reference.clone());
        if added {
            self.persist(&stored)?;
            info!(signature = %reference, "Signature saved");
        }
        Ok(added)
    }

    /// All stored references in a stable order.
    pub fn list(&self) -> Vec<ImageRef> {
        self.load().signatures.into_iter().collect()
    }

    /// Forget `reference`. Returns `false` if it was not stored.
    pub fn remove(&self, reference: &ImageRef) -> Result<bool> {
        let mut stored = self.load();
        let removed = stored.signatures.remove(reference);
        if removed {
            self.persist(&stored)?;
            debug!(signature = %reference, "Signature forgotten");
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => {
                info!("Saved signatures cleared");
                Ok(())
            }
        }
    }

    /// Missing or unreadable files count as an empty store.
    fn load(&self) -> StoredSignatures {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(_) => return StoredSignatures::default(),
        };
        serde_json::from_str(&data).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "Signature store unreadable, starting empty");
            StoredSignatures::default()
        })
    }

    fn persist(&self, stored: &StoredSignatures) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(stored)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
