// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the host screens to the signwerk backend crates.
//
// Each service wraps the document crate in a way that is convenient for a
// screen to drive (touch in, references and outcomes out).

pub mod app_services;
pub mod capture;
pub mod data_dir;
pub mod preview;
pub mod signature_store;
