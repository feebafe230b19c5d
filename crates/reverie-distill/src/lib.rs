// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch distillation for Reverie.
//!
//! Folds recent artifact entries into durable insight entries on each
//! user's reserved soul artifact, with per-user failure isolation. The
//! single entry point, [`Distiller::run_for_all_users`], is designed to be
//! invoked by an external scheduler.

pub mod distiller;
pub mod types;

pub use distiller::Distiller;
pub use types::{DistillationRun, UserError};
