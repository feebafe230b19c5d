// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result types for one distillation batch run. Transient: returned to the
//! invoking scheduler, never persisted.

use serde::{Deserialize, Serialize};

/// Counters for one invocation of the distillation batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistillationRun {
    /// Users attempted, successes and failures both.
    pub users_processed: usize,
    /// Insight entries appended across all users.
    pub total_insights: usize,
    /// Per-user failures. A failure here never aborted sibling users.
    pub errors: Vec<UserError>,
}

/// One isolated per-user failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserError {
    pub user_id: String,
    pub message: String,
}
