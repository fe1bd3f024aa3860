// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Result of a reload request

use super::error::ReloadError;
use crate::registry::Generation;
use std::sync::Arc;

/// Result of a finished reload run, shared with every caller that joined it
pub type RunResult = Result<Arc<Generation>, Arc<ReloadError>>;

/// What happened to one reload request
#[derive(Debug, Clone)]
pub enum ReloadOutcome {
    /// This call ran the reload and committed the generation
    Committed(Arc<Generation>),

    /// This call ran the reload and it failed
    Failed(Arc<ReloadError>),

    /// Another reload was in flight; this is its result
    Joined(RunResult),

    /// Another reload was in flight and the caller chose not to wait
    AlreadyInProgress,
}

impl ReloadOutcome {
    /// The committed generation, whether this call or the joined run produced it
    pub fn generation(&self) -> Option<&Arc<Generation>> {
        match self {
            ReloadOutcome::Committed(generation) | ReloadOutcome::Joined(Ok(generation)) => {
                Some(generation)
            }
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ReloadError> {
        match self {
            ReloadOutcome::Failed(error) | ReloadOutcome::Joined(Err(error)) => Some(error),
            _ => None,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.generation().is_some()
    }

    /// Collapse into the run's result; `None` when no run was observed
    pub fn into_result(self) -> Option<RunResult> {
        match self {
            ReloadOutcome::Committed(generation) => Some(Ok(generation)),
            ReloadOutcome::Failed(error) => Some(Err(error)),
            ReloadOutcome::Joined(result) => Some(result),
            ReloadOutcome::AlreadyInProgress => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReloadOutcome::Committed(_) => "committed",
            ReloadOutcome::Failed(_) => "failed",
            ReloadOutcome::Joined(Ok(_)) => "joined (committed)",
            ReloadOutcome::Joined(Err(_)) => "joined (failed)",
            ReloadOutcome::AlreadyInProgress => "already in progress",
        }
    }
}
