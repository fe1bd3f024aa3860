// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Non-blocking single-flight guard
//!
//! A guard is either `Idle` or `Running`. The only legal transitions are
//! `Idle -> Running` through [`RunGuard::try_acquire`] and `Running -> Idle`
//! when the returned permit is dropped. Acquiring a running guard fails
//! immediately instead of waiting.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Idle = 0,
    Running = 1,
}

/// Compare-and-set guard around a critical section
#[derive(Debug)]
pub struct RunGuard {
    name: &'static str,
    state: AtomicU8,
}

impl RunGuard {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            state: AtomicU8::new(RunState::Idle as u8),
        })
    }

    /// Enter the critical section, or `None` if it is already active
    pub fn try_acquire(self: &Arc<Self>) -> Option<RunPermit> {
        self.state
            .compare_exchange(
                RunState::Idle as u8,
                RunState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()
            .map(|_| {
                log::trace!("Entered '{}' section", self.name);
                RunPermit {
                    guard: Arc::clone(self),
                }
            })
    }

    pub fn state(&self) -> RunState {
        if self.state.load(Ordering::Acquire) == RunState::Running as u8 {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Proof of being inside the section; leaving happens on drop
#[derive(Debug)]
pub struct RunPermit {
    guard: Arc<RunGuard>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.guard
            .state
            .store(RunState::Idle as u8, Ordering::Release);
        log::trace!("Left '{}' section", self.guard.name);
    }
}
