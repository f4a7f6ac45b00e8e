/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

use modlog_types::log::LogSnapshot;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendSnapshot {
    /// Records handed to the drain.
    pub written: u64,
    /// Records below the minimum priority.
    pub filtered: u64,
    /// Failed writes.
    pub rejected: u64,
    /// Counters of the drain itself, when it has any.
    pub drain: Option<LogSnapshot>,
}

#[derive(Default)]
pub(super) struct BackendStats {
    written: AtomicU64,
    filtered: AtomicU64,
    rejected: AtomicU64,
}

impl BackendStats {
    pub(super) fn add_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn add_filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn add_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self, drain: Option<LogSnapshot>) -> BackendSnapshot {
        BackendSnapshot {
            written: self.written.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            drain,
        }
    }
}
