/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use foldhash::fast::FixedState;
use slog::{Logger, o};

use modlog_types::log::key;

use crate::LoggerHandle;

// shared by every registry in the process so that a handle issued by a
// replaced backend never matches a logger of the new one
static NEXT_HANDLE_ID: AtomicUsize = AtomicUsize::new(1);

fn next_handle() -> LoggerHandle {
    let id = NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed);
    match NonZeroUsize::new(id) {
        Some(id) => LoggerHandle::new(id),
        None => next_handle(),
    }
}

struct GroupEntry {
    handle: LoggerHandle,
}

struct ModuleEntry {
    logger: Logger,
    groups: HashMap<String, GroupEntry, FixedState>,
}

/// Loggers indexed both by module/group pair and by handle.
pub(super) struct LoggerRegistry {
    modules: HashMap<String, ModuleEntry, FixedState>,
    handles: HashMap<LoggerHandle, Logger, FixedState>,
}

impl LoggerRegistry {
    pub(super) fn new() -> Self {
        LoggerRegistry {
            modules: HashMap::with_hasher(FixedState::with_seed(0)),
            handles: HashMap::with_hasher(FixedState::with_seed(0)),
        }
    }

    pub(super) fn get_or_insert(
        &mut self,
        root: &Logger,
        module: &str,
        group: &str,
    ) -> LoggerHandle {
        let module_entry = self
            .modules
            .entry(module.to_string())
            .or_insert_with(|| ModuleEntry {
                logger: root.new(o!(key::MODULE => module.to_string())),
                groups: HashMap::with_hasher(FixedState::with_seed(0)),
            });

        if let Some(g) = module_entry.groups.get(group) {
            return g.handle;
        }

        let handle = next_handle();
        let logger = module_entry
            .logger
            .new(o!(key::GROUP => group.to_string()));
        module_entry
            .groups
            .insert(group.to_string(), GroupEntry { handle });
        self.handles.insert(handle, logger);
        handle
    }

    pub(super) fn get(&self, handle: LoggerHandle) -> Option<Logger> {
        self.handles.get(&handle).cloned()
    }

    /// Returns false if the pair was not registered.
    pub(super) fn remove(&mut self, module: &str, group: &str) -> bool {
        let Some(module_entry) = self.modules.get_mut(module) else {
            return false;
        };
        let Some(g) = module_entry.groups.remove(group) else {
            return false;
        };
        self.handles.remove(&g.handle);
        if module_entry.groups.is_empty() {
            self.modules.remove(module);
        }
        true
    }

    pub(super) fn logger_count(&self) -> usize {
        self.handles.len()
    }

    pub(super) fn module_count(&self) -> usize {
        self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Logger {
        Logger::root(slog::Discard, o!())
    }

    #[test]
    fn shared_per_pair() {
        let root = root();
        let mut r = LoggerRegistry::new();
        let h1 = r.get_or_insert(&root, "camera", "acquisition");
        let h2 = r.get_or_insert(&root, "camera", "acquisition");
        let h3 = r.get_or_insert(&root, "camera", "transfer");
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_eq!(r.logger_count(), 2);
        assert_eq!(r.module_count(), 1);
    }

    #[test]
    fn remove_drops_module() {
        let root = root();
        let mut r = LoggerRegistry::new();
        let h1 = r.get_or_insert(&root, "camera", "a");
        let h2 = r.get_or_insert(&root, "camera", "b");

        assert!(r.remove("camera", "a"));
        assert!(r.get(h1).is_none());
        assert!(r.get(h2).is_some());
        assert_eq!(r.module_count(), 1);

        assert!(r.remove("camera", "b"));
        assert_eq!(r.module_count(), 0);
        assert_eq!(r.logger_count(), 0);

        assert!(!r.remove("camera", "b"));
        assert!(!r.remove("stage", "x"));
    }

    #[test]
    fn ids_not_reused() {
        let root = root();
        let mut r = LoggerRegistry::new();
        let h1 = r.get_or_insert(&root, "camera", "a");
        r.remove("camera", "a");
        let h2 = r.get_or_insert(&root, "camera", "a");
        assert_ne!(h1, h2);
        assert!(r.get(h1).is_none());
    }
}
