/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::warn;
use slog::{Logger, Never, SendSyncRefUnwindSafeDrain, o};

use modlog_types::log::{LogStats, Priority, key};

use crate::{
    AcquireError, GroupPolicy, LogBackend, LogConfig, LogConfigDriver, LogRecord, LoggerHandle,
    UnknownPriorityPolicy, WriteError,
};

mod registry;
mod report;
mod stats;

use registry::LoggerRegistry;
use report::ReportLogIoError;
use stats::BackendStats;
pub use stats::BackendSnapshot;

/// The in-process backend, one slog drain shared by all module loggers.
pub struct SlogBackend {
    root: Logger,
    registry: Mutex<LoggerRegistry>,
    min_priority: Priority,
    group_policy: GroupPolicy,
    unknown_priority: UnknownPriorityPolicy,
    stats: BackendStats,
    drain_stats: Option<Arc<LogStats>>,
}

impl SlogBackend {
    /// Start the drain described by `config`.
    ///
    /// Console and syslog drains spawn their io threads here.
    pub fn new(config: &LogConfig, program_name: &str) -> Self {
        let async_conf = config.async_conf(&format!("{program_name}-log"));
        match &config.driver {
            LogConfigDriver::Discard => SlogBackend::with_drain(slog::Discard, config),
            LogConfigDriver::Stdout | LogConfigDriver::Stderr => {
                let use_stdout = matches!(config.driver, LogConfigDriver::Stdout);
                let drain = modlog_stdlog::new_async_logger(
                    &async_conf,
                    config.append_code_position,
                    use_stdout,
                );
                let stats = drain.get_stats();
                let drain_name = if use_stdout { "stdout" } else { "stderr" };
                let drain = ReportLogIoError::new(drain, drain_name, config.io_err_sampling_mask);
                SlogBackend::build(drain, config, Some(stats))
            }
            #[cfg(unix)]
            LogConfigDriver::Syslog(builder) => {
                let mut builder = builder.clone();
                builder.append_code_position(config.append_code_position);
                let drain = builder.start_async(&async_conf);
                let stats = drain.get_stats();
                let drain = ReportLogIoError::new(drain, "syslog", config.io_err_sampling_mask);
                SlogBackend::build(drain, config, Some(stats))
            }
        }
    }

    /// Use a caller provided drain. Drain errors must already be handled.
    pub fn with_drain<D>(drain: D, config: &LogConfig) -> Self
    where
        D: SendSyncRefUnwindSafeDrain<Ok = (), Err = Never> + std::panic::UnwindSafe + 'static,
    {
        SlogBackend::build(drain, config, None)
    }

    fn build<D>(drain: D, config: &LogConfig, drain_stats: Option<Arc<LogStats>>) -> Self
    where
        D: SendSyncRefUnwindSafeDrain<Ok = (), Err = Never> + std::panic::UnwindSafe + 'static,
    {
        SlogBackend {
            root: Logger::root(drain, o!()),
            registry: Mutex::new(LoggerRegistry::new()),
            min_priority: config.min_priority,
            group_policy: config.group_policy,
            unknown_priority: config.unknown_priority,
            stats: BackendStats::default(),
            drain_stats,
        }
    }

    fn registry(&self) -> MutexGuard<'_, LoggerRegistry> {
        // the registry is never left half updated, so a poisoned lock is usable
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live module/group loggers.
    pub fn logger_count(&self) -> usize {
        self.registry().logger_count()
    }

    /// Number of modules with at least one live group logger.
    pub fn module_count(&self) -> usize {
        self.registry().module_count()
    }

    pub fn stats(&self) -> BackendSnapshot {
        let drain = self.drain_stats.as_ref().map(|s| s.snapshot());
        self.stats.snapshot(drain)
    }

    /// Wait for the io threads to catch up with what has been written so far.
    ///
    /// Returns false on timeout. Backends without an async drain are always idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let Some(stats) = &self.drain_stats else {
            return true;
        };
        let deadline = Instant::now() + timeout;
        loop {
            if stats.snapshot().pending() == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn resolve_priority(&self, name: &str) -> Result<Priority, WriteError> {
        match Priority::from_str(name) {
            Ok(p) => Ok(p),
            Err(e) => match self.unknown_priority {
                UnknownPriorityPolicy::Reject => Err(WriteError::UnknownPriority(e.0)),
                UnknownPriorityPolicy::Fallback(p) => Ok(p),
            },
        }
    }

    fn try_write(&self, handle: LoggerHandle, record: &LogRecord<'_>) -> Result<(), WriteError> {
        let logger = self.registry().get(handle).ok_or(WriteError::InvalidHandle)?;
        let priority = self.resolve_priority(record.priority)?;
        if priority < self.min_priority {
            self.stats.add_filtered();
            return Ok(());
        }
        emit(&logger, priority, record);
        self.stats.add_written();
        Ok(())
    }
}

impl LogBackend for SlogBackend {
    fn acquire(&self, module_id: &str, group_id: &str) -> Result<LoggerHandle, AcquireError> {
        if module_id.is_empty() {
            return Err(AcquireError::EmptyIdentifier("module"));
        }
        if group_id.is_empty() {
            return Err(AcquireError::EmptyIdentifier("group"));
        }
        if group_id == module_id {
            match self.group_policy {
                GroupPolicy::Allow => {}
                GroupPolicy::Warn => {
                    warn!("log group for module {module_id} uses the module identifier");
                }
                GroupPolicy::Reject => {
                    return Err(AcquireError::GroupIsModule(module_id.to_string()));
                }
            }
        }
        Ok(self.registry().get_or_insert(&self.root, module_id, group_id))
    }

    fn write(&self, handle: LoggerHandle, record: &LogRecord<'_>) -> Result<(), WriteError> {
        self.try_write(handle, record).inspect_err(|_| {
            self.stats.add_rejected();
        })
    }

    fn release(&self, module_id: &str, group_id: &str) {
        self.registry().remove(module_id, group_id);
    }
}

fn emit(logger: &Logger, priority: Priority, record: &LogRecord<'_>) {
    macro_rules! emit_at {
        ($level:ident) => {
            slog::$level!(logger, "{}", record.message;
                key::PRIORITY => priority.as_str(),
                key::FILE => record.file_name,
                key::LINE => record.file_line,
                key::FUNCTION => record.function_name
            )
        };
    }

    match priority {
        Priority::Fatal | Priority::Critical => emit_at!(crit),
        Priority::Error => emit_at!(error),
        Priority::Warning => emit_at!(warn),
        Priority::Notice | Priority::Information => emit_at!(info),
        Priority::Debug => emit_at!(debug),
        Priority::Trace => emit_at!(trace),
    }
}
