/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Diagnostics of the host program itself, sent to the `log` facade.

use slog::{Drain, o};
use slog_scope::GlobalLoggerGuard;

use modlog_types::log::AsyncLogConfig;

const PROCESS_LOG_THREAD_NAME: &str = "log-process";

/// Where process log lines go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessLogTarget {
    Stderr,
    #[cfg(unix)]
    Syslog(String),
}

pub fn verbose_level(verbose: u8) -> log::Level {
    match verbose {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

/// Install the global logger behind the `log` macros.
///
/// Keep the returned guard alive for as long as the process logs.
pub fn setup(
    target: ProcessLogTarget,
    verbose: u8,
) -> Result<GlobalLoggerGuard, log::SetLoggerError> {
    let async_conf = AsyncLogConfig::with_name(PROCESS_LOG_THREAD_NAME);
    let logger = match target {
        ProcessLogTarget::Stderr => {
            let drain = modlog_stdlog::new_async_logger(&async_conf, true, false);
            slog::Logger::root(drain.ignore_res(), o!())
        }
        #[cfg(unix)]
        ProcessLogTarget::Syslog(ident) => {
            let mut builder = modlog_syslog::SyslogBuilder::with_ident(ident);
            builder.append_code_position(true);
            let drain = builder.start_async(&async_conf);
            slog::Logger::root(drain.ignore_res(), o!())
        }
    };

    let scope_guard = slog_scope::set_global_logger(logger);
    slog_stdlog::init_with_level(verbose_level(verbose))?;
    Ok(scope_guard)
}
